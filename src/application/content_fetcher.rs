// Content fetcher - builds activity URLs and retrieves activity definitions
use crate::application::dashboard_transport::{DashboardTransport, TransportError};
use crate::domain::page::{Params, add_arg_to_uri, param_to_string};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Clone)]
pub struct ContentFetcher {
    transport: Arc<dyn DashboardTransport>,
    page_path: String,
    page_query: Params,
    in_flight: Arc<AtomicUsize>,
}

impl ContentFetcher {
    pub fn new(transport: Arc<dyn DashboardTransport>, page_path: String, page_query: Params) -> Self {
        Self {
            transport,
            page_path,
            page_query,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn transport(&self) -> Arc<dyn DashboardTransport> {
        self.transport.clone()
    }

    /// Shared handle on the number of fetches currently in flight.
    pub fn in_flight(&self) -> Arc<AtomicUsize> {
        self.in_flight.clone()
    }

    /// Base params, then each extra map in order (later wins), then any query parameter
    /// of the dashboard page itself that is not already present.
    pub fn build_params(&self, base: &Params, extra_params: &[Params]) -> Params {
        let mut params = base.clone();
        for extra in extra_params {
            for (name, value) in extra {
                params.insert(name.clone(), value.clone());
            }
        }
        for (name, value) in &self.page_query {
            if !params.contains_key(name) {
                params.insert(name.clone(), value.clone());
            }
        }
        params
    }

    /// `<locator>?_panel=<name>&_variable=_<name>&_pageSrc=<page>&<params...>`
    pub fn build_url(&self, panel: &str, locator: &str, params: &Params) -> String {
        let mut url = add_arg_to_uri(locator, "_panel", panel);
        url = add_arg_to_uri(&url, "_variable", &format!("_{}", panel));
        url = add_arg_to_uri(&url, "_pageSrc", &self.page_path);
        for (name, value) in params {
            url = add_arg_to_uri(&url, name, &param_to_string(value));
        }
        url
    }

    pub async fn fetch(&self, url: &str) -> Result<String, TransportError> {
        let _guard = InFlightGuard::enter(&self.in_flight);
        tracing::debug!("fetch() loading: {}", url);
        self.transport.get(url).await
    }
}

struct InFlightGuard<'a>(&'a AtomicUsize);

impl<'a> InFlightGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
