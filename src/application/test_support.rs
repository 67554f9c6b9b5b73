// In-memory transport used by the session tests
use crate::application::dashboard_transport::{DashboardTransport, TransportError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// Answers requests by path (the URL before `?`) and records every request made.
#[derive(Default)]
pub struct ScriptedTransport {
    gets: Mutex<HashMap<String, Result<String, u16>>>,
    posts: Mutex<HashMap<String, Result<String, u16>>>,
    get_log: Mutex<Vec<String>>,
    post_log: Mutex<Vec<(String, Value)>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, path: &str, body: &str) {
        self.gets
            .lock()
            .unwrap()
            .insert(path.to_string(), Ok(body.to_string()));
    }

    pub fn respond_post(&self, path: &str, body: &str) {
        self.posts
            .lock()
            .unwrap()
            .insert(path.to_string(), Ok(body.to_string()));
    }

    pub fn fail_post(&self, path: &str, status: u16) {
        self.posts.lock().unwrap().insert(path.to_string(), Err(status));
    }

    pub fn gets(&self) -> Vec<String> {
        self.get_log.lock().unwrap().clone()
    }

    /// Paths (without query) of every GET, in order.
    pub fn get_paths(&self) -> Vec<String> {
        self.gets().iter().map(|url| path_of(url).to_string()).collect()
    }

    pub fn posts(&self) -> Vec<(String, Value)> {
        self.post_log.lock().unwrap().clone()
    }

    fn answer(
        table: &Mutex<HashMap<String, Result<String, u16>>>,
        url: &str,
    ) -> Result<String, TransportError> {
        match table.lock().unwrap().get(path_of(url)) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(status)) => Err(TransportError::Status {
                url: url.to_string(),
                status: *status,
                body: String::new(),
            }),
            None => Err(TransportError::Status {
                url: url.to_string(),
                status: 404,
                body: "Not Found".to_string(),
            }),
        }
    }
}

fn path_of(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

#[async_trait]
impl DashboardTransport for ScriptedTransport {
    async fn get(&self, url: &str) -> Result<String, TransportError> {
        self.get_log.lock().unwrap().push(url.to_string());
        Self::answer(&self.gets, url)
    }

    async fn post(&self, url: &str, body: &Value) -> Result<String, TransportError> {
        self.post_log
            .lock()
            .unwrap()
            .push((url.to_string(), body.clone()));
        Self::answer(&self.posts, url)
    }
}
