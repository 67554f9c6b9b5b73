// Cache of raw activity definitions for activities that opt in
use std::collections::HashMap;

const PAGE_SRC_MARKER: &str = "&_pageSrc=";

/// Truncates a fetched URL just after the `_pageSrc` marker, so variants that differ
/// only in later parameters share one entry.
pub fn cache_key(url: &str) -> &str {
    match url.find(PAGE_SRC_MARKER) {
        Some(loc) if loc > 0 => &url[..loc + PAGE_SRC_MARKER.len()],
        _ => url,
    }
}

#[derive(Debug, Default)]
pub struct ActivityCache {
    entries: HashMap<String, String>,
}

impl ActivityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, url: &str) -> Option<&str> {
        self.entries.get(cache_key(url)).map(String::as_str)
    }

    pub fn put(&mut self, url: &str, definition: &str) {
        let key = cache_key(url).to_string();
        tracing::trace!("Caching[{}]: {}", key, definition);
        self.entries.insert(key, definition.to_string());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
