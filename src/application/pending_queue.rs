// Per-panel FIFO of follow-on activities from multi-entry loads
use crate::domain::page::{PageRequest, Params};
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Default)]
pub struct PendingQueue {
    entries: HashMap<String, VecDeque<String>>,
    extra_params: Option<Vec<Params>>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Groups page requests by panel in first-appearance order. Entries without a url
    /// are dropped.
    pub fn group_by_panel(pages: &[PageRequest]) -> Vec<(Option<String>, Vec<String>)> {
        let mut grouped: Vec<(Option<String>, Vec<String>)> = Vec::new();
        for page in pages {
            let Some(url) = page.url.as_deref().filter(|url| !url.is_empty()) else {
                continue;
            };
            match grouped.iter_mut().find(|(panel, _)| panel == &page.panel) {
                Some((_, urls)) => urls.push(url.to_string()),
                None => grouped.push((page.panel.clone(), vec![url.to_string()])),
            }
        }
        grouped
    }

    /// Replaces a panel's queue with the given follow-on urls.
    pub fn replace(&mut self, panel: &str, urls: Vec<String>) {
        self.entries.insert(panel.to_string(), urls.into());
    }

    /// Pops the head entry together with the extra parameters of the load that queued it.
    pub fn pop(&mut self, panel: &str) -> Option<(String, Vec<Params>)> {
        let url = self.entries.get_mut(panel)?.pop_front()?;
        let extra_params = self.extra_params.clone().unwrap_or_default();
        if self.is_drained() {
            self.extra_params = None;
        }
        Some((url, extra_params))
    }

    pub fn clear(&mut self, panel: &str) {
        self.entries.remove(panel);
        if self.is_drained() {
            self.extra_params = None;
        }
    }

    pub fn reset(&mut self) {
        self.entries.clear();
        self.extra_params = None;
    }

    pub fn remember_extra_params(&mut self, extra_params: Vec<Params>) {
        self.extra_params = Some(extra_params);
    }

    pub fn forget_extra_params(&mut self) {
        self.extra_params = None;
    }

    pub fn len(&self, panel: &str) -> usize {
        self.entries.get(panel).map(VecDeque::len).unwrap_or(0)
    }

    pub fn peek(&self, panel: &str) -> Vec<String> {
        self.entries
            .get(panel)
            .map(|urls| urls.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn is_drained(&self) -> bool {
        self.entries.values().all(VecDeque::is_empty)
    }
}
