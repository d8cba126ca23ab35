//! BFS work queue plus the dedup sets of one crawl session.
//!
//! A URL lives in at most one of `queue` and `in_flight` at a time. Once
//! [`Frontier::complete`] moves it into `visited` it can never be queued or
//! dispatched again. Keeping `in_flight` separate from `visited` is what
//! stops two concurrently rendering pages that discover the same new link
//! from both queueing it.
//!
//! Every entry point normalizes its argument, so callers may pass raw hrefs.

use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

use crate::utils::normalize_url;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Frontier {
    queue: VecDeque<String>,
    queued: HashSet<String>,
    in_flight: HashSet<String>,
    visited: HashSet<String>,
    /// Insertion-ordered so results come back in discovery order
    discovered: Vec<String>,
    discovered_set: HashSet<String>,
}

impl Frontier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `url` unless it is already queued, in flight or visited.
    /// Returns whether it was added.
    pub fn enqueue(&mut self, url: &str) -> bool {
        let url = normalize_url(url);
        if self.visited.contains(&url)
            || self.in_flight.contains(&url)
            || self.queued.contains(&url)
        {
            return false;
        }
        self.queued.insert(url.clone());
        self.queue.push_back(url);
        true
    }

    /// Pop the oldest queued URL and mark it in flight
    pub fn dequeue(&mut self) -> Option<String> {
        let url = self.queue.pop_front()?;
        self.queued.remove(&url);
        self.in_flight.insert(url.clone());
        Some(url)
    }

    /// Move an in-flight URL to `visited`. Unknown URLs are still marked
    /// visited so they can never be dispatched later.
    pub fn complete(&mut self, url: &str) {
        let url = normalize_url(url);
        self.in_flight.remove(&url);
        self.visited.insert(url);
    }

    /// Put an in-flight URL back at the head of the queue.
    ///
    /// Used for renders abandoned by cancellation before they produced a
    /// result, so a resumed crawl picks them up first.
    pub fn requeue(&mut self, url: &str) {
        let url = normalize_url(url);
        if !self.in_flight.remove(&url) || self.visited.contains(&url) {
            return;
        }
        if self.queued.insert(url.clone()) {
            self.queue.push_front(url);
        }
    }

    /// Add to the result set. Returns whether the URL was new.
    pub fn record_discovered(&mut self, url: &str) -> bool {
        let url = normalize_url(url);
        if self.discovered_set.insert(url.clone()) {
            self.discovered.push(url);
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }

    #[must_use]
    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    #[must_use]
    pub fn discovered(&self) -> &[String] {
        &self.discovered
    }

    #[must_use]
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(&normalize_url(url))
    }

    #[must_use]
    pub fn is_discovered(&self, url: &str) -> bool {
        self.discovered_set.contains(&normalize_url(url))
    }

    /// Nothing queued and nothing rendering
    #[must_use]
    pub fn is_drained(&self) -> bool {
        self.queue.is_empty() && self.in_flight.is_empty()
    }

    /// Every visited URL is also in the discovered set
    #[must_use]
    pub fn visited_subset_of_discovered(&self) -> bool {
        self.visited.is_subset(&self.discovered_set)
    }
}
