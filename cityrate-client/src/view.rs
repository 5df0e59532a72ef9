//! Per-view loading state and the stale-response guard
//!
//! Every fetch carries the [`RequestKey`] it was issued for. A result whose
//! key no longer matches the view's current key belongs to a subject the user
//! has moved away from (another user, another mode, a remounted tab) and is
//! dropped instead of overwriting newer data.

use std::fmt::Debug;

use tracing::debug;

/// Loading state of one view
///
/// Error and data never coexist.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Loading,
    Error(String),
    Ready(T),
}

impl<T> ViewState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ViewState::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn data_mut(&mut self) -> Option<&mut T> {
        match self {
            ViewState::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ViewState::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Identity of a fetch: what it is about, and which view mount issued it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestKey<S> {
    /// User id, rating mode, ...
    pub subject: S,
    /// Application generation at the time of the request
    pub generation: u64,
}

impl<S> RequestKey<S> {
    pub fn new(subject: S, generation: u64) -> Self {
        Self {
            subject,
            generation,
        }
    }
}

/// A [`ViewState`] that only accepts results for its latest request
#[derive(Debug, Clone)]
pub struct KeyedView<K, T> {
    current: Option<K>,
    state: ViewState<T>,
}

impl<K, T> Default for KeyedView<K, T> {
    fn default() -> Self {
        Self {
            current: None,
            state: ViewState::Loading,
        }
    }
}

impl<K: PartialEq + Debug, T> KeyedView<K, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request for `key`; older in-flight requests become stale
    pub fn begin(&mut self, key: K) {
        self.current = Some(key);
        self.state = ViewState::Loading;
    }

    /// Apply a finished request
    ///
    /// Returns false (and leaves the state untouched) when `key` is not the
    /// latest request.
    pub fn resolve(&mut self, key: &K, result: Result<T, String>) -> bool {
        if self.current.as_ref() != Some(key) {
            debug!(?key, current = ?self.current, "Discarding stale response");
            return false;
        }

        self.state = match result {
            Ok(data) => ViewState::Ready(data),
            Err(message) => ViewState::Error(message),
        };
        true
    }

    pub fn current_key(&self) -> Option<&K> {
        self.current.as_ref()
    }

    pub fn state(&self) -> &ViewState<T> {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ViewState<T> {
        &mut self.state
    }
}
