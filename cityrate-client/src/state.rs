//! Application state
//!
//! Holds the logged-in user and the active tab. Views receive it explicitly;
//! nothing here is global. Every login, logout and tab switch bumps the
//! generation counter so that requests issued by a previous view mount are
//! recognisably stale.

use cityrate_common::session::SessionStore;
use tracing::info;

use crate::error::{ClientError, ClientResult};
use crate::view::RequestKey;

/// Top-level views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    /// Sequential voting queue (login required)
    Voting,
    /// City and country rankings
    Ratings,
    /// Personal voting history (login required)
    Profile,
}

impl Tab {
    pub fn requires_login(&self) -> bool {
        matches!(self, Tab::Voting | Tab::Profile)
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    user_id: Option<String>,
    tab: Tab,
    generation: u64,
    session: Option<SessionStore>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// Logged-out state without persistence
    pub fn new() -> Self {
        Self {
            user_id: None,
            tab: Tab::Ratings,
            generation: 0,
            session: None,
        }
    }

    /// Restore the logged-in user from `store`, persisting future changes there
    pub fn with_session(store: SessionStore) -> ClientResult<Self> {
        let user_id = store.load()?;
        Ok(Self {
            user_id,
            tab: Tab::Ratings,
            generation: 0,
            session: Some(store),
        })
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user_id.is_some()
    }

    /// The logged-in user, or [`ClientError::NotLoggedIn`]
    pub fn require_user(&self) -> ClientResult<&str> {
        self.user_id().ok_or(ClientError::NotLoggedIn)
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Tabs the user can currently open
    pub fn available_tabs(&self) -> Vec<Tab> {
        [Tab::Voting, Tab::Ratings, Tab::Profile]
            .into_iter()
            .filter(|t| self.is_logged_in() || !t.requires_login())
            .collect()
    }

    pub fn login(&mut self, user_id: &str) -> ClientResult<()> {
        if let Some(store) = &self.session {
            store.save(user_id)?;
        }
        self.user_id = Some(user_id.to_string());
        self.tab = Tab::Voting;
        self.generation += 1;

        info!(generation = self.generation, "Logged in");
        Ok(())
    }

    pub fn logout(&mut self) -> ClientResult<()> {
        if let Some(store) = &self.session {
            store.clear()?;
        }
        self.user_id = None;
        self.tab = Tab::Ratings;
        self.generation += 1;

        info!(generation = self.generation, "Logged out");
        Ok(())
    }

    pub fn switch_tab(&mut self, tab: Tab) -> ClientResult<()> {
        if tab.requires_login() && !self.is_logged_in() {
            return Err(ClientError::NotLoggedIn);
        }
        self.tab = tab;
        self.generation += 1;
        Ok(())
    }

    /// Key for a request about `subject` issued from the current mount
    pub fn request_key<S>(&self, subject: S) -> RequestKey<S> {
        RequestKey::new(subject, self.generation)
    }
}
