//! City rater client library
//!
//! Talks to the remote rating service and holds per-view state for the
//! terminal client. All vote tallying happens server-side; ranking math and
//! table shaping come from [`cityrate_common::rating`].

pub mod client;
pub mod error;
pub mod render;
pub mod state;
pub mod view;
pub mod views;

pub use client::ApiClient;
pub use error::{ClientError, ClientResult};
pub use state::{AppState, Tab};
pub use view::{KeyedView, RequestKey, ViewState};
