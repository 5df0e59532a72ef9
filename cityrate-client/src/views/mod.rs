//! Views: login, voting queue, ratings and profile
//!
//! Each view owns its loading state and turns client errors into the short
//! message the user sees. Underlying errors are logged, not shown.

pub mod login;
pub mod profile;
pub mod ratings;
pub mod voting;

pub use login::LoginView;
pub use profile::{CountryFilter, CountrySection, ProfileView};
pub use ratings::{RatingsOptions, RatingsTable, RatingsView, Scope};
pub use voting::{VotingQueue, VotingView};
