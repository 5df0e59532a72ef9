//! Login by externally issued user id

use tracing::warn;

use crate::client::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::state::AppState;

pub const EMPTY_ID_MESSAGE: &str = "Please enter a user ID";
pub const INVALID_ID_MESSAGE: &str = "Invalid user ID";
pub const VALIDATION_FAILED_MESSAGE: &str = "Failed to validate user ID. Please try again later.";

/// Check `input` with the service and return the normalized user id
///
/// Blank input is rejected locally without a request.
pub async fn validate_login(client: &ApiClient, input: &str) -> ClientResult<String> {
    let user_id = input.trim();
    if user_id.is_empty() {
        return Err(ClientError::InvalidUser(EMPTY_ID_MESSAGE.to_string()));
    }

    let response = client.validate_user(user_id).await?;
    if response.valid {
        Ok(user_id.to_string())
    } else {
        Err(ClientError::InvalidUser(
            response
                .error
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| INVALID_ID_MESSAGE.to_string()),
        ))
    }
}

/// Login form state
#[derive(Debug, Default)]
pub struct LoginView {
    error: Option<String>,
}

impl LoginView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Message from the last failed attempt
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Validate `input` and log the user in on success
    ///
    /// Returns whether the login went through; on failure [`Self::error`]
    /// holds the message to show.
    pub async fn submit(&mut self, client: &ApiClient, app: &mut AppState, input: &str) -> bool {
        self.error = None;

        let user_id = match validate_login(client, input).await {
            Ok(id) => id,
            Err(ClientError::InvalidUser(message)) => {
                self.error = Some(message);
                return false;
            }
            Err(e) => {
                warn!(error = %e, "User validation failed");
                self.error = Some(VALIDATION_FAILED_MESSAGE.to_string());
                return false;
            }
        };

        if let Err(e) = app.login(&user_id) {
            warn!(error = %e, "Could not persist login");
            self.error = Some(format!("Could not save login: {}", e));
            return false;
        }
        true
    }
}
