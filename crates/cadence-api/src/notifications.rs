use reqwest::Method;

use cadence_types::models::Notification;

use crate::client::{ApiClient, parse_list};
use crate::error::ApiError;

impl ApiClient {
    /// Notifications for the token's user; the gateway reads the user id
    /// from the token.
    pub async fn notifications(&self) -> Result<Vec<Notification>, ApiError> {
        parse_list(self.send(Method::GET, "/api/notifications", None).await?)
    }
}
