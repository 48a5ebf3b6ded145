use reqwest::Method;
use tracing::warn;

use cadence_types::models::Subscription;

use crate::client::{ApiClient, enc, parse_list};
use crate::error::ApiError;

impl ApiClient {
    /// The signed-in user's subscriptions. Failures and odd bodies come back
    /// as an empty list so a profile screen still renders.
    pub async fn subscriptions(&self) -> Vec<Subscription> {
        self.send(Method::GET, "/api/subscriptions", None)
            .await
            .and_then(parse_list)
            .unwrap_or_else(|e| {
                warn!(error = %e, "Could not load subscriptions");
                Vec::new()
            })
    }

    pub async fn subscribe_artist(&self, artist_id: &str) -> Result<(), ApiError> {
        let path = self.subscription_path("subscribe-artist", "artistId", artist_id)?;
        self.call(Method::POST, &path).await
    }

    pub async fn unsubscribe_artist(&self, artist_id: &str) -> Result<(), ApiError> {
        let path = self.subscription_path("subscribe-artist", "artistId", artist_id)?;
        self.call(Method::DELETE, &path).await
    }

    pub async fn subscribe_genre(&self, genre: &str) -> Result<(), ApiError> {
        let path = self.subscription_path("subscribe-genre", "genre", genre)?;
        self.call(Method::POST, &path).await
    }

    pub async fn unsubscribe_genre(&self, genre: &str) -> Result<(), ApiError> {
        let path = self.subscription_path("subscribe-genre", "genre", genre)?;
        self.call(Method::DELETE, &path).await
    }

    fn subscription_path(&self, endpoint: &str, param: &str, value: &str) -> Result<String, ApiError> {
        let user_id = self.current_user_id()?;
        Ok(format!(
            "/api/subscriptions/{endpoint}?{param}={}&userId={}",
            enc(value),
            enc(&user_id)
        ))
    }
}
