use reqwest::Method;

use cadence_types::api::{RecommendationResponse, SongRatingResponse};

use crate::client::{ApiClient, enc};
use crate::error::ApiError;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

// The gateway fills in userId from the token and refuses ADMIN tokens on
// every ratings route.

impl ApiClient {
    /// Create or replace the caller's rating for a song.
    pub async fn rate_song(&self, song_id: &str, rating: u8) -> Result<(), ApiError> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(ApiError::InvalidRating(rating));
        }
        let path = format!("/api/ratings/rate-song?songId={}&rating={rating}", enc(song_id));
        self.call(Method::POST, &path).await
    }

    pub async fn delete_rating(&self, song_id: &str) -> Result<(), ApiError> {
        let path = format!("/api/ratings/delete-rating?songId={}", enc(song_id));
        self.call(Method::DELETE, &path).await
    }

    /// `None` when the caller has not rated the song.
    pub async fn song_rating(&self, song_id: &str) -> Result<Option<u8>, ApiError> {
        let resp: SongRatingResponse = self
            .get(&format!("/api/ratings/get-rating?songId={}", enc(song_id)))
            .await?;
        Ok(resp.rating)
    }

    pub async fn recommendations(&self) -> Result<RecommendationResponse, ApiError> {
        self.get("/api/ratings/recommendations").await
    }
}
