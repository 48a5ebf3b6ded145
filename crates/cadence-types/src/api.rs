use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{UserRecord, null_as_default};

// -- Auth --

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OtpRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyOtpRequest {
    pub username: String,
    pub otp: String,
}

/// Body of a successful OTP or magic-link verification.
///
/// The gateway returns the user fields and the token side by side; they are
/// split apart before anything is cached.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: String,
    #[serde(flatten)]
    pub user: UserRecord,
}

impl LoginResponse {
    /// Both halves of a session are present.
    pub fn is_complete(&self) -> bool {
        !self.token.is_empty() && !self.user.id.is_empty()
    }

    pub fn into_parts(self) -> (UserRecord, String) {
        (self.user, self.token)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub username: String,
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

/// Generic `{"message": "..."}` acknowledgement.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

// -- Content --

#[derive(Debug, Clone, Serialize)]
pub struct ArtistInput {
    pub name: String,
    pub biography: String,
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumInput {
    pub name: String,
    pub release_date: DateTime<Utc>,
    pub genre: String,
    pub artist_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SongInput {
    pub name: String,
    pub duration: u32,
    pub genre: String,
    pub album_id: String,
    pub artist_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_file_url: Option<String>,
}

// -- Ratings --

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct SongRatingResponse {
    #[serde(default)]
    pub rating: Option<u8>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongRecommendation {
    pub song_id: String,
    pub name: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub artist_ids: Vec<String>,
    #[serde(default)]
    pub album_id: String,
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub subscribed_genre_songs: Vec<SongRecommendation>,
    #[serde(default)]
    pub top_rated_song: Option<SongRecommendation>,
}
