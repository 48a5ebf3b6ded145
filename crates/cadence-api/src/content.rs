use reqwest::Method;
use serde::de::DeserializeOwned;

use cadence_types::api::{AlbumInput, ArtistInput, SongInput};
use cadence_types::models::{Album, Artist, Song};

use crate::client::{ApiClient, enc, parse_list};
use crate::error::ApiError;

// Reads are public. Create/update/delete need an ADMIN token; the gateway
// enforces that. List reads treat a body that is not an array as empty.

impl ApiClient {
    async fn list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        parse_list(self.send(Method::GET, path, None).await?)
    }
}

// -- Artists --

impl ApiClient {
    pub async fn artists(&self) -> Result<Vec<Artist>, ApiError> {
        self.list("/api/content/artists").await
    }

    pub async fn artist(&self, id: &str) -> Result<Artist, ApiError> {
        self.get(&format!("/api/content/artists/{}", enc(id))).await
    }

    pub async fn create_artist(&self, input: &ArtistInput) -> Result<Artist, ApiError> {
        self.post("/api/content/artists", input).await
    }

    pub async fn update_artist(&self, id: &str, input: &ArtistInput) -> Result<Artist, ApiError> {
        self.put(&format!("/api/content/artists/{}", enc(id)), input).await
    }

    pub async fn delete_artist(&self, id: &str) -> Result<(), ApiError> {
        self.call(Method::DELETE, &format!("/api/content/artists/{}", enc(id)))
            .await
    }
}

// -- Albums --

impl ApiClient {
    pub async fn albums(&self) -> Result<Vec<Album>, ApiError> {
        self.list("/api/content/albums").await
    }

    pub async fn album(&self, id: &str) -> Result<Album, ApiError> {
        self.get(&format!("/api/content/albums/{}", enc(id))).await
    }

    pub async fn albums_by_artist(&self, artist_id: &str) -> Result<Vec<Album>, ApiError> {
        self.list(&format!("/api/content/albums/by-artist?artistId={}", enc(artist_id)))
            .await
    }

    pub async fn create_album(&self, input: &AlbumInput) -> Result<Album, ApiError> {
        self.post("/api/content/albums", input).await
    }

    pub async fn update_album(&self, id: &str, input: &AlbumInput) -> Result<Album, ApiError> {
        self.put(&format!("/api/content/albums/{}", enc(id)), input).await
    }

    pub async fn delete_album(&self, id: &str) -> Result<(), ApiError> {
        self.call(Method::DELETE, &format!("/api/content/albums/{}", enc(id)))
            .await
    }
}

// -- Songs --

impl ApiClient {
    pub async fn songs(&self) -> Result<Vec<Song>, ApiError> {
        self.list("/api/content/songs").await
    }

    pub async fn song(&self, id: &str) -> Result<Song, ApiError> {
        self.get(&format!("/api/content/songs/{}", enc(id))).await
    }

    pub async fn songs_by_album(&self, album_id: &str) -> Result<Vec<Song>, ApiError> {
        self.list(&format!("/api/content/songs/by-album?albumId={}", enc(album_id)))
            .await
    }

    pub async fn create_song(&self, input: &SongInput) -> Result<Song, ApiError> {
        self.post("/api/content/songs", input).await
    }

    pub async fn update_song(&self, id: &str, input: &SongInput) -> Result<Song, ApiError> {
        self.put(&format!("/api/content/songs/{}", enc(id)), input).await
    }

    pub async fn delete_song(&self, id: &str) -> Result<(), ApiError> {
        self.call(Method::DELETE, &format!("/api/content/songs/{}", enc(id)))
            .await
    }

    /// Gateway endpoint that streams the song's audio. The player fetches
    /// it directly; no token is attached.
    pub fn stream_url(&self, song_id: &str) -> String {
        self.url(&format!("/api/content/songs/{}/stream", enc(song_id)))
    }
}
