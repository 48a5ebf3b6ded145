use thiserror::Error;

use crate::models::{Artist, Song, Subscription, SubscriptionKind};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("YouTube URLs are not supported, use a direct link to an audio file")]
    UnsupportedSource,
}

/// Artists whose genre list contains `genre` exactly. No genre (or an empty
/// one) keeps everything.
pub fn filter_by_genre<'a>(artists: &'a [Artist], genre: Option<&str>) -> Vec<&'a Artist> {
    match genre.filter(|g| !g.is_empty()) {
        None => artists.iter().collect(),
        Some(genre) => artists
            .iter()
            .filter(|a| a.genres.iter().any(|g| g == genre))
            .collect(),
    }
}

/// `m:ss`, seconds zero-padded.
pub fn format_duration(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Where the player should read audio from: the song's own file URL when it
/// has one, otherwise the gateway stream endpoint.
pub fn playback_source(song: &Song, stream_url: &str) -> Result<String, PlaybackError> {
    match song.audio_file_url.as_deref().filter(|u| !u.is_empty()) {
        Some(url) if url.contains("youtube.com") || url.contains("youtu.be") => {
            Err(PlaybackError::UnsupportedSource)
        }
        Some(url) => Ok(url.to_string()),
        None => Ok(stream_url.to_string()),
    }
}

/// Splits subscriptions into (artist, genre) lists, order preserved.
pub fn partition_subscriptions(subs: &[Subscription]) -> (Vec<&Subscription>, Vec<&Subscription>) {
    subs.iter().partition(|s| s.kind == SubscriptionKind::Artist)
}
