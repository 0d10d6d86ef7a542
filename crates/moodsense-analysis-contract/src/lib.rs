#![warn(missing_docs)]
//! # moodsense-analysis-contract
//!
//! ## Purpose
//! Defines the remote analysis and preview response schemas plus the
//! client-side link helpers built on them.
//!
//! ## Responsibilities
//! - Parse analysis (`MoodResponse`) and preview (`PreviewPlaylist`)
//!   payloads.
//! - Map a preview playlist into the same result shape the analysis call
//!   returns, so both exercise identical downstream logic.
//! - Derive playable-video identifiers from music links and build the
//!   canonical watch/thumbnail/embed URLs.
//!
//! ## Data flow
//! Raw response body -> [`parse_mood_response`] /
//! [`parse_preview_playlist`] -> orchestrator window policy and UI
//! projection.
//!
//! ## Ownership and lifetimes
//! Parsed values are owned structs to avoid borrowing from transient network
//! buffers.
//!
//! ## Error model
//! Invalid JSON or blank mandatory fields return
//! [`AnalysisContractError`].
//!
//! ## Security and privacy notes
//! This crate processes only model outputs and public music links; it never
//! touches input media bytes.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Host of short-form music links whose video id is the trailing path
/// segment.
pub const SHORT_LINK_HOST: &str = "youtu.be";

/// One recommended track from the analysis or preview service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MusicTrack {
    /// Track title.
    pub name: String,
    /// Playable link.
    pub url: String,
    /// Publishing channel, when the service knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    /// Human-readable duration, when the service knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

/// Structured mood analysis result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodResponse {
    /// Emotion estimated from the face image.
    pub face_emotion: String,
    /// Emotion estimated from the EEG recording.
    pub eeg_emotion: String,
    /// Combined final mood label.
    pub final_mood: String,
    /// Ordered music recommendations.
    #[serde(default)]
    pub music_options: Vec<MusicTrack>,
    /// Optional top-level primary music link sent alongside the options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music_link: Option<String>,
}

impl MoodResponse {
    /// Returns the primary music link: `music_link` when present, otherwise
    /// the first option's URL.
    pub fn primary_music_link(&self) -> Option<&str> {
        self.music_link
            .as_deref()
            .or_else(|| self.music_options.first().map(|track| track.url.as_str()))
    }
}

/// Preview payload keyed by a mood label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewPlaylist {
    /// Tracks in the same shape as `music_options`.
    #[serde(default)]
    pub tracks: Vec<MusicTrack>,
}

/// Parses raw JSON into a validated mood response.
///
/// # Errors
/// Returns [`AnalysisContractError::Decode`] for invalid JSON and
/// [`AnalysisContractError::InvalidContract`] when `final_mood` is blank.
pub fn parse_mood_response(raw: &str) -> Result<MoodResponse, AnalysisContractError> {
    let parsed: MoodResponse = serde_json::from_str(raw).map_err(AnalysisContractError::Decode)?;

    if parsed.final_mood.trim().is_empty() {
        return Err(AnalysisContractError::InvalidContract(
            "final_mood is empty".to_string(),
        ));
    }

    Ok(parsed)
}

/// Parses raw JSON into a preview playlist.
///
/// # Errors
/// Returns [`AnalysisContractError::Decode`] for invalid JSON.
pub fn parse_preview_playlist(raw: &str) -> Result<PreviewPlaylist, AnalysisContractError> {
    serde_json::from_str(raw).map_err(AnalysisContractError::Decode)
}

/// Maps a preview playlist into the analysis result shape.
///
/// Both emotion estimates are fixed to `preview`, the final mood is the
/// capitalized request label, and the tracks become `music_options`
/// unmodified.
pub fn preview_response(mood: &str, playlist: PreviewPlaylist) -> MoodResponse {
    MoodResponse {
        face_emotion: "preview".to_string(),
        eeg_emotion: "preview".to_string(),
        final_mood: capitalize_mood(mood),
        music_options: playlist.tracks,
        music_link: None,
    }
}

/// Uppercases the first character of a mood label (`happy` -> `Happy`).
pub fn capitalize_mood(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Derives a playable-video identifier from a music link.
///
/// Checks for a `v` query parameter first, then for the trailing path
/// segment on the [`SHORT_LINK_HOST`] short-link form. Returns `None` for
/// unparseable links or links with neither shape.
pub fn playable_video_id(raw_url: &str) -> Option<String> {
    let parsed = Url::parse(raw_url).ok()?;

    if let Some((_, value)) = parsed.query_pairs().find(|(key, _)| key == "v")
        && !value.is_empty()
    {
        return Some(value.into_owned());
    }

    if parsed.host_str() == Some(SHORT_LINK_HOST) {
        let segment = parsed.path_segments()?.next_back()?;
        if !segment.is_empty() {
            return Some(segment.to_string());
        }
    }

    None
}

/// Canonical watch URL for a derived video id.
pub fn canonical_watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

/// Thumbnail URL for a derived video id.
pub fn thumbnail_url(video_id: &str) -> String {
    format!("https://img.youtube.com/vi/{video_id}/mqdefault.jpg")
}

/// Muted autoplay embed URL for a derived video id.
pub fn embed_url(video_id: &str) -> String {
    format!("https://www.youtube.com/embed/{video_id}?autoplay=1&mute=1")
}

/// Analysis contract errors.
#[derive(Debug, Error)]
pub enum AnalysisContractError {
    /// JSON decode failure.
    #[error("analysis decode failure: {0}")]
    Decode(#[from] serde_json::Error),
    /// Parsed payload violates contract invariants.
    #[error("analysis contract violation: {0}")]
    InvalidContract(String),
}
