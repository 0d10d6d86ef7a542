#![warn(missing_docs)]
//! # moodsense-ui
//!
//! ## Purpose
//! Projects a mood analysis result into display-ready state.
//!
//! ## Responsibilities
//! - Map final mood labels to their emoji.
//! - Build track cards with derived thumbnails and meta lines.
//! - Expose the embed URL for the active video selection.
//!
//! ## Data flow
//! Orchestrator hands a [`MoodResponse`] reference and the active selection
//! to [`project_mood`], which produces an owned [`MoodDisplay`] for
//! rendering.
//!
//! ## Ownership and lifetimes
//! Display values are owned strings so the projection can outlive the
//! response it was derived from.
//!
//! ## Error model
//! Projection is total; unknown moods fall back to the neutral emoji and
//! missing track metadata falls back to defaults.
//!
//! ## Security and privacy notes
//! Only service-provided labels and public links appear here.

use moodsense_analysis_contract::{
    MoodResponse, embed_url, playable_video_id, thumbnail_url,
};

/// One renderable music recommendation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackCard {
    /// Track title.
    pub name: String,
    /// Playable link.
    pub url: String,
    /// Channel plus optional duration, for example `Channel · 3:21`.
    pub meta: String,
    /// Thumbnail URL when a video id could be derived.
    pub thumbnail: Option<String>,
}

/// Display-ready projection of one analysis result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoodDisplay {
    /// Emoji for the final mood.
    pub emoji: &'static str,
    /// Final mood label.
    pub final_mood: String,
    /// Face emotion estimate.
    pub face_emotion: String,
    /// EEG emotion estimate.
    pub eeg_emotion: String,
    /// Renderable recommendation cards, order preserved.
    pub tracks: Vec<TrackCard>,
    /// Embed player URL for the active selection, if any.
    pub embed: Option<String>,
}

/// Maps a final mood label to its emoji; unknown moods are neutral.
pub fn mood_emoji(final_mood: &str) -> &'static str {
    match final_mood {
        "Happy" => "😊",
        "Sad" => "😢",
        "Angry" => "😡",
        "Fear" => "😨",
        _ => "😐",
    }
}

/// Projects a response and the active selection into display state.
pub fn project_mood(response: &MoodResponse, selected_video: Option<&str>) -> MoodDisplay {
    let tracks = response
        .music_options
        .iter()
        .map(|track| TrackCard {
            name: track.name.clone(),
            url: track.url.clone(),
            meta: track_meta(track.channel.as_deref(), track.duration.as_deref()),
            thumbnail: playable_video_id(&track.url)
                .map(|video_id| thumbnail_url(&video_id)),
        })
        .collect();

    MoodDisplay {
        emoji: mood_emoji(&response.final_mood),
        final_mood: response.final_mood.clone(),
        face_emotion: response.face_emotion.clone(),
        eeg_emotion: response.eeg_emotion.clone(),
        tracks,
        embed: selected_video.map(embed_url),
    }
}

fn track_meta(channel: Option<&str>, duration: Option<&str>) -> String {
    let channel = channel.unwrap_or("YouTube");
    match duration {
        Some(duration) => format!("{channel} · {duration}"),
        None => channel.to_string(),
    }
}
