#![warn(missing_docs)]
//! # moodsense-app
//!
//! ## Purpose
//! Wires the camera, file-selection, orchestration, and contract layers into
//! one application surface.
//!
//! ## Responsibilities
//! - Resolve runtime configuration (API base, auto-open preference) from the
//!   environment with documented defaults.
//! - Build the two service endpoint URLs the transports target.
//! - Drive the camera open/resolve sequence against a provider and surface.
//! - Route a camera capture into the owning file zone.
//! - Aggregate subsystem failures into one [`AppError`].
//!
//! ## Data flow
//! Env config -> endpoints -> camera capture / file selection ->
//! orchestrator run -> result projection.
//!
//! ## Ownership and lifetimes
//! Helpers take borrowed subsystem handles and return owned values; nothing
//! here retains cross-subsystem state.
//!
//! ## Error model
//! Subsystem failures are wrapped in [`AppError`] and categorized for
//! runtime observability.
//!
//! ## Security and privacy notes
//! Configuration values are log-safe; media bytes never pass through this
//! crate's diagnostics.

use moodsense_analysis_contract::AnalysisContractError;
use moodsense_camera::{
    CameraError, CameraSession, DeviceStreamProvider, StreamConstraints, VideoSurface,
};
use moodsense_core::SelectedFile;
use moodsense_files::{FileCaptureZone, FileZoneError};
use moodsense_orchestrator::OrchestratorError;
use thiserror::Error;
use url::Url;

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("MOODSENSE_VERSION");

/// Default analysis service base URL, matching the local dev server.
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:5000";

/// Env var overriding the analysis service base URL.
pub const API_BASE_ENV: &str = "MOODSENSE_API_BASE";

/// Env var enabling the auto-open preference.
pub const AUTO_OPEN_ENV: &str = "MOODSENSE_AUTO_OPEN";

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Resolves the API base URL from the environment, trailing slashes
/// trimmed.
pub fn api_base_from_env() -> String {
    match std::env::var(API_BASE_ENV) {
        Ok(value) if !value.trim().is_empty() => value.trim().trim_end_matches('/').to_string(),
        _ => DEFAULT_API_BASE.to_string(),
    }
}

/// Reads the auto-open preference.
///
/// Semantics:
/// - Unset => disabled.
/// - `1`, `true`, `on` (case-insensitive) => enabled.
/// - Any other value => disabled.
pub fn auto_open_from_env() -> bool {
    match std::env::var(AUTO_OPEN_ENV) {
        Ok(value) => {
            let normalized = value.trim().to_ascii_lowercase();
            normalized == "1" || normalized == "true" || normalized == "on"
        }
        Err(_) => false,
    }
}

/// Builds the mood analysis endpoint URL.
///
/// # Errors
/// Returns [`AppError::Config`] when the base is not a valid URL.
pub fn detect_mood_endpoint(base: &str) -> Result<String, AppError> {
    let base = base.trim_end_matches('/');
    let url = Url::parse(&format!("{base}/detect-mood"))
        .map_err(|error| AppError::Config(format!("invalid API base '{base}': {error}")))?;
    Ok(url.into())
}

/// Builds the preview endpoint URL with the mood label query-encoded.
///
/// # Errors
/// Returns [`AppError::Config`] when the base is not a valid URL.
pub fn mood_music_endpoint(base: &str, mood: &str) -> Result<String, AppError> {
    let base = base.trim_end_matches('/');
    let mut url = Url::parse(&format!("{base}/mood-music"))
        .map_err(|error| AppError::Config(format!("invalid API base '{base}': {error}")))?;
    url.query_pairs_mut().append_pair("mood", mood);
    Ok(url.into())
}

/// Opens a camera session end to end: issues the device request and applies
/// its outcome.
///
/// The `open` transition happens synchronously before the provider is
/// consulted, so the surface a `Live` session binds to exists for the whole
/// round-trip.
///
/// # Errors
/// Returns [`AppError::Camera`] for illegal transitions and classified
/// device failures; the session is `Closed` after a device failure.
pub fn open_camera(
    session: &mut CameraSession,
    provider: &dyn DeviceStreamProvider,
    constraints: &StreamConstraints,
    surface: &mut dyn VideoSurface,
) -> Result<(), AppError> {
    let ticket = session.open()?;
    let outcome = provider.request_stream(constraints);
    session.resolve_grant(ticket, outcome, surface)?;
    Ok(())
}

/// Captures a still frame and routes it into the owning file zone,
/// returning the zone's new selection snapshot.
///
/// # Errors
/// Returns [`AppError::Camera`] when the session is not ready or encoding
/// fails; the zone is untouched in that case.
pub fn capture_into_zone<'zone>(
    session: &mut CameraSession,
    surface: &mut dyn VideoSurface,
    zone: &'zone mut FileCaptureZone,
    captured_at_ms: u64,
) -> Result<&'zone [SelectedFile], AppError> {
    let file = session.capture(surface, captured_at_ms)?;
    Ok(zone.accept_files(vec![file]))
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Camera subsystem error.
    #[error("camera error: {0}")]
    Camera(#[from] CameraError),
    /// File selection error.
    #[error("file selection error: {0}")]
    Files(#[from] FileZoneError),
    /// Orchestration error.
    #[error("orchestration error: {0}")]
    Orchestrator(#[from] OrchestratorError),
    /// Contract parse/mapping error.
    #[error("contract error: {0}")]
    Contract(#[from] AnalysisContractError),
    /// Invalid runtime configuration.
    #[error("configuration error: {0}")]
    Config(String),
}
