#![warn(missing_docs)]
//! # moodsense-orchestrator
//!
//! ## Purpose
//! Coordinates one remote analysis request with the auxiliary-window
//! navigation policy that defeats popup-blocking heuristics.
//!
//! ## Responsibilities
//! - Pre-open a blank auxiliary window inside the triggering gesture, before
//!   any transport work begins.
//! - Validate inputs, issue exactly one transport call per run, and guard
//!   against duplicate in-flight runs.
//! - Resolve the pre-opened window exactly once: navigate it to a derived
//!   watch URL or raw link, or close it, never leaving it open-and-blank.
//! - Provide the preview path that exercises the identical window logic
//!   against the mood-music endpoint.
//!
//! ## Data flow
//! Complete [`AnalysisInputs`] -> [`AnalysisRequest`] ->
//! [`AnalysisTransport`] -> parsed [`MoodResponse`] -> window resolution ->
//! [`AnalysisOutcome`] for UI projection.
//!
//! ## Ownership and lifetimes
//! The orchestrator owns the stored result and active selection; window
//! handles are single-owner per run with a terminal operation applied exactly
//! once.
//!
//! ## Error model
//! Validation, busy-guard, transport, and contract failures are reported as
//! [`OrchestratorError`] values. Every failure is terminal for the attempt;
//! there is no automatic retry.
//!
//! ## Security and privacy notes
//! Input media bytes are hashed for the attempt key but never logged.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use log::{info, warn};
use moodsense_analysis_contract::{
    AnalysisContractError, MoodResponse, canonical_watch_url, parse_mood_response,
    parse_preview_playlist, playable_video_id, preview_response,
};
use moodsense_core::{AnalysisInputs, CoreError, SelectedFile};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Multipart field name carrying the face image.
pub const FIELD_FACE_IMAGE: &str = "image";
/// Multipart field name carrying the EEG recording.
pub const FIELD_EEG: &str = "eeg";

/// One validated analysis submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    /// Face image payload, sent as field [`FIELD_FACE_IMAGE`].
    pub face: SelectedFile,
    /// EEG payload, sent as field [`FIELD_EEG`].
    pub eeg: SelectedFile,
}

impl AnalysisRequest {
    /// Builds a request from complete inputs.
    ///
    /// # Errors
    /// Returns [`OrchestratorError::Validation`] naming the missing slot.
    pub fn from_inputs(inputs: &AnalysisInputs) -> Result<Self, OrchestratorError> {
        let (face, eeg) = inputs
            .require_complete()
            .map_err(OrchestratorError::Validation)?;
        Ok(Self {
            face: face.clone(),
            eeg: eeg.clone(),
        })
    }

    /// Returns the multipart parts in submission order.
    pub fn parts(&self) -> [(&'static str, &SelectedFile); 2] {
        [(FIELD_FACE_IMAGE, &self.face), (FIELD_EEG, &self.eeg)]
    }

    /// Hex-encoded SHA-256 attempt key, stable for identical submissions.
    pub fn attempt_key(&self) -> String {
        let mut hasher = Sha256::new();
        for (field, file) in self.parts() {
            hasher.update(field.as_bytes());
            hasher.update([0]);
            hasher.update(file.name.as_bytes());
            hasher.update([0]);
            hasher.update(file.byte_size.to_be_bytes());
            hasher.update(&file.bytes);
        }
        hex::encode(hasher.finalize())
    }
}

/// Transport failure reaching or talking to the remote service.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The service could not be reached at all.
    #[error("could not connect to the analysis service: {0}")]
    Connect(String),
    /// The service answered with a non-success status.
    #[error("analysis service returned status {status}")]
    Status {
        /// HTTP-style status code.
        status: u16,
        /// Raw response body, possibly empty.
        body: String,
    },
}

/// Opaque remote analysis service.
///
/// Both calls block until the underlying platform resolves or rejects; no
/// timeout is imposed here.
pub trait AnalysisTransport: Send + Sync {
    /// Submits one analysis request and returns the raw response body.
    ///
    /// # Errors
    /// Returns [`TransportError`] for connect failures and non-success
    /// statuses.
    fn detect_mood(&self, request: &AnalysisRequest) -> Result<String, TransportError>;

    /// Fetches the preview playlist for a mood label.
    ///
    /// # Errors
    /// Returns [`TransportError`] for connect failures and non-success
    /// statuses.
    fn mood_music(&self, mood: &str) -> Result<String, TransportError>;
}

/// Auxiliary-window lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowState {
    /// Open and blank; must not be left this way past the run.
    Open,
    /// Navigated to its final URL.
    Navigated(String),
    /// Explicitly closed.
    Closed,
}

/// Handle to one auxiliary window.
///
/// Clones share state so an opener can keep a handle for inspection while
/// the orchestrator applies the terminal operation. `navigate` and `close`
/// only act on an `Open` window, which enforces the exactly-once terminal
/// discipline.
#[derive(Debug, Clone)]
pub struct PendingWindow {
    state: Arc<Mutex<WindowState>>,
}

impl PendingWindow {
    /// Creates an open, blank window handle.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(WindowState::Open)),
        }
    }

    /// Creates a handle already navigated to `url`, as a fallback opener
    /// produces.
    pub fn navigated(url: impl Into<String>) -> Self {
        Self {
            state: Arc::new(Mutex::new(WindowState::Navigated(url.into()))),
        }
    }

    /// Navigates the window when it is still open. Returns `false` when the
    /// window was already navigated or closed (for example by the user).
    pub fn navigate(&self, url: &str) -> bool {
        let mut state = self.state.lock().expect("window state lock should not be poisoned");
        if *state == WindowState::Open {
            *state = WindowState::Navigated(url.to_string());
            true
        } else {
            false
        }
    }

    /// Closes the window when it is still open. Returns `false` otherwise.
    pub fn close(&self) -> bool {
        let mut state = self.state.lock().expect("window state lock should not be poisoned");
        if *state == WindowState::Open {
            *state = WindowState::Closed;
            true
        } else {
            false
        }
    }

    /// Returns a snapshot of the window state.
    pub fn state(&self) -> WindowState {
        self.state
            .lock()
            .expect("window state lock should not be poisoned")
            .clone()
    }
}

impl Default for PendingWindow {
    fn default() -> Self {
        Self::new()
    }
}

/// Capability for opening browser-level auxiliary windows.
///
/// `open_blank` must be invoked within the synchronous extent of the user
/// gesture; embedding contexts may still refuse, in which case `None` is
/// returned and the run proceeds without a window.
pub trait WindowOpener: Send + Sync {
    /// Opens a blank window, returning its handle unless blocked.
    fn open_blank(&self) -> Option<PendingWindow>;

    /// Opens `url` directly, the fallback when a pre-opened window was
    /// closed in the interim.
    fn open_url(&self, url: &str) -> Option<PendingWindow>;
}

/// How the auxiliary window ended up after a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowDisposition {
    /// Auto-open was off or the opener refused; no window existed.
    NotOpened,
    /// The pre-opened window was navigated to this URL.
    Navigated(String),
    /// The pre-opened window was gone, so this URL was opened directly.
    FallbackOpened(String),
    /// The pre-opened window was closed because no link was available.
    Closed,
}

/// Result of one successful orchestration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOutcome {
    /// Parsed analysis result.
    pub result: MoodResponse,
    /// Terminal state of the auxiliary window.
    pub window: WindowDisposition,
    /// Derived video id recorded as the active selection, if any.
    pub selected_video: Option<String>,
    /// Attempt key of the submission; `None` for the preview path.
    pub attempt_key: Option<String>,
}

/// Sequences window pre-open, remote call, and window resolution.
pub struct AnalysisOrchestrator {
    transport: Arc<dyn AnalysisTransport>,
    opener: Arc<dyn WindowOpener>,
    auto_open: bool,
    in_flight: bool,
    result: Option<MoodResponse>,
    selected_video: Option<String>,
}

impl AnalysisOrchestrator {
    /// Creates an orchestrator with auto-open disabled.
    pub fn new(transport: Arc<dyn AnalysisTransport>, opener: Arc<dyn WindowOpener>) -> Self {
        Self {
            transport,
            opener,
            auto_open: false,
            in_flight: false,
            result: None,
            selected_video: None,
        }
    }

    /// Sets the auto-open preference.
    pub fn set_auto_open(&mut self, auto_open: bool) {
        self.auto_open = auto_open;
    }

    /// Returns the auto-open preference.
    pub fn auto_open(&self) -> bool {
        self.auto_open
    }

    /// Returns `true` while a run is outstanding; the triggering control
    /// must be disabled for the duration.
    pub fn is_busy(&self) -> bool {
        self.in_flight
    }

    /// Returns the last stored result, if any.
    pub fn result(&self) -> Option<&MoodResponse> {
        self.result.as_ref()
    }

    /// Returns the active video selection, if any.
    pub fn selected_video(&self) -> Option<&str> {
        self.selected_video.as_deref()
    }

    /// Clears the stored result and active selection.
    pub fn reset(&mut self) {
        self.result = None;
        self.selected_video = None;
    }

    /// Runs one analysis submission.
    ///
    /// Must be triggered synchronously inside a user gesture: when auto-open
    /// is enabled the blank window is created before any transport work, the
    /// only ordering popup blockers permit.
    ///
    /// # Errors
    /// Returns [`OrchestratorError`] for busy, validation, transport, and
    /// contract failures. Whatever the path, a pre-opened window is resolved
    /// (navigated or closed) exactly once.
    pub fn run_analysis(
        &mut self,
        inputs: &AnalysisInputs,
    ) -> Result<AnalysisOutcome, OrchestratorError> {
        if self.in_flight {
            return Err(OrchestratorError::Busy);
        }

        let window = self.pre_open_window();

        let request = match AnalysisRequest::from_inputs(inputs) {
            Ok(request) => request,
            Err(error) => {
                close_unused(&window);
                return Err(error);
            }
        };

        self.in_flight = true;
        let raw = self.transport.detect_mood(&request);
        self.in_flight = false;

        let raw = match raw {
            Ok(raw) => raw,
            Err(error) => {
                warn!("analysis call failed: {error}");
                close_unused(&window);
                return Err(error.into());
            }
        };

        let response = match parse_mood_response(&raw) {
            Ok(response) => response,
            Err(error) => {
                close_unused(&window);
                return Err(error.into());
            }
        };

        info!("analysis resolved final mood '{}'", response.final_mood);
        self.finish_run(response, window, Some(request.attempt_key()))
    }

    /// Runs the preview path: fetches a fixed-mood playlist and feeds it
    /// through the identical window-resolution logic without real inputs.
    ///
    /// # Errors
    /// Returns [`OrchestratorError`] for busy, transport, and contract
    /// failures, with the same window guarantee as [`Self::run_analysis`].
    pub fn run_preview(&mut self, mood: &str) -> Result<AnalysisOutcome, OrchestratorError> {
        if self.in_flight {
            return Err(OrchestratorError::Busy);
        }

        let window = self.pre_open_window();

        self.in_flight = true;
        let raw = self.transport.mood_music(mood);
        self.in_flight = false;

        let raw = match raw {
            Ok(raw) => raw,
            Err(error) => {
                warn!("preview call failed: {error}");
                close_unused(&window);
                return Err(error.into());
            }
        };

        let playlist = match parse_preview_playlist(&raw) {
            Ok(playlist) => playlist,
            Err(error) => {
                close_unused(&window);
                return Err(error.into());
            }
        };

        let response = preview_response(mood, playlist);
        self.finish_run(response, window, None)
    }

    fn pre_open_window(&self) -> Option<PendingWindow> {
        if !self.auto_open {
            return None;
        }
        let window = self.opener.open_blank();
        if window.is_none() {
            warn!("auxiliary window was blocked by the embedding context");
        }
        window
    }

    fn finish_run(
        &mut self,
        response: MoodResponse,
        window: Option<PendingWindow>,
        attempt_key: Option<String>,
    ) -> Result<AnalysisOutcome, OrchestratorError> {
        let link = response.primary_music_link().map(str::to_string);
        let (disposition, selected) = self.resolve_window(window, link.as_deref());

        self.result = Some(response.clone());
        self.selected_video = selected.clone();

        Ok(AnalysisOutcome {
            result: response,
            window: disposition,
            selected_video: selected,
            attempt_key,
        })
    }

    fn resolve_window(
        &self,
        window: Option<PendingWindow>,
        link: Option<&str>,
    ) -> (WindowDisposition, Option<String>) {
        if !self.auto_open {
            return (WindowDisposition::NotOpened, None);
        }

        let Some(link) = link else {
            return match window {
                Some(handle) => {
                    handle.close();
                    (WindowDisposition::Closed, None)
                }
                None => (WindowDisposition::NotOpened, None),
            };
        };

        let (target, selected) = match playable_video_id(link) {
            Some(video_id) => (canonical_watch_url(&video_id), Some(video_id)),
            None => (link.to_string(), None),
        };

        let disposition = match window {
            Some(handle) if handle.navigate(&target) => WindowDisposition::Navigated(target),
            _ => {
                // Pre-opened window missing or closed by the user; open the
                // target directly instead.
                self.opener.open_url(&target);
                WindowDisposition::FallbackOpened(target)
            }
        };

        (disposition, selected)
    }
}

fn close_unused(window: &Option<PendingWindow>) {
    if let Some(handle) = window {
        handle.close();
    }
}

/// Orchestration error taxonomy.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Required input is missing; no transport call was made.
    #[error("{0}")]
    Validation(CoreError),
    /// A run is already outstanding.
    #[error("an analysis is already in progress")]
    Busy,
    /// The remote service could not be reached.
    #[error("could not reach the analysis service: {0}")]
    Network(String),
    /// The remote service answered with a non-success response.
    #[error("analysis failed: {0}")]
    Service(String),
    /// The response body violated the analysis contract.
    #[error("analysis response was not understood: {0}")]
    Contract(#[from] AnalysisContractError),
}

impl From<TransportError> for OrchestratorError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::Connect(cause) => OrchestratorError::Network(cause),
            TransportError::Status { status, body } => {
                if body.trim().is_empty() {
                    OrchestratorError::Service(format!("request failed with status {status}"))
                } else {
                    OrchestratorError::Service(body)
                }
            }
        }
    }
}

/// Recording window opener for tests.
///
/// Every opened handle is retained for inspection; `set_blocked` simulates a
/// popup blocker refusing the gesture.
#[derive(Debug, Default)]
pub struct RecordingWindowOpener {
    opened: Mutex<Vec<PendingWindow>>,
    blocked: Mutex<bool>,
}

impl RecordingWindowOpener {
    /// Creates an opener that permits windows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent `open_blank` calls fail like a popup blocker.
    pub fn set_blocked(&self, blocked: bool) {
        *self
            .blocked
            .lock()
            .expect("blocked flag lock should not be poisoned") = blocked;
    }

    /// Returns handles for every window opened so far, in order.
    pub fn opened(&self) -> Vec<PendingWindow> {
        self.opened
            .lock()
            .expect("opened windows lock should not be poisoned")
            .clone()
    }
}

impl WindowOpener for RecordingWindowOpener {
    fn open_blank(&self) -> Option<PendingWindow> {
        if *self
            .blocked
            .lock()
            .expect("blocked flag lock should not be poisoned")
        {
            return None;
        }

        let window = PendingWindow::new();
        self.opened
            .lock()
            .expect("opened windows lock should not be poisoned")
            .push(window.clone());
        Some(window)
    }

    fn open_url(&self, url: &str) -> Option<PendingWindow> {
        let window = PendingWindow::navigated(url);
        self.opened
            .lock()
            .expect("opened windows lock should not be poisoned")
            .push(window.clone());
        Some(window)
    }
}

/// Scripted transport for tests.
///
/// Responses are consumed in push order per endpoint; calling beyond the
/// script fails with [`TransportError::Connect`].
#[derive(Debug, Default)]
pub struct ScriptedAnalysisTransport {
    detect_responses: Mutex<VecDeque<Result<String, TransportError>>>,
    music_responses: Mutex<VecDeque<Result<String, TransportError>>>,
    detect_keys: Mutex<Vec<String>>,
    music_moods: Mutex<Vec<String>>,
}

impl ScriptedAnalysisTransport {
    /// Creates a transport with empty scripts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues one `detect_mood` response.
    pub fn push_detect(&self, response: Result<String, TransportError>) {
        self.detect_responses
            .lock()
            .expect("detect script lock should not be poisoned")
            .push_back(response);
    }

    /// Queues one `mood_music` response.
    pub fn push_music(&self, response: Result<String, TransportError>) {
        self.music_responses
            .lock()
            .expect("music script lock should not be poisoned")
            .push_back(response);
    }

    /// Attempt keys of every `detect_mood` call seen, in order.
    pub fn detect_calls(&self) -> Vec<String> {
        self.detect_keys
            .lock()
            .expect("detect calls lock should not be poisoned")
            .clone()
    }

    /// Mood labels of every `mood_music` call seen, in order.
    pub fn music_calls(&self) -> Vec<String> {
        self.music_moods
            .lock()
            .expect("music calls lock should not be poisoned")
            .clone()
    }
}

impl AnalysisTransport for ScriptedAnalysisTransport {
    fn detect_mood(&self, request: &AnalysisRequest) -> Result<String, TransportError> {
        self.detect_keys
            .lock()
            .map_err(|_| TransportError::Connect("detect calls lock poisoned".to_string()))?
            .push(request.attempt_key());

        self.detect_responses
            .lock()
            .map_err(|_| TransportError::Connect("detect script lock poisoned".to_string()))?
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Connect("no scripted response".to_string())))
    }

    fn mood_music(&self, mood: &str) -> Result<String, TransportError> {
        self.music_moods
            .lock()
            .map_err(|_| TransportError::Connect("music calls lock poisoned".to_string()))?
            .push(mood.to_string());

        self.music_responses
            .lock()
            .map_err(|_| TransportError::Connect("music script lock poisoned".to_string()))?
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Connect("no scripted response".to_string())))
    }
}
