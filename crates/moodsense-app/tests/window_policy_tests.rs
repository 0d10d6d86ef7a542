//! Integration tests for auxiliary-window navigation policy.

mod common;

use std::sync::Arc;

use moodsense_orchestrator::{
    AnalysisOrchestrator, AnalysisRequest, AnalysisTransport, RecordingWindowOpener,
    ScriptedAnalysisTransport, TransportError, WindowDisposition, WindowState,
};

#[test]
fn window_policy_tests_watch_link_navigates_preopened_window_to_canonical_url() {
    let transport = Arc::new(ScriptedAnalysisTransport::new());
    transport.push_detect(Ok(common::response_with_watch_link()));
    let opener = Arc::new(RecordingWindowOpener::new());

    let mut orchestrator = AnalysisOrchestrator::new(transport, opener.clone());
    orchestrator.set_auto_open(true);

    let outcome = orchestrator
        .run_analysis(&common::complete_inputs())
        .expect("analysis should succeed");

    assert_eq!(
        outcome.window,
        WindowDisposition::Navigated("https://www.youtube.com/watch?v=ABC123".to_string())
    );
    assert_eq!(outcome.selected_video.as_deref(), Some("ABC123"));
    assert_eq!(orchestrator.selected_video(), Some("ABC123"));

    let windows = opener.opened();
    assert_eq!(windows.len(), 1);
    assert_eq!(
        windows[0].state(),
        WindowState::Navigated("https://www.youtube.com/watch?v=ABC123".to_string())
    );
}

#[test]
fn window_policy_tests_link_without_id_navigates_to_raw_url() {
    let transport = Arc::new(ScriptedAnalysisTransport::new());
    transport.push_detect(Ok(r#"{
        "face_emotion": "happy",
        "eeg_emotion": "calm",
        "final_mood": "Happy",
        "music_options": [{"name": "Plain", "url": "https://example.test/song"}]
    }"#
    .to_string()));
    let opener = Arc::new(RecordingWindowOpener::new());

    let mut orchestrator = AnalysisOrchestrator::new(transport, opener.clone());
    orchestrator.set_auto_open(true);

    let outcome = orchestrator
        .run_analysis(&common::complete_inputs())
        .expect("analysis should succeed");

    assert_eq!(
        outcome.window,
        WindowDisposition::Navigated("https://example.test/song".to_string())
    );
    assert!(outcome.selected_video.is_none());
}

#[test]
fn window_policy_tests_no_link_closes_preopened_window() {
    let transport = Arc::new(ScriptedAnalysisTransport::new());
    transport.push_detect(Ok(common::response_without_links()));
    let opener = Arc::new(RecordingWindowOpener::new());

    let mut orchestrator = AnalysisOrchestrator::new(transport, opener.clone());
    orchestrator.set_auto_open(true);

    let outcome = orchestrator
        .run_analysis(&common::complete_inputs())
        .expect("analysis should succeed");

    assert_eq!(outcome.window, WindowDisposition::Closed);

    let windows = opener.opened();
    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0].state(), WindowState::Closed);
}

/// Transport that closes every window the opener produced before answering,
/// like a user dismissing the blank popup while the call is outstanding.
struct UserClosesPopupTransport {
    opener: Arc<RecordingWindowOpener>,
    body: String,
}

impl AnalysisTransport for UserClosesPopupTransport {
    fn detect_mood(&self, _request: &AnalysisRequest) -> Result<String, TransportError> {
        for window in self.opener.opened() {
            window.close();
        }
        Ok(self.body.clone())
    }

    fn mood_music(&self, _mood: &str) -> Result<String, TransportError> {
        Err(TransportError::Connect("not scripted".to_string()))
    }
}

#[test]
fn window_policy_tests_user_closed_window_falls_back_to_direct_open() {
    let opener = Arc::new(RecordingWindowOpener::new());
    let transport = Arc::new(UserClosesPopupTransport {
        opener: opener.clone(),
        body: common::response_with_watch_link(),
    });

    let mut orchestrator = AnalysisOrchestrator::new(transport, opener.clone());
    orchestrator.set_auto_open(true);

    let outcome = orchestrator
        .run_analysis(&common::complete_inputs())
        .expect("analysis should succeed");

    assert_eq!(
        outcome.window,
        WindowDisposition::FallbackOpened("https://www.youtube.com/watch?v=ABC123".to_string())
    );
    assert_eq!(outcome.selected_video.as_deref(), Some("ABC123"));

    // Pre-opened (user-closed) window plus the fallback window.
    let windows = opener.opened();
    assert_eq!(windows.len(), 2);
    assert_eq!(windows[0].state(), WindowState::Closed);
    assert_eq!(
        windows[1].state(),
        WindowState::Navigated("https://www.youtube.com/watch?v=ABC123".to_string())
    );
}

#[test]
fn window_policy_tests_blocked_opener_still_opens_target_directly() {
    let transport = Arc::new(ScriptedAnalysisTransport::new());
    transport.push_detect(Ok(common::response_with_watch_link()));
    let opener = Arc::new(RecordingWindowOpener::new());
    opener.set_blocked(true);

    let mut orchestrator = AnalysisOrchestrator::new(transport, opener.clone());
    orchestrator.set_auto_open(true);

    let outcome = orchestrator
        .run_analysis(&common::complete_inputs())
        .expect("analysis should succeed");

    assert_eq!(
        outcome.window,
        WindowDisposition::FallbackOpened("https://www.youtube.com/watch?v=ABC123".to_string())
    );
    assert_eq!(outcome.selected_video.as_deref(), Some("ABC123"));
}

#[test]
fn window_policy_tests_every_window_ends_resolved() {
    let transport = Arc::new(ScriptedAnalysisTransport::new());
    transport.push_detect(Ok(common::response_with_watch_link()));
    transport.push_detect(Ok(common::response_without_links()));
    let opener = Arc::new(RecordingWindowOpener::new());

    let mut orchestrator = AnalysisOrchestrator::new(transport, opener.clone());
    orchestrator.set_auto_open(true);

    orchestrator
        .run_analysis(&common::complete_inputs())
        .expect("first run should succeed");
    orchestrator
        .run_analysis(&common::complete_inputs())
        .expect("second run should succeed");

    for window in opener.opened() {
        assert_ne!(window.state(), WindowState::Open, "window left blank");
    }
}
