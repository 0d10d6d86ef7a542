//! Integration tests for the preview orchestration path.

use std::sync::Arc;

use moodsense_analysis_contract::{MusicTrack, parse_preview_playlist};
use moodsense_orchestrator::{
    AnalysisOrchestrator, RecordingWindowOpener, ScriptedAnalysisTransport, WindowDisposition,
};

const PREVIEW_BODY: &str = r#"{
    "tracks": [
        {"name": "Upbeat One", "url": "https://www.youtube.com/watch?v=UP1", "channel": "Happy Hits"},
        {"name": "Upbeat Two", "url": "https://example.test/two"}
    ]
}"#;

#[test]
fn preview_path_tests_maps_tracks_into_result_shape_unmodified() {
    let transport = Arc::new(ScriptedAnalysisTransport::new());
    transport.push_music(Ok(PREVIEW_BODY.to_string()));
    let opener = Arc::new(RecordingWindowOpener::new());

    let mut orchestrator = AnalysisOrchestrator::new(transport.clone(), opener);

    let outcome = orchestrator
        .run_preview("happy")
        .expect("preview should succeed");

    assert_eq!(outcome.result.final_mood, "Happy");
    assert_eq!(outcome.result.face_emotion, "preview");
    assert_eq!(outcome.result.eeg_emotion, "preview");
    assert!(outcome.attempt_key.is_none());

    let fetched: Vec<MusicTrack> = parse_preview_playlist(PREVIEW_BODY)
        .expect("fixture should parse")
        .tracks;
    assert_eq!(outcome.result.music_options, fetched);
    assert_eq!(transport.music_calls(), vec!["happy".to_string()]);
}

#[test]
fn preview_path_tests_exercises_identical_window_logic() {
    let transport = Arc::new(ScriptedAnalysisTransport::new());
    transport.push_music(Ok(PREVIEW_BODY.to_string()));
    let opener = Arc::new(RecordingWindowOpener::new());

    let mut orchestrator = AnalysisOrchestrator::new(transport, opener);
    orchestrator.set_auto_open(true);

    let outcome = orchestrator
        .run_preview("happy")
        .expect("preview should succeed");

    assert_eq!(
        outcome.window,
        WindowDisposition::Navigated("https://www.youtube.com/watch?v=UP1".to_string())
    );
    assert_eq!(outcome.selected_video.as_deref(), Some("UP1"));
}

#[test]
fn preview_path_tests_empty_playlist_closes_preopened_window() {
    let transport = Arc::new(ScriptedAnalysisTransport::new());
    transport.push_music(Ok(r#"{"tracks": []}"#.to_string()));
    let opener = Arc::new(RecordingWindowOpener::new());

    let mut orchestrator = AnalysisOrchestrator::new(transport, opener);
    orchestrator.set_auto_open(true);

    let outcome = orchestrator
        .run_preview("happy")
        .expect("preview should succeed");

    assert_eq!(outcome.window, WindowDisposition::Closed);
    assert!(outcome.selected_video.is_none());
}
