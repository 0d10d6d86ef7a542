//! Shared fixtures for app integration tests.

use moodsense_core::{AnalysisInputs, SelectedFile};

/// Creates a deterministic face image fixture.
#[allow(dead_code)]
pub fn face_file() -> SelectedFile {
    SelectedFile::new("face.jpg", "image/jpeg", vec![0xff, 0xd8, 0xff, 0xe0])
        .expect("face fixture should be valid")
}

/// Creates a deterministic EEG recording fixture.
#[allow(dead_code)]
pub fn eeg_file() -> SelectedFile {
    SelectedFile::new("session.csv", "text/csv", b"t,af3\n0,4100\n".to_vec())
        .expect("eeg fixture should be valid")
}

/// Creates complete analysis inputs.
#[allow(dead_code)]
pub fn complete_inputs() -> AnalysisInputs {
    let mut inputs = AnalysisInputs::default();
    inputs.set_face(face_file());
    inputs.set_eeg(eeg_file());
    inputs
}

/// Analysis response body whose primary link carries a `v=` parameter.
#[allow(dead_code)]
pub fn response_with_watch_link() -> String {
    r#"{
        "face_emotion": "happy",
        "eeg_emotion": "calm",
        "final_mood": "Happy",
        "music_options": [
            {"name": "First Song", "url": "https://www.youtube.com/watch?v=ABC123", "channel": "Channel A", "duration": "3:21"},
            {"name": "Second Song", "url": "https://example.test/other"}
        ]
    }"#
    .to_string()
}

/// Analysis response body without any music link.
#[allow(dead_code)]
pub fn response_without_links() -> String {
    r#"{
        "face_emotion": "sad",
        "eeg_emotion": "sad",
        "final_mood": "Sad",
        "music_options": []
    }"#
    .to_string()
}
