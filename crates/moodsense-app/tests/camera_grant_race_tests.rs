//! Integration tests for grant cancellation-on-resolve.

use moodsense_camera::{
    CameraSession, DeviceStream, PixelSurface, SessionStatus,
};

#[test]
fn camera_grant_race_tests_close_before_grant_leaves_no_running_stream() {
    let mut session = CameraSession::new();
    let mut surface = PixelSurface::new();

    let ticket = session.open().expect("open should work");
    assert_eq!(session.status(), SessionStatus::Requesting);

    // User backs out while the permission prompt is still up.
    session.close(&mut surface);

    let stream = DeviceStream::new("front-camera");
    session
        .resolve_grant(ticket, Ok(stream.clone()), &mut surface)
        .expect("stale grant should be discarded silently");

    assert!(stream.is_released(), "granted stream must be stopped");
    assert!(surface.attached_stream().is_none(), "stream must not bind");
    assert_eq!(session.status(), SessionStatus::Closed);
    assert!(!session.is_ready());
}

#[test]
fn camera_grant_race_tests_at_most_one_request_resolves_into_state() {
    let mut session = CameraSession::new();
    let mut surface = PixelSurface::new();

    let first_ticket = session.open().expect("open should work");
    session.close(&mut surface);

    // A fresh session restarts at Idle; the old ticket must stay dead even
    // though a new request is now outstanding.
    let mut second = CameraSession::new();
    let second_ticket = second.open().expect("open should work");

    let stale_stream = DeviceStream::new("front-camera");
    session
        .resolve_grant(first_ticket, Ok(stale_stream.clone()), &mut surface)
        .expect("stale grant should be discarded silently");
    assert!(stale_stream.is_released());

    let live_stream = DeviceStream::new("front-camera");
    second
        .resolve_grant(second_ticket, Ok(live_stream.clone()), &mut surface)
        .expect("current grant should apply");

    assert_eq!(second.status(), SessionStatus::Live);
    assert!(!live_stream.is_released());
    assert!(surface.attached_stream().is_some());

    second.close(&mut surface);
    assert!(live_stream.is_released());
}
