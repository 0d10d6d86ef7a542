#![warn(missing_docs)]
//! # moodsense-camera
//!
//! ## Purpose
//! Implements the camera acquisition/teardown state machine that turns a user
//! gesture into a live device stream and then a still-image file.
//!
//! ## Responsibilities
//! - Model the `Idle -> Requesting -> Live -> Closed` session lifecycle with
//!   explicit legal transitions.
//! - Discard a device grant that resolves after the session was closed, so a
//!   cancelled request never leaves the camera running.
//! - Encode the current surface frame as a JPEG [`SelectedFile`].
//! - Expose backend-agnostic capability traits plus deterministic scripted
//!   fakes for tests and CI.
//!
//! ## Data flow
//! Host calls [`CameraSession::open`] -> issues the device request through a
//! [`DeviceStreamProvider`] -> feeds the outcome back via
//! [`CameraSession::resolve_grant`] -> a `Live` session renders frames on a
//! [`VideoSurface`] -> [`CameraSession::capture`] emits one `SelectedFile`
//! for the owning file-selection zone and closes the session.
//!
//! ## Ownership and lifetimes
//! The session exclusively owns its [`DeviceStream`]; release happens on
//! `close`, on `capture`, or on drop, whichever comes first, and is
//! idempotent. `Closed` is terminal: a new session value restarts at `Idle`.
//!
//! ## Error model
//! Illegal transitions, classified device failures, premature capture, and
//! encode failures are reported as [`CameraError`] values. Device failures
//! always force the session to `Closed`.
//!
//! ## Security and privacy notes
//! Frame bytes are never logged; diagnostics carry only status names and
//! device labels.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, warn};
use moodsense_core::SelectedFile;
use thiserror::Error;

/// JPEG quality used for still captures.
pub const CAPTURE_JPEG_QUALITY: u8 = 95;

/// Which way the requested camera faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraFacing {
    /// Front-facing (selfie) camera.
    User,
    /// Rear-facing camera.
    Environment,
}

/// Preferred stream parameters forwarded to the device provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConstraints {
    /// Requested camera orientation.
    pub facing: CameraFacing,
    /// Ideal frame width in pixels.
    pub ideal_width: u32,
    /// Ideal frame height in pixels.
    pub ideal_height: u32,
}

impl Default for StreamConstraints {
    fn default() -> Self {
        Self {
            facing: CameraFacing::User,
            ideal_width: 1280,
            ideal_height: 720,
        }
    }
}

/// Owned handle to live camera hardware output.
///
/// Clones share one underlying stream; release is observable through every
/// clone, which lets providers and tests verify teardown.
#[derive(Debug, Clone)]
pub struct DeviceStream {
    shared: Arc<StreamShared>,
}

#[derive(Debug)]
struct StreamShared {
    device_label: String,
    released: AtomicBool,
}

impl DeviceStream {
    /// Creates a running stream handle for the named device.
    pub fn new(device_label: impl Into<String>) -> Self {
        Self {
            shared: Arc::new(StreamShared {
                device_label: device_label.into(),
                released: AtomicBool::new(false),
            }),
        }
    }

    /// Returns the provider-assigned device label.
    pub fn device_label(&self) -> &str {
        &self.shared.device_label
    }

    /// Stops the underlying tracks. Safe to invoke multiple times.
    pub fn release(&self) {
        if !self.shared.released.swap(true, Ordering::SeqCst) {
            debug!("released device stream '{}'", self.shared.device_label);
        }
    }

    /// Returns `true` once the stream has been released.
    pub fn is_released(&self) -> bool {
        self.shared.released.load(Ordering::SeqCst)
    }
}

/// Classified device request failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The user or platform denied camera permission.
    #[error("camera permission was denied")]
    PermissionDenied,
    /// No camera hardware is available.
    #[error("no camera device was found")]
    NotFound,
    /// The camera exists but cannot be started.
    #[error("camera device is not readable")]
    NotReadable,
    /// Unclassified provider failure.
    #[error("camera request failed: {0}")]
    Other(String),
}

impl DeviceError {
    /// Maps the failure class to its user-facing message.
    pub fn user_message(&self) -> &'static str {
        match self {
            DeviceError::PermissionDenied => {
                "Camera access was denied. Allow camera permission and try again."
            }
            DeviceError::NotFound => "No camera device found. Connect a camera and try again.",
            DeviceError::NotReadable => {
                "Cannot access the camera. It may be in use by another application."
            }
            DeviceError::Other(_) => {
                "Unable to access the camera. Check permissions and try again."
            }
        }
    }
}

/// Trait implemented by concrete device stream providers.
pub trait DeviceStreamProvider: Send + Sync {
    /// Requests a camera stream honoring `constraints` where possible.
    ///
    /// # Errors
    /// Returns a classified [`DeviceError`] when the platform rejects the
    /// request. The request itself cannot be aborted mid-flight; cancellation
    /// is applied by the session when the outcome is resolved.
    fn request_stream(&self, constraints: &StreamConstraints) -> Result<DeviceStream, DeviceError>;
}

/// One decoded frame lifted off a rendering surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraFrame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Raw RGBA pixel buffer (`width * height * 4` bytes).
    pub rgba: Vec<u8>,
}

impl CameraFrame {
    /// Constructs a validated frame.
    ///
    /// # Errors
    /// Returns [`CameraError::InvalidFrameShape`] when the pixel buffer length
    /// is not exactly `width * height * 4`.
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, CameraError> {
        let expected = (width as usize) * (height as usize) * 4;
        if rgba.len() != expected {
            return Err(CameraError::InvalidFrameShape {
                expected,
                actual: rgba.len(),
            });
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }
}

/// Rendering surface a live stream binds to.
///
/// The surface reports no dimensions until its first frame arrives, which is
/// what gates [`CameraSession::capture`] readiness.
pub trait VideoSurface {
    /// Binds a live stream to the surface.
    fn attach(&mut self, stream: &DeviceStream);

    /// Unbinds whatever stream is attached.
    fn detach(&mut self);

    /// Current frame dimensions, `None` until a frame is available.
    fn frame_dimensions(&self) -> Option<(u32, u32)>;

    /// Snapshot of the current frame, `None` until one is available.
    fn current_frame(&self) -> Option<CameraFrame>;
}

/// Camera session lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// No request has been made.
    Idle,
    /// A device request is outstanding.
    Requesting,
    /// A stream is held and bound to a surface.
    Live,
    /// Terminal state; the stream (if any) has been released.
    Closed,
}

/// Proof that a grant outcome belongs to the session's current request.
///
/// The generation is captured when [`CameraSession::open`] issues the request;
/// `close` bumps it, so a grant resolving afterwards is recognized as stale
/// and discarded instead of applied.
#[derive(Debug)]
pub struct GrantTicket {
    generation: u64,
}

/// Owns one camera session from user gesture to teardown.
#[derive(Debug)]
pub struct CameraSession {
    status: SessionStatus,
    stream: Option<DeviceStream>,
    ready: bool,
    generation: u64,
}

impl CameraSession {
    /// Creates a session in `Idle` state.
    pub fn new() -> Self {
        Self {
            status: SessionStatus::Idle,
            stream: None,
            ready: false,
            generation: 0,
        }
    }

    /// Returns the current lifecycle state.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Returns `true` once a live frame-producing stream is bound.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Begins stream acquisition.
    ///
    /// Transitions `Idle -> Requesting` synchronously so any surface that
    /// depends on the session existing is mounted before the permission
    /// round-trip completes. The host issues the device request and applies
    /// its outcome through [`CameraSession::resolve_grant`].
    ///
    /// # Errors
    /// Returns [`CameraError::InvalidTransition`] unless the session is
    /// `Idle`.
    pub fn open(&mut self) -> Result<GrantTicket, CameraError> {
        if self.status != SessionStatus::Idle {
            return Err(CameraError::InvalidTransition {
                operation: "open",
                from: self.status,
            });
        }

        self.status = SessionStatus::Requesting;
        debug!("camera session requesting (generation {})", self.generation);
        Ok(GrantTicket {
            generation: self.generation,
        })
    }

    /// Applies the outcome of the device request identified by `ticket`.
    ///
    /// A grant arriving after `close` (stale ticket or non-`Requesting`
    /// status) is released immediately without binding, so a user who backed
    /// out never sees a zombie camera indicator.
    ///
    /// # Errors
    /// Returns [`CameraError::Device`] when the provider rejected the
    /// request; the session is forced to `Closed` and no automatic retry is
    /// attempted.
    pub fn resolve_grant(
        &mut self,
        ticket: GrantTicket,
        outcome: Result<DeviceStream, DeviceError>,
        surface: &mut dyn VideoSurface,
    ) -> Result<(), CameraError> {
        let stale = ticket.generation != self.generation || self.status != SessionStatus::Requesting;
        if stale {
            if let Ok(stream) = outcome {
                info!(
                    "discarding device grant for cancelled request (generation {})",
                    ticket.generation
                );
                stream.release();
            }
            return Ok(());
        }

        match outcome {
            Ok(stream) => {
                surface.attach(&stream);
                self.stream = Some(stream);
                self.ready = true;
                self.status = SessionStatus::Live;
                debug!("camera session live");
                Ok(())
            }
            Err(error) => {
                self.ready = false;
                self.status = SessionStatus::Closed;
                warn!("camera request failed: {error}");
                Err(CameraError::Device(error))
            }
        }
    }

    /// Encodes the current surface frame as a JPEG selected file and closes
    /// the session.
    ///
    /// The file is named `camera-{captured_at_ms}.jpg` with mime
    /// `image/jpeg`.
    ///
    /// # Errors
    /// Returns [`CameraError::NotReady`] when the session is not `Live`, the
    /// surface reports no dimensions yet, or no frame is available; no state
    /// changes in that case. Returns [`CameraError::Encode`] on JPEG encoder
    /// failure.
    pub fn capture(
        &mut self,
        surface: &mut dyn VideoSurface,
        captured_at_ms: u64,
    ) -> Result<SelectedFile, CameraError> {
        if self.status != SessionStatus::Live || !self.ready {
            return Err(CameraError::NotReady("camera not initialized"));
        }

        match surface.frame_dimensions() {
            Some((width, height)) if width > 0 && height > 0 => {}
            _ => return Err(CameraError::NotReady("camera image not ready yet, try again")),
        }

        let frame = surface
            .current_frame()
            .ok_or(CameraError::NotReady("camera image not ready yet, try again"))?;
        let encoded = encode_jpeg(&frame)?;

        let file = SelectedFile::new(
            format!("camera-{captured_at_ms}.jpg"),
            "image/jpeg",
            encoded,
        )
        .map_err(|error| CameraError::Encode(error.to_string()))?;

        info!("captured still frame '{}'", file.name);
        self.close(surface);
        Ok(file)
    }

    /// Releases any held stream, detaches the surface, and transitions to
    /// `Closed`. Valid from any state and idempotent.
    pub fn close(&mut self, surface: &mut dyn VideoSurface) {
        if let Some(stream) = self.stream.take() {
            stream.release();
        }
        surface.detach();
        self.ready = false;
        if self.status != SessionStatus::Closed {
            debug!("camera session closed from {:?}", self.status);
        }
        self.status = SessionStatus::Closed;
        // An outstanding grant must resolve stale after this point.
        self.generation = self.generation.wrapping_add(1);
    }
}

impl Default for CameraSession {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        // Owner teardown must release the device even without a close call.
        if let Some(stream) = self.stream.take() {
            stream.release();
        }
    }
}

fn encode_jpeg(frame: &CameraFrame) -> Result<Vec<u8>, CameraError> {
    let rgb = rgba_to_rgb(&frame.rgba)?;

    let mut encoded = Vec::new();
    let mut encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut encoded, CAPTURE_JPEG_QUALITY);
    encoder
        .encode(
            &rgb,
            frame.width,
            frame.height,
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|error| CameraError::Encode(error.to_string()))?;

    Ok(encoded)
}

fn rgba_to_rgb(rgba: &[u8]) -> Result<Vec<u8>, CameraError> {
    if rgba.len() % 4 != 0 {
        return Err(CameraError::InvalidFrameShape {
            expected: rgba.len().next_multiple_of(4),
            actual: rgba.len(),
        });
    }

    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
    for pixel in rgba.chunks_exact(4) {
        rgb.extend_from_slice(&pixel[..3]);
    }
    Ok(rgb)
}

/// Camera layer error type.
#[derive(Debug, Error)]
pub enum CameraError {
    /// Operation is not legal from the current state.
    #[error("camera operation '{operation}' is not valid from {from:?}")]
    InvalidTransition {
        /// Attempted operation name.
        operation: &'static str,
        /// State the session was in.
        from: SessionStatus,
    },
    /// Classified device request failure.
    #[error("camera device failure: {0}")]
    Device(DeviceError),
    /// Capture attempted before a live frame is available.
    #[error("camera is not ready: {0}")]
    NotReady(&'static str),
    /// JPEG encoding failure.
    #[error("frame encode failure: {0}")]
    Encode(String),
    /// Pixel buffer does not match the declared dimensions.
    #[error("invalid frame shape: expected {expected} bytes, got {actual}")]
    InvalidFrameShape {
        /// Expected buffer length.
        expected: usize,
        /// Actual buffer length.
        actual: usize,
    },
}

/// Deterministic scripted provider for tests and CI.
///
/// Outcomes are consumed in push order; requesting beyond the script fails
/// with [`DeviceError::Other`].
#[derive(Debug, Default)]
pub struct ScriptedDeviceProvider {
    outcomes: Mutex<VecDeque<Result<DeviceStream, DeviceError>>>,
    requests: Mutex<Vec<StreamConstraints>>,
}

impl ScriptedDeviceProvider {
    /// Creates a provider with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful grant and returns a handle for later inspection.
    pub fn push_grant(&self, device_label: impl Into<String>) -> DeviceStream {
        let stream = DeviceStream::new(device_label);
        self.outcomes
            .lock()
            .expect("scripted outcomes lock should not be poisoned")
            .push_back(Ok(stream.clone()));
        stream
    }

    /// Queues a classified failure.
    pub fn push_failure(&self, error: DeviceError) {
        self.outcomes
            .lock()
            .expect("scripted outcomes lock should not be poisoned")
            .push_back(Err(error));
    }

    /// Returns the constraints of every request seen so far.
    pub fn recorded_requests(&self) -> Vec<StreamConstraints> {
        self.requests
            .lock()
            .expect("scripted requests lock should not be poisoned")
            .clone()
    }
}

impl DeviceStreamProvider for ScriptedDeviceProvider {
    fn request_stream(&self, constraints: &StreamConstraints) -> Result<DeviceStream, DeviceError> {
        self.requests
            .lock()
            .map_err(|_| DeviceError::Other("scripted requests lock poisoned".to_string()))?
            .push(*constraints);

        self.outcomes
            .lock()
            .map_err(|_| DeviceError::Other("scripted outcomes lock poisoned".to_string()))?
            .pop_front()
            .unwrap_or_else(|| Err(DeviceError::Other("no scripted outcome".to_string())))
    }
}

/// In-memory surface for tests; frames are injected with
/// [`PixelSurface::set_frame`].
#[derive(Debug, Default)]
pub struct PixelSurface {
    attached: Option<DeviceStream>,
    frame: Option<CameraFrame>,
}

impl PixelSurface {
    /// Creates an empty, unattached surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Injects the frame the surface currently shows.
    pub fn set_frame(&mut self, frame: CameraFrame) {
        self.frame = Some(frame);
    }

    /// Returns the stream bound to the surface, if any.
    pub fn attached_stream(&self) -> Option<&DeviceStream> {
        self.attached.as_ref()
    }
}

impl VideoSurface for PixelSurface {
    fn attach(&mut self, stream: &DeviceStream) {
        self.attached = Some(stream.clone());
    }

    fn detach(&mut self) {
        self.attached = None;
        self.frame = None;
    }

    fn frame_dimensions(&self) -> Option<(u32, u32)> {
        self.frame.as_ref().map(|frame| (frame.width, frame.height))
    }

    fn current_frame(&self) -> Option<CameraFrame> {
        self.frame.clone()
    }
}
