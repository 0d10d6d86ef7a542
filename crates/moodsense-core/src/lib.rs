#![warn(missing_docs)]
//! # moodsense-core
//!
//! ## Purpose
//! Defines the pure data model shared across the `moodsense` workspace.
//!
//! ## Responsibilities
//! - Represent selected input files regardless of where they came from
//!   (drag-drop, file picker, or a camera frame capture).
//! - Represent the pair of inputs one analysis submission requires.
//! - Validate submission completeness before any transport work happens.
//!
//! ## Data flow
//! Capture and file-selection code produce [`SelectedFile`] values that are
//! slotted into [`AnalysisInputs`]. The orchestrator calls
//! [`AnalysisInputs::require_complete`] before building a request.
//!
//! ## Ownership and lifetimes
//! Files own their backing byte buffers (`Vec<u8>`) so selection state can
//! outlive whatever surface or reader produced them.
//!
//! ## Error model
//! Construction and completeness failures return [`CoreError`] variants with
//! caller-actionable categorization.
//!
//! ## Security and privacy notes
//! This crate never logs file contents; names and sizes are the only values
//! expected to appear in diagnostics.
//!
//! ## Example
//! ```rust
//! use moodsense_core::{AnalysisInputs, SelectedFile};
//!
//! let mut inputs = AnalysisInputs::default();
//! inputs.set_face(SelectedFile::new("face.jpg", "image/jpeg", vec![0xff, 0xd8]).unwrap());
//! assert!(!inputs.is_complete());
//! inputs.set_eeg(SelectedFile::new("session.csv", "text/csv", vec![b'1']).unwrap());
//! assert!(inputs.is_complete());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One user-supplied input file with its payload bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedFile {
    /// Display name, for example `camera-1700000000000.jpg`.
    pub name: String,
    /// Payload length in bytes.
    pub byte_size: u64,
    /// MIME type reported by the producer (`image/jpeg`, `text/csv`, ...).
    pub mime_type: String,
    /// Owned payload bytes.
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    /// Constructs a validated selected file.
    ///
    /// `byte_size` is derived from the payload so the two can never drift.
    ///
    /// # Errors
    /// Returns [`CoreError::EmptyFileName`] when `name` is blank.
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, CoreError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CoreError::EmptyFileName);
        }

        Ok(Self {
            name,
            byte_size: bytes.len() as u64,
            mime_type: mime_type.into(),
            bytes,
        })
    }
}

/// Identifies which input slot a file fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSlot {
    /// Face image slot.
    Face,
    /// Primary EEG recording slot.
    Eeg,
}

impl fmt::Display for InputSlot {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSlot::Face => formatter.write_str("face image"),
            InputSlot::Eeg => formatter.write_str("EEG file"),
        }
    }
}

/// The pair of inputs one analysis submission requires.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisInputs {
    /// Selected face image, if any.
    pub face: Option<SelectedFile>,
    /// Selected EEG recording, if any.
    pub eeg: Option<SelectedFile>,
}

impl AnalysisInputs {
    /// Fills the face slot, replacing any prior selection.
    pub fn set_face(&mut self, file: SelectedFile) {
        self.face = Some(file);
    }

    /// Fills the EEG slot, replacing any prior selection.
    pub fn set_eeg(&mut self, file: SelectedFile) {
        self.eeg = Some(file);
    }

    /// Clears both slots.
    pub fn clear(&mut self) {
        self.face = None;
        self.eeg = None;
    }

    /// Returns `true` when both slots are filled and submission may proceed.
    pub fn is_complete(&self) -> bool {
        self.face.is_some() && self.eeg.is_some()
    }

    /// Returns both files or reports the first missing slot.
    ///
    /// # Errors
    /// Returns [`CoreError::MissingInput`] naming the empty slot.
    pub fn require_complete(&self) -> Result<(&SelectedFile, &SelectedFile), CoreError> {
        let face = self
            .face
            .as_ref()
            .ok_or(CoreError::MissingInput(InputSlot::Face))?;
        let eeg = self
            .eeg
            .as_ref()
            .ok_or(CoreError::MissingInput(InputSlot::Eeg))?;
        Ok((face, eeg))
    }
}

/// Core model error type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// File names must be non-blank.
    #[error("file name must be non-empty")]
    EmptyFileName,
    /// A required input slot is empty.
    #[error("missing required input: {0}")]
    MissingInput(InputSlot),
}
