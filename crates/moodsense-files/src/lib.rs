#![warn(missing_docs)]
//! # moodsense-files
//!
//! ## Purpose
//! Maintains the selected-file list for one input slot, fed by drag-drop,
//! the file picker, or a camera capture event.
//!
//! ## Responsibilities
//! - Apply the slot's selection policy (single replace, or bounded multi).
//! - Remove individual entries while preserving order.
//! - Format byte sizes for display.
//!
//! ## Data flow
//! Producers hand [`SelectedFile`] lists to [`FileCaptureZone::accept_files`];
//! every mutation returns the new selection snapshot for the owner to emit.
//!
//! ## Ownership and lifetimes
//! The zone owns its selection; snapshots are borrowed slices valid until the
//! next mutation.
//!
//! ## Error model
//! Invalid policies and out-of-range removals return [`FileZoneError`].
//! Type filtering is advisory only: accepted-extension hints are carried for
//! display and nothing is rejected by type at this layer.
//!
//! ## Security and privacy notes
//! File bytes pass through untouched and are never inspected or logged here.

use moodsense_core::SelectedFile;
use thiserror::Error;

/// How many files the zone retains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// Keep exactly one file; new selections replace the old one.
    Single,
    /// Keep up to `max_files`, newest selections appended then truncated.
    Multi {
        /// Upper bound on retained files; must be positive.
        max_files: usize,
    },
}

/// Static zone description shown alongside the drop target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneConfig {
    /// Slot label, for example `Face Image` or `EEG Brain Signals`.
    pub slot_label: String,
    /// Advisory accepted-extension hints, for example `[".csv"]`.
    pub accept: Vec<String>,
    /// Selection retention policy.
    pub policy: SelectionPolicy,
    /// Advisory per-file size hint in bytes; not enforced.
    pub max_byte_hint: u64,
}

impl ZoneConfig {
    /// Creates a single-select zone with the given label and accept hints.
    pub fn single(slot_label: impl Into<String>, accept: &[&str]) -> Self {
        Self {
            slot_label: slot_label.into(),
            accept: accept.iter().map(|hint| (*hint).to_string()).collect(),
            policy: SelectionPolicy::Single,
            max_byte_hint: 50 * 1024 * 1024,
        }
    }
}

/// Selected-file list for one input slot.
#[derive(Debug, Clone)]
pub struct FileCaptureZone {
    config: ZoneConfig,
    files: Vec<SelectedFile>,
}

impl FileCaptureZone {
    /// Creates a zone with a validated policy.
    ///
    /// # Errors
    /// Returns [`FileZoneError::InvalidPolicy`] when a multi-select bound is
    /// zero.
    pub fn new(config: ZoneConfig) -> Result<Self, FileZoneError> {
        if let SelectionPolicy::Multi { max_files } = config.policy
            && max_files == 0
        {
            return Err(FileZoneError::InvalidPolicy);
        }

        Ok(Self {
            config,
            files: Vec::new(),
        })
    }

    /// Returns the zone's static configuration.
    pub fn config(&self) -> &ZoneConfig {
        &self.config
    }

    /// Applies an incoming selection and returns the new snapshot.
    ///
    /// Single-select zones keep only the first incoming file, replacing any
    /// prior selection. Multi-select zones append then truncate to the policy
    /// bound. An empty incoming list leaves the selection untouched.
    pub fn accept_files(&mut self, incoming: Vec<SelectedFile>) -> &[SelectedFile] {
        if incoming.is_empty() {
            return &self.files;
        }

        match self.config.policy {
            SelectionPolicy::Single => {
                self.files = incoming.into_iter().take(1).collect();
            }
            SelectionPolicy::Multi { max_files } => {
                self.files.extend(incoming);
                self.files.truncate(max_files);
            }
        }

        &self.files
    }

    /// Removes one entry, order preserved, and returns the new snapshot.
    ///
    /// # Errors
    /// Returns [`FileZoneError::IndexOutOfRange`] for an invalid index.
    pub fn remove_file(&mut self, index: usize) -> Result<&[SelectedFile], FileZoneError> {
        if index >= self.files.len() {
            return Err(FileZoneError::IndexOutOfRange {
                index,
                len: self.files.len(),
            });
        }

        self.files.remove(index);
        Ok(&self.files)
    }

    /// Returns the current selection snapshot.
    pub fn selection(&self) -> &[SelectedFile] {
        &self.files
    }

    /// Returns the first selected file, if any.
    pub fn primary(&self) -> Option<&SelectedFile> {
        self.files.first()
    }

    /// Human-readable accept hint, for example `Accepts .jpg, .png`.
    pub fn accept_hint(&self) -> String {
        if self.config.accept.is_empty() {
            "Accepts any file".to_string()
        } else {
            format!("Accepts {}", self.config.accept.join(", "))
        }
    }
}

/// Formats a byte count as B/KB/MB/GB with one decimal.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    format!("{size:.1} {}", UNITS[unit])
}

/// File zone error type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FileZoneError {
    /// Multi-select zones need a positive retention bound.
    #[error("multi-select zones require max_files > 0")]
    InvalidPolicy,
    /// Removal index does not point at a selected file.
    #[error("file index {index} is out of range for {len} selected files")]
    IndexOutOfRange {
        /// Index requested by the caller.
        index: usize,
        /// Number of selected files at the time of the call.
        len: usize,
    },
}

#[cfg(test)]
mod tests {
    //! Unit tests for selection policy and size formatting.

    use super::*;

    fn file(name: &str) -> SelectedFile {
        SelectedFile::new(name, "text/csv", vec![0; 4]).expect("fixture file should be valid")
    }

    #[test]
    fn single_select_replaces_prior_selection() {
        let mut zone = FileCaptureZone::new(ZoneConfig::single("EEG Brain Signals", &[".csv"]))
            .expect("zone should build");

        zone.accept_files(vec![file("a.csv")]);
        let snapshot = zone.accept_files(vec![file("b.csv"), file("c.csv")]);

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].name, "b.csv");
    }

    #[test]
    fn multi_select_appends_then_truncates() {
        let mut zone = FileCaptureZone::new(ZoneConfig {
            slot_label: "EEG Sessions".to_string(),
            accept: vec![".csv".to_string()],
            policy: SelectionPolicy::Multi { max_files: 2 },
            max_byte_hint: 1024,
        })
        .expect("zone should build");

        zone.accept_files(vec![file("a.csv")]);
        let snapshot = zone.accept_files(vec![file("b.csv"), file("c.csv")]);

        assert_eq!(
            snapshot.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
            vec!["a.csv", "b.csv"]
        );
    }

    #[test]
    fn remove_preserves_order_of_remaining_entries() {
        let mut zone = FileCaptureZone::new(ZoneConfig {
            slot_label: "EEG Sessions".to_string(),
            accept: vec![],
            policy: SelectionPolicy::Multi { max_files: 3 },
            max_byte_hint: 1024,
        })
        .expect("zone should build");

        zone.accept_files(vec![file("a.csv"), file("b.csv"), file("c.csv")]);
        let snapshot = zone.remove_file(1).expect("index should be valid");

        assert_eq!(
            snapshot.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
            vec!["a.csv", "c.csv"]
        );
    }

    #[test]
    fn remove_out_of_range_is_reported() {
        let mut zone = FileCaptureZone::new(ZoneConfig::single("Face Image", &[".jpg"]))
            .expect("zone should build");
        assert!(matches!(
            zone.remove_file(0),
            Err(FileZoneError::IndexOutOfRange { index: 0, len: 0 })
        ));
    }

    #[test]
    fn formats_sizes_with_one_decimal() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(500), "500.0 B");
        assert_eq!(format_size(1_536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.0 GB");
    }
}
