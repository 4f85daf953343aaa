//! Host-facing callback slots and their payload types (SPEC_FULL.md §4.6, §6).
//!
//! Modeled as a capability record of `Option<Box<dyn FnMut(..)>>` fields per
//! the design note in SPEC_FULL.md §9, rather than a trait object hierarchy.

use crate::error::DemuxError;
use crate::stream_type::StreamType;

/// Which elementary-stream kind a track or metadata event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Video,
    Audio,
}

/// One decoded access unit, ready for an elementary-stream collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub pts: u64,
    pub dts: u64,
    pub data: Vec<u8>,
}

/// A sequence of samples for one track, as delivered to `on_data_available`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Track {
    pub id: u16,
    pub sequence_number: u64,
    pub samples: Vec<Sample>,
}

impl Track {
    pub fn length(&self) -> usize {
        self.samples.iter().map(|s| s.data.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Container/codec summary surfaced once the active program's PMT is known.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MediaInfo {
    pub video_pid: Option<u16>,
    pub video_codec: Option<StreamType>,
    pub audio_pid: Option<u16>,
    pub audio_codec: Option<StreamType>,
}

/// Opaque per-track metadata, passed through without interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackMetadata {
    pub pid: u16,
    pub stream_type: StreamType,
}

/// The facade's full set of host callback slots. Four are mandatory; see
/// [`Callbacks::check_mandatory_bound`].
#[derive(Default)]
pub struct Callbacks {
    pub on_error: Option<Box<dyn FnMut(&str, &str)>>,
    pub on_media_info: Option<Box<dyn FnMut(&MediaInfo)>>,
    pub on_track_metadata: Option<Box<dyn FnMut(TrackKind, &TrackMetadata)>>,
    pub on_data_available: Option<Box<dyn FnMut(&Track, &Track)>>,
    pub on_timed_id3_metadata: Option<Box<dyn FnMut(u16, &[u8])>>,
    pub on_scte35_metadata: Option<Box<dyn FnMut(u16, &[u8])>>,
    pub on_pes_private_data: Option<Box<dyn FnMut(u16, &[u8])>>,
    pub on_pes_private_data_descriptor: Option<Box<dyn FnMut(u16, &[u8])>>,
}

impl std::fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_error", &self.on_error.is_some())
            .field("on_media_info", &self.on_media_info.is_some())
            .field("on_track_metadata", &self.on_track_metadata.is_some())
            .field("on_data_available", &self.on_data_available.is_some())
            .field("on_timed_id3_metadata", &self.on_timed_id3_metadata.is_some())
            .field("on_scte35_metadata", &self.on_scte35_metadata.is_some())
            .field("on_pes_private_data", &self.on_pes_private_data.is_some())
            .field("on_pes_private_data_descriptor", &self.on_pes_private_data_descriptor.is_some())
            .finish()
    }
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Verify the four mandatory slots are bound, per SPEC_FULL.md §4.6.
    pub fn check_mandatory_bound(&self) -> Result<(), DemuxError> {
        if self.on_error.is_none() {
            return Err(DemuxError::MissingCallback("on_error"));
        }
        if self.on_media_info.is_none() {
            return Err(DemuxError::MissingCallback("on_media_info"));
        }
        if self.on_track_metadata.is_none() {
            return Err(DemuxError::MissingCallback("on_track_metadata"));
        }
        if self.on_data_available.is_none() {
            return Err(DemuxError::MissingCallback("on_data_available"));
        }
        Ok(())
    }

    pub fn emit_error(&mut self, kind: &str, detail: &str) {
        if let Some(cb) = self.on_error.as_mut() {
            cb(kind, detail);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_any_mandatory_callback_is_rejected() {
        let callbacks = Callbacks::new();
        assert_eq!(callbacks.check_mandatory_bound(), Err(DemuxError::MissingCallback("on_error")));
    }

    #[test]
    fn all_four_mandatory_callbacks_bound_passes() {
        let mut callbacks = Callbacks::new();
        callbacks.on_error = Some(Box::new(|_, _| {}));
        callbacks.on_media_info = Some(Box::new(|_| {}));
        callbacks.on_track_metadata = Some(Box::new(|_, _| {}));
        callbacks.on_data_available = Some(Box::new(|_, _| {}));
        assert!(callbacks.check_mandatory_bound().is_ok());
    }

    #[test]
    fn track_length_sums_sample_bytes() {
        let track = Track {
            id: 1,
            sequence_number: 0,
            samples: vec![
                Sample { pts: 0, dts: 0, data: vec![1, 2, 3] },
                Sample { pts: 1, dts: 1, data: vec![4, 5] },
            ],
        };
        assert_eq!(track.length(), 5);
    }
}
