//! Streaming MPEG-2 Transport Stream demultiplexer.
//!
//! Recovers the PAT → PMT table hierarchy, reassembles PES payloads
//! per-PID, and dispatches decoded elementary-stream samples and table
//! metadata to a host-supplied set of callbacks. See [`Demuxer`] for the
//! main entry point and [`probe`] for synchronizing onto a raw byte stream.

pub mod callbacks;
pub mod config;
pub mod crc32;
pub mod demux;
pub mod error;
pub mod pat;
pub mod packet;
pub mod pes;
pub mod pmt;
pub mod probe;
pub mod reassembler;
pub mod stream_type;

pub use callbacks::{Callbacks, MediaInfo, Sample, Track, TrackKind, TrackMetadata};
pub use config::DemuxerConfig;
pub use demux::{DataSource, Demuxer};
pub use error::{DemuxError, ParseErrorKind, Result};
pub use probe::{probe, ProbeResult};
pub use stream_type::StreamType;
