use thiserror::Error;

/// Fatal, interface-contract errors returned directly to the caller of
/// [`crate::Demuxer::parse_chunk`] or [`crate::Demuxer::new`].
///
/// Everything that can be recovered from locally (a bad section, a malformed
/// PES, a desynced packet) is *not* represented here — it is reported through
/// the host's `on_error` callback and the stream keeps going. See
/// [`ParseErrorKind`] for those.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DemuxError {
    #[error("mandatory callback '{0}' is not bound")]
    MissingCallback(&'static str),

    #[error("parse_chunk called after destroy()")]
    Destroyed,
}

/// Result type for interface-contract-level operations.
pub type Result<T> = std::result::Result<T, DemuxError>;

/// Classification for errors reported through `on_error`. These never abort
/// parsing: the offending packet/section/PES is dropped and the demuxer
/// resumes on the next one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("sync byte mismatch: expected 0x47, got 0x{0:02x}")]
    FormatDesync(u8),

    #[error("unexpected table_id: expected {expected:#04x}, got {actual:#04x}")]
    TableMismatch { expected: u8, actual: u8 },

    #[error("malformed PES packet: {0}")]
    MalformedPes(String),

    #[error("section too short: expected at least {expected} bytes, got {actual}")]
    SectionTooShort { expected: usize, actual: usize },

    #[error("CRC-32 mismatch: expected {expected:#010x}, calculated {calculated:#010x}")]
    Crc32Mismatch { expected: u32, calculated: u32 },
}

impl ParseErrorKind {
    /// Stable machine-readable tag for the `on_error(kind, detail)` callback.
    pub fn tag(&self) -> &'static str {
        match self {
            ParseErrorKind::FormatDesync(_) => "format_desync",
            ParseErrorKind::TableMismatch { .. } => "table_mismatch",
            ParseErrorKind::MalformedPes(_) => "malformed_pes",
            ParseErrorKind::SectionTooShort { .. } => "section_too_short",
            ParseErrorKind::Crc32Mismatch { .. } => "crc_mismatch",
        }
    }
}
