//! Facade configuration (SPEC_FULL.md §6).

/// Construction-time options for [`crate::Demuxer`]. None of these affect
/// TS-layer decode semantics beyond `validate_crc`; `live_backtrack_bytes` is
/// a collaborator hint the TS layer stores and returns verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemuxerConfig {
    /// Enable the optional MPEG-2 CRC-32 check on PAT/PMT sections.
    pub validate_crc: bool,
    /// Opaque hint for elementary-stream collaborators; not consulted here.
    pub live_backtrack_bytes: usize,
}

impl Default for DemuxerConfig {
    fn default() -> Self {
        DemuxerConfig { validate_crc: false, live_backtrack_bytes: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let config = DemuxerConfig::default();
        assert!(!config.validate_crc);
        assert_eq!(config.live_backtrack_bytes, 0);
    }
}
