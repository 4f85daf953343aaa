//! The `stream_type` byte carried in PMT elementary-stream records.

/// Stream types defined in ISO/IEC 13818-1 and common private registrations.
///
/// Only the seven variants named in SPEC_FULL.md §3 are load-bearing for the
/// demuxer's own dispatch logic (`is_h264`, `is_adts_aac`, `is_pes_private_data`);
/// the rest are retained so a caller inspecting `Pmt::pid_stream_type` gets a
/// meaningful symbol instead of a bare byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamType {
    Mpeg1Video,
    Mpeg2Video,
    Mpeg1Audio,
    Mpeg2Audio,
    Mpeg2PrivateSections,
    PesPrivateData,
    Mheg,
    DsmCc,
    AdtsAac,
    Mpeg4Visual,
    LatmAac,
    H264,
    Mpeg4Audio,
    H265,
    Id3,
    Ac3,
    EAc3,
    Dts,
    DtsHd,
    TrueHd,
    /// Any stream_type value not given a named variant above.
    Unknown(u8),
}

impl From<u8> for StreamType {
    fn from(value: u8) -> Self {
        match value {
            0x01 => StreamType::Mpeg1Video,
            0x02 => StreamType::Mpeg2Video,
            0x03 => StreamType::Mpeg1Audio,
            0x04 => StreamType::Mpeg2Audio,
            0x05 => StreamType::Mpeg2PrivateSections,
            0x06 => StreamType::PesPrivateData,
            0x07 => StreamType::Mheg,
            0x08 => StreamType::DsmCc,
            0x0F => StreamType::AdtsAac,
            0x10 => StreamType::Mpeg4Visual,
            0x11 => StreamType::LatmAac,
            0x15 => StreamType::Id3,
            0x1B => StreamType::H264,
            0x1C => StreamType::Mpeg4Audio,
            0x24 => StreamType::H265,
            0x81 => StreamType::Ac3,
            0x82 => StreamType::Dts,
            0x83 => StreamType::TrueHd,
            0x84 => StreamType::EAc3,
            0x85 => StreamType::DtsHd,
            other => StreamType::Unknown(other),
        }
    }
}

impl From<StreamType> for u8 {
    fn from(value: StreamType) -> Self {
        match value {
            StreamType::Mpeg1Video => 0x01,
            StreamType::Mpeg2Video => 0x02,
            StreamType::Mpeg1Audio => 0x03,
            StreamType::Mpeg2Audio => 0x04,
            StreamType::Mpeg2PrivateSections => 0x05,
            StreamType::PesPrivateData => 0x06,
            StreamType::Mheg => 0x07,
            StreamType::DsmCc => 0x08,
            StreamType::AdtsAac => 0x0F,
            StreamType::Mpeg4Visual => 0x10,
            StreamType::LatmAac => 0x11,
            StreamType::Id3 => 0x15,
            StreamType::H264 => 0x1B,
            StreamType::Mpeg4Audio => 0x1C,
            StreamType::H265 => 0x24,
            StreamType::Ac3 => 0x81,
            StreamType::Dts => 0x82,
            StreamType::TrueHd => 0x83,
            StreamType::EAc3 => 0x84,
            StreamType::DtsHd => 0x85,
            StreamType::Unknown(v) => v,
        }
    }
}

impl StreamType {
    pub fn is_h264(&self) -> bool {
        matches!(self, StreamType::H264)
    }

    pub fn is_adts_aac(&self) -> bool {
        matches!(self, StreamType::AdtsAac)
    }

    pub fn is_pes_private_data(&self) -> bool {
        matches!(self, StreamType::PesPrivateData)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_named_values() {
        for (byte, ty) in [
            (0x03u8, StreamType::Mpeg1Audio),
            (0x04, StreamType::Mpeg2Audio),
            (0x06, StreamType::PesPrivateData),
            (0x0F, StreamType::AdtsAac),
            (0x15, StreamType::Id3),
            (0x1B, StreamType::H264),
            (0x24, StreamType::H265),
        ] {
            assert_eq!(StreamType::from(byte), ty);
            assert_eq!(u8::from(ty), byte);
        }
    }

    #[test]
    fn unknown_value_round_trips() {
        assert_eq!(StreamType::from(0xFE), StreamType::Unknown(0xFE));
        assert_eq!(u8::from(StreamType::Unknown(0xFE)), 0xFE);
    }

    #[test]
    fn classification_helpers() {
        assert!(StreamType::H264.is_h264());
        assert!(!StreamType::H264.is_adts_aac());
        assert!(StreamType::AdtsAac.is_adts_aac());
        assert!(StreamType::PesPrivateData.is_pes_private_data());
    }
}
