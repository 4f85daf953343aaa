//! Stateless sync-byte probing: decide whether a buffer looks like MPEG-TS
//! and at what packet size (188 canonical, or 192 for BDAV/M2TS framing).

use memchr::memchr_iter;

/// Canonical TS sync byte.
pub const SYNC_BYTE: u8 = 0x47;

/// Canonical transport packet size.
pub const TS_PACKET_SIZE: usize = 188;

/// M2TS packet size: a 4-byte TP_extra_header followed by a 188-byte packet.
pub const M2TS_PACKET_SIZE: usize = 192;

const SCAN_WINDOW: usize = 1000;

/// Outcome of [`probe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeResult {
    /// The buffer was recognized as MPEG-TS.
    Match {
        /// 188 or 192.
        packet_size: usize,
        /// Byte offset of the first sync byte.
        sync_offset: usize,
        /// Always 0: probing never consumes bytes, it only inspects them.
        consumed: usize,
    },
    /// No packet size produced three equidistant sync bytes.
    NoMatch,
}

impl ProbeResult {
    pub fn is_match(&self) -> bool {
        matches!(self, ProbeResult::Match { .. })
    }

    pub fn packet_size(&self) -> Option<usize> {
        match self {
            ProbeResult::Match { packet_size, .. } => Some(*packet_size),
            ProbeResult::NoMatch => None,
        }
    }

    pub fn sync_offset(&self) -> Option<usize> {
        match self {
            ProbeResult::Match { sync_offset, .. } => Some(*sync_offset),
            ProbeResult::NoMatch => None,
        }
    }
}

/// Find the smallest offset in `data` at which three consecutive packets of
/// `packet_size` all begin with [`SYNC_BYTE`], scanning at most
/// `min(SCAN_WINDOW, data.len() - 3 * packet_size)` candidate offsets.
fn find_sync(data: &[u8], packet_size: usize) -> Option<usize> {
    let span = 3 * packet_size;
    if data.len() < span {
        return None;
    }
    let window = SCAN_WINDOW.min(data.len() - span);
    memchr_iter(SYNC_BYTE, &data[..=window])
        .find(|&i| data[i + packet_size] == SYNC_BYTE && data[i + 2 * packet_size] == SYNC_BYTE)
}

/// Probe `data` for MPEG-TS framing.
///
/// Requires at least `3 * 188` bytes to even attempt a match: three
/// equidistant sync bytes is the cheapest check that reliably rules out
/// random data, since a single 0x47 occurs by chance roughly once every 256
/// bytes.
pub fn probe(data: &[u8]) -> ProbeResult {
    if data.len() <= 3 * TS_PACKET_SIZE {
        return ProbeResult::NoMatch;
    }

    if let Some(sync_offset) = find_sync(data, TS_PACKET_SIZE) {
        return ProbeResult::Match {
            packet_size: TS_PACKET_SIZE,
            sync_offset,
            consumed: 0,
        };
    }

    if let Some(sync_offset) = find_sync(data, M2TS_PACKET_SIZE) {
        return ProbeResult::Match {
            packet_size: M2TS_PACKET_SIZE,
            sync_offset,
            consumed: 0,
        };
    }

    ProbeResult::NoMatch
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts_buffer_with_sync_at(offsets: &[usize], len: usize) -> Vec<u8> {
        let mut buf = vec![0u8; len];
        for &o in offsets {
            buf[o] = SYNC_BYTE;
        }
        buf
    }

    #[test]
    fn probe_188_at_zero() {
        let buf = ts_buffer_with_sync_at(&[0, 188, 376, 564], 4 * 188);
        let result = probe(&buf);
        assert_eq!(
            result,
            ProbeResult::Match {
                packet_size: 188,
                sync_offset: 0,
                consumed: 0,
            }
        );
    }

    #[test]
    fn probe_192_fallback() {
        let buf = ts_buffer_with_sync_at(&[4, 196, 388, 580], 4 * 192);
        let result = probe(&buf);
        assert_eq!(
            result,
            ProbeResult::Match {
                packet_size: 192,
                sync_offset: 4,
                consumed: 0,
            }
        );
    }

    #[test]
    fn probe_failure_on_random_bytes() {
        // Deterministic pseudo-random fill with no engineered sync pattern.
        let mut buf = vec![0u8; 4 * 188];
        for (i, b) in buf.iter_mut().enumerate() {
            *b = ((i * 37 + 11) % 251) as u8;
        }
        assert_eq!(probe(&buf), ProbeResult::NoMatch);
    }

    #[test]
    fn probe_rejects_too_short_buffer() {
        let buf = vec![0x47u8; 3 * 188];
        assert_eq!(probe(&buf), ProbeResult::NoMatch);
    }

    #[test]
    fn probe_prefers_188_over_192_when_both_match() {
        // Offsets that happen to satisfy both spacings at once still resolve
        // to 188 since it is tried first.
        let mut buf = vec![0u8; 4 * 192];
        for i in 0..4 {
            buf[i * 188] = SYNC_BYTE;
        }
        let result = probe(&buf);
        assert_eq!(result.packet_size(), Some(188));
    }

    #[test]
    fn probe_finds_smallest_offset() {
        let mut buf = ts_buffer_with_sync_at(&[0, 188, 376, 564], 6 * 188);
        // A later, unrelated run of sync bytes should not win over offset 0.
        buf[200] = SYNC_BYTE;
        buf[388] = SYNC_BYTE;
        buf[576] = SYNC_BYTE;
        let result = probe(&buf);
        assert_eq!(result.sync_offset(), Some(0));
    }
}
