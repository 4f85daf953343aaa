//! Per-PID PES reassembly (SPEC_FULL.md §4.4): buffers payload slices
//! between payload-unit-start markers and hands a complete PES buffer to the
//! caller once the next start marker (or a terminal flush) arrives.

use std::collections::HashMap;

use bytes::{Bytes, BytesMut};

/// Accumulates payload slices for one PID between start markers.
#[derive(Debug, Default)]
struct PesQueue {
    slices: Vec<Vec<u8>>,
    total_length: usize,
}

impl PesQueue {
    fn push(&mut self, slice: &[u8]) {
        self.total_length += slice.len();
        self.slices.push(slice.to_vec());
    }

    fn take_contiguous(&mut self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.total_length);
        for slice in self.slices.drain(..) {
            buf.extend_from_slice(&slice);
        }
        self.total_length = 0;
        buf.freeze()
    }

    fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }
}

/// Owns the PID → PESQueue map for one demuxer session.
#[derive(Debug, Default)]
pub struct Reassembler {
    queues: HashMap<u16, PesQueue>,
}

impl Reassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one TS payload slice for `pid`. Returns the just-completed PES
    /// buffer when `payload_unit_start` closes out a prior queue.
    pub fn push_slice(&mut self, pid: u16, payload_unit_start: bool, slice: &[u8]) -> Option<Bytes> {
        if payload_unit_start {
            let completed = self.queues.get_mut(&pid).filter(|q| !q.is_empty()).map(PesQueue::take_contiguous);
            self.queues.entry(pid).or_default().push(slice);
            completed
        } else if let Some(queue) = self.queues.get_mut(&pid) {
            queue.push(slice);
            None
        } else {
            None
        }
    }

    /// Reassemble and drain every pending queue, for end-of-stream flush.
    pub fn flush(&mut self) -> Vec<(u16, Bytes)> {
        let mut flushed = Vec::new();
        for (&pid, queue) in self.queues.iter_mut() {
            if !queue.is_empty() {
                flushed.push((pid, queue.take_contiguous()));
            }
        }
        flushed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_continuation_slice_with_no_prior_start() {
        let mut r = Reassembler::new();
        assert!(r.push_slice(0x100, false, b"orphan").is_none());
    }

    #[test]
    fn accumulates_and_emits_on_next_start() {
        let mut r = Reassembler::new();
        assert!(r.push_slice(0x100, true, b"AAA").is_none());
        assert!(r.push_slice(0x100, false, b"BBB").is_none());
        let completed = r.push_slice(0x100, true, b"CCC").unwrap();
        assert_eq!(&completed[..], &b"AAABBB"[..]);
    }

    #[test]
    fn independent_pids_do_not_interfere() {
        let mut r = Reassembler::new();
        r.push_slice(0x100, true, b"video1");
        r.push_slice(0x101, true, b"audio1");
        r.push_slice(0x100, false, b"video2");
        let video = r.push_slice(0x100, true, b"video3").unwrap();
        assert_eq!(&video[..], &b"video1video2"[..]);
        let audio = r.push_slice(0x101, true, b"audio2").unwrap();
        assert_eq!(&audio[..], &b"audio1"[..]);
    }

    #[test]
    fn flush_drains_all_pending_queues() {
        let mut r = Reassembler::new();
        r.push_slice(0x100, true, b"v");
        r.push_slice(0x101, true, b"a");
        let mut flushed = r.flush();
        flushed.sort_by_key(|(pid, _)| *pid);
        assert_eq!(flushed, vec![(0x100, Bytes::from_static(b"v")), (0x101, Bytes::from_static(b"a"))]);
        assert!(r.flush().is_empty());
    }
}
