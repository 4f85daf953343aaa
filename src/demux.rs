//! The demuxer facade (SPEC_FULL.md §4.6): composes the sync probe, packet
//! iterator, section parsers, reassembler and PES header parser, and owns
//! all session state.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::callbacks::{Callbacks, MediaInfo, Sample, Track, TrackKind, TrackMetadata};
use crate::config::DemuxerConfig;
use crate::crc32;
use crate::error::{DemuxError, ParseErrorKind};
use crate::packet::{TsPacketIter, PID_NULL, PID_PAT};
use crate::pat::{PatTable, PatUpdate};
use crate::pes::{dispatch_for, PesDispatch, PesHeader};
use crate::pmt::{Pmt, PmtTable, PmtUpdate};
use crate::probe::{self, ProbeResult};
use crate::reassembler::Reassembler;
use crate::stream_type::StreamType;

/// A push-style byte source a host can bind the facade to, so that chunks
/// arriving on the source are routed straight into `parse_chunk`.
pub trait DataSource {
    fn bind_sink(&mut self, sink: Box<dyn FnMut(&[u8], usize)>);
}

/// Owns the entire demuxer session: table state, the active program/PMT
/// selection, per-PID PES queues, and the host callback set.
pub struct Demuxer {
    config: DemuxerConfig,
    packet_size: usize,
    next_offset: usize,
    pat: PatTable,
    pmt: PmtTable,
    /// Set exactly once, from the first accepted PAT section's first
    /// non-zero program_number, and never re-derived on later version bumps.
    current_program: Option<u16>,
    current_pmt_pid: Option<u16>,
    reassembler: Reassembler,
    callbacks: Callbacks,
    destroyed: bool,
    media_info_announced: bool,
    video_sequence: u64,
    audio_sequence: u64,
}

impl Demuxer {
    /// Stateless sync probe; see [`crate::probe::probe`].
    pub fn probe(data: &[u8]) -> ProbeResult {
        probe::probe(data)
    }

    pub fn new(packet_size: usize, sync_offset: usize, config: DemuxerConfig) -> Self {
        Demuxer {
            config,
            packet_size,
            next_offset: sync_offset,
            pat: PatTable::new(),
            pmt: PmtTable::new(),
            current_program: None,
            current_pmt_pid: None,
            reassembler: Reassembler::new(),
            callbacks: Callbacks::new(),
            destroyed: false,
            media_info_announced: false,
            video_sequence: 0,
            audio_sequence: 0,
        }
    }

    /// Construct directly from a successful probe result.
    pub fn from_probe(probe: ProbeResult, config: DemuxerConfig) -> Option<Self> {
        match probe {
            ProbeResult::Match { packet_size, sync_offset, .. } => Some(Self::new(packet_size, sync_offset, config)),
            ProbeResult::NoMatch => None,
        }
    }

    pub fn callbacks_mut(&mut self) -> &mut Callbacks {
        &mut self.callbacks
    }

    /// Register `self.parse_chunk` as `source`'s data-arrival sink.
    pub fn bind_data_source<S: DataSource>(demuxer: Rc<RefCell<Demuxer>>, source: &mut S) {
        source.bind_sink(Box::new(move |bytes, byte_start| {
            if let Err(err) = demuxer.borrow_mut().parse_chunk(bytes, byte_start) {
                warn!(%err, "parse_chunk failed for data pushed via bind_data_source");
            }
        }));
    }

    /// Drive one pass over `bytes`, returning the exclusive end-offset
    /// actually consumed. `byte_start` is the caller's absolute stream
    /// position for this chunk, used only for diagnostics.
    pub fn parse_chunk(&mut self, bytes: &[u8], byte_start: usize) -> Result<usize, DemuxError> {
        if self.destroyed {
            return Err(DemuxError::Destroyed);
        }
        self.callbacks.check_mandatory_bound()?;

        debug!(byte_start, len = bytes.len(), "parsing chunk");

        let start = self.next_offset;
        let mut iter = TsPacketIter::new(bytes, start, self.packet_size);
        loop {
            match iter.next() {
                Some(Ok(view)) => {
                    let header = view.header;
                    let payload = view.payload;
                    self.handle_packet(header.pid, header.payload_unit_start_indicator, view.psi_payload(), payload);
                }
                Some(Err(err)) => {
                    let fatal = matches!(err, ParseErrorKind::FormatDesync(_));
                    self.report_error(&err);
                    if fatal {
                        break;
                    }
                }
                None => break,
            }
        }

        let consumed = iter.consumed();
        self.next_offset = 0;
        Ok(consumed)
    }

    fn handle_packet(&mut self, pid: u16, pusi: bool, psi_payload: Option<&[u8]>, raw_payload: Option<&[u8]>) {
        if pid == PID_NULL {
            return;
        }
        if pid == PID_PAT {
            if let Some(section) = psi_payload {
                self.handle_pat_section(section);
            }
        } else if self.current_pmt_pid == Some(pid) {
            if let Some(section) = psi_payload {
                self.handle_pmt_section(section);
            }
        } else if self.is_tracked_pid(pid) {
            if let Some(payload) = raw_payload {
                if let Some(completed) = self.reassembler.push_slice(pid, pusi, payload) {
                    self.dispatch_pes(pid, &completed);
                }
            }
        }
    }

    fn check_crc(&mut self, section: &[u8]) {
        if !self.config.validate_crc {
            return;
        }
        if let Err((expected, calculated)) = crc32::validate_section_crc32(section) {
            self.report_error(&ParseErrorKind::Crc32Mismatch { expected, calculated });
        }
    }

    fn handle_pat_section(&mut self, section: &[u8]) {
        self.check_crc(section);

        // `ingest` ties its returned reference to the exclusive borrow of
        // `self.pat`; clone the accepted table out immediately so the match
        // below is free to call other `self.pat` methods.
        enum Outcome {
            Replaced(crate::pat::Pat),
            Merged(crate::pat::Pat),
        }
        let outcome = match self.pat.ingest(section) {
            Ok(PatUpdate::Replaced { pat, .. }) => Some(Outcome::Replaced(pat.clone())),
            Ok(PatUpdate::Merged(pat)) => Some(Outcome::Merged(pat.clone())),
            Ok(PatUpdate::Unchanged) => None,
            Err(err) => {
                self.report_error(&err);
                None
            }
        };

        match outcome {
            Some(Outcome::Replaced(pat)) => {
                debug!(version = pat.version_number, "PAT accepted");
                if self.current_program.is_none() {
                    self.current_program = self.pat.current_program_candidate();
                }
                self.current_pmt_pid = self.current_program.and_then(|pn| pat.program_pmt_pid.get(&pn).copied());
            }
            Some(Outcome::Merged(pat)) => {
                if self.current_pmt_pid.is_none() {
                    self.current_pmt_pid = self.current_program.and_then(|pn| pat.program_pmt_pid.get(&pn).copied());
                }
            }
            None => {}
        }
    }

    fn handle_pmt_section(&mut self, section: &[u8]) {
        self.check_crc(section);
        let updated: Option<Pmt> = match self.pmt.ingest(section) {
            Ok(PmtUpdate::Replaced(pmt)) | Ok(PmtUpdate::Merged(pmt)) => Some(pmt.clone()),
            Ok(PmtUpdate::Unchanged) => None,
            Err(err) => {
                self.report_error(&err);
                None
            }
        };
        if let Some(pmt) = updated {
            if Some(pmt.program_number) == self.current_program && !self.media_info_announced {
                self.announce_media_info(&pmt);
            }
        }
    }

    fn is_tracked_pid(&self, pid: u16) -> bool {
        self.current_program
            .and_then(|pn| self.pmt.get(pn))
            .map(|pmt| pmt.is_tracked_pid(pid))
            .unwrap_or(false)
    }

    fn stream_type_for(&self, pid: u16) -> StreamType {
        self.current_program
            .and_then(|pn| self.pmt.get(pn))
            .and_then(|pmt| pmt.pid_stream_type.get(&pid).copied())
            .unwrap_or(StreamType::Unknown(0))
    }

    fn announce_media_info(&mut self, pmt: &Pmt) {
        let media_info = MediaInfo {
            video_pid: pmt.common_pids.h264,
            video_codec: pmt.common_pids.h264.map(|_| StreamType::H264),
            audio_pid: pmt.common_pids.adts_aac,
            audio_codec: pmt.common_pids.adts_aac.map(|_| StreamType::AdtsAac),
        };
        if let Some(cb) = self.callbacks.on_media_info.as_mut() {
            cb(&media_info);
        }
        self.media_info_announced = true;

        if let Some(pid) = pmt.common_pids.h264 {
            let metadata = TrackMetadata { pid, stream_type: StreamType::H264 };
            if let Some(cb) = self.callbacks.on_track_metadata.as_mut() {
                cb(TrackKind::Video, &metadata);
            }
        }
        if let Some(pid) = pmt.common_pids.adts_aac {
            let metadata = TrackMetadata { pid, stream_type: StreamType::AdtsAac };
            if let Some(cb) = self.callbacks.on_track_metadata.as_mut() {
                cb(TrackKind::Audio, &metadata);
            }
        }
    }

    fn dispatch_pes(&mut self, pid: u16, data: &[u8]) {
        let stream_type = self.stream_type_for(pid);
        match PesHeader::parse(data) {
            Ok(header) => {
                let payload = header.payload(data).unwrap_or(&[]);
                match dispatch_for(stream_type) {
                    PesDispatch::Video => {
                        self.emit_sample(TrackKind::Video, pid, header.pts.unwrap_or(0), header.dts.unwrap_or(0), payload)
                    }
                    PesDispatch::Audio => {
                        self.emit_sample(TrackKind::Audio, pid, header.pts.unwrap_or(0), header.dts.unwrap_or(0), payload)
                    }
                    PesDispatch::Id3 => {
                        if let Some(cb) = self.callbacks.on_timed_id3_metadata.as_mut() {
                            cb(pid, payload);
                        }
                    }
                    PesDispatch::PesPrivateData => {
                        if let Some(cb) = self.callbacks.on_pes_private_data.as_mut() {
                            cb(pid, payload);
                        }
                    }
                    PesDispatch::NoOp => {}
                }
            }
            Err(err) => self.report_error(&err),
        }
    }

    fn emit_sample(&mut self, kind: TrackKind, pid: u16, pts: u64, dts: u64, payload: &[u8]) {
        let sequence_number = match kind {
            TrackKind::Video => {
                self.video_sequence += 1;
                self.video_sequence
            }
            TrackKind::Audio => {
                self.audio_sequence += 1;
                self.audio_sequence
            }
        };
        let track = Track { id: pid, sequence_number, samples: vec![Sample { pts, dts, data: payload.to_vec() }] };
        let (video_track, audio_track) = match kind {
            TrackKind::Video => (track, Track::default()),
            TrackKind::Audio => (Track::default(), track),
        };
        if let Some(cb) = self.callbacks.on_data_available.as_mut() {
            cb(&video_track, &audio_track);
        }
    }

    fn report_error(&mut self, err: &ParseErrorKind) {
        warn!(kind = err.tag(), "{err}");
        self.callbacks.emit_error(err.tag(), &err.to_string());
    }

    /// Terminal flush of every pending per-PID PES queue (SPEC_FULL.md §4.4).
    pub fn flush(&mut self) {
        for (pid, data) in self.reassembler.flush() {
            self.dispatch_pes(pid, &data);
        }
    }

    /// Discard accumulated media metadata so the next active-PMT update
    /// re-announces `on_media_info`/`on_track_metadata`.
    pub fn reset_media_info(&mut self) {
        self.media_info_announced = false;
    }

    /// Release state; further `parse_chunk` calls fail with `Destroyed`.
    pub fn destroy(&mut self) {
        self.destroyed = true;
    }
}
