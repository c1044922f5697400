//! Two-level pull iteration over a V1 stone archive.
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::Cursor;
//! use libstone::stone1::Record;
//!
//! let mut reader = libstone::open(File::open("bash.stone")?, Cursor::new(Vec::new()))?;
//! while reader.advance_payload() {
//!     while reader.advance_record() {
//!         if let Some(Record::Meta(meta)) = reader.record() {
//!             println!("{}: {}", meta.tag, meta.field);
//!         }
//!     }
//! }
//! if let Some(err) = reader.take_error() {
//!     return Err(err.into());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # States
//! `Start → PayloadReady → RecordReady → … → Done`, with `Failed` reachable
//! from every transition.  `Failed` is sticky: both `advance_*` calls return
//! `false` from then on, and [`Reader::last_error`] tells a failure apart
//! from a clean end.
//!
//! # Scratch sink
//! The decompressed body of the current payload lives in a caller-supplied
//! `Read + Write + Seek` sink that is rewound and overwritten for every
//! payload.  Only one payload body is resident at a time, and advancing
//! invalidates the previous record's backing bytes.
//!
//! # Unread payloads
//! A payload body is only decoded and verified once a record is requested
//! from it.  Payloads whose records are never requested are skipped in bulk
//! without decompression or checksum verification, unless
//! [`ReadOptions::verify_skipped`] is set.

use std::io::{Read, Seek, Write};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::prelude::Prelude;

use super::header::PayloadHeader;
use super::payload::{self, ChecksumScope, PayloadBody};
use super::prelude::V1Prelude;
use super::record::{ContentReader, Record};

// ── Options ──────────────────────────────────────────────────────────────────

/// Configuration for [`Reader`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Run unread payloads through the full decode + checksum pipeline
    /// instead of skipping their bytes.
    pub verify_skipped: bool,
    pub checksum_scope: ChecksumScope,
}

impl ReadOptions {
    pub fn verify_skipped(mut self, verify: bool) -> Self {
        self.verify_skipped = verify;
        self
    }

    pub fn checksum_scope(mut self, scope: ChecksumScope) -> Self {
        self.checksum_scope = scope;
        self
    }
}

// ── State ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Start,
    PayloadReady,
    RecordReady,
    Done,
    Failed,
}

/// Running counters, mostly for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderStats {
    pub payloads_read:      u32,
    /// Bodies handed to the decode + checksum pipeline, failed ones included.
    pub payloads_extracted: u32,
    /// Bodies discarded unverified.
    pub payloads_skipped:   u32,
    pub records_read:       u64,
}

// ── Reader ───────────────────────────────────────────────────────────────────

pub struct Reader<R, S> {
    prelude: V1Prelude,
    src:     R,
    sink:    S,
    options: ReadOptions,

    state:  State,
    header: Option<PayloadHeader>,
    record: Option<Record>,
    error:  Option<Error>,

    payload_index:  u16,
    record_index:   u32,
    body_staged:    bool,
    /// Unread plain bytes of the staged body.
    body_remaining: u64,

    stats: ReaderStats,
}

impl<R: Read, S: Read + Write + Seek> Reader<R, S> {
    /// Continue reading an archive whose prelude has already been consumed
    /// from `src`.
    pub fn new(prelude: V1Prelude, src: R, sink: S) -> Self {
        Self::with_options(prelude, src, sink, ReadOptions::default())
    }

    pub fn with_options(prelude: V1Prelude, src: R, sink: S, options: ReadOptions) -> Self {
        Self {
            prelude,
            src,
            sink,
            options,
            state:          State::Start,
            header:         None,
            record:         None,
            error:          None,
            payload_index:  0,
            record_index:   0,
            body_staged:    false,
            body_remaining: 0,
            stats:          ReaderStats::default(),
        }
    }

    /// Read and validate the prelude from `src`, then return a reader
    /// positioned at the first payload header.
    pub fn open(src: R, sink: S, options: ReadOptions) -> Result<Self> {
        let mut src = src;
        let prelude = V1Prelude::decode(&Prelude::read(&mut src)?)?;
        debug!(
            payloads = prelude.num_payloads,
            stone_type = %prelude.stone_type,
            "opened stone archive"
        );
        Ok(Self::with_options(prelude, src, sink, options))
    }

    // ── Iteration ────────────────────────────────────────────────────────────

    /// Move to the next payload header.
    ///
    /// Returns `false` at the end of the archive or on failure; check
    /// [`Reader::last_error`] to tell which.
    pub fn advance_payload(&mut self) -> bool {
        if matches!(self.state, State::Done | State::Failed) {
            return false;
        }
        if let Err(e) = self.settle_current() {
            return self.fail(e);
        }
        self.record = None;

        if self.payload_index >= self.prelude.num_payloads {
            self.header = None;
            self.state = State::Done;
            return false;
        }

        match PayloadHeader::read(&mut self.src) {
            Ok(header) => {
                debug!(
                    index = self.payload_index,
                    kind = header.kind,
                    records = header.num_records,
                    stored = header.stored_size,
                    "payload header"
                );
                self.header = Some(header);
                self.payload_index += 1;
                self.record_index = 0;
                self.body_staged = false;
                self.body_remaining = 0;
                self.stats.payloads_read += 1;
                self.state = State::PayloadReady;
                true
            }
            Err(e) => self.fail(e),
        }
    }

    /// Move to the next record of the current payload.
    ///
    /// The first call for a payload decodes and verifies its body.  Returns
    /// `false` once the payload's records are exhausted, before the first
    /// [`Reader::advance_payload`], or on failure.
    pub fn advance_record(&mut self) -> bool {
        if !matches!(self.state, State::PayloadReady | State::RecordReady) {
            return false;
        }
        let header = match self.header {
            Some(header) => header,
            None => return false,
        };
        if self.record_index >= header.num_records {
            return false;
        }

        let kind = match header.record_kind() {
            Ok(kind) => kind,
            Err(e) => return self.fail(e),
        };
        if !self.body_staged {
            if let Err(e) = self.stage_body(&header) {
                return self.fail(e);
            }
        }

        let remaining = self.body_remaining;
        let mut body = PayloadBody::new(&mut self.sink, &mut self.body_remaining);
        match Record::decode(kind, &mut body, remaining) {
            Ok(record) => {
                self.record = Some(record);
                self.record_index += 1;
                self.stats.records_read += 1;
                self.state = State::RecordReady;
                true
            }
            Err(e) => self.fail(e),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn prelude(&self) -> &V1Prelude {
        &self.prelude
    }

    /// Header of the current payload.
    pub fn header(&self) -> Option<&PayloadHeader> {
        self.header.as_ref()
    }

    /// The most recently decoded record; replaced by every successful
    /// [`Reader::advance_record`].
    pub fn record(&self) -> Option<&Record> {
        self.record.as_ref()
    }

    /// Bounded view over the bytes of the current content record.
    ///
    /// Reading through the view consumes the staged payload; consume it
    /// fully before advancing if the bytes matter.
    pub fn content(&mut self) -> Option<ContentReader<'_>> {
        let len = match self.record {
            Some(Record::Content(ref content)) => content.len.min(self.body_remaining),
            _ => return None,
        };
        let body = PayloadBody::new(&mut self.sink, &mut self.body_remaining);
        Some(ContentReader::new(Box::new(body), len))
    }

    pub fn last_error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Take the terminal error out; the reader stays `Failed`.
    pub fn take_error(&mut self) -> Option<Error> {
        self.error.take()
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn stats(&self) -> ReaderStats {
        self.stats
    }

    pub fn options(&self) -> ReadOptions {
        self.options
    }

    /// Release the source and scratch sink.
    pub fn into_inner(self) -> (R, S) {
        (self.src, self.sink)
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    fn stage_body(&mut self, header: &PayloadHeader) -> Result<()> {
        self.stats.payloads_extracted += 1;
        payload::extract(&mut self.src, header, self.options.checksum_scope, &mut self.sink)?;
        self.body_staged = true;
        self.body_remaining = header.plain_size;
        Ok(())
    }

    /// Get the source past the current payload body if no record ever
    /// pulled it in.
    fn settle_current(&mut self) -> Result<()> {
        let header = match self.header {
            Some(header) if !self.body_staged => header,
            _ => return Ok(()),
        };
        if self.options.verify_skipped {
            self.stage_body(&header)
        } else {
            payload::skip(&mut self.src, &header)?;
            self.stats.payloads_skipped += 1;
            Ok(())
        }
    }

    fn fail(&mut self, e: Error) -> bool {
        warn!(error = %e, payload = self.payload_index, record = self.record_index, "stone read failed");
        self.error = Some(e);
        self.record = None;
        self.state = State::Failed;
        false
    }
}
