//! Edge events read back from a request fd: a rising or falling transition on
//! one of the request's lines, with kernel-assigned sequence numbers.

use std::io::Read;

use crate::errors::{Result, ValidationError};
use crate::uapi::v2;
use crate::wait::read_records;

const RECORD_SIZE: usize = core::mem::size_of::<v2::gpio_line_event>();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    Rising,
    Falling,
}

impl EdgeKind {
    fn from_v2(id: v2::LineEventId) -> Result<Self> {
        match id.bits() {
            1 => Ok(Self::Rising),
            2 => Ok(Self::Falling),
            other => {
                Err(ValidationError::new("gpio_line_event.id", format!("unrecognized edge id {other}")).into())
            }
        }
    }
}

/// A single rising/falling transition on a requested line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeEvent {
    kind: EdgeKind,
    timestamp_ns: u64,
    offset: u32,
    sequence: u32,
    line_sequence: u32,
}

impl EdgeEvent {
    fn from_v2(raw: v2::gpio_line_event) -> Result<Self> {
        Ok(Self {
            kind: EdgeKind::from_v2(raw.id)?,
            timestamp_ns: raw.timestamp_ns,
            offset: raw.offset,
            sequence: raw.seqno,
            line_sequence: raw.line_seqno,
        })
    }

    pub fn kind(&self) -> EdgeKind {
        self.kind
    }

    pub fn timestamp_ns(&self) -> u64 {
        self.timestamp_ns
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Sequence number across every line in the request.
    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Sequence number local to this one line.
    pub fn line_sequence(&self) -> u32 {
        self.line_sequence
    }
}

/// A reusable buffer for draining edge events off a request fd in batches.
///
/// `capacity` is clamped to `[1, 1024]`; `0` is treated as a request for the
/// default of 64, matching the kernel's own default event buffer sizing.
pub struct EdgeEventBuffer {
    raw: Vec<u8>,
    events: Vec<EdgeEvent>,
}

impl EdgeEventBuffer {
    pub(crate) const DEFAULT_CAPACITY: usize = 64;
    pub(crate) const MAX_CAPACITY: usize = 1024;

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let capacity = match capacity {
            0 => Self::DEFAULT_CAPACITY,
            c => c.min(Self::MAX_CAPACITY),
        };

        Self {
            raw: vec![0u8; capacity * RECORD_SIZE],
            events: Vec::with_capacity(capacity),
        }
    }

    /// Read whatever whole records are currently available from `src`,
    /// replacing the previously parsed batch.
    pub(crate) fn fill_from<R: Read>(&mut self, src: &mut R) -> Result<usize> {
        let n = read_records(src, &mut self.raw, RECORD_SIZE, "gpio_line_event")?;

        self.events.clear();
        for chunk in self.raw[..n * RECORD_SIZE].chunks_exact(RECORD_SIZE) {
            let mut bytes = [0u8; RECORD_SIZE];
            bytes.copy_from_slice(chunk);
            let raw = unsafe { v2::gpio_line_event::from_bytes(bytes) };
            self.events.push(EdgeEvent::from_v2(raw)?);
        }

        Ok(self.events.len())
    }

    pub fn num_events(&self) -> usize {
        self.events.len()
    }

    pub fn get_event(&self, index: usize) -> Option<&EdgeEvent> {
        self.events.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EdgeEvent> {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_event(id: v2::LineEventId, offset: u32, seqno: u32) -> v2::gpio_line_event {
        let mut e = v2::gpio_line_event::zeroed();
        e.id = id;
        e.offset = offset;
        e.seqno = seqno;
        e.timestamp_ns = 42;
        e
    }

    #[test]
    fn capacity_zero_defaults_and_clamps() {
        let buf = EdgeEventBuffer::with_capacity(0);
        assert_eq!(buf.raw.len(), EdgeEventBuffer::DEFAULT_CAPACITY * RECORD_SIZE);

        let buf = EdgeEventBuffer::with_capacity(10_000);
        assert_eq!(buf.raw.len(), EdgeEventBuffer::MAX_CAPACITY * RECORD_SIZE);
    }

    #[test]
    fn fill_from_parses_multiple_records() {
        let a = raw_event(v2::LineEventId::RISING_EDGE, 2, 1);
        let b = raw_event(v2::LineEventId::FALLING_EDGE, 2, 2);

        let mut bytes = Vec::new();
        for e in [a, b] {
            let ptr = &e as *const v2::gpio_line_event as *const u8;
            bytes.extend_from_slice(unsafe { std::slice::from_raw_parts(ptr, RECORD_SIZE) });
        }

        let mut buf = EdgeEventBuffer::with_capacity(4);
        let n = buf.fill_from(&mut bytes.as_slice()).unwrap();
        assert_eq!(n, 2);
        assert_eq!(buf.get_event(0).unwrap().kind(), EdgeKind::Rising);
        assert_eq!(buf.get_event(1).unwrap().kind(), EdgeKind::Falling);
    }

    #[test]
    fn unrecognized_edge_id_is_rejected() {
        let raw = raw_event(v2::LineEventId::from_bits_retain(99), 0, 0);
        assert!(EdgeEvent::from_v2(raw).is_err());
    }
}
