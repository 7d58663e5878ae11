//! An open line request: the fd returned by `GPIO_V2_GET_LINE_IOCTL`, together
//! with everything needed to read/write values, reconfigure live, and drain
//! edge events from it.

use std::fs::File;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, FromRawFd};
use std::time::Duration;

use crate::errors::{InvalidArgumentError, Result};
use crate::fixed_str::FixedStr;
use crate::line::config::LineConfig;
use crate::line::edge::EdgeEventBuffer;
use crate::line::mask::LineMask;
use crate::line::offsets::OffsetSet;
use crate::line::request_config::RequestConfig;
use crate::uapi::v2::{self, GPIO_MAX_NAME_SIZE};
use crate::wait::wait_readable;

/// An open handle on one or more requested lines.
///
/// Dropping a `LineRequest` closes the underlying fd and releases the lines
/// back to the kernel, same as closing any other file descriptor.
pub struct LineRequest {
    fd: File,
    offsets: OffsetSet,
    consumer: FixedStr<GPIO_MAX_NAME_SIZE>,
    events: EdgeEventBuffer,
}

impl LineRequest {
    pub(crate) fn new(
        chip_fd: BorrowedFd<'_>,
        request: &RequestConfig,
        config: &LineConfig,
    ) -> Result<Self> {
        let kernel_config = config.compile(&request.offsets)?;
        let (num_lines, offsets) = request.offsets.to_fixed_array();

        let mut raw = v2::gpio_line_request::zeroed();
        raw.offsets = offsets;
        raw.num_lines = num_lines;
        raw.consumer = request.consumer.into_byte_array();
        raw.config = kernel_config;
        raw.event_buffer_size = request.event_buffer_size;

        unsafe {
            v2::gpio_get_line(chip_fd.as_raw_fd(), &mut raw)?;
        }

        let fd = unsafe { File::from_raw_fd(raw.fd) };

        Ok(Self {
            fd,
            offsets: request.offsets.clone(),
            consumer: request.consumer,
            events: EdgeEventBuffer::with_capacity(request.event_buffer_size as usize),
        })
    }

    pub fn consumer(&self) -> &str {
        self.consumer.as_str()
    }

    pub fn offsets(&self) -> &[u32] {
        self.offsets.as_slice()
    }

    fn raw_get(&self, mask: u64) -> Result<u64> {
        let mut data = v2::gpio_line_values { bits: 0, mask };
        unsafe {
            v2::gpio_line_get_values(self.fd.as_raw_fd(), &mut data)?;
        }
        Ok(data.bits)
    }

    fn raw_set(&self, bits: u64, mask: u64) -> Result<()> {
        let mut data = v2::gpio_line_values { bits, mask };
        unsafe {
            v2::gpio_line_set_values(self.fd.as_raw_fd(), &mut data)?;
        }
        Ok(())
    }

    /// Read the current value of a single requested line.
    pub fn get_value(&self, offset: u32) -> Result<bool> {
        let idx = self
            .offsets
            .find_idx(offset)
            .ok_or(InvalidArgumentError::OffsetNotInRequest(offset))?;
        let mask = LineMask::zero().set(idx);
        let bits = self.raw_get(mask.bits())?;
        Ok(LineMask::from_bits(bits).test(idx))
    }

    /// Read the current values of the given subset of requested lines, in a
    /// single ioctl round trip. Values are returned in the order of `offsets`.
    pub fn get_values(&self, offsets: &[u32]) -> Result<Vec<(u32, bool)>> {
        let mut mask = LineMask::zero();
        let mut indices = Vec::with_capacity(offsets.len());
        for &offset in offsets {
            let idx = self
                .offsets
                .find_idx(offset)
                .ok_or(InvalidArgumentError::OffsetNotInRequest(offset))?;
            mask = mask.set(idx);
            indices.push(idx);
        }

        let bits = LineMask::from_bits(self.raw_get(mask.bits())?);
        Ok(offsets
            .iter()
            .zip(indices)
            .map(|(&offset, idx)| (offset, bits.test(idx)))
            .collect())
    }

    /// Set the value of a single requested output line.
    pub fn set_value(&self, offset: u32, value: bool) -> Result<()> {
        self.set_values(&[(offset, value)])
    }

    /// Set the values of one or more requested output lines. Lines not named
    /// in `values` are left untouched.
    pub fn set_values(&self, values: &[(u32, bool)]) -> Result<()> {
        let mut bits = LineMask::zero();
        let mut mask = LineMask::zero();
        for &(offset, value) in values {
            let idx = self
                .offsets
                .find_idx(offset)
                .ok_or(InvalidArgumentError::OffsetNotInRequest(offset))?;
            bits = bits.assign(idx, value);
            mask = mask.set(idx);
        }
        self.raw_set(bits.bits(), mask.bits())
    }

    /// Recompile `config` against this request's offsets and push it to the
    /// kernel as a live reconfiguration.
    pub fn reconfigure(&mut self, config: &LineConfig) -> Result<()> {
        let mut kernel_config = config.compile(&self.offsets)?;
        unsafe {
            v2::gpio_line_set_config(self.fd.as_raw_fd(), &mut kernel_config)?;
        }
        Ok(())
    }

    /// Block until an edge event is available, or `timeout` elapses.
    /// `None` blocks indefinitely.
    pub fn edge_event_wait(&self, timeout: Option<Duration>) -> Result<bool> {
        wait_readable(self.fd.as_fd(), timeout)
    }

    /// Drain whatever edge events are currently available into this
    /// request's reusable event buffer.
    pub fn edge_event_read(&mut self) -> Result<&EdgeEventBuffer> {
        self.events.fill_from(&mut self.fd)?;
        Ok(&self.events)
    }

    /// Explicitly release the lines. Equivalent to dropping the request.
    pub fn release(self) {}
}
