//! A single GPIO chip character device: open/validate, per-line info
//! queries and watches, and line requests.
//!
//! A GPIO chip maps to the actual device driver instance in hardware that one
//! interacts with to reach individual lines. Often these map to IP blocks on
//! an SoC, but could also be enumerated via a PCI or USB bus.

use std::fs::File;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd};
use std::os::unix::fs::FileTypeExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bstr::ByteSlice;

use crate::errors::{Error, Result};
use crate::fixed_str::FixedStr;
use crate::line::config::LineConfig;
use crate::line::info::{InfoEvent, LineInfo};
use crate::line::request_config::RequestConfig;
use crate::request::LineRequest;
use crate::uapi::{self, v2};

const INFO_EVENT_RECORD_SIZE: usize = core::mem::size_of::<v2::gpio_line_info_changed>();

/// A handle to an open GPIO chip character device.
pub struct Chip {
    fd: File,
    name: FixedStr<{ v2::GPIO_MAX_NAME_SIZE }>,
    label: FixedStr<{ v2::GPIO_MAX_NAME_SIZE }>,
    num_lines: u32,
}

impl Chip {
    /// Open the GPIO chip at `path` (e.g. `/dev/gpiochip0`).
    ///
    /// Fails unless `path` is a character device with a matching entry under
    /// `/sys/bus/gpio/devices` (symlinks followed).
    pub fn open(path: &Path) -> Result<Self> {
        let meta = std::fs::metadata(path)?;
        if !meta.file_type().is_char_device() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not a character device", path.display()),
            )));
        }

        let fd = std::fs::OpenOptions::new().read(true).write(true).open(path)?;

        let mut raw_info = uapi::gpio_chip_info::zeroed();
        unsafe {
            uapi::gpio_get_chipinfo(fd.as_raw_fd(), &mut raw_info)?;
        }

        let name = FixedStr::from_byte_array(raw_info.name)?;
        let label = FixedStr::from_byte_array(raw_info.label)?;

        let sysfs_entry = PathBuf::from("/sys/bus/gpio/devices").join(name.as_str());
        std::fs::metadata(&sysfs_entry)?;

        Ok(Self {
            fd,
            name,
            label,
            num_lines: raw_info.lines,
        })
    }

    /// The name of the kernel driver backing this chip.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// A functional name for the chip, e.g. a product number. May be empty.
    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    /// The number of lines indexable through this chip.
    pub fn num_lines(&self) -> u32 {
        self.num_lines
    }

    pub fn get_line_info(&self, offset: u32) -> Result<LineInfo> {
        let mut raw = LineInfo::query_v2(offset);
        unsafe {
            v2::gpio_get_line_info(self.fd.as_raw_fd(), &mut raw)?;
        }
        LineInfo::from_v2(raw)
    }

    /// Like [`Chip::get_line_info`], but also begins delivering info events
    /// for this line on the chip fd.
    pub fn watch_line_info(&self, offset: u32) -> Result<LineInfo> {
        let mut raw = LineInfo::query_v2(offset);
        unsafe {
            v2::gpio_get_line_info_watch(self.fd.as_raw_fd(), &mut raw)?;
        }
        LineInfo::from_v2(raw)
    }

    pub fn unwatch_line_info(&self, offset: u32) -> Result<()> {
        let mut offset = offset;
        unsafe {
            uapi::gpio_get_lineinfo_unwatch(self.fd.as_raw_fd(), &mut offset)?;
        }
        Ok(())
    }

    /// Poll the chip fd for an available info event.
    pub fn info_event_wait(&self, timeout: Option<Duration>) -> Result<bool> {
        crate::wait::wait_readable(self.fd.as_fd(), timeout)
    }

    /// Block for exactly one info event and return the decoded snapshot.
    pub fn info_event_read(&mut self) -> Result<InfoEvent> {
        let mut buf = [0u8; INFO_EVENT_RECORD_SIZE];
        let n = crate::wait::read_records(
            &mut self.fd,
            &mut buf,
            INFO_EVENT_RECORD_SIZE,
            "gpio_line_info_changed",
        )?;

        if n == 0 {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "no info event available",
            )));
        }

        let raw = unsafe { v2::gpio_line_info_changed::from_bytes(buf) };
        InfoEvent::from_v2(raw)
    }

    /// Scan offsets `0..num_lines` for a line whose kernel-reported name
    /// matches `name`.
    pub fn find_line(&self, name: &str) -> Result<u32> {
        for offset in 0..self.num_lines {
            let info = self.get_line_info(offset)?;
            if info.name() == name {
                return Ok(offset);
            }
        }
        Err(Error::NotFound(name.to_string()))
    }

    /// Request ownership of one or more lines, compiling `config` against
    /// `request`'s offset list.
    pub fn request_lines(&self, request: &RequestConfig, config: &LineConfig) -> Result<LineRequest> {
        LineRequest::new(self.fd.as_fd(), request, config)
    }
}

impl std::os::fd::AsFd for Chip {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }
}

impl std::os::fd::AsRawFd for Chip {
    fn as_raw_fd(&self) -> std::os::fd::RawFd {
        self.fd.as_raw_fd()
    }
}

/// Enumerate every GPIO chip currently present under `/dev`.
pub fn chips() -> Result<ChipIterator> {
    Ok(ChipIterator {
        readdir: std::fs::read_dir("/dev")?,
    })
}

/// Iterator over chips discovered under `/dev`. Errors opening or validating
/// one entry do not stop enumeration of the rest.
pub struct ChipIterator {
    readdir: std::fs::ReadDir,
}

impl Iterator for ChipIterator {
    type Item = Result<Chip>;

    fn next(&mut self) -> Option<Result<Chip>> {
        for entry in &mut self.readdir {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => return Some(Err(e.into())),
            };

            let path = entry.path();
            let Some(name) = path.file_name() else {
                continue;
            };

            if name.as_encoded_bytes().contains_str("gpiochip") {
                return Some(Chip::open(&path));
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_line_name_is_not_found() {
        // Exercised indirectly via Chip::find_line's pure loop body would
        // require a live fd; the NotFound mapping itself is covered by
        // asserting on the error variant shape.
        let err = Error::NotFound("does-not-exist".to_string());
        assert!(matches!(err, Error::NotFound(ref n) if n == "does-not-exist"));
    }
}
