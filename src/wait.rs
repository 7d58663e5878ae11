//! Blocking-read and poll helpers shared by the chip fd (info events) and the
//! request fd (edge events).

use std::io::Read;
use std::os::fd::BorrowedFd;
use std::time::Duration;

use crate::errors::{Result, UnderReadError};

/// Poll a fd for read-readiness. Returns `Ok(true)` if data is ready before
/// `timeout` elapses, `Ok(false)` on timeout. `None` blocks indefinitely.
///
/// Nanosecond-granularity timeouts are rounded up to the nearest millisecond
/// (poll's own resolution); a timeout that would overflow poll's millisecond
/// argument saturates to an infinite wait.
pub(crate) fn wait_readable(fd: BorrowedFd<'_>, timeout: Option<Duration>) -> Result<bool> {
    let pollfd = nix::poll::PollFd::new(fd, nix::poll::PollFlags::POLLIN);

    let timeout = timeout
        .as_ref()
        .map(|t| {
            let nanos_remainder = t.subsec_nanos() % 1_000_000;
            t.as_millis() + u128::from(nanos_remainder != 0)
        })
        .map(std::convert::TryInto::try_into)
        .transpose()
        .unwrap_or(Some(nix::poll::PollTimeout::MAX))
        .unwrap_or(nix::poll::PollTimeout::MAX);

    Ok(nix::poll::poll(&mut [pollfd], timeout)? != 0)
}

/// Read whatever fixed-size records are currently available from `src` into
/// `buf`, with a single underlying `read()` call. These are blocking fds: a
/// `read()` returns as soon as the currently queued data is copied out, it
/// does not block further to top `buf` up to capacity, so neither do we. Any
/// read that terminates mid-record is a hard error: a short read is never
/// exposed as a partial event, per the kernel's own all-or-nothing record
/// framing.
pub(crate) fn read_records<R: Read>(
    src: &mut R,
    buf: &mut [u8],
    record_size: usize,
    obj: &'static str,
) -> Result<usize> {
    let total = loop {
        match src.read(buf) {
            Ok(n) => break n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    };

    if total % record_size != 0 {
        return Err(UnderReadError {
            obj,
            record_size,
            found: total,
        }
        .into());
    }

    Ok(total / record_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A reader that returns everything it has in a single `read()` call,
    /// the way a blocking chardev fd does: it never tops up a caller's
    /// buffer across repeated calls.
    struct OneShot<'a>(&'a [u8]);

    impl<'a> Read for OneShot<'a> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let n = buf.len().min(self.0.len());
            buf[..n].copy_from_slice(&self.0[..n]);
            self.0 = &self.0[n..];
            Ok(n)
        }
    }

    #[test]
    fn a_short_read_of_whole_records_succeeds_without_blocking_for_more() {
        // Buffer has room for 4 records but only 2 are queued; a real
        // blocking fd would return those 2 immediately rather than block
        // for the other 2 to show up.
        let data = [1u8; 16];
        let mut src = OneShot(&data);
        let mut buf = [0u8; 32];
        let n = read_records(&mut src, &mut buf, 8, "test_record").unwrap();
        assert_eq!(n, 2);
    }

    #[test]
    fn partial_record_is_an_error() {
        let data = [1u8; 12];
        let mut src = OneShot(&data);
        let mut buf = [0u8; 16];
        let err = read_records(&mut src, &mut buf, 8, "test_record").unwrap_err();
        assert!(matches!(err, crate::errors::Error::Io(_)));
    }
}
