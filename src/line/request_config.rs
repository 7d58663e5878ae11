//! The fixed parameters of a line request: which offsets, whose name, and how
//! large an edge-event buffer to ask the kernel for. Distinct from
//! [`super::config::LineConfig`], which carries the per-line electrical
//! configuration and can be recompiled after the request is made.

use crate::errors::Result;
use crate::fixed_str::FixedStr;
use crate::line::offsets::OffsetSet;
use crate::uapi::v2::GPIO_MAX_NAME_SIZE;

#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub(crate) consumer: FixedStr<GPIO_MAX_NAME_SIZE>,
    pub(crate) offsets: OffsetSet,
    pub(crate) event_buffer_size: u32,
}

impl RequestConfig {
    pub fn new(offsets: &[u32]) -> Self {
        Self {
            consumer: FixedStr::empty(),
            offsets: OffsetSet::truncated(offsets),
            event_buffer_size: 0,
        }
    }

    /// Truncates silently past 32 bytes; use [`RequestConfig::try_consumer`]
    /// to be told about truncation instead.
    pub fn consumer(mut self, name: &str) -> Self {
        let mut s = FixedStr::empty();
        let _ = s.write(&name[..name.len().min(GPIO_MAX_NAME_SIZE)]);
        self.consumer = s;
        self
    }

    pub fn try_consumer(mut self, name: &str) -> Result<Self> {
        self.consumer = FixedStr::new(name)?;
        Ok(self)
    }

    pub fn event_buffer_size(mut self, size: u32) -> Self {
        self.event_buffer_size = size;
        self
    }

    pub fn offsets(&self) -> &OffsetSet {
        &self.offsets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_keep_caller_order_and_duplicates() {
        let cfg = RequestConfig::new(&[3, 1, 1, 2]);
        assert_eq!(cfg.offsets().as_slice(), &[3, 1, 1, 2]);
    }

    #[test]
    fn offsets_are_truncated_past_64() {
        let many: Vec<u32> = (0..100).collect();
        let cfg = RequestConfig::new(&many);
        assert_eq!(cfg.offsets().len(), 64);
        assert_eq!(cfg.offsets().as_slice()[0], 0);
    }

    #[test]
    fn consumer_round_trips() {
        let cfg = RequestConfig::new(&[0]).try_consumer("my-app").unwrap();
        assert_eq!(cfg.consumer.as_str(), "my-app");
    }
}
