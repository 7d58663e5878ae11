//! Immutable snapshots of a single line's kernel state, and the
//! info-change-event envelope delivered on a watched chip fd.

use crate::errors::{Result, ValidationError};
use crate::fixed_str::FixedStr;
use crate::line::options::{Bias, Debounce, Direction, Drive, EdgeDetect};
use crate::uapi::v2::{self, LineAttrId, LineFlags, GPIO_MAX_NAME_SIZE};

/// A read-only snapshot of a line's current kernel configuration.
#[derive(Debug, Clone)]
pub struct LineInfo {
    offset: u32,
    name: FixedStr<GPIO_MAX_NAME_SIZE>,
    consumer: FixedStr<GPIO_MAX_NAME_SIZE>,
    flags: LineFlags,
    debounce_period_us: u32,
}

impl LineInfo {
    pub(crate) fn from_v2(raw: v2::gpio_line_info) -> Result<Self> {
        let name = FixedStr::from_byte_array(raw.name)?;
        let consumer = FixedStr::from_byte_array(raw.consumer)?;

        let mut debounce_period_us = 0;
        for slot in raw.attrs.iter().take(raw.num_attrs as usize) {
            let attr = unsafe { slot.assume_init() };
            if attr.id == LineAttrId::DEBOUNCE {
                debounce_period_us = unsafe { attr.attribute.debounce_period };
            }
        }

        Ok(Self {
            offset: raw.offset,
            name,
            consumer,
            flags: raw.flags,
            debounce_period_us,
        })
    }

    pub(crate) fn query_v2(offset: u32) -> v2::gpio_line_info {
        let mut info = v2::gpio_line_info::zeroed();
        info.offset = offset;
        info
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn consumer(&self) -> &str {
        self.consumer.as_str()
    }

    pub fn is_used(&self) -> bool {
        self.flags.contains(LineFlags::USED)
    }

    pub fn is_active_low(&self) -> bool {
        self.flags.contains(LineFlags::ACTIVE_LOW)
    }

    pub fn direction(&self) -> Option<Direction> {
        if self.flags.contains(LineFlags::OUTPUT) {
            Some(Direction::Output)
        } else if self.flags.contains(LineFlags::INPUT) {
            Some(Direction::Input)
        } else {
            None
        }
    }

    pub fn edge_detection(&self) -> Option<EdgeDetect> {
        match (
            self.flags.contains(LineFlags::EDGE_RISING),
            self.flags.contains(LineFlags::EDGE_FALLING),
        ) {
            (true, true) => Some(EdgeDetect::Both),
            (true, false) => Some(EdgeDetect::Rising),
            (false, true) => Some(EdgeDetect::Falling),
            (false, false) => None,
        }
    }

    pub fn drive(&self) -> Drive {
        if self.flags.contains(LineFlags::OPEN_DRAIN) {
            Drive::OpenDrain
        } else if self.flags.contains(LineFlags::OPEN_SOURCE) {
            Drive::OpenSource
        } else {
            Drive::PushPull
        }
    }

    pub fn bias(&self) -> Option<Bias> {
        if self.flags.contains(LineFlags::BIAS_PULL_UP) {
            Some(Bias::PullUp)
        } else if self.flags.contains(LineFlags::BIAS_PULL_DOWN) {
            Some(Bias::PullDown)
        } else if self.flags.contains(LineFlags::BIAS_DISABLED) {
            Some(Bias::Disabled)
        } else {
            None
        }
    }

    pub fn debounce(&self) -> Debounce {
        Debounce::from_micros(self.debounce_period_us)
    }
}

/// What changed about a watched line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoEventKind {
    Requested,
    Released,
    ConfigChanged,
}

impl InfoEventKind {
    fn from_v2(kind: v2::LineChangedType) -> Result<Self> {
        match kind.bits() {
            1 => Ok(Self::Requested),
            2 => Ok(Self::Released),
            3 => Ok(Self::ConfigChanged),
            other => Err(ValidationError::new(
                "line_info_changed.event_type",
                format!("unrecognized event type {other}"),
            )
            .into()),
        }
    }
}

/// A notification that a watched line's kernel state changed.
#[derive(Debug, Clone)]
pub struct InfoEvent {
    kind: InfoEventKind,
    timestamp_ns: u64,
    info: LineInfo,
}

impl InfoEvent {
    pub(crate) fn from_v2(raw: v2::gpio_line_info_changed) -> Result<Self> {
        Ok(Self {
            kind: InfoEventKind::from_v2(raw.event_type)?,
            timestamp_ns: raw.timestamp_ns,
            info: LineInfo::from_v2(raw.info)?,
        })
    }

    pub fn kind(&self) -> InfoEventKind {
        self.kind
    }

    pub fn timestamp_ns(&self) -> u64 {
        self.timestamp_ns
    }

    pub fn line_info(&self) -> &LineInfo {
        &self.info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_info(flags: LineFlags) -> v2::gpio_line_info {
        let mut info = v2::gpio_line_info::zeroed();
        info.offset = 4;
        info.flags = flags;
        info.name[..4].copy_from_slice(b"gp04");
        info
    }

    #[test]
    fn used_and_active_low_read_back() {
        let info = LineInfo::from_v2(raw_info(LineFlags::USED | LineFlags::ACTIVE_LOW)).unwrap();
        assert!(info.is_used());
        assert!(info.is_active_low());
        assert_eq!(info.name(), "gp04");
    }

    #[test]
    fn direction_is_none_when_neither_flag_set() {
        let info = LineInfo::from_v2(raw_info(LineFlags::USED)).unwrap();
        assert_eq!(info.direction(), None);
    }

    #[test]
    fn bias_prefers_explicit_pull_over_disabled() {
        let info =
            LineInfo::from_v2(raw_info(LineFlags::BIAS_PULL_UP | LineFlags::BIAS_DISABLED)).unwrap();
        assert_eq!(info.bias(), Some(Bias::PullUp));
    }

    #[test]
    fn info_event_kind_rejects_unknown_value() {
        let err = InfoEventKind::from_v2(v2::LineChangedType::from_bits_retain(99));
        assert!(err.is_err());
    }
}
