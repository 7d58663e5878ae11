//! The closed set of per-line electrical/logical options (`base_config` in
//! the kernel docs) and their translation to [`LineFlags`](crate::uapi::v2::LineFlags).
//!
//! Every option here defaults to "as-is" / unset, distinct from an explicit
//! setting: leaving [`Bias`] at `None` emits no bias bit at all, whereas
//! `Some(Bias::Disabled)` emits `BIAS_DISABLED`. The kernel has no "as-is"
//! encoding of its own; "as-is" just means the setter was never called.

use crate::uapi::v2::LineFlags;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeDetect {
    Rising,
    Falling,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drive {
    PushPull,
    OpenDrain,
    OpenSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
    Disabled,
    PullUp,
    PullDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventClock {
    Monotonic,
    RealTime,
}

/// Debounce period, in microseconds. `0` (the default) disables debouncing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Debounce(u32);

impl Debounce {
    pub const fn from_micros(micros: u32) -> Self {
        Self(micros)
    }

    pub const fn as_micros(self) -> u32 {
        self.0
    }

    pub const fn is_enabled(self) -> bool {
        self.0 != 0
    }
}

/// The full set of per-line options, any of which may be left unset
/// ("as-is"). Accumulated in [`super::config::LineConfig`] and translated to
/// kernel flags at compile time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct BaseConfig {
    pub(crate) direction: Option<Direction>,
    pub(crate) edge: Option<EdgeDetect>,
    pub(crate) drive: Option<Drive>,
    pub(crate) bias: Option<Bias>,
    pub(crate) active_low: bool,
    pub(crate) clock: Option<EventClock>,
    pub(crate) debounce: Debounce,
}

impl BaseConfig {
    /// Translate to the kernel's flag word. Edge detection implies input and
    /// clears any output bit, matching the kernel's own semantics.
    pub(crate) fn to_kernel_flags(self) -> LineFlags {
        let mut flags = LineFlags::empty();

        match self.direction {
            Some(Direction::Input) => flags |= LineFlags::INPUT,
            Some(Direction::Output) => flags |= LineFlags::OUTPUT,
            None => {}
        }

        match self.edge {
            Some(EdgeDetect::Rising) => {
                flags |= LineFlags::EDGE_RISING | LineFlags::INPUT;
                flags &= !LineFlags::OUTPUT;
            }
            Some(EdgeDetect::Falling) => {
                flags |= LineFlags::EDGE_FALLING | LineFlags::INPUT;
                flags &= !LineFlags::OUTPUT;
            }
            Some(EdgeDetect::Both) => {
                flags |= LineFlags::EDGE_RISING | LineFlags::EDGE_FALLING | LineFlags::INPUT;
                flags &= !LineFlags::OUTPUT;
            }
            None => {}
        }

        match self.drive {
            Some(Drive::OpenDrain) => flags |= LineFlags::OPEN_DRAIN,
            Some(Drive::OpenSource) => flags |= LineFlags::OPEN_SOURCE,
            Some(Drive::PushPull) | None => {}
        }

        match self.bias {
            Some(Bias::Disabled) => flags |= LineFlags::BIAS_DISABLED,
            Some(Bias::PullUp) => flags |= LineFlags::BIAS_PULL_UP,
            Some(Bias::PullDown) => flags |= LineFlags::BIAS_PULL_DOWN,
            None => {}
        }

        if self.active_low {
            flags |= LineFlags::ACTIVE_LOW;
        }

        match self.clock {
            Some(EventClock::RealTime) => flags |= LineFlags::EVENT_CLOCK_REALTIME,
            Some(EventClock::Monotonic) | None => {}
        }

        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_bias_emits_no_bias_bit() {
        let cfg = BaseConfig::default();
        let flags = cfg.to_kernel_flags();
        assert!(!flags.intersects(
            LineFlags::BIAS_DISABLED | LineFlags::BIAS_PULL_UP | LineFlags::BIAS_PULL_DOWN
        ));
    }

    #[test]
    fn unset_event_clock_defaults_to_monotonic() {
        let cfg = BaseConfig::default();
        let flags = cfg.to_kernel_flags();
        assert!(!flags.contains(LineFlags::EVENT_CLOCK_REALTIME));
    }

    #[test]
    fn edge_detection_implies_input_and_clears_output() {
        let cfg = BaseConfig {
            direction: Some(Direction::Output),
            edge: Some(EdgeDetect::Both),
            ..Default::default()
        };
        let flags = cfg.to_kernel_flags();
        assert!(flags.contains(LineFlags::INPUT));
        assert!(!flags.contains(LineFlags::OUTPUT));
        assert!(flags.contains(LineFlags::EDGE_RISING));
        assert!(flags.contains(LineFlags::EDGE_FALLING));
    }
}
