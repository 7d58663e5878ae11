//! Accumulating line configuration (`line_config` in the kernel docs): one
//! primary [`BaseConfig`], a table of offset-scoped secondary overrides, and
//! a set of explicit output values, compiled against a request's offset list
//! into the kernel's `gpio_v2_line_config` wire structure.
//!
//! Grounded directly on libgpiod's `lib/line-config.c`: setters never fail;
//! a secondary is found by exact offset-set equality (so two setters
//! targeting the same sorted offsets share one kernel attribute slot), and
//! running out of attribute slots sets a sticky `too_complex` flag that
//! makes every subsequent compile attempt fail.

use heapless::Vec as HVec;

use crate::errors::{Result, TooComplexError};
use crate::line::mask::LineMask;
use crate::line::offsets::OffsetSet;
use crate::line::options::{Bias, Debounce, Direction, Drive, EdgeDetect, EventClock};
use crate::uapi::v2::{
    gpio_line_config, gpio_line_config_attribute, LineAttrId, GPIO_LINE_NUM_ATTRS_MAX,
    GPIO_LINES_MAX,
};

use super::options::BaseConfig;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct SecondaryConfig {
    config: BaseConfig,
    offsets: OffsetSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OutputValue {
    offset: u32,
    value: bool,
}

/// An accumulating line configuration. Build it up with the `set_*` methods,
/// then hand it to [`crate::Chip::request_lines`] or
/// [`crate::LineRequest::reconfigure`], which compile it against a concrete
/// offset list.
#[derive(Debug, Clone, Default)]
pub struct LineConfig {
    too_complex: bool,
    primary: BaseConfig,
    secondary: HVec<SecondaryConfig, GPIO_LINE_NUM_ATTRS_MAX>,
    output_values: HVec<OutputValue, GPIO_LINES_MAX>,
}

impl LineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    fn secondary_for(&mut self, offsets: &[u32]) -> Option<&mut BaseConfig> {
        if self.too_complex {
            return None;
        }

        let normalized = OffsetSet::normalize(offsets);

        if let Some(idx) = self
            .secondary
            .iter()
            .position(|s| s.offsets == normalized)
        {
            return Some(&mut self.secondary[idx].config);
        }

        if self.secondary.len() == GPIO_LINE_NUM_ATTRS_MAX {
            self.too_complex = true;
            return None;
        }

        let _ = self.secondary.push(SecondaryConfig {
            config: BaseConfig::default(),
            offsets: normalized,
        });
        self.secondary.last_mut().map(|s| &mut s.config)
    }

    pub fn set_direction(&mut self, direction: Direction) -> &mut Self {
        self.primary.direction = Some(direction);
        self
    }

    pub fn set_direction_subset(&mut self, direction: Direction, offsets: &[u32]) -> &mut Self {
        if let Some(cfg) = self.secondary_for(offsets) {
            cfg.direction = Some(direction);
        }
        self
    }

    pub fn set_edge_detection(&mut self, edge: EdgeDetect) -> &mut Self {
        self.primary.edge = Some(edge);
        self
    }

    pub fn set_edge_detection_subset(&mut self, edge: EdgeDetect, offsets: &[u32]) -> &mut Self {
        if let Some(cfg) = self.secondary_for(offsets) {
            cfg.edge = Some(edge);
        }
        self
    }

    pub fn set_drive(&mut self, drive: Drive) -> &mut Self {
        self.primary.drive = Some(drive);
        self
    }

    pub fn set_drive_subset(&mut self, drive: Drive, offsets: &[u32]) -> &mut Self {
        if let Some(cfg) = self.secondary_for(offsets) {
            cfg.drive = Some(drive);
        }
        self
    }

    pub fn set_bias(&mut self, bias: Bias) -> &mut Self {
        self.primary.bias = Some(bias);
        self
    }

    pub fn set_bias_subset(&mut self, bias: Bias, offsets: &[u32]) -> &mut Self {
        if let Some(cfg) = self.secondary_for(offsets) {
            cfg.bias = Some(bias);
        }
        self
    }

    pub fn set_active_low(&mut self, active_low: bool) -> &mut Self {
        self.primary.active_low = active_low;
        self
    }

    pub fn set_active_low_subset(&mut self, active_low: bool, offsets: &[u32]) -> &mut Self {
        if let Some(cfg) = self.secondary_for(offsets) {
            cfg.active_low = active_low;
        }
        self
    }

    pub fn set_event_clock(&mut self, clock: EventClock) -> &mut Self {
        self.primary.clock = Some(clock);
        self
    }

    pub fn set_event_clock_subset(&mut self, clock: EventClock, offsets: &[u32]) -> &mut Self {
        if let Some(cfg) = self.secondary_for(offsets) {
            cfg.clock = Some(clock);
        }
        self
    }

    pub fn set_debounce_period(&mut self, period: Debounce) -> &mut Self {
        self.primary.debounce = period;
        self
    }

    pub fn set_debounce_period_subset(&mut self, period: Debounce, offsets: &[u32]) -> &mut Self {
        if let Some(cfg) = self.secondary_for(offsets) {
            cfg.debounce = period;
        }
        self
    }

    /// Set (or overwrite) the output value for a single offset.
    pub fn set_output_value(&mut self, offset: u32, value: bool) -> &mut Self {
        self.set_output_values(&[(offset, value)])
    }

    /// Set (or overwrite) output values for several offsets at once.
    pub fn set_output_values(&mut self, values: &[(u32, bool)]) -> &mut Self {
        if self.too_complex {
            return self;
        }

        for &(offset, value) in values {
            if let Some(existing) = self.output_values.iter_mut().find(|v| v.offset == offset) {
                existing.value = value;
                continue;
            }

            if self.output_values.len() == GPIO_LINES_MAX {
                self.too_complex = true;
                return self;
            }

            let _ = self.output_values.push(OutputValue { offset, value });
        }

        self
    }

    /// True once the configuration has overflowed a kernel capacity; sticky
    /// and never cleared by further mutation.
    pub fn is_too_complex(&self) -> bool {
        self.too_complex
    }

    /// Compile this configuration against `offsets`, the exact offset list a
    /// request or reconfigure call will use, producing the kernel's
    /// `gpio_v2_line_config` wire structure.
    pub(crate) fn compile(&self, offsets: &OffsetSet) -> Result<gpio_line_config> {
        if self.too_complex {
            return Err(TooComplexError::AttributeSlotsExhausted.into());
        }

        let num_lines = offsets.len();
        let mut attrs: HVec<gpio_line_config_attribute, GPIO_LINE_NUM_ATTRS_MAX> = HVec::new();

        if !self.output_values.is_empty() {
            if self.output_values.len() > num_lines {
                return Err(TooComplexError::TooManyOutputValues.into());
            }

            let mut mask = LineMask::zero();
            let mut values = LineMask::zero();

            for ov in &self.output_values {
                let idx = offsets
                    .find_idx(ov.offset)
                    .ok_or(crate::errors::InvalidArgumentError::OffsetNotInRequest(ov.offset))?;
                mask = mask.set(idx);
                values = values.assign(idx, ov.value);
            }

            let attr = gpio_line_config_attribute {
                attr: crate::uapi::v2::gpio_line_attribute::values(values.bits()),
                mask: mask.bits(),
            };
            attrs
                .push(attr)
                .map_err(|_| TooComplexError::AttributeSlotsExhausted)?;
        }

        if self.primary.debounce.is_enabled() {
            let attr = gpio_line_config_attribute {
                attr: crate::uapi::v2::gpio_line_attribute::debounce_period(
                    self.primary.debounce.as_micros(),
                ),
                mask: LineMask::fill(num_lines).bits(),
            };
            attrs
                .push(attr)
                .map_err(|_| TooComplexError::AttributeSlotsExhausted)?;
        }

        for sec in &self.secondary {
            if sec.offsets.len() > num_lines {
                return Err(TooComplexError::AttributeSlotsExhausted.into());
            }

            let mut mask = LineMask::zero();
            for offset in sec.offsets.iter() {
                let idx = offsets
                    .find_idx(offset)
                    .ok_or(crate::errors::InvalidArgumentError::OffsetNotInRequest(offset))?;
                mask = mask.set(idx);
            }

            // A secondary can carry either a debounce period or flag overrides,
            // never both: a non-zero debounce wins and the flag overrides for
            // that offset set are dropped, matching the kernel attribute's
            // single-tag shape.
            let attr = if sec.config.debounce.is_enabled() {
                crate::uapi::v2::gpio_line_attribute::debounce_period(
                    sec.config.debounce.as_micros(),
                )
            } else {
                crate::uapi::v2::gpio_line_attribute::flags(
                    LineAttrId::FLAGS,
                    sec.config.to_kernel_flags(),
                )
            };

            attrs
                .push(gpio_line_config_attribute {
                    attr,
                    mask: mask.bits(),
                })
                .map_err(|_| TooComplexError::AttributeSlotsExhausted)?;
        }

        let mut cfgbuf = gpio_line_config::zeroed();
        cfgbuf.flags = self.primary.to_kernel_flags();
        cfgbuf.num_attrs = attrs.len() as u32;
        for (slot, attr) in cfgbuf.attrs.iter_mut().zip(attrs.into_iter()) {
            *slot = core::mem::MaybeUninit::new(attr);
        }

        Ok(cfgbuf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uapi::v2::LineFlags;

    fn offsets(o: &[u32]) -> OffsetSet {
        OffsetSet::normalize(o)
    }

    #[test]
    fn idempotent_setters_compile_identically() {
        let mut a = LineConfig::new();
        a.set_direction(Direction::Output).set_direction(Direction::Output);
        let mut b = LineConfig::new();
        b.set_direction(Direction::Output);

        let offs = offsets(&[0, 1]);
        let ca = a.compile(&offs).unwrap();
        let cb = b.compile(&offs).unwrap();
        assert_eq!(ca.flags, cb.flags);
    }

    #[test]
    fn secondary_setters_on_same_offsets_coalesce() {
        let mut cfg = LineConfig::new();
        cfg.set_bias_subset(Bias::PullUp, &[3, 5]);
        cfg.set_direction_subset(Direction::Input, &[5, 3]);
        assert_eq!(cfg.secondary.len(), 1);
    }

    #[test]
    fn distinct_offset_sets_allocate_distinct_secondaries() {
        let mut cfg = LineConfig::new();
        cfg.set_bias_subset(Bias::PullUp, &[3]);
        cfg.set_bias_subset(Bias::PullDown, &[5]);
        assert_eq!(cfg.secondary.len(), 2);
    }

    #[test]
    fn overflow_of_secondary_table_sets_too_complex() {
        let mut cfg = LineConfig::new();
        for i in 0..GPIO_LINE_NUM_ATTRS_MAX as u32 + 1 {
            cfg.set_bias_subset(Bias::PullUp, &[i]);
        }
        assert!(cfg.is_too_complex());
        let offs = offsets(&(0..GPIO_LINE_NUM_ATTRS_MAX as u32 + 1).collect::<Vec<_>>());
        assert!(cfg.compile(&offs).is_err());
    }

    #[test]
    fn too_complex_is_sticky() {
        let mut cfg = LineConfig::new();
        for i in 0..GPIO_LINE_NUM_ATTRS_MAX as u32 + 1 {
            cfg.set_bias_subset(Bias::PullUp, &[i]);
        }
        assert!(cfg.is_too_complex());
        cfg.set_direction(Direction::Input);
        assert!(cfg.is_too_complex());
    }

    #[test]
    fn output_values_round_trip_through_mask_and_bits() {
        let mut cfg = LineConfig::new();
        cfg.set_output_values(&[(2, true), (4, false), (7, true)]);

        let offs = offsets(&[2, 4, 7]);
        let compiled = cfg.compile(&offs).unwrap();
        assert_eq!(compiled.num_attrs, 1);
        let attr = unsafe { compiled.attrs[0].assume_init() };
        assert_eq!(attr.mask, 0b111);
        let values = unsafe { attr.attr.attribute.values };
        assert_eq!(values & 0b111, 0b101);
    }

    #[test]
    fn unset_event_clock_compiles_without_realtime_bit() {
        let cfg = LineConfig::new();
        let offs = offsets(&[0]);
        let compiled = cfg.compile(&offs).unwrap();
        assert!(!compiled.flags.contains(LineFlags::EVENT_CLOCK_REALTIME));
    }

    #[test]
    fn secondary_offset_absent_from_request_is_invalid_argument() {
        let mut cfg = LineConfig::new();
        cfg.set_bias_subset(Bias::PullUp, &[9]);
        let offs = offsets(&[0, 1]);
        assert!(cfg.compile(&offs).is_err());
    }
}
