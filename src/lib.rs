// Copyright (c) 2018 The rust-gpio-cdev Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! This crate provides access to the Linux [GPIO character device uAPI
//! v2](https://www.kernel.org/doc/html/latest/userspace-api/gpio/gpio-v2-get-line-ioctl.html),
//! the ioctl-based interface that replaced the legacy sysfs GPIO API.
//!
//! A [`Chip`] opens a `/dev/gpiochipN` device and is used to query and watch
//! line info and to request ownership of one or more lines. A [`LineConfig`]
//! accumulates the electrical/logical options for a request (direction, edge
//! detection, bias, drive, debounce, ...), and is compiled against a concrete
//! set of offsets by [`Chip::request_lines`], which hands back a
//! [`LineRequest`] for reading/writing values, reconfiguring live, and
//! draining edge events.
//!
//! # Examples
//!
//! Read the state of a line and mirror it onto another line:
//!
//! ```no_run
//! use gpio_uapi2::{Chip, LineConfig, RequestConfig};
//! use gpio_uapi2::line::options::Direction;
//!
//! fn mirror_gpio(chip_path: &str, input: u32, output: u32) -> gpio_uapi2::Result<()> {
//!     let chip = Chip::open(std::path::Path::new(chip_path))?;
//!
//!     let mut input_cfg = LineConfig::new();
//!     input_cfg.set_direction(Direction::Input);
//!     let input_req = chip.request_lines(&RequestConfig::new(&[input]), &input_cfg)?;
//!
//!     let mut output_cfg = LineConfig::new();
//!     output_cfg.set_direction(Direction::Output);
//!     let output_req = chip.request_lines(&RequestConfig::new(&[output]), &output_cfg)?;
//!
//!     let value = input_req.get_value(input)?;
//!     output_req.set_value(output, value)?;
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod errors;

pub mod fixed_str;

#[allow(non_camel_case_types)]
pub mod uapi;

pub mod chip;

pub mod line;

pub mod request;

mod wait;

pub use chip::{chips, Chip};
pub use errors::{Error, Result};
pub use line::{LineConfig, RequestConfig};
pub use request::LineRequest;
