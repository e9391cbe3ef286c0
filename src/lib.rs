/*
 * This file is part of Fanmode.
 *
 * Copyright (C) 2025 Fanmode contributors
 *
 * Fanmode is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Fanmode is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Fanmode. If not, see <https://www.gnu.org/licenses/>.
 */

//! Fanmode - switch hwmon fan channels between automatic and manual control
//!
//! This library resolves configured fans to their sysfs PWM files, reads and
//! writes their mode and duty cycle with read-back verification, and expands
//! aliases into ordered fan lists.

pub mod error;
pub mod sysfs;
pub mod hwmon;
pub mod fan;
pub mod config;
pub mod registry;
pub mod display;
pub mod cli;
pub mod commands;
pub mod logger;

#[cfg(test)]
pub mod test_utils;

pub use error::{FanmodeError, Result};
pub use fan::{Fan, Mode, ModeTarget, PwmWrite};
pub use registry::FanRegistry;
