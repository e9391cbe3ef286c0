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

//! Locating PWM attribute files under the hwmon class directory.
//!
//! hwmonN numbering depends on driver load order, so a fan is addressed by the
//! driver name found in each device's `name` file plus its channel number, and
//! the concrete directory is looked up every time the tool runs.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{FanmodeError, Result};
use crate::sysfs::read_trimmed;

pub const HWMON_ROOT: &str = "/sys/class/hwmon";

/// Appended to the PWM file name to get the mode select file
pub const ENABLE_SUFFIX: &str = "_enable";

/// Attribute files controlling one PWM channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanPaths {
    pub pwm: PathBuf,
    pub mode: PathBuf,
}

impl FanPaths {
    /// Build the pair from the PWM file, deriving `pwmN_enable` next to it
    pub fn from_pwm(pwm: impl Into<PathBuf>) -> Self {
        let pwm = pwm.into();
        let mut mode = pwm.clone().into_os_string();
        mode.push(ENABLE_SUFFIX);
        Self { pwm, mode: PathBuf::from(mode) }
    }
}

/// Find the PWM files for `channel` of the device whose driver is `platform`.
///
/// Devices are visited in name order and the first one that both reports the
/// platform and has a `pwm<channel>` file wins.
pub fn resolve_fan_paths(root: &Path, platform: &str, channel: u32) -> Result<FanPaths> {
    let not_found = || FanmodeError::SensorNotFound {
        platform: platform.to_string(),
        channel,
    };

    let entries = match fs::read_dir(root) {
        Ok(it) => it,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(not_found()),
        Err(source) => return Err(FanmodeError::FileRead { path: root.to_path_buf(), source }),
    };

    let mut dirs: Vec<PathBuf> = entries
        .flatten()
        .map(|ent| ent.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();

    for dir in dirs {
        let Ok(name) = read_trimmed(dir.join("name")) else { continue };
        if name != platform {
            continue;
        }
        let pwm = dir.join(format!("pwm{}", channel));
        if pwm.exists() {
            debug!(platform, channel, path = %pwm.display(), "resolved fan channel");
            return Ok(FanPaths::from_pwm(pwm));
        }
        debug!(
            platform,
            channel,
            dir = %dir.display(),
            available = ?pwm_channels(&dir),
            "platform matched but channel is missing"
        );
    }

    Err(not_found())
}

/// PWM channel numbers present in a device directory, sorted
pub fn pwm_channels(dir: &Path) -> Vec<usize> {
    let mut out: Vec<usize> = match fs::read_dir(dir) {
        Ok(it) => it
            .flatten()
            .filter_map(|f| pwm_index(&f.file_name().to_string_lossy()))
            .collect(),
        Err(_) => Vec::new(),
    };
    out.sort_unstable();
    out
}

/// Channel number of a `pwm<N>` value file; `None` for any other attribute
fn pwm_index(fname: &str) -> Option<usize> {
    fname.strip_prefix("pwm")?.parse().ok()
}
