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

use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FanmodeError, Result};

/// Separator between fan names in alias definitions and on the command line
pub const FAN_SEPARATOR: char = '+';

/// Static description of one fan channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FanSpec {
    pub name: String,
    /// Driver name as reported by the hwmon device's `name` file
    pub platform: String,
    pub channel: u32,
    /// Raw `pwmN_enable` code meaning firmware control
    pub auto: String,
    /// Raw `pwmN_enable` code meaning fixed duty cycle
    pub manual: String,
    /// Skip the hwmon scan and use this PWM file directly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pwm_path: Option<PathBuf>,
}

impl FanSpec {
    pub fn new(name: &str, platform: &str, channel: u32, auto: &str, manual: &str) -> Self {
        Self {
            name: name.to_string(),
            platform: platform.to_string(),
            channel,
            auto: auto.to_string(),
            manual: manual.to_string(),
            pwm_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AliasSpec {
    pub name: String,
    /// `+` separated fan names, e.g. `cpu_2+case`
    pub fans: String,
}

impl AliasSpec {
    pub fn new(name: &str, fans: &str) -> Self {
        Self { name: name.to_string(), fans: fans.to_string() }
    }

    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.fans.split(FAN_SEPARATOR)
    }
}

/// Named PWM preset usable as a `mode` value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModeKeyword {
    pub name: String,
    pub pwm: u8,
}

impl ModeKeyword {
    pub fn new(name: &str, pwm: u8) -> Self {
        Self { name: name.to_string(), pwm }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FanmodeConfig {
    pub fans: Vec<FanSpec>,
    #[serde(default)]
    pub aliases: Vec<AliasSpec>,
    #[serde(default = "default_modes")]
    pub modes: Vec<ModeKeyword>,
}

impl Default for FanmodeConfig {
    fn default() -> Self {
        Self {
            fans: default_fans(),
            aliases: default_aliases(),
            modes: default_modes(),
        }
    }
}

fn default_fans() -> Vec<FanSpec> {
    vec![
        FanSpec::new("cpu", "nct6798", 2, "5", "1"),
        FanSpec::new("cpu_2", "nct6798", 1, "5", "1"),
        FanSpec::new("case", "nct6798", 3, "5", "1"),
        FanSpec::new("gpu", "amdgpu", 1, "2", "1"),
    ]
}

fn default_aliases() -> Vec<AliasSpec> {
    vec![
        AliasSpec::new("full-case", "cpu_2+case"),
        AliasSpec::new("all", "cpu+cpu_2+case+gpu"),
        AliasSpec::new("no-gpu", "cpu+cpu_2+case"),
        AliasSpec::new("no-cpu", "cpu_2+case+gpu"),
    ]
}

fn default_modes() -> Vec<ModeKeyword> {
    vec![
        ModeKeyword::new("max", 255),
        ModeKeyword::new("high", 190),
        ModeKeyword::new("mid", 127),
        ModeKeyword::new("low", 76),
        ModeKeyword::new("off", 0),
    ]
}

pub fn config_path() -> PathBuf {
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        return Path::new(&xdg).join("fanmode").join("config.json");
    }
    if let Ok(home) = env::var("HOME") {
        return Path::new(&home)
            .join(".config")
            .join("fanmode")
            .join("config.json");
    }
    system_config_path()
}

pub fn system_config_path() -> PathBuf { PathBuf::from("/etc/fanmode/config.json") }

/// Load the fan catalog.
///
/// An explicit path must exist. Without one, the user config and then the
/// system config are tried, and the built-in catalog is used if neither is
/// present. Whatever is loaded is validated before it is returned.
pub fn load_config(explicit: Option<&Path>) -> Result<FanmodeConfig> {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => [config_path(), system_config_path()].into_iter().find(|p| p.exists()),
    };

    let cfg = match path {
        Some(path) => {
            debug!(path = %path.display(), "loading fan configuration");
            let data = fs::read_to_string(&path)
                .map_err(|source| FanmodeError::FileRead { path: path.clone(), source })?;
            serde_json::from_str(&data)?
        }
        None => {
            debug!("no configuration file, using built-in fan catalog");
            FanmodeConfig::default()
        }
    };

    validate_config(&cfg)?;
    Ok(cfg)
}

fn is_safe_name(s: &str) -> bool {
    if s.is_empty() || s.len() > 64 { return false; }
    s.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

fn is_raw_code(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

pub fn validate_config(cfg: &FanmodeConfig) -> Result<()> {
    if cfg.fans.is_empty() {
        return Err(FanmodeError::config("no fans configured"));
    }

    let mut names: HashSet<&str> = HashSet::new();
    for fan in &cfg.fans {
        if !is_safe_name(&fan.name) {
            return Err(FanmodeError::config(format!("invalid fan name '{}'", fan.name)));
        }
        if !names.insert(fan.name.as_str()) {
            return Err(FanmodeError::config(format!("duplicate fan name '{}'", fan.name)));
        }
        if fan.platform.trim().is_empty() {
            return Err(FanmodeError::config(format!("fan '{}' has no platform", fan.name)));
        }
        if !is_raw_code(&fan.auto) || !is_raw_code(&fan.manual) {
            return Err(FanmodeError::config(format!(
                "fan '{}' needs numeric auto/manual codes (got '{}'/'{}')",
                fan.name, fan.auto, fan.manual
            )));
        }
    }

    let mut alias_names: HashSet<&str> = HashSet::new();
    for alias in &cfg.aliases {
        if !is_safe_name(&alias.name) {
            return Err(FanmodeError::config(format!("invalid alias name '{}'", alias.name)));
        }
        if names.contains(alias.name.as_str()) {
            return Err(FanmodeError::config(format!("alias '{}' shadows a fan", alias.name)));
        }
        if !alias_names.insert(alias.name.as_str()) {
            return Err(FanmodeError::config(format!("duplicate alias '{}'", alias.name)));
        }
        for member in alias.members() {
            if !names.contains(member) {
                return Err(FanmodeError::config(format!(
                    "alias '{}' references unknown fan '{}'",
                    alias.name, member
                )));
            }
        }
    }

    let mut mode_names: HashSet<&str> = HashSet::new();
    for mode in &cfg.modes {
        if !is_safe_name(&mode.name) || mode.name == "auto" || mode.name == "manual" {
            return Err(FanmodeError::config(format!("invalid mode keyword '{}'", mode.name)));
        }
        if !mode_names.insert(mode.name.as_str()) {
            return Err(FanmodeError::config(format!("duplicate mode keyword '{}'", mode.name)));
        }
    }

    Ok(())
}
