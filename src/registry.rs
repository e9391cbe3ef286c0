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

//! The fan catalog: name lookup, alias expansion and mode keywords.

use std::path::Path;
use std::rc::Rc;

use crate::config::{AliasSpec, FanmodeConfig, ModeKeyword, FAN_SEPARATOR};
use crate::error::{FanmodeError, Result};
use crate::fan::Fan;
use crate::sysfs::SysfsIo;

#[derive(Debug)]
pub struct FanRegistry {
    fans: Vec<Fan>,
    aliases: Vec<AliasSpec>,
    modes: Vec<ModeKeyword>,
}

impl FanRegistry {
    /// Build every fan of `config`; nothing touches sysfs until a fan is used
    pub fn new(config: FanmodeConfig, hwmon_root: &Path, io: Rc<dyn SysfsIo>) -> Self {
        let fans = config
            .fans
            .into_iter()
            .map(|spec| Fan::new(spec, hwmon_root, io.clone()))
            .collect();
        Self { fans, aliases: config.aliases, modes: config.modes }
    }

    /// Catalog order
    pub fn fans(&self) -> &[Fan] {
        &self.fans
    }

    pub fn aliases(&self) -> &[AliasSpec] {
        &self.aliases
    }

    pub fn modes(&self) -> &[ModeKeyword] {
        &self.modes
    }

    pub fn lookup(&self, name: &str) -> Result<&Fan> {
        self.fans
            .iter()
            .find(|f| f.name() == name)
            .ok_or_else(|| FanmodeError::FanNotFound(name.to_string()))
    }

    pub fn alias(&self, name: &str) -> Option<&AliasSpec> {
        self.aliases.iter().find(|a| a.name == name)
    }

    /// Resolve an alias or a `+` separated list of fan names.
    ///
    /// Order is kept and repeated names yield the same fan twice.
    pub fn expand(&self, name_or_alias: &str) -> Result<Vec<&Fan>> {
        let list = match self.alias(name_or_alias) {
            Some(alias) => alias.fans.as_str(),
            None => name_or_alias,
        };
        list.split(FAN_SEPARATOR).map(|name| self.lookup(name)).collect()
    }

    pub fn mode_keyword(&self, name: &str) -> Option<u8> {
        self.modes.iter().find(|m| m.name == name).map(|m| m.pwm)
    }

    /// The configuration this registry was built from
    pub fn to_config(&self) -> FanmodeConfig {
        FanmodeConfig {
            fans: self.fans.iter().map(|f| f.spec().clone()).collect(),
            aliases: self.aliases.clone(),
            modes: self.modes.clone(),
        }
    }
}
