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

//! Command Line Interface
//!
//! `set` takes its positionals as optional strings so that missing or
//! malformed values are reported by the dispatcher together with the usage
//! tables instead of by clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::hwmon::HWMON_ROOT;

#[derive(Parser, Debug)]
#[command(name = "fanmode")]
#[command(version)]
#[command(about = "FanMode - switch hwmon fans between automatic and manual control")]
#[command(long_about = "FanMode - switch hwmon fans between automatic and manual control

EXAMPLES:
    fanmode set full-case mode high    Manual mode, PWM 190 on cpu_2 and case
    fanmode set cpu+case pwm 100       Manual mode, PWM 100 on cpu and case
    fanmode set cpu+case mode auto     Hand cpu and case back to the firmware
    fanmode default                    Same as: set all mode auto

ENVIRONMENT VARIABLES:
    RUST_LOG=debug         Enable debug logging

FILES:
    ~/.config/fanmode/config.json      Fan catalog, aliases and mode keywords
    /etc/fanmode/config.json           System-wide fan catalog")]
#[command(disable_help_subcommand = true, allow_external_subcommands = true)]
pub struct Cli {
    /// Append every hardware write to the JSON event log
    #[arg(long, global = true)]
    pub logging: bool,

    /// Event log location (implies --logging)
    #[arg(long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Fan catalog to use instead of the default locations
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// hwmon class directory to scan
    #[arg(long, global = true, hide = true, value_name = "DIR", default_value = HWMON_ROOT)]
    pub hwmon_root: PathBuf,

    /// Debug output on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Set fan mode/pwm: set <fans> <mode/pwm> <value>
    Set {
        /// Fan names joined with '+', or an alias
        fans: Option<String>,
        /// `mode` or `pwm`
        action: Option<String>,
        /// auto, manual, a mode keyword or raw mode code; or a PWM value 0-255
        #[arg(allow_hyphen_values = true)]
        value: Option<String>,
    },

    /// Show fans, aliases and modes
    #[command(alias = "show")]
    Info,

    /// Show fans
    Fans,

    /// Set auto mode on all fans
    Default,

    /// Print the active configuration as JSON
    Config,

    /// Show commands and examples
    Help,

    #[command(external_subcommand)]
    Unknown(Vec<String>),
}

impl Cli {
    pub fn logging_enabled(&self) -> bool {
        self.logging || self.log_file.is_some()
    }
}
