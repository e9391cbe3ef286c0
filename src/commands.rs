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

//! Turning a parsed command into fan operations and printed tables.
//!
//! Fans are handled one at a time in list order and the first error stops the
//! command; fans already written keep their new state.

use std::io::Write;

use tracing::info;

use crate::cli::Commands;
use crate::display;
use crate::error::{FanmodeError, Result};
use crate::fan::{parse_pwm, Fan, Mode, ModeTarget, PwmWrite};
use crate::registry::FanRegistry;

/// What `set` does to each selected fan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetOp {
    /// Write the mode select file only
    Mode(ModeTarget),
    /// Switch to manual, then write the duty cycle
    Pwm(u8),
}

/// Per-fan result of a `set`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetOutcome {
    pub fan: String,
    pub mode: Mode,
    pub pwm: Option<PwmWrite>,
}

/// Check the `set` arguments in the order they appear on the command line
pub fn parse_set<'r>(
    registry: &'r FanRegistry,
    fans: Option<&str>,
    action: Option<&str>,
    value: Option<&str>,
) -> Result<(Vec<&'r Fan>, SetOp)> {
    let fans = fans.ok_or_else(|| FanmodeError::invalid_argument("Fans not set"))?;
    let targets = registry.expand(fans)?;
    let action = action.ok_or_else(|| FanmodeError::invalid_argument("Mode/PWM?"))?;
    if action != "mode" && action != "pwm" {
        return Err(FanmodeError::invalid_argument("Invalid value in mode/pwm"));
    }
    let value = value.ok_or_else(|| FanmodeError::invalid_argument("Mode/PWM value not set"))?;

    let op = if action == "pwm" {
        let pwm = parse_pwm(value).map_err(|e| FanmodeError::invalid_argument(e.to_string()))?;
        SetOp::Pwm(pwm)
    } else if let Some(pwm) = registry.mode_keyword(value) {
        SetOp::Pwm(pwm)
    } else {
        let target = ModeTarget::parse(value)
            .ok_or_else(|| FanmodeError::invalid_argument("Invalid mode value"))?;
        SetOp::Mode(target)
    };
    Ok((targets, op))
}

/// Apply `op` to every fan in order, stopping at the first failure
pub fn apply(fans: &[&Fan], op: &SetOp) -> Result<Vec<SetOutcome>> {
    let mut outcomes = Vec::with_capacity(fans.len());
    for fan in fans {
        let outcome = match op {
            SetOp::Mode(target) => SetOutcome {
                fan: fan.name().to_string(),
                mode: fan.set_mode(target)?,
                pwm: None,
            },
            SetOp::Pwm(value) => {
                let mode = fan.set_mode(&ModeTarget::Manual)?;
                let pwm = fan.set_pwm(&value.to_string())?;
                SetOutcome { fan: fan.name().to_string(), mode, pwm: Some(pwm) }
            }
        };
        info!(fan = %outcome.fan, mode = outcome.mode.raw(), "fan updated");
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

fn write_usage<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out, "{}", display::commands_table())?;
    writeln!(out, "{}", display::examples_table())?;
    Ok(())
}

fn write_info<W: Write>(registry: &FanRegistry, out: &mut W) -> Result<()> {
    writeln!(out, "{}", display::fans_table(registry)?)?;
    writeln!(out, "{}", display::aliases_table(registry))?;
    writeln!(out, "{}", display::modes_table(registry))?;
    Ok(())
}

fn run_set<W: Write>(
    registry: &FanRegistry,
    fans: Option<&str>,
    action: Option<&str>,
    value: Option<&str>,
    authorize: &dyn Fn() -> Result<()>,
    out: &mut W,
) -> Result<Vec<SetOutcome>> {
    let (targets, op) = parse_set(registry, fans, action, value)?;
    authorize()?;
    let outcomes = apply(&targets, &op)?;
    for outcome in &outcomes {
        if let Some(line) = outcome.pwm.as_ref().and_then(|p| display::pwm_warning(&outcome.fan, p)) {
            writeln!(out, "{}", line)?;
        }
    }
    writeln!(out, "{}", display::fans_table(registry)?)?;
    Ok(outcomes)
}

fn execute<W: Write>(
    registry: &FanRegistry,
    command: Option<&Commands>,
    authorize: &dyn Fn() -> Result<()>,
    out: &mut W,
) -> Result<Vec<SetOutcome>> {
    match command {
        None | Some(Commands::Help) => {
            write_usage(out)?;
            write_info(registry, out)?;
        }
        Some(Commands::Info) => write_info(registry, out)?,
        Some(Commands::Fans) => writeln!(out, "{}", display::fans_table(registry)?)?,
        Some(Commands::Config) => {
            writeln!(out, "{}", serde_json::to_string_pretty(&registry.to_config())?)?;
        }
        Some(Commands::Default) => {
            return run_set(registry, Some("all"), Some("mode"), Some("auto"), authorize, out);
        }
        Some(Commands::Set { fans, action, value }) => {
            return run_set(registry, fans.as_deref(), action.as_deref(), value.as_deref(), authorize, out);
        }
        Some(Commands::Unknown(args)) => {
            let action = args.first().map(String::as_str).unwrap_or_default();
            return Err(FanmodeError::invalid_argument(format!("No action for {}", action)));
        }
    }
    Ok(Vec::new())
}

/// Run one command, writing tables to `out`.
///
/// Argument errors are followed by the usage tables and the error message
/// before being returned. Returns the per-fan results of `set`/`default`.
pub fn dispatch<W: Write>(registry: &FanRegistry, command: Option<&Commands>, out: &mut W) -> Result<Vec<SetOutcome>> {
    dispatch_authorized(registry, command, &|| Ok(()), out)
}

/// Like [`dispatch`], but `authorize` must pass before the first hardware
/// write. It runs only once the `set` arguments and fan list are valid.
pub fn dispatch_authorized<W: Write>(
    registry: &FanRegistry,
    command: Option<&Commands>,
    authorize: &dyn Fn() -> Result<()>,
    out: &mut W,
) -> Result<Vec<SetOutcome>> {
    match execute(registry, command, authorize, out) {
        Err(e) if e.wants_usage() => {
            write_usage(out)?;
            writeln!(out, "\nError: {}", e)?;
            Err(e)
        }
        other => other,
    }
}
