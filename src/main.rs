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

use std::io;
use std::path::Path;
use std::rc::Rc;

use anyhow::Context;
use clap::Parser;
use crossterm::style::Stylize;
use crossterm::tty::IsTty;
use tracing::debug;

use fanmode::cli::Cli;
use fanmode::hwmon::HWMON_ROOT;
use fanmode::sysfs::RealSysfs;
use fanmode::{commands, config, logger, FanRegistry, FanmodeError};

fn main() {
    let cli = Cli::parse();
    logger::init_tracing(cli.verbose);

    // Optional JSON event log
    let logging_enabled = cli.logging_enabled();
    if logging_enabled {
        logger::init_logging(cli.log_file.as_deref());
        logger::log_event("startup", serde_json::json!({
            "args": std::env::args().collect::<Vec<_>>(),
        }));
    }

    println!("FanMode v{} - Control your FANS!", env!("CARGO_PKG_VERSION"));

    if let Err(err) = run(&cli) {
        report(&err);
        if logging_enabled {
            logger::log_event("fatal_error", serde_json::json!({ "error": format!("{:#}", err) }));
        }
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let cfg = config::load_config(cli.config.as_deref()).context("loading fan configuration")?;
    debug!(fans = cfg.fans.len(), root = %cli.hwmon_root.display(), "fan catalog loaded");
    let registry = FanRegistry::new(cfg, &cli.hwmon_root, Rc::new(RealSysfs));

    // Only the real sysfs tree needs root; test trees are writable by anyone
    let real_sysfs = cli.hwmon_root == Path::new(HWMON_ROOT);
    let require_root = || -> fanmode::Result<()> {
        if real_sysfs && unsafe { libc::geteuid() } != 0 {
            return Err(FanmodeError::PermissionDenied(format!(
                "fanmode requires root privileges to change fans. Please run with: sudo {}",
                std::env::args().next().unwrap_or_else(|| "fanmode".to_string())
            )));
        }
        Ok(())
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    commands::dispatch_authorized(&registry, cli.command.as_ref(), &require_root, &mut out)?;
    Ok(())
}

fn report(err: &anyhow::Error) {
    // Usage errors were already printed along with the command table
    let usage_shown = err
        .downcast_ref::<FanmodeError>()
        .is_some_and(FanmodeError::wants_usage);
    if usage_shown {
        return;
    }
    if io::stderr().is_tty() {
        eprintln!("{} {:#}", "error:".red().bold(), err);
    } else {
        eprintln!("error: {:#}", err);
    }
}
