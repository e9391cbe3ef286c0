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

//! Attribute file access for fan channels.
//!
//! Every read and write opens the file, performs one operation and closes it
//! again; nothing is held open between calls.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

#[cfg(test)]
use mockall::automock;

/// Read/write access to single-value sysfs attributes
#[cfg_attr(test, automock)]
pub trait SysfsIo {
    /// Read the attribute and strip surrounding whitespace
    fn read_trimmed(&self, path: &Path) -> io::Result<String>;

    /// Replace the attribute content with `value`
    fn write_value(&self, path: &Path, value: &str) -> io::Result<()>;
}

/// Direct filesystem access, used outside of tests
#[derive(Debug, Default, Clone, Copy)]
pub struct RealSysfs;

impl SysfsIo for RealSysfs {
    fn read_trimmed(&self, path: &Path) -> io::Result<String> {
        read_trimmed(path)
    }

    fn write_value(&self, path: &Path, value: &str) -> io::Result<()> {
        fs::write(path, value)
    }
}

pub(crate) fn read_trimmed<P: AsRef<Path>>(p: P) -> io::Result<String> {
    let mut s = String::new();
    fs::File::open(p)?.read_to_string(&mut s)?;
    Ok(s.trim().to_string())
}
