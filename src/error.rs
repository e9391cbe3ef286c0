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

//! Error type shared by every fanmode operation.

use std::io;
use std::path::PathBuf;

/// Result type alias using FanmodeError
pub type Result<T> = std::result::Result<T, FanmodeError>;

#[derive(thiserror::Error, Debug)]
pub enum FanmodeError {
    // ============================================================================
    // I/O and File System Errors
    // ============================================================================
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    FileWrite {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Malformed value '{value}' in {path}")]
    MalformedValue {
        path: PathBuf,
        value: String,
    },

    // ============================================================================
    // Lookup Errors
    // ============================================================================
    #[error("No hwmon sensor for platform '{platform}' channel {channel}")]
    SensorNotFound {
        platform: String,
        channel: u32,
    },

    #[error("Fan {0} not found!")]
    FanNotFound(String),

    // ============================================================================
    // Validation Errors
    // ============================================================================
    #[error("{0}")]
    InvalidCommandArgument(String),

    #[error("Invalid PWM value: '{0}' (must be 0-255)")]
    InvalidPwmValue(String),

    #[error("Can't set mode '{mode}' on {fan}")]
    InvalidModeTarget {
        fan: String,
        mode: String,
    },

    #[error("Setting mode {requested} on {fan} failed (got {actual})!")]
    ModeVerificationFailed {
        fan: String,
        requested: String,
        actual: String,
    },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),
}

impl FanmodeError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidCommandArgument(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Argument errors are reported together with the usage reference
    pub fn wants_usage(&self) -> bool {
        matches!(self, Self::InvalidCommandArgument(_))
    }
}
