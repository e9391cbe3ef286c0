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

//! A single fan channel and its verified read/write protocol.
//!
//! Drivers tend to accept writes silently and then keep whatever they like, so
//! every write is followed by a read-back:
//! - a mode code that does not stick is an error ([`FanmodeError::ModeVerificationFailed`]),
//! - a PWM value that lands elsewhere is reported as [`PwmWrite::Mismatch`],
//!   since duty cycle hardware routinely quantizes or clamps.
//!
//! No mode precondition is enforced for PWM writes; callers switch to manual
//! first when it matters.

use std::cell::OnceCell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde_json::json;
use tracing::{debug, warn};

use crate::config::FanSpec;
use crate::error::{FanmodeError, Result};
use crate::hwmon::{resolve_fan_paths, FanPaths};
use crate::logger;
use crate::sysfs::SysfsIo;

/// Observed control mode of a channel, carrying the raw code read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Auto(String),
    Manual(String),
    Unknown(String),
}

impl Mode {
    /// Classify a raw `pwmN_enable` value by exact comparison
    pub fn classify(raw: &str, auto: &str, manual: &str) -> Mode {
        if raw == auto {
            Mode::Auto(raw.to_string())
        } else if raw == manual {
            Mode::Manual(raw.to_string())
        } else {
            Mode::Unknown(raw.to_string())
        }
    }

    pub fn raw(&self) -> &str {
        match self {
            Mode::Auto(r) | Mode::Manual(r) | Mode::Unknown(r) => r,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Auto(r) => write!(f, "Auto ({})", r),
            Mode::Manual(r) => write!(f, "Manual ({})", r),
            Mode::Unknown(r) => write!(f, "Unknown ({})", r),
        }
    }
}

/// Requested mode for [`Fan::set_mode`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeTarget {
    Auto,
    Manual,
    /// Driver specific code written as-is, e.g. `2` for thermal cruise on nct67xx
    Raw(String),
}

impl ModeTarget {
    /// Accepts `auto`, `man`/`manual` (any case) or a decimal code
    pub fn parse(s: &str) -> Option<ModeTarget> {
        let lower = s.to_ascii_lowercase();
        match lower.as_str() {
            "auto" => Some(ModeTarget::Auto),
            "man" | "manual" => Some(ModeTarget::Manual),
            _ if is_numeric(&lower) => Some(ModeTarget::Raw(lower)),
            _ => None,
        }
    }
}

impl fmt::Display for ModeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModeTarget::Auto => f.write_str("auto"),
            ModeTarget::Manual => f.write_str("manual"),
            ModeTarget::Raw(code) => f.write_str(code),
        }
    }
}

/// Outcome of a PWM write that passed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PwmWrite {
    Exact(u8),
    /// The driver kept a different duty cycle than requested
    Mismatch { requested: u8, actual: u8 },
}

impl PwmWrite {
    pub fn is_exact(&self) -> bool {
        matches!(self, PwmWrite::Exact(_))
    }
}

fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// Parse a duty cycle given on the command line; only plain decimals 0..=255
pub fn parse_pwm(raw: &str) -> Result<u8> {
    if !is_numeric(raw) {
        return Err(FanmodeError::InvalidPwmValue(raw.to_string()));
    }
    raw.parse::<u8>()
        .map_err(|_| FanmodeError::InvalidPwmValue(raw.to_string()))
}

pub struct Fan {
    spec: FanSpec,
    hwmon_root: PathBuf,
    io: Rc<dyn SysfsIo>,
    paths: OnceCell<FanPaths>,
}

impl fmt::Debug for Fan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fan")
            .field("spec", &self.spec)
            .field("paths", &self.paths.get())
            .finish()
    }
}

impl Fan {
    pub fn new(spec: FanSpec, hwmon_root: impl Into<PathBuf>, io: Rc<dyn SysfsIo>) -> Self {
        let paths = OnceCell::new();
        if let Some(pwm) = &spec.pwm_path {
            let _ = paths.set(FanPaths::from_pwm(pwm.clone()));
        }
        Self { spec, hwmon_root: hwmon_root.into(), io, paths }
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn spec(&self) -> &FanSpec {
        &self.spec
    }

    /// Attribute paths, scanning hwmon on first use only
    pub fn paths(&self) -> Result<&FanPaths> {
        if let Some(p) = self.paths.get() {
            return Ok(p);
        }
        let resolved = resolve_fan_paths(&self.hwmon_root, &self.spec.platform, self.spec.channel)?;
        Ok(self.paths.get_or_init(|| resolved))
    }

    fn read(&self, path: &Path) -> Result<String> {
        self.io
            .read_trimmed(path)
            .map_err(|source| FanmodeError::FileRead { path: path.to_path_buf(), source })
    }

    fn write(&self, path: &Path, value: &str) -> Result<()> {
        self.io
            .write_value(path, value)
            .map_err(|source| FanmodeError::FileWrite { path: path.to_path_buf(), source })
    }

    pub fn get_mode(&self) -> Result<Mode> {
        let raw = self.read(&self.paths()?.mode)?;
        Ok(Mode::classify(&raw, &self.spec.auto, &self.spec.manual))
    }

    pub fn get_pwm(&self) -> Result<u8> {
        let path = &self.paths()?.pwm;
        let raw = self.read(path)?;
        raw.parse::<u8>().map_err(|_| FanmodeError::MalformedValue {
            path: path.clone(),
            value: raw,
        })
    }

    /// Write a mode code and confirm the driver kept it
    pub fn set_mode(&self, target: &ModeTarget) -> Result<Mode> {
        let code = match target {
            ModeTarget::Auto => self.spec.auto.as_str(),
            ModeTarget::Manual => self.spec.manual.as_str(),
            ModeTarget::Raw(code) if is_numeric(code) => code.as_str(),
            ModeTarget::Raw(code) => {
                return Err(FanmodeError::InvalidModeTarget {
                    fan: self.spec.name.clone(),
                    mode: code.clone(),
                })
            }
        };

        let path = &self.paths()?.mode;
        debug!(fan = %self.spec.name, code, path = %path.display(), "writing mode");
        self.write(path, code)?;
        logger::log_event(
            "mode_write",
            json!({ "fan": self.spec.name, "path": path, "code": code }),
        );

        let actual = self.read(path)?;
        if actual != code {
            return Err(FanmodeError::ModeVerificationFailed {
                fan: self.spec.name.clone(),
                requested: code.to_string(),
                actual,
            });
        }
        Ok(Mode::classify(&actual, &self.spec.auto, &self.spec.manual))
    }

    /// Validate and write a duty cycle, then compare the read-back
    pub fn set_pwm(&self, raw: &str) -> Result<PwmWrite> {
        let requested = parse_pwm(raw)?;
        let path = &self.paths()?.pwm;
        debug!(fan = %self.spec.name, requested, path = %path.display(), "writing pwm");
        self.write(path, &requested.to_string())?;
        logger::log_event(
            "pwm_write",
            json!({ "fan": self.spec.name, "path": path, "requested": requested }),
        );

        let actual = self.get_pwm()?;
        if actual == requested {
            return Ok(PwmWrite::Exact(actual));
        }
        warn!(fan = %self.spec.name, requested, actual, "pwm set inaccurately");
        logger::log_event(
            "pwm_mismatch",
            json!({ "fan": self.spec.name, "requested": requested, "actual": actual }),
        );
        Ok(PwmWrite::Mismatch { requested, actual })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sysfs::{MockSysfsIo, RealSysfs};
    use crate::test_utils::test_utils::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    const PWM: &str = "/sys/class/hwmon/hwmon3/pwm2";
    const ENABLE: &str = "/sys/class/hwmon/hwmon3/pwm2_enable";

    fn pinned_spec() -> FanSpec {
        let mut spec = FanSpec::new("cpu", "nct6798", 2, "5", "1");
        spec.pwm_path = Some(PathBuf::from(PWM));
        spec
    }

    fn fan_with(mock: MockSysfsIo) -> Fan {
        Fan::new(pinned_spec(), "/nonexistent", Rc::new(mock))
    }

    /// Attribute that stores whatever `accept` turns the written value into
    fn simulated_attr(mock: &mut MockSysfsIo, path: &'static str, initial: &str, accept: fn(&str) -> String) {
        let state = Arc::new(Mutex::new(initial.to_string()));
        let reader = state.clone();
        mock.expect_read_trimmed()
            .withf(move |p| p == Path::new(path))
            .returning(move |_| Ok(reader.lock().unwrap().clone()));
        mock.expect_write_value()
            .withf(move |p, _| p == Path::new(path))
            .returning(move |_, v| {
                *state.lock().unwrap() = accept(v);
                Ok(())
            });
    }

    #[test]
    fn test_classify_mode() {
        assert_eq!(Mode::classify("5", "5", "1"), Mode::Auto("5".into()));
        assert_eq!(Mode::classify("1", "5", "1"), Mode::Manual("1".into()));
        assert_eq!(Mode::classify("3", "5", "1"), Mode::Unknown("3".into()));
        assert_eq!(Mode::classify(" 5", "5", "1"), Mode::Unknown(" 5".into()));
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(Mode::Auto("2".into()).to_string(), "Auto (2)");
        assert_eq!(Mode::Manual("1".into()).to_string(), "Manual (1)");
        assert_eq!(Mode::Unknown("0".into()).to_string(), "Unknown (0)");
    }

    #[test]
    fn test_mode_target_parse() {
        assert_eq!(ModeTarget::parse("auto"), Some(ModeTarget::Auto));
        assert_eq!(ModeTarget::parse("AUTO"), Some(ModeTarget::Auto));
        assert_eq!(ModeTarget::parse("man"), Some(ModeTarget::Manual));
        assert_eq!(ModeTarget::parse("manual"), Some(ModeTarget::Manual));
        assert_eq!(ModeTarget::parse("2"), Some(ModeTarget::Raw("2".into())));
        assert_eq!(ModeTarget::parse("turbo"), None);
        assert_eq!(ModeTarget::parse("-1"), None);
        assert_eq!(ModeTarget::parse(""), None);
    }

    #[test]
    fn test_parse_pwm_bounds() {
        assert_eq!(parse_pwm("0").unwrap(), 0);
        assert_eq!(parse_pwm("255").unwrap(), 255);
        for bad in ["256", "-1", "abc", "", "+5", " 7", "12.5"] {
            assert!(
                matches!(parse_pwm(bad), Err(FanmodeError::InvalidPwmValue(ref v)) if v == bad),
                "expected rejection of {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_get_mode_unknown_code_is_not_an_error() {
        let mut mock = MockSysfsIo::new();
        mock.expect_read_trimmed()
            .withf(|p| p == Path::new(ENABLE))
            .returning(|_| Ok("3".to_string()));
        let fan = fan_with(mock);
        assert_eq!(fan.get_mode().unwrap(), Mode::Unknown("3".into()));
    }

    #[test]
    fn test_get_mode_io_error() {
        let mut mock = MockSysfsIo::new();
        mock.expect_read_trimmed()
            .returning(|_| Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied")));
        let fan = fan_with(mock);
        assert!(matches!(fan.get_mode(), Err(FanmodeError::FileRead { .. })));
    }

    #[test]
    fn test_get_pwm_malformed() {
        let mut mock = MockSysfsIo::new();
        mock.expect_read_trimmed()
            .withf(|p| p == Path::new(PWM))
            .returning(|_| Ok("garbage".to_string()));
        let fan = fan_with(mock);
        match fan.get_pwm() {
            Err(FanmodeError::MalformedValue { value, .. }) => assert_eq!(value, "garbage"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_set_mode_auto_verified() {
        let mut mock = MockSysfsIo::new();
        simulated_attr(&mut mock, ENABLE, "1", |v| v.to_string());
        let fan = fan_with(mock);

        assert_eq!(fan.set_mode(&ModeTarget::Auto).unwrap(), Mode::Auto("5".into()));
        assert_eq!(fan.get_mode().unwrap(), Mode::Auto("5".into()));
    }

    #[test]
    fn test_set_mode_raw_code_passes_through() {
        let mut mock = MockSysfsIo::new();
        simulated_attr(&mut mock, ENABLE, "5", |v| v.to_string());
        let fan = fan_with(mock);

        assert_eq!(
            fan.set_mode(&ModeTarget::Raw("2".into())).unwrap(),
            Mode::Unknown("2".into())
        );
    }

    #[test]
    fn test_set_mode_ignored_by_driver_fails() {
        let mut mock = MockSysfsIo::new();
        simulated_attr(&mut mock, ENABLE, "1", |_| "1".to_string());
        let fan = fan_with(mock);

        match fan.set_mode(&ModeTarget::Auto) {
            Err(FanmodeError::ModeVerificationFailed { fan, requested, actual }) => {
                assert_eq!(fan, "cpu");
                assert_eq!(requested, "5");
                assert_eq!(actual, "1");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_set_mode_rejects_non_numeric_raw_without_writing() {
        let mut mock = MockSysfsIo::new();
        mock.expect_write_value().never();
        let fan = fan_with(mock);
        assert!(matches!(
            fan.set_mode(&ModeTarget::Raw("fast".into())),
            Err(FanmodeError::InvalidModeTarget { .. })
        ));
    }

    #[test]
    fn test_set_mode_write_error_propagates() {
        let mut mock = MockSysfsIo::new();
        mock.expect_write_value()
            .returning(|_, _| Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied")));
        mock.expect_read_trimmed().never();
        let fan = fan_with(mock);
        assert!(matches!(
            fan.set_mode(&ModeTarget::Manual),
            Err(FanmodeError::FileWrite { .. })
        ));
    }

    #[test]
    fn test_set_pwm_exact() {
        let mut mock = MockSysfsIo::new();
        simulated_attr(&mut mock, PWM, "0", |v| v.to_string());
        let fan = fan_with(mock);

        for v in [0u8, 1, 76, 127, 190, 255] {
            assert_eq!(fan.set_pwm(&v.to_string()).unwrap(), PwmWrite::Exact(v));
            assert_eq!(fan.get_pwm().unwrap(), v);
        }
    }

    #[test]
    fn test_set_pwm_quantized_is_a_warning() {
        let mut mock = MockSysfsIo::new();
        // 4-bit controller: keeps the upper nibble only
        simulated_attr(&mut mock, PWM, "0", |v| {
            let n: u8 = v.parse().unwrap();
            (n & 0xF0).to_string()
        });
        let fan = fan_with(mock);

        let outcome = fan.set_pwm("100").unwrap();
        assert_eq!(outcome, PwmWrite::Mismatch { requested: 100, actual: 96 });
        assert!(!outcome.is_exact());
    }

    #[test]
    fn test_set_pwm_invalid_never_writes() {
        let mut mock = MockSysfsIo::new();
        mock.expect_write_value().never();
        mock.expect_read_trimmed().never();
        let fan = fan_with(mock);

        for bad in ["256", "-5", "full", ""] {
            assert!(matches!(fan.set_pwm(bad), Err(FanmodeError::InvalidPwmValue(_))));
        }
    }

    #[test]
    fn test_paths_resolved_once() {
        let tree = MockHwmon::new();
        tree.device("hwmon3", "nct6798", &[("2", "5")]);
        let fan = Fan::new(
            FanSpec::new("cpu", "nct6798", 2, "5", "1"),
            tree.root(),
            Rc::new(RealSysfs),
        );

        let first = fan.paths().unwrap().clone();
        assert_eq!(first.pwm, tree.root().join("hwmon3/pwm2"));

        // A device appearing later in the scan order must not move a resolved fan
        tree.device("hwmon0", "nct6798", &[("2", "1")]);
        assert_eq!(fan.paths().unwrap(), &first);
        assert_eq!(fan.get_mode().unwrap(), Mode::Auto("5".into()));
    }

    #[test]
    fn test_failed_resolution_is_not_cached() {
        let tree = MockHwmon::new();
        let fan = Fan::new(
            FanSpec::new("gpu", "amdgpu", 1, "2", "1"),
            tree.root(),
            Rc::new(RealSysfs),
        );
        assert!(matches!(fan.get_pwm(), Err(FanmodeError::SensorNotFound { .. })));

        tree.device("hwmon1", "amdgpu", &[("1", "2")]);
        assert_eq!(fan.get_mode().unwrap(), Mode::Auto("2".into()));
    }
}
