/*
 * Test utilities and mock helpers for Fanmode
 *
 * Builds throwaway hwmon trees so resolution and the full read/write path can
 * be exercised against real files.
 */

#[cfg(test)]
pub mod test_utils {
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::rc::Rc;
    use tempfile::TempDir;

    use crate::config::FanmodeConfig;
    use crate::registry::FanRegistry;
    use crate::sysfs::RealSysfs;

    fn populate(path: &Path, platform: &str, channels: &[(&str, &str)]) {
        fs::create_dir_all(path).unwrap();
        fs::write(path.join("name"), format!("{}\n", platform)).unwrap();
        for (channel, enable) in channels {
            fs::write(path.join(format!("pwm{}", channel)), "0\n").unwrap();
            fs::write(path.join(format!("pwm{}_enable", channel)), format!("{}\n", enable)).unwrap();
        }
    }

    /// Temporary directory laid out like /sys/class/hwmon
    pub struct MockHwmon {
        _dir: TempDir,
        root: PathBuf,
    }

    impl MockHwmon {
        pub fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let root = dir.path().join("sys/class/hwmon");
            fs::create_dir_all(&root).unwrap();
            Self { _dir: dir, root }
        }

        /// The two chips the built-in catalog expects, all fans in auto
        pub fn with_default_chips() -> Self {
            let tree = Self::new();
            tree.device("hwmon0", "acpitz", &[]);
            tree.device("hwmon2", "nct6798", &[("1", "5"), ("2", "5"), ("3", "5")]);
            tree.device("hwmon5", "amdgpu", &[("1", "2")]);
            tree
        }

        pub fn root(&self) -> &Path {
            &self.root
        }

        /// Create `hwmonN` with a `name` file and one `pwmK`/`pwmK_enable` pair
        /// per `(channel, enable code)`; duty cycles start at 0
        pub fn device(&self, dir: &str, platform: &str, channels: &[(&str, &str)]) -> PathBuf {
            let path = self.root.join(dir);
            populate(&path, platform, channels);
            path
        }

        /// Like [`device`](Self::device), but the attributes live under
        /// `sys/devices/platform/<device>` and `hwmonN` is a symlink to them,
        /// as on a real system
        pub fn linked_device(&self, dir: &str, device: &str, platform: &str, channels: &[(&str, &str)]) -> PathBuf {
            let sys = self.root.parent().and_then(Path::parent).unwrap();
            let target = sys.join("devices/platform").join(device).join("hwmon").join(dir);
            populate(&target, platform, channels);
            let link = self.root.join(dir);
            std::os::unix::fs::symlink(&target, &link).unwrap();
            link
        }

        pub fn read(&self, rel: &str) -> String {
            fs::read_to_string(self.root.join(rel)).unwrap().trim().to_string()
        }

        pub fn registry(&self) -> FanRegistry {
            FanRegistry::new(FanmodeConfig::default(), self.root(), Rc::new(RealSysfs))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_utils::*;

    #[test]
    fn test_mock_hwmon_layout() {
        let tree = MockHwmon::with_default_chips();
        assert_eq!(tree.read("hwmon2/name"), "nct6798");
        assert_eq!(tree.read("hwmon2/pwm3_enable"), "5");
        assert_eq!(tree.read("hwmon5/pwm1"), "0");
        assert!(!tree.root().join("hwmon0/pwm1").exists());
    }
}
