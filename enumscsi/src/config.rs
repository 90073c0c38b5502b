use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ScsiError;

pub static DEFAULT_PORT: u16 = 3260;
static DEFAULT_MOUNT_POINT: &str = "/mnt/iscsi";
static DEFAULT_DEV_DIR: &str = "/dev";
static DEFAULT_DEVICE_PATTERN: &str = r"^(sd|nvme|mmcblk)\w+";

/// Tool names, paths and the device poll window.
///
/// Every field may be omitted from the yaml file:
///
/// ```yaml
/// mount_point: /mnt/iscsi
/// poll_attempts: 20
/// less: most
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    iscsiadm: String,
    blkid: String,
    mount: String,
    umount: String,
    cat: String,
    less: String,

    mount_point: PathBuf,
    dev_dir: PathBuf,
    device_pattern: String,
    poll_attempts: u32,
    poll_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            iscsiadm: "iscsiadm".to_string(),
            blkid: "blkid".to_string(),
            mount: "mount".to_string(),
            umount: "umount".to_string(),
            cat: "cat".to_string(),
            less: "less".to_string(),
            mount_point: PathBuf::from(DEFAULT_MOUNT_POINT),
            dev_dir: PathBuf::from(DEFAULT_DEV_DIR),
            device_pattern: DEFAULT_DEVICE_PATTERN.to_string(),
            poll_attempts: 10,
            poll_interval_ms: 1000,
        }
    }
}

impl Config {
    /// create `Config` from yaml string
    pub fn from(s: &str) -> Result<Config> {
        let config = serde_yml::from_str::<Config>(s)
            .map_err(|e| ScsiError::BadConfig(e.to_string()))?;
        config.device_regex()?;
        Ok(config)
    }

    /// create `Config` from yaml file
    pub fn read<S: AsRef<Path>>(filename: S) -> Result<Config> {
        let s = fs::read_to_string(filename)?;
        Config::from(&s)
    }

    /// encodes `Config` to yaml string
    pub fn to_yml(&self) -> Result<String> {
        let s = serde_yml::to_string(self)?;
        Ok(s)
    }

    pub fn write_to<S: AsRef<Path>>(&self, filename: S) -> Result<()> {
        let yml = self.to_yml()?;
        fs::write(filename, yml)?;

        Ok(())
    }

    pub fn iscsiadm(&self) -> &str {
        &self.iscsiadm
    }

    pub fn blkid(&self) -> &str {
        &self.blkid
    }

    pub fn mount(&self) -> &str {
        &self.mount
    }

    pub fn umount(&self) -> &str {
        &self.umount
    }

    pub fn cat(&self) -> &str {
        &self.cat
    }

    pub fn less(&self) -> &str {
        &self.less
    }

    pub fn mount_point(&self) -> &Path {
        &self.mount_point
    }

    pub fn dev_dir(&self) -> &Path {
        &self.dev_dir
    }

    pub fn device_regex(&self) -> Result<Regex> {
        let re = Regex::new(&self.device_pattern)
            .map_err(|_| ScsiError::BadPattern(self.device_pattern.clone()))?;
        Ok(re)
    }

    pub fn poll_attempts(&self) -> u32 {
        self.poll_attempts
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn set_mount_point<P: AsRef<Path>>(&mut self, path: P) -> &mut Self {
        self.mount_point = path.as_ref().to_path_buf();
        self
    }

    pub fn set_dev_dir<P: AsRef<Path>>(&mut self, path: P) -> &mut Self {
        self.dev_dir = path.as_ref().to_path_buf();
        self
    }

    pub fn set_poll(&mut self, attempts: u32, interval_ms: u64) -> &mut Self {
        self.poll_attempts = attempts;
        self.poll_interval_ms = interval_ms;
        self
    }
}
