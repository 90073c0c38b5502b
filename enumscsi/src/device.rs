use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use log::{debug, info, warn};
use regex::Regex;

use crate::{choose, entry_names, Config, Prompter};

/// Block device leaf names seen under the device namespace at one instant.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeviceSet {
    names: BTreeSet<String>,
}

impl DeviceSet {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        DeviceSet {
            names: names.into_iter().map(|s| s.as_ref().to_string()).collect(),
        }
    }

    /// entries of `dev_dir` whose name matches `pattern`
    pub fn scan<P: AsRef<Path>>(dev_dir: P, pattern: &Regex) -> Result<Self> {
        let names = entry_names(dev_dir)?
            .into_iter()
            .filter(|name| pattern.is_match(name));
        Ok(DeviceSet::from_names(names))
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// sorted names
    pub fn names(&self) -> Vec<&str> {
        self.names.iter().map(|s| s.as_str()).collect()
    }

    /// names present here but not in `before`
    pub fn added_since(&self, before: &DeviceSet) -> DeviceSet {
        DeviceSet {
            names: self.names.difference(&before.names).cloned().collect(),
        }
    }

    /// every entry that extends `base`, e.g. `sdb1` and `sdb2` for `sdb`
    pub fn partitions_of(&self, base: &str) -> Vec<&str> {
        self.names
            .iter()
            .filter(|name| name.starts_with(base) && name.as_str() != base)
            .map(|s| s.as_str())
            .collect()
    }
}

/// Calls `scan` up to `attempts` times, sleeping `interval` before each
/// call, until it reports something missing from `before`. Returns the new
/// names, empty when the window expired.
pub fn wait_for_new<F>(before: &DeviceSet, attempts: u32, interval: Duration, mut scan: F) -> DeviceSet
where
    F: FnMut() -> DeviceSet,
{
    for attempt in 1..=attempts {
        thread::sleep(interval);

        let added = scan().added_since(before);
        if !added.is_empty() {
            debug!("new devices after {} attempt(s): {:?}", attempt, added.names());
            return added;
        }
    }

    DeviceSet::default()
}

/// Finds the block device a fresh login produced.
pub struct DeviceFinder {
    dev_dir: PathBuf,
    pattern: Regex,
    attempts: u32,
    interval: Duration,
}

impl DeviceFinder {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(DeviceFinder {
            dev_dir: config.dev_dir().to_path_buf(),
            pattern: config.device_regex()?,
            attempts: config.poll_attempts(),
            interval: config.poll_interval(),
        })
    }

    /// Current device set. An unreadable namespace reads as empty.
    pub fn snapshot(&self) -> DeviceSet {
        DeviceSet::scan(&self.dev_dir, &self.pattern).unwrap_or_else(|e| {
            warn!("failed to read {}: {}", self.dev_dir.display(), e);
            DeviceSet::default()
        })
    }

    pub fn device_path(&self, name: &str) -> PathBuf {
        self.dev_dir.join(name)
    }

    /// Waits for devices missing from `before` and settles on one path,
    /// asking the operator when there is more than one candidate disk or
    /// partition. `None` when nothing appeared within the poll window.
    pub fn find(
        &self,
        before: &DeviceSet,
        prompter: &mut dyn Prompter,
        out: &mut dyn Write,
    ) -> Result<Option<PathBuf>> {
        writeln!(out, "Waiting for new iSCSI devices to appear...")?;
        let added = wait_for_new(before, self.attempts, self.interval, || self.snapshot());
        if added.is_empty() {
            info!("no new device under {}", self.dev_dir.display());
            return Ok(None);
        }

        let candidates = added.names();
        let base = if candidates.len() == 1 {
            candidates[0].to_string()
        } else {
            writeln!(out, "\nMultiple new devices detected:")?;
            for (idx, name) in candidates.iter().enumerate() {
                writeln!(out, "{}. {}", idx + 1, self.device_path(name).display())?;
            }
            let prompt = format!("Select a device (1-{}): ", candidates.len());
            let idx = choose(prompter, out, &prompt, candidates.len(), "Please enter a number.")?;
            candidates[idx].to_string()
        };

        let current = self.snapshot();
        let partitions = current.partitions_of(&base);
        if partitions.is_empty() {
            return Ok(Some(self.device_path(&base)));
        }

        writeln!(out, "\nAvailable partitions:")?;
        for (idx, name) in partitions.iter().enumerate() {
            writeln!(out, "{}. {}", idx + 1, self.device_path(name).display())?;
        }
        let prompt = format!("Select a partition to mount (1-{}): ", partitions.len());
        let idx = choose(prompter, out, &prompt, partitions.len(), "Please enter a number.")?;

        Ok(Some(self.device_path(partitions[idx])))
    }
}
