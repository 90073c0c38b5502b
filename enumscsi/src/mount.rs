use std::fs;
use std::path::{Path, PathBuf};

use log::{error, info, warn};

use crate::{entry_names, Config, Runner};

/// A device mounted read-only at the configured mount point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountHandle {
    device: PathBuf,
    mount_point: PathBuf,
}

impl MountHandle {
    pub fn device(&self) -> &Path {
        &self.device
    }

    pub fn mount_point(&self) -> &Path {
        &self.mount_point
    }
}

/// Mounts and unmounts at a single fixed mount point, so only one device
/// can be attached at a time.
#[derive(Clone)]
pub struct Mounter<'a> {
    runner: &'a dyn Runner,
    blkid: String,
    mount: String,
    umount: String,
    mount_point: PathBuf,
}

impl<'a> Mounter<'a> {
    pub fn new(runner: &'a dyn Runner, config: &Config) -> Self {
        Mounter {
            runner,
            blkid: config.blkid().to_string(),
            mount: config.mount().to_string(),
            umount: config.umount().to_string(),
            mount_point: config.mount_point().to_path_buf(),
        }
    }

    pub fn mount_point(&self) -> &Path {
        &self.mount_point
    }

    /// Whether `blkid` recognises a filesystem signature on `device`. A
    /// missing `blkid` reads the same as an unformatted device.
    pub fn has_filesystem<P: AsRef<Path>>(&self, device: P) -> bool {
        let device = device.as_ref().to_string_lossy().to_string();
        self.runner.run(&self.blkid, &[&device]).success()
    }

    /// Mounts `device` read-only. Declines devices without a filesystem.
    pub fn mount<P: AsRef<Path>>(&self, device: P) -> Option<MountHandle> {
        let device = device.as_ref();
        if !self.mount_point.exists() {
            if let Err(e) = fs::create_dir_all(&self.mount_point) {
                error!(
                    "failed to create mount point {}: {}",
                    self.mount_point.display(),
                    e
                );
                return None;
            }
        }

        if !self.has_filesystem(device) {
            warn!("no filesystem signature on {}, not mounting", device.display());
            return None;
        }

        let dev = device.to_string_lossy().to_string();
        let target = self.mount_point.to_string_lossy().to_string();
        let out = self.runner.run(&self.mount, &["-o", "ro", &dev, &target]);
        if !out.success() {
            error!("mount {} failed: {}", dev, out.text().trim_end());
            return None;
        }

        info!("mounted {} at {}", dev, target);
        Some(MountHandle {
            device: device.to_path_buf(),
            mount_point: self.mount_point.clone(),
        })
    }

    /// Best-effort; the outcome is only logged.
    pub fn unmount<P: AsRef<Path>>(&self, device: P) -> bool {
        let dev = device.as_ref().to_string_lossy().to_string();
        let out = self.runner.run(&self.umount, &[&dev]);
        if out.success() {
            info!("unmounted {}", dev);
        } else {
            warn!("umount {} failed: {}", dev, out.text().trim_end());
        }
        out.success()
    }
}

/// Entry names at the top of `mount_point`; empty when unreadable.
pub fn list_contents<P: AsRef<Path>>(mount_point: P) -> Vec<String> {
    entry_names(mount_point.as_ref()).unwrap_or_else(|e| {
        warn!("failed to list {}: {}", mount_point.as_ref().display(), e);
        Vec::new()
    })
}
