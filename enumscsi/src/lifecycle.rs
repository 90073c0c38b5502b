use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use log::debug;

use crate::{Initiator, Mounter, TargetRef};

/// Tracks what one pass over a target has acquired and gives it back,
/// device first, session second.
///
/// Both resources are released at most once. Anything not yet released when
/// the guard is dropped is released then, with the messages discarded.
pub struct Teardown<'a> {
    mounter: Mounter<'a>,
    initiator: Initiator<'a>,
    device: Option<PathBuf>,
    session: Option<TargetRef>,
}

impl<'a> Teardown<'a> {
    pub fn new(mounter: Mounter<'a>, initiator: Initiator<'a>) -> Self {
        Teardown {
            mounter,
            initiator,
            device: None,
            session: None,
        }
    }

    /// Logout is attempted for `target` on release, whether or not the
    /// login went through.
    pub fn track_session(&mut self, target: &TargetRef) {
        self.session = Some(target.clone());
    }

    /// Unmount is attempted for `device` on release, whether or not the
    /// mount went through.
    pub fn track_device<P: AsRef<Path>>(&mut self, device: P) {
        self.device = Some(device.as_ref().to_path_buf());
    }

    pub fn device(&self) -> Option<&Path> {
        self.device.as_deref()
    }

    pub fn session(&self) -> Option<&TargetRef> {
        self.session.as_ref()
    }

    pub fn release(&mut self, out: &mut dyn Write) -> Result<()> {
        if let Some(device) = self.device.take() {
            self.mounter.unmount(&device);
            writeln!(out, "Device {} unmounted.", device.display())?;
        }

        if let Some(target) = self.session.take() {
            if self.initiator.logout(&target) {
                writeln!(out, "Logged out from {} at {}", target.name(), target.endpoint())?;
            }
        }

        Ok(())
    }
}

impl Drop for Teardown<'_> {
    fn drop(&mut self) {
        if self.device.is_some() || self.session.is_some() {
            debug!("releasing leftovers of an interrupted pass");
            self.release(&mut io::sink()).ok();
        }
    }
}

#[cfg(test)]
mod test {
    use anyhow::Result;

    use super::*;
    use crate::testing::ScriptedRunner;
    use crate::Config;

    fn target() -> TargetRef {
        TargetRef::new("192.168.1.50:3260", "iqn.2020-01.com.example:disk1")
    }

    #[test]
    fn test_release_order() -> Result<()> {
        let runner = ScriptedRunner::new();
        let cfg = Config::default();
        let mut teardown = Teardown::new(Mounter::new(&runner, &cfg), Initiator::new(&runner, &cfg));

        teardown.track_session(&target());
        teardown.track_device("/dev/sdb1");

        let mut out = Vec::new();
        teardown.release(&mut out)?;
        assert_eq!(
            runner.calls(),
            vec![
                "umount /dev/sdb1",
                "iscsiadm -m node --targetname iqn.2020-01.com.example:disk1 -p 192.168.1.50:3260 --logout",
            ]
        );
        assert_eq!(
            String::from_utf8(out)?,
            "Device /dev/sdb1 unmounted.\n\
             Logged out from iqn.2020-01.com.example:disk1 at 192.168.1.50:3260\n"
        );

        // nothing left to release
        teardown.release(&mut Vec::new())?;
        drop(teardown);
        assert_eq!(runner.calls().len(), 2);
        Ok(())
    }

    #[test]
    fn test_release_continues_after_failed_unmount() -> Result<()> {
        let runner = ScriptedRunner::new()
            .respond("umount", false, "umount: /dev/sdb1: not mounted.")
            .respond("iscsiadm", false, "iscsiadm: No matching sessions found");
        let cfg = Config::default();
        let mut teardown = Teardown::new(Mounter::new(&runner, &cfg), Initiator::new(&runner, &cfg));

        teardown.track_session(&target());
        teardown.track_device("/dev/sdb1");

        let mut out = Vec::new();
        teardown.release(&mut out)?;
        assert_eq!(runner.calls().len(), 2);
        assert!(!String::from_utf8(out)?.contains("Logged out"));
        Ok(())
    }

    #[test]
    fn test_release_nothing_tracked() -> Result<()> {
        let runner = ScriptedRunner::new();
        let cfg = Config::default();
        let mut teardown = Teardown::new(Mounter::new(&runner, &cfg), Initiator::new(&runner, &cfg));

        let mut out = Vec::new();
        teardown.release(&mut out)?;
        assert!(runner.calls().is_empty());
        assert!(out.is_empty());
        Ok(())
    }

    #[test]
    fn test_session_only() -> Result<()> {
        let runner = ScriptedRunner::new();
        let cfg = Config::default();
        let mut teardown = Teardown::new(Mounter::new(&runner, &cfg), Initiator::new(&runner, &cfg));

        teardown.track_session(&target());
        assert!(teardown.device().is_none());
        teardown.release(&mut Vec::new())?;
        assert_eq!(runner.calls().len(), 1);
        assert_eq!(runner.position("iscsiadm"), Some(0));
        Ok(())
    }

    #[test]
    fn test_drop_releases() {
        let runner = ScriptedRunner::new();
        let cfg = Config::default();
        {
            let mut teardown =
                Teardown::new(Mounter::new(&runner, &cfg), Initiator::new(&runner, &cfg));
            teardown.track_session(&target());
            teardown.track_device("/dev/sdc");
            assert_eq!(teardown.session(), Some(&target()));
        }
        assert_eq!(runner.position("umount /dev/sdc"), Some(0));
        assert_eq!(runner.position("iscsiadm"), Some(1));
    }
}
