use log::{info, warn};

use crate::{parse_targets, Config, Runner, TargetRef};

/// open-iscsi front end: discovery plus node login/logout.
///
/// Each operation is a single `iscsiadm` invocation with no retry; success
/// means the command exited zero.
#[derive(Clone)]
pub struct Initiator<'a> {
    runner: &'a dyn Runner,
    iscsiadm: String,
}

impl<'a> Initiator<'a> {
    pub fn new(runner: &'a dyn Runner, config: &Config) -> Self {
        Initiator {
            runner,
            iscsiadm: config.iscsiadm().to_string(),
        }
    }

    /// sendtargets discovery against `ip:port`. A failed command yields no
    /// targets.
    pub fn discover(&self, ip: &str, port: u16) -> Vec<TargetRef> {
        let portal = format!("{}:{}", ip, port);
        let out = self
            .runner
            .run(&self.iscsiadm, &["-m", "discovery", "-t", "st", "-p", &portal]);
        if !out.success() {
            warn!("discovery on {} failed: {}", portal, out.text().trim_end());
            return Vec::new();
        }

        let targets = parse_targets(out.text());
        info!("discovered {} target(s) on {}", targets.len(), portal);
        targets
    }

    pub fn login(&self, target: &TargetRef) -> bool {
        let ok = self.node(target, "--login");
        if ok {
            info!("logged in to {}", target);
        }
        ok
    }

    /// Failures are logged, never escalated.
    pub fn logout(&self, target: &TargetRef) -> bool {
        let ok = self.node(target, "--logout");
        if ok {
            info!("logged out from {}", target);
        } else {
            warn!("logout from {} failed", target);
        }
        ok
    }

    fn node(&self, target: &TargetRef, op: &str) -> bool {
        let args = [
            "-m",
            "node",
            "--targetname",
            target.name(),
            "-p",
            target.endpoint(),
            op,
        ];
        self.runner.run(&self.iscsiadm, &args).success()
    }
}
