use std::io::Write;
use std::path::Path;

use anyhow::Result;
use log::{debug, info};

use crate::{
    choose, confirm, format_listing, list_contents, Browser, Config, DeviceFinder, Initiator,
    Mounter, Prompter, Report, Runner, TargetRef, Teardown,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// every discovered target in turn, listing only
    All,
    /// one selected target at a time, listing its contents
    Single,
    /// one selected target at a time, browsing it
    Interactive,
}

/// Where a pass over a target currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    TargetSelected,
    LoggedIn,
    DeviceFound,
    Mounted,
    Browsing,
    Listed,
    CleanedUp,
}

/// How a pass over a target ended. Every outcome has been cleaned up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    LoginFailed,
    NoDevice,
    MountFailed,
    Done,
}

/// Drives discovery, then select → login → find device → mount →
/// list or browse → cleanup for each target.
pub struct Orchestrator<'a> {
    config: &'a Config,
    runner: &'a dyn Runner,
    prompter: &'a mut dyn Prompter,
    out: &'a mut dyn Write,
    finder: DeviceFinder,
    report: Option<Report>,
    state: State,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        config: &'a Config,
        runner: &'a dyn Runner,
        prompter: &'a mut dyn Prompter,
        out: &'a mut dyn Write,
    ) -> Result<Self> {
        Ok(Orchestrator {
            config,
            runner,
            prompter,
            out,
            finder: DeviceFinder::new(config)?,
            report: None,
            state: State::Idle,
        })
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// listings are appended to `report` as well
    pub fn with_report(mut self, report: Report) -> Self {
        self.report = Some(report);
        self
    }

    /// Discovers the targets behind `ip:port` and processes them. No targets
    /// ends the run with a message.
    pub fn discover_and_run(&mut self, ip: &str, port: u16, mode: Mode) -> Result<()> {
        let targets = Initiator::new(self.runner, self.config).discover(ip, port);
        if targets.is_empty() {
            writeln!(self.out, "No iSCSI targets found.")?;
            return Ok(());
        }

        self.run(&targets, mode)
    }

    pub fn run(&mut self, targets: &[TargetRef], mode: Mode) -> Result<()> {
        if mode == Mode::All {
            for target in targets {
                writeln!(
                    self.out,
                    "\nProcessing target: {} at {}",
                    target.name(),
                    target.endpoint()
                )?;
                let outcome = self.process(target, mode)?;
                info!("{}: {:?}", target, outcome);
            }
            return Ok(());
        }

        loop {
            let target = self.select_target(targets)?;
            writeln!(
                self.out,
                "Selected target: {} at {}",
                target.name(),
                target.endpoint()
            )?;

            let outcome = self.process(&target, mode)?;
            info!("{}: {:?}", target, outcome);
            if outcome != Outcome::Done {
                continue;
            }

            let again = confirm(
                &mut *self.prompter,
                "\nWould you like to choose another iSCSI target? (y/n): ",
            )?;
            if !again {
                break;
            }
        }

        Ok(())
    }

    /// One full pass over `target`. Whatever was acquired is released before
    /// this returns, unmount first.
    pub fn process(&mut self, target: &TargetRef, mode: Mode) -> Result<Outcome> {
        let mut teardown = Teardown::new(
            Mounter::new(self.runner, self.config),
            Initiator::new(self.runner, self.config),
        );

        let outcome = self.attach(target, mode, &mut teardown);
        teardown.release(&mut *self.out)?;
        self.enter(target, State::CleanedUp);
        self.enter(target, State::Idle);

        outcome
    }

    fn attach(&mut self, target: &TargetRef, mode: Mode, teardown: &mut Teardown<'a>) -> Result<Outcome> {
        self.enter(target, State::TargetSelected);
        let before = self.finder.snapshot();

        teardown.track_session(target);
        if !Initiator::new(self.runner, self.config).login(target) {
            return self.fail(mode, Outcome::LoginFailed);
        }
        self.enter(target, State::LoggedIn);

        let device = match self.finder.find(&before, &mut *self.prompter, &mut *self.out)? {
            Some(device) => device,
            None => return self.fail(mode, Outcome::NoDevice),
        };
        self.enter(target, State::DeviceFound);

        teardown.track_device(&device);
        let handle = match Mounter::new(self.runner, self.config).mount(&device) {
            Some(handle) => handle,
            None => return self.fail(mode, Outcome::MountFailed),
        };
        self.enter(target, State::Mounted);

        let mount_point = handle.mount_point();
        match mode {
            Mode::Interactive => {
                self.enter(target, State::Browsing);
                let mut browser = Browser::new(mount_point, self.config);
                browser.run(self.runner, &mut *self.prompter, &mut *self.out)?;
            }
            Mode::All => {
                let header = format!("Files in {} for target {}:", mount_point.display(), target.name());
                self.list(mount_point, &header)?;
                self.enter(target, State::Listed);
            }
            Mode::Single => {
                let header = format!("Files in {}:", mount_point.display());
                self.list(mount_point, &header)?;
                self.enter(target, State::Listed);
            }
        }

        Ok(Outcome::Done)
    }

    fn select_target(&mut self, targets: &[TargetRef]) -> Result<TargetRef> {
        writeln!(self.out, "\nAvailable iSCSI Targets:")?;
        for (idx, target) in targets.iter().enumerate() {
            writeln!(self.out, "{}. {}", idx + 1, target)?;
        }

        let prompt = format!("Select a target (1-{}): ", targets.len());
        let idx = choose(
            &mut *self.prompter,
            &mut *self.out,
            &prompt,
            targets.len(),
            "Invalid input. Please enter a number.",
        )?;

        Ok(targets[idx].clone())
    }

    fn list(&mut self, mount_point: &Path, header: &str) -> Result<()> {
        let text = format_listing(header, &list_contents(mount_point));
        write!(self.out, "{}", text)?;

        if let Some(report) = &self.report {
            report.append(&text)?;
        }
        Ok(())
    }

    fn fail(&mut self, mode: Mode, outcome: Outcome) -> Result<Outcome> {
        let msg = match (mode, outcome) {
            (Mode::All, Outcome::LoginFailed) => "Login failed.",
            (Mode::All, Outcome::NoDevice) => "No new device found.",
            (Mode::All, _) => "Mount failed.",
            (_, Outcome::LoginFailed) => "Login to target failed.",
            (_, Outcome::NoDevice) => "iSCSI device not found.",
            (_, _) => "Failed to mount device.",
        };
        writeln!(self.out, "{}", msg)?;

        Ok(outcome)
    }

    fn enter(&mut self, target: &TargetRef, state: State) {
        debug!("{} {:?} -> {:?}", target.name(), self.state, state);
        self.state = state;
    }
}
