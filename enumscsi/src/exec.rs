use std::process::Command;

use log::{debug, warn};

/// Result of an external command: exit status plus stdout and stderr merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Output {
    success: bool,
    text: String,
}

impl Output {
    pub fn new<S: Into<String>>(success: bool, text: S) -> Self {
        Output {
            success,
            text: text.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Runs external programs. Implementations never fail: a program that
/// cannot be spawned is reported as an unsuccessful `Output`.
///
/// There is no timeout, a hung child blocks the caller.
pub trait Runner {
    fn run(&self, program: &str, args: &[&str]) -> Output;

    /// run with the terminal inherited, used for pagers
    fn run_attached(&self, program: &str, args: &[&str]) -> bool;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl Runner for SystemRunner {
    fn run(&self, program: &str, args: &[&str]) -> Output {
        debug!("exec: {} {}", program, args.join(" "));

        match Command::new(program).args(args).output() {
            Ok(out) => {
                let mut text = String::from_utf8_lossy(&out.stdout).to_string();
                text.push_str(&String::from_utf8_lossy(&out.stderr));

                let success = out.status.success();
                if !success {
                    warn!("{} exited with {}: {}", program, out.status, text.trim_end());
                }
                Output::new(success, text)
            }
            Err(e) => {
                warn!("failed to execute {}: {}", program, e);
                Output::new(false, e.to_string())
            }
        }
    }

    fn run_attached(&self, program: &str, args: &[&str]) -> bool {
        debug!("exec (attached): {} {}", program, args.join(" "));

        match Command::new(program).args(args).status() {
            Ok(status) => status.success(),
            Err(e) => {
                warn!("failed to execute {}: {}", program, e);
                false
            }
        }
    }
}
