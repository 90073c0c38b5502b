//! Scripted stand-ins for the terminal and for external programs.

use std::cell::RefCell;
use std::collections::VecDeque;

use anyhow::Result;

use crate::{Output, Prompter, Runner};

type Hook = Box<dyn Fn()>;

/// Answers every command with the first rule whose prefix matches the
/// command line, or with an empty success.
#[derive(Default)]
pub(crate) struct ScriptedRunner {
    rules: Vec<(String, Output)>,
    hooks: Vec<(String, Hook)>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedRunner {
    pub(crate) fn new() -> Self {
        ScriptedRunner::default()
    }

    pub(crate) fn respond(mut self, prefix: &str, success: bool, text: &str) -> Self {
        self.rules
            .push((prefix.to_string(), Output::new(success, text)));
        self
    }

    /// runs `hook` whenever a command starting with `prefix` is executed
    pub(crate) fn on<F: Fn() + 'static>(mut self, prefix: &str, hook: F) -> Self {
        self.hooks.push((prefix.to_string(), Box::new(hook)));
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub(crate) fn position(&self, prefix: &str) -> Option<usize> {
        self.calls.borrow().iter().position(|c| c.starts_with(prefix))
    }

    fn record(&self, program: &str, args: &[&str]) -> String {
        let mut line = program.to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        self.calls.borrow_mut().push(line.clone());

        for (prefix, hook) in &self.hooks {
            if line.starts_with(prefix.as_str()) {
                hook();
            }
        }
        line
    }
}

impl Runner for ScriptedRunner {
    fn run(&self, program: &str, args: &[&str]) -> Output {
        let line = self.record(program, args);
        self.rules
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map(|(_, out)| out.clone())
            .unwrap_or_else(|| Output::new(true, ""))
    }

    fn run_attached(&self, program: &str, args: &[&str]) -> bool {
        let line = self.record(program, args);
        self.rules
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map(|(_, out)| out.success())
            .unwrap_or(true)
    }
}

/// Replays canned answers; runs dry with `None` like a closed stdin.
#[derive(Default)]
pub(crate) struct ScriptedPrompter {
    answers: VecDeque<String>,
    prompts: Vec<String>,
}

impl ScriptedPrompter {
    pub(crate) fn new(answers: &[&str]) -> Self {
        ScriptedPrompter {
            answers: answers.iter().map(|s| s.to_string()).collect(),
            prompts: Vec::new(),
        }
    }

    pub(crate) fn prompts(&self) -> &[String] {
        &self.prompts
    }

    pub(crate) fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Prompter for ScriptedPrompter {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.answers.pop_front())
    }
}
