use std::io::{self, BufRead, Write};

use anyhow::Result;

use crate::ScsiError;

/// Line source for operator input.
pub trait Prompter {
    /// Shows `prompt` and reads one line without its terminator.
    /// Returns `None` once input is exhausted.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

#[derive(Debug, Default)]
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        let mut stdout = io::stdout();
        stdout.write_all(prompt.as_bytes())?;
        stdout.flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }

        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Choice {
    /// zero-based position of the selected item
    Index(usize),
    NotANumber,
    OutOfRange,
}

/// Parses a 1-based menu selection among `len` items.
pub fn parse_choice(input: &str, len: usize) -> Choice {
    match input.trim().parse::<usize>() {
        Ok(n) if n >= 1 && n <= len => Choice::Index(n - 1),
        Ok(_) => Choice::OutOfRange,
        Err(_) => Choice::NotANumber,
    }
}

/// Asks until a valid 1-based selection among `len` items is given and
/// returns its zero-based index.
pub fn choose(
    prompter: &mut dyn Prompter,
    out: &mut dyn Write,
    prompt: &str,
    len: usize,
    not_a_number: &str,
) -> Result<usize> {
    loop {
        let line = match prompter.read_line(prompt)? {
            Some(line) => line,
            None => anyhow::bail!(ScsiError::InputClosed(prompt.trim().to_string())),
        };

        match parse_choice(&line, len) {
            Choice::Index(idx) => return Ok(idx),
            Choice::NotANumber => writeln!(out, "{}", not_a_number)?,
            Choice::OutOfRange => writeln!(out, "Please choose between 1 and {}.", len)?,
        }
    }
}

/// y/n question; anything but `y` declines, as does closed input.
pub fn confirm(prompter: &mut dyn Prompter, prompt: &str) -> Result<bool> {
    let answer = prompter.read_line(prompt)?.unwrap_or_default();
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}
