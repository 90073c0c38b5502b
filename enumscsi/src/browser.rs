use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use log::debug;

use crate::{entry_names, Config, Prompter, Runner};

static HELP: &str = "Commands: ls, cd <dir>, copy <file> <dest>, cat <file>, less <file>, pwd, exit";
static UNKNOWN: &str = "Unknown command. Use 'help' for a list of commands.";

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Flow {
    Continue,
    Exit,
}

/// Line-command shell over a mounted tree.
pub struct Browser {
    current_dir: PathBuf,
    cat: String,
    less: String,
}

impl Browser {
    pub fn new<P: AsRef<Path>>(mount_point: P, config: &Config) -> Self {
        Browser {
            current_dir: mount_point.as_ref().to_path_buf(),
            cat: config.cat().to_string(),
            less: config.less().to_string(),
        }
    }

    pub fn current_dir(&self) -> &Path {
        &self.current_dir
    }

    /// Reads and executes commands until `exit` or end of input.
    pub fn run(
        &mut self,
        runner: &dyn Runner,
        prompter: &mut dyn Prompter,
        out: &mut dyn Write,
    ) -> Result<()> {
        loop {
            writeln!(out, "\nCurrent Directory: {}", self.current_dir.display())?;
            let prompt = format!("{}$ ", self.current_dir.display());
            let line = match prompter.read_line(&prompt)? {
                Some(line) => line,
                None => break,
            };

            if self.execute(&line, runner, out)? == Flow::Exit {
                break;
            }
        }

        Ok(())
    }

    pub fn execute(&mut self, line: &str, runner: &dyn Runner, out: &mut dyn Write) -> Result<Flow> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Flow::Continue);
        }

        let args = match split_words(line) {
            Some(args) => args,
            None => {
                writeln!(out, "Parsing error: unbalanced quotes or trailing escape")?;
                return Ok(Flow::Continue);
            }
        };
        let (cmd, rest) = match args.split_first() {
            Some((cmd, rest)) => (cmd.to_lowercase(), rest),
            None => return Ok(Flow::Continue),
        };
        debug!("browser: {} {:?}", cmd, rest);

        match (cmd.as_str(), rest) {
            ("exit", _) => {
                writeln!(out, "Exiting interactive mode...")?;
                return Ok(Flow::Exit);
            }
            ("ls", _) => self.ls(out)?,
            ("cd", [dir, ..]) => self.cd(dir, out)?,
            ("pwd", _) => writeln!(out, "{}", self.current_dir.display())?,
            ("help", _) => writeln!(out, "{}", HELP)?,
            ("copy", [src, dest]) => self.copy(src, dest, out)?,
            ("cat", [file]) => self.page(&self.cat, file, runner, out)?,
            ("less", [file]) => self.page(&self.less, file, runner, out)?,
            _ => writeln!(out, "{}", UNKNOWN)?,
        }

        Ok(Flow::Continue)
    }

    fn ls(&self, out: &mut dyn Write) -> Result<()> {
        if !self.current_dir.is_dir() {
            writeln!(out, "Directory {} not found.", self.current_dir.display())?;
            return Ok(());
        }

        match entry_names(&self.current_dir) {
            Ok(names) if names.is_empty() => writeln!(out, "Directory is empty.")?,
            Ok(names) => writeln!(out, "{}", names.join("\n"))?,
            Err(e) => writeln!(out, "Cannot list {}: {}", self.current_dir.display(), e)?,
        }
        Ok(())
    }

    fn cd(&mut self, dir: &str, out: &mut dyn Write) -> Result<()> {
        if dir == ".." {
            if let Some(parent) = self.current_dir.parent() {
                self.current_dir = parent.to_path_buf();
            }
            return Ok(());
        }

        let path = self.current_dir.join(dir);
        if path.is_dir() {
            self.current_dir = path;
        } else {
            writeln!(out, "Directory {} not found.", dir)?;
        }
        Ok(())
    }

    fn copy(&self, src: &str, dest: &str, out: &mut dyn Write) -> Result<()> {
        let src_path = self.current_dir.join(src);
        if !src_path.exists() {
            writeln!(out, "File {} does not exist.", src)?;
            return Ok(());
        }

        let mut dest_path = PathBuf::from(dest);
        if dest_path.is_dir() {
            if let Some(name) = src_path.file_name() {
                dest_path.push(name);
            }
        }

        match fs::copy(&src_path, &dest_path) {
            Ok(_) => writeln!(
                out,
                "Copied {} to {}",
                src_path.display(),
                dest_path.display()
            )?,
            Err(e) => writeln!(out, "Error copying file: {}", e)?,
        }
        Ok(())
    }

    fn page(&self, pager: &str, file: &str, runner: &dyn Runner, out: &mut dyn Write) -> Result<()> {
        let path = self.current_dir.join(file);
        if !path.exists() {
            writeln!(out, "File {} does not exist.", file)?;
            return Ok(());
        }

        let path = path.to_string_lossy().to_string();
        if !runner.run_attached(pager, &[&path]) {
            writeln!(out, "{} {} failed.", pager, file)?;
        }
        Ok(())
    }
}

/// POSIX word splitting without comments: a word may start with `#`.
fn split_words(line: &str) -> Option<Vec<String>> {
    let mut escaped = String::with_capacity(line.len());
    let mut quote = None;
    let mut backslash = false;
    let mut word_start = true;

    for ch in line.chars() {
        if backslash {
            backslash = false;
        } else if let Some(q) = quote {
            if ch == q {
                quote = None;
            } else if ch == '\\' && q == '"' {
                backslash = true;
            }
        } else {
            match ch {
                '\\' => backslash = true,
                '\'' | '"' => quote = Some(ch),
                '#' if word_start => escaped.push('\\'),
                _ => {}
            }
            word_start = ch.is_whitespace();
        }
        escaped.push(ch);
    }

    shlex::split(&escaped)
}
