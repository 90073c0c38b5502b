use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::ScsiError;

static HEADER: &str = "Output for iSCSI target discovery and operations\n\n";

/// Output file collecting the listings of a run.
#[derive(Debug, Clone)]
pub struct Report {
    path: PathBuf,
}

impl Report {
    /// Truncates `path` and writes the header.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Report> {
        let path = path.as_ref().to_path_buf();
        fs::write(&path, HEADER)
            .map_err(|_| ScsiError::OutputOpen(path.display().to_string()))?;

        Ok(Report { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, text: &str) -> Result<()> {
        let err = || ScsiError::OutputWrite(self.path.display().to_string());

        let mut fd = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(|_| err())?;
        fd.write_all(text.as_bytes()).map_err(|_| err())?;

        Ok(())
    }
}

/// Listing block for one mount.
pub fn format_listing(header: &str, files: &[String]) -> String {
    let mut text = format!("{}\n", header);
    if files.is_empty() {
        text.push_str("No files found.\n");
    } else {
        text.push_str(&files.join("\n"));
        text.push('\n');
    }
    text
}
