use std::fs;
use std::path::Path;

use anyhow::Result;

mod browser;
mod config;
mod device;
mod discovery;
mod error;
mod exec;
mod lifecycle;
mod mount;
mod orchestrator;
mod preflight;
mod prompt;
mod report;
mod session;

#[cfg(test)]
mod testing;

pub use browser::*;
pub use config::*;
pub use device::*;
pub use discovery::*;
pub use error::*;
pub use exec::*;
pub use lifecycle::*;
pub use mount::*;
pub use orchestrator::*;
pub use preflight::*;
pub use prompt::*;
pub use report::*;
pub use session::*;

/// names of the entries under `path`, sorted
pub(crate) fn entry_names<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let mut names = fs::read_dir(path)
        .map_err(ScsiError::Io)?
        .filter_map(|res| res.ok())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .collect::<Vec<String>>();
    names.sort();

    Ok(names)
}
