use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScsiError {
    #[error("A fatal error occured: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Unknown(#[from] anyhow::Error),

    #[error("Invalid IP address format: {0}")]
    InvalidIp(String),
    #[error("Invalid device pattern '{0}'.")]
    BadPattern(String),
    #[error("Failed to parse config: {0}")]
    BadConfig(String),

    #[error("Input closed while waiting for '{0}'.")]
    InputClosed(String),

    #[error("Failed to open output file '{0}'.")]
    OutputOpen(String),
    #[error("Failed to write output file '{0}'.")]
    OutputWrite(String),
}
