use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The start request carried no 18-19 digit subject identifier. Surfaced
    /// to the caller as a structured failure; run state is left untouched.
    #[error("no numeric subject identifier found in link")]
    InvalidSubject,

    /// The device source could not be read. Soft condition: the run ends
    /// immediately with zero activity instead of failing the process.
    #[error("device source unavailable: {0}")]
    DeviceLoad(#[from] io::Error),
}
