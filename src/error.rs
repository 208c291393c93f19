//! Error types for the gaze tracking library.

use crate::session::SessionState;
use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image encoding or decoding failed
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// The gaze sample source could not be brought up (camera missing, permission denied)
    #[error("Initialization failed: {0}")]
    Initialization(String),

    /// The requested operation is not legal in the current session state
    #[error("Cannot {action} while session is {from}")]
    InvalidTransition {
        /// State the session was in when the request arrived
        from: SessionState,
        /// Operation that was requested
        action: &'static str,
    },

    /// A tracking session is already running
    #[error("Session conflict: {0}")]
    SessionConflict(String),

    /// Tracking requires a valid calibration first
    #[error("No valid calibration is available")]
    NotCalibrated,

    /// Point-based calibration still has unconfirmed targets
    #[error("Calibration incomplete: {remaining} confirmations outstanding")]
    CalibrationIncomplete {
        /// Confirmations still required across all targets
        remaining: u32,
    },

    /// Tracking finished without collecting a single sample
    #[error("No gaze samples were collected during the session")]
    EmptySession,

    /// Image geometry was not available when the session was reduced
    #[error("Image bounds are not available; raw samples were kept for a retry")]
    MissingGeometry,

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The gaze sample source reported a failure
    #[error("Sample source error: {0}")]
    SampleSource(String),

    /// The persistence collaborator rejected a result
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic I/O error with description
    #[error("I/O error: {0}")]
    IoError(String),
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
