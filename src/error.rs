//! Error types for the driver
//!
//! This module defines error types for configuration building ([`BuilderError`])
//! and display operations ([`Error`]).
//!
//! ## Error Types
//!
//! - [`BuilderError`] - Errors during configuration construction
//! - [`Error`] - Runtime errors during display operations
//! - [`InterfaceError`](crate::interface::InterfaceError) - Low-level hardware communication errors
//!
//! A bus failure ([`Error::Interface`]) is not retried by the driver: the
//! wiring is assumed correct, and the failed operation leaves the refresh
//! state stuck non-idle so that callers polling readiness observe the hang
//! and can escalate (typically a hardware reset at the application level).

use crate::interface::ErrorType;

/// Maximum gate outputs (rows) supported by the SSD1683 controller
///
/// The SSD1683 drives up to 300 gate outputs.
pub const MAX_GATE_OUTPUTS: u16 = 300;

/// Maximum source outputs (columns) supported by the SSD1683 controller
///
/// The SSD1683 drives up to 400 source outputs.
pub const MAX_SOURCE_OUTPUTS: u16 = 400;

/// Errors that can occur when interacting with the display
///
/// Generic over the interface type to preserve the specific error type.
/// This allows error handling code to match on the underlying hardware error.
#[derive(Debug)]
pub enum Error<I: ErrorType> {
    /// Interface error (SPI/GPIO)
    ///
    /// Wraps the underlying hardware error from the [`DisplayInterface`]
    /// implementation. Fatal for the current operation; no retry is attempted.
    Interface(I::Error),
    /// A refresh is already in progress
    ///
    /// `show()` was called while a previous refresh had not yet completed.
    /// The request is rejected, never queued. Wait for readiness (or the
    /// completion event under the async driver) before retrying.
    Busy,
    /// Partial refresh requested on a panel configured without it
    ///
    /// Reported when selecting partial mode on a [`crate::Config`] built
    /// with `supports_partial(false)`.
    PartialUnsupported,
    /// Frame buffer has the wrong size
    ///
    /// The buffer handed to the driver must be exactly
    /// `dimensions.buffer_size()` bytes; it is never resized after
    /// construction.
    BufferSizeMismatch {
        /// Required buffer size in bytes
        expected: usize,
        /// Provided buffer size in bytes
        provided: usize,
    },
    /// Invalid LUT length
    ///
    /// The panel requires exactly [`crate::lut::LUT_SIZE`] bytes.
    InvalidLutLength {
        /// Expected length
        expected: usize,
        /// Provided length
        provided: usize,
    },
}

impl<I: ErrorType> core::fmt::Display for Error<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Interface(_) => write!(f, "Interface error"),
            Self::Busy => write!(f, "Display is busy: refresh in progress"),
            Self::PartialUnsupported => write!(f, "Partial refresh not supported by this panel"),
            Self::BufferSizeMismatch { expected, provided } => {
                write!(
                    f,
                    "Buffer size mismatch: expected {expected} bytes, provided {provided}"
                )
            }
            Self::InvalidLutLength { expected, provided } => {
                write!(
                    f,
                    "Invalid LUT length: expected {expected} bytes, provided {provided}"
                )
            }
        }
    }
}

impl<I: ErrorType + core::fmt::Debug> core::error::Error for Error<I> {}

/// Errors that can occur when building configuration
///
/// These errors occur during the builder pattern before the display is created.
#[derive(Debug)]
pub enum BuilderError {
    /// Dimensions were not specified
    ///
    /// [`Builder::dimensions()`](crate::config::Builder::dimensions) must be called before building.
    MissingDimensions,
    /// Invalid dimensions provided
    ///
    /// See [`Dimensions::new()`](crate::config::Dimensions::new) for constraints.
    InvalidDimensions {
        /// Number of rows (height) requested
        rows: u16,
        /// Number of columns (width) requested
        cols: u16,
    },
    /// Partial start mode requested on a panel configured without partial refresh
    ///
    /// `start_partial(true)` conflicts with `supports_partial(false)`.
    /// The capability is checked here, at composition time, rather than deep
    /// inside the refresh path.
    PartialUnsupported,
}

impl core::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingDimensions => write!(f, "Dimensions must be specified"),
            Self::InvalidDimensions { rows, cols } => write!(
                f,
                "Invalid dimensions {rows}x{cols} (max {MAX_GATE_OUTPUTS}x{MAX_SOURCE_OUTPUTS}, cols must be multiple of 8)"
            ),
            Self::PartialUnsupported => {
                write!(f, "start_partial requires a panel with partial refresh support")
            }
        }
    }
}

impl core::error::Error for BuilderError {}
