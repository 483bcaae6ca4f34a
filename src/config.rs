//! Display configuration types and builder

pub use crate::error::{BuilderError, MAX_GATE_OUTPUTS, MAX_SOURCE_OUTPUTS};

/// Display dimensions
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dimensions {
    /// Number of rows (height in pixels, corresponds to gate outputs)
    pub rows: u16,
    /// Number of columns (width in pixels, corresponds to source outputs)
    pub cols: u16,
}

impl Dimensions {
    /// Create new dimensions with validation
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::InvalidDimensions` if:
    /// - rows == 0 or rows > MAX_GATE_OUTPUTS
    /// - cols == 0 or cols > MAX_SOURCE_OUTPUTS
    /// - cols % 8 != 0 (must be byte-aligned for memory)
    pub fn new(rows: u16, cols: u16) -> Result<Self, BuilderError> {
        if rows == 0 || rows > MAX_GATE_OUTPUTS {
            return Err(BuilderError::InvalidDimensions { rows, cols });
        }
        if cols == 0 || cols > MAX_SOURCE_OUTPUTS || !cols.is_multiple_of(8) {
            return Err(BuilderError::InvalidDimensions { rows, cols });
        }
        Ok(Self { rows, cols })
    }

    /// Dimensions of the Waveshare 4.2" V2 panel (400x300)
    pub const WAVESHARE_4IN2_V2: Self = Self {
        rows: 300,
        cols: 400,
    };

    /// Calculate required buffer size in bytes
    pub fn buffer_size(&self) -> usize {
        (self.rows as usize * self.cols as usize) / 8
    }

    /// Width of one row in bytes
    pub fn row_bytes(&self) -> usize {
        self.cols as usize / 8
    }
}

/// Display configuration
///
/// This struct holds all configurable parameters for the SSD1683 controller.
/// The per-mode command payloads default to the Waveshare 4.2" V2 values and
/// must match the target panel's datasheet bit-for-bit.
/// Use [`Builder`] to create a Config.
#[derive(Clone, Debug)]
pub struct Config {
    /// Display dimensions
    pub dimensions: Dimensions,
    /// Whether the driver starts out in partial refresh mode
    pub start_partial: bool,
    /// Whether the panel supports partial refresh at all
    pub supports_partial: bool,
    /// Data entry mode byte (0x03 = X-mode, X and Y increment)
    pub data_entry_mode: u8,
    /// Border waveform payload for full refresh
    pub border_waveform_full: u8,
    /// Border waveform payload for partial refresh
    pub border_waveform_partial: u8,
    /// Display update control payload for full refresh (2 bytes)
    pub update_control_full: [u8; 2],
    /// Display update control payload for partial refresh (2 bytes)
    pub update_control_partial: [u8; 2],
    /// Update sequence option for full refresh activation
    pub activate_full: u8,
    /// Update sequence option for partial refresh activation
    pub activate_partial: u8,
    /// Deep sleep mode payload
    pub deep_sleep_mode: u8,
}

/// Builder for constructing display configuration
///
/// # Example
///
/// ```
/// use ssd1683::{Builder, Dimensions};
///
/// let config = match Builder::new()
///     .dimensions(Dimensions::WAVESHARE_4IN2_V2)
///     .start_partial(false)
///     .build()
/// {
///     Ok(config) => config,
///     Err(_) => return,
/// };
/// let _ = config;
/// ```
#[must_use]
pub struct Builder {
    /// Display dimensions (required)
    dimensions: Option<Dimensions>,
    /// Start in partial refresh mode
    start_partial: bool,
    /// Panel supports partial refresh
    supports_partial: bool,
    /// Data entry mode byte
    data_entry_mode: u8,
    /// Border waveform payload for full refresh
    border_waveform_full: u8,
    /// Border waveform payload for partial refresh
    border_waveform_partial: u8,
    /// Display update control payload for full refresh
    update_control_full: [u8; 2],
    /// Display update control payload for partial refresh
    update_control_partial: [u8; 2],
    /// Update sequence option for full refresh activation
    activate_full: u8,
    /// Update sequence option for partial refresh activation
    activate_partial: u8,
    /// Deep sleep mode payload
    deep_sleep_mode: u8,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            dimensions: None,
            start_partial: false,
            supports_partial: true,
            // X-mode: X and Y auto-increment
            data_entry_mode: 0x03,
            // Full and partial refresh use different border waveforms
            border_waveform_full: 0x05,
            border_waveform_partial: 0x80,
            // ...and different display update control values
            update_control_full: [0x40, 0x00],
            update_control_partial: [0x00, 0x00],
            // Update sequence options for master activation
            activate_full: 0xF7,
            activate_partial: 0xFF,
            // Deep sleep mode 1: RAM content retained
            deep_sleep_mode: 0x01,
        }
    }
}

impl Builder {
    /// Create a new Builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set display dimensions (required)
    pub fn dimensions(mut self, dims: Dimensions) -> Self {
        self.dimensions = Some(dims);
        self
    }

    /// Start the driver in partial refresh mode
    ///
    /// The first `show()` after initialization then uses the partial
    /// command sequence. Requires partial refresh support.
    pub fn start_partial(mut self, value: bool) -> Self {
        self.start_partial = value;
        self
    }

    /// Declare whether the panel supports partial refresh
    ///
    /// Panels whose OTP waveform lacks a partial LUT must set this to false;
    /// selecting partial mode on such a driver returns
    /// [`Error::PartialUnsupported`](crate::Error::PartialUnsupported).
    pub fn supports_partial(mut self, value: bool) -> Self {
        self.supports_partial = value;
        self
    }

    /// Set data entry mode
    pub fn data_entry_mode(mut self, value: u8) -> Self {
        self.data_entry_mode = value;
        self
    }

    /// Set the border waveform payload for full refresh
    pub fn border_waveform_full(mut self, value: u8) -> Self {
        self.border_waveform_full = value;
        self
    }

    /// Set the border waveform payload for partial refresh
    pub fn border_waveform_partial(mut self, value: u8) -> Self {
        self.border_waveform_partial = value;
        self
    }

    /// Set the display update control payload for full refresh
    pub fn update_control_full(mut self, value: [u8; 2]) -> Self {
        self.update_control_full = value;
        self
    }

    /// Set the display update control payload for partial refresh
    pub fn update_control_partial(mut self, value: [u8; 2]) -> Self {
        self.update_control_partial = value;
        self
    }

    /// Set the update sequence option for full refresh activation
    pub fn activate_full(mut self, value: u8) -> Self {
        self.activate_full = value;
        self
    }

    /// Set the update sequence option for partial refresh activation
    pub fn activate_partial(mut self, value: u8) -> Self {
        self.activate_partial = value;
        self
    }

    /// Set the deep sleep mode payload
    pub fn deep_sleep_mode(mut self, value: u8) -> Self {
        self.deep_sleep_mode = value;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// - [`BuilderError::MissingDimensions`] if dimensions were not set
    /// - [`BuilderError::PartialUnsupported`] if `start_partial(true)` was
    ///   combined with `supports_partial(false)`
    pub fn build(self) -> Result<Config, BuilderError> {
        let dimensions = self.dimensions.ok_or(BuilderError::MissingDimensions)?;
        if self.start_partial && !self.supports_partial {
            return Err(BuilderError::PartialUnsupported);
        }
        Ok(Config {
            dimensions,
            start_partial: self.start_partial,
            supports_partial: self.supports_partial,
            data_entry_mode: self.data_entry_mode,
            border_waveform_full: self.border_waveform_full,
            border_waveform_partial: self.border_waveform_partial,
            update_control_full: self.update_control_full,
            update_control_partial: self.update_control_partial,
            activate_full: self.activate_full,
            activate_partial: self.activate_partial,
            deep_sleep_mode: self.deep_sleep_mode,
        })
    }
}
