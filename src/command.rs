//! SSD1683 command definitions
//!
//! This module defines the command bytes used to control the SSD1683
//! e-paper display controller. Commands are sent over SPI with the DC pin
//! low for commands and high for data.
//!
//! ## Command Structure
//!
//! All commands follow the pattern:
//! 1. Assert CS (Chip Select)
//! 2. Set DC low (command mode)
//! 3. Send command byte
//! 4. Set DC high (data mode)
//! 5. Send data bytes (if any)
//! 6. Deassert CS
//!
//! Full and partial refresh use **different** payload values for
//! [`DISPLAY_UPDATE_CONTROL`] and [`BORDER_WAVEFORM`]. The distinction is a
//! documented quirk of the panel: sending the full-mode values before a
//! partial refresh (or vice versa) produces ghosting or a corrupted image.
//! The per-mode payloads live in [`crate::Config`] so that the refresh code
//! cannot mix them up.

// System control commands

/// Soft reset command (0x12)
///
/// Resets the controller to default state. Must wait for BUSY low after issuing.
pub const SOFT_RESET: u8 = 0x12;

/// Data entry mode command (0x11)
///
/// Controls the address counter auto-increment direction.
/// Requires 1 byte; the panel uses 0x03 (X and Y increment, X-mode).
pub const DATA_ENTRY_MODE: u8 = 0x11;

/// Border waveform control command (0x3C)
///
/// Controls the border color and transition behavior.
/// Requires 1 byte: 0x05 for full refresh, 0x80 for partial refresh.
pub const BORDER_WAVEFORM: u8 = 0x3C;

// RAM window and data commands

/// Set RAM X address range command (0x44)
///
/// Sets the X (column) address window for RAM access. X is byte-addressed
/// on this controller: requires 2 bytes [start_byte, end_byte].
pub const SET_RAM_X_RANGE: u8 = 0x44;

/// Set RAM Y address range command (0x45)
///
/// Sets the Y (row) address window for RAM access.
/// Requires 4 bytes: [start_LSB, start_MSB, end_LSB, end_MSB]
pub const SET_RAM_Y_RANGE: u8 = 0x45;

/// Set RAM X address counter command (0x4E)
///
/// Sets the X address counter. Requires 1 byte (byte-addressed).
pub const SET_RAM_X_COUNTER: u8 = 0x4E;

/// Set RAM Y address counter command (0x4F)
///
/// Sets the Y address counter. Requires 2 bytes: [address_LSB, address_MSB]
pub const SET_RAM_Y_COUNTER: u8 = 0x4F;

/// Write to the current image RAM (0x24)
///
/// Writes pixel data to the register the controller displays from.
/// Bit=0: Black, Bit=1: White on the wire.
/// Requires pixel data bytes (width * height / 8).
pub const WRITE_RAM_CURRENT: u8 = 0x24;

/// Write to the previous image RAM (0x26)
///
/// Writes pixel data to the register the controller diffs against when
/// computing per-pixel transition waveforms. Full refresh writes both
/// registers; partial refresh writes only [`WRITE_RAM_CURRENT`] and lets
/// the panel-held previous image provide the diff baseline.
pub const WRITE_RAM_PREVIOUS: u8 = 0x26;

// Display update commands

/// Display update control command (0x21)
///
/// Selects how the RAM contents feed the update sequence.
/// Requires 2 bytes: [0x40, 0x00] for full refresh, [0x00, 0x00] for partial.
pub const DISPLAY_UPDATE_CONTROL: u8 = 0x21;

/// Display update sequence option command (0x22)
///
/// Selects the update sequence run by [`MASTER_ACTIVATION`].
/// Requires 1 byte: 0xF7 for full refresh, 0xFF for partial.
pub const DISPLAY_UPDATE_SEQUENCE: u8 = 0x22;

/// Master activation command (0x20)
///
/// Triggers the display update sequence. BUSY goes high during update.
pub const MASTER_ACTIVATION: u8 = 0x20;

// Power and LUT commands

/// Write LUT command (0x32)
///
/// Loads a custom Look-Up Table (waveform) for the display update.
/// Requires 233 bytes on this panel; see [`crate::lut`].
pub const WRITE_LUT: u8 = 0x32;

/// Deep sleep command (0x10)
///
/// Enters ultra-low power mode. Only a hardware reset can wake the panel.
/// Requires 1 byte: 0x01 = enter deep sleep.
pub const DEEP_SLEEP: u8 = 0x10;
