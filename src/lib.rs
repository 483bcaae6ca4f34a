//! SSD1683 E-Paper Display Driver
//!
//! A driver for the SSD1683 e-paper display controller as wired in the
//! Waveshare 4.2" V2 module (400x300, monochrome).
//!
//! ## Features
//!
//! - `no_std` compatible
//! - `embedded-hal` v1.0 support
//! - `embedded-graphics` integration (with `graphics` feature)
//! - Full and partial refresh modes with the panel's distinct per-mode
//!   command sequences
//! - Driver-owned frame buffer with a natural-sense drawing interface
//! - Async operation with refresh completion events (with `asynch` feature)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use core::convert::Infallible;
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::{InputPin, OutputPin};
//! use embedded_hal::spi::{Operation, SpiDevice};
//! use ssd1683::{Builder, Color, Dimensions, Display, Interface};
//!
//! # struct MockSpi;
//! # impl embedded_hal::spi::ErrorType for MockSpi { type Error = Infallible; }
//! # impl SpiDevice for MockSpi {
//! #     fn transaction(
//! #         &mut self,
//! #         _operations: &mut [Operation<'_, u8>],
//! #     ) -> Result<(), Self::Error> {
//! #         Ok(())
//! #     }
//! # }
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
//! # impl OutputPin for MockPin {
//! #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl InputPin for MockPin {
//! #     fn is_high(&mut self) -> Result<bool, Self::Error> { Ok(false) }
//! #     fn is_low(&mut self) -> Result<bool, Self::Error> { Ok(true) }
//! # }
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! # let spi = MockSpi;
//! # let dc = MockPin;
//! # let rst = MockPin;
//! # let busy = MockPin;
//! # let mut delay = MockDelay;
//! let interface = Interface::new(spi, dc, rst, busy);
//! let config = match Builder::new().dimensions(Dimensions::WAVESHARE_4IN2_V2).build() {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//!
//! let buffer = [0u8; 300 * 400 / 8];
//! let mut display = match Display::new(interface, config, buffer) {
//!     Ok(display) => display,
//!     Err(_) => return,
//! };
//!
//! // Cold start: reset, configure, blank the panel
//! let _ = display.init(&mut delay);
//!
//! // Draw and refresh
//! display.set_pixel(10, 10, Color::Black);
//! let _ = display.show(&mut delay);
//!
//! // Fast updates until the next full clean-up
//! let _ = display.select_partial_mode();
//! ```

#![no_std]

#[cfg(any(test, feature = "alloc"))]
extern crate alloc;

/// Color type for the monochrome panel
pub mod color;
/// SSD1683 command definitions
pub mod command;
/// Display configuration types and builder
pub mod config;
/// Core display operations
pub mod display;
/// Error types for the driver
pub mod error;
/// Hardware interface abstraction
pub mod interface;
/// Look-Up Table for the panel's voltage waveforms
pub mod lut;

/// Graphics support via embedded-graphics (requires `graphics` feature)
#[cfg(feature = "graphics")]
pub mod graphics;

/// Async driver and completion signaling (requires `asynch` feature)
#[cfg(feature = "asynch")]
pub mod asynch;

pub use color::Color;
pub use config::{Builder, Config, Dimensions, MAX_GATE_OUTPUTS, MAX_SOURCE_OUTPUTS};
pub use display::{Display, RefreshMode};
pub use error::{BuilderError, Error};
pub use interface::{BUSY_POLL_INTERVAL_MS, DisplayInterface, ErrorType, Interface, InterfaceError};

#[cfg(feature = "asynch")]
pub use asynch::{AsyncDisplay, AsyncDisplayInterface, AsyncInterface, RefreshEvents};
