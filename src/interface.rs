//! Hardware interface abstraction
//!
//! This module provides the [`DisplayInterface`] trait and the [`Interface`] struct
//! for communicating with the SSD1683 controller over SPI.
//!
//! ## Hardware Requirements
//!
//! The SSD1683 requires:
//! - SPI bus (MOSI + SCK); CS is managed by the [`SpiDevice`] implementation
//! - 3 GPIO pins:
//!   - **DC**: Data/Command select (output)
//!   - **RST**: Reset (output, active low)
//!   - **BUSY**: Busy status (input, active high)
//!
//! ## Example
//!
//! ```rust,no_run
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::{InputPin, OutputPin};
//! use embedded_hal::spi::{Operation, SpiDevice};
//! use ssd1683::{DisplayInterface, Interface};
//! # use core::convert::Infallible;
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
//! # let mut delay = MockDelay;
//! // Create interface with SPI and GPIO pins
//! let mut interface = Interface::new(MockSpi, MockPin, MockPin, MockPin);
//!
//! // Send command
//! let _ = interface.send_command(0x12); // Soft reset
//!
//! // Send data
//! let _ = interface.send_data(&[0xFF, 0x00, 0xFF]);
//!
//! // Wait for display ready
//! let _ = interface.busy_wait(&mut delay);
//! ```

use core::fmt::Debug;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;

type InterfaceResult<T, E> = core::result::Result<T, E>;

/// Trait for hardware interface to the SSD1683 controller
///
/// This trait abstracts over different hardware implementations,
/// allowing the [`Display`](crate::display::Display) to work with any
/// SPI + GPIO implementation that satisfies embedded-hal traits.
///
/// Associated error type for a display interface
///
/// Factored out of [`DisplayInterface`] (and its async counterpart
/// [`AsyncDisplayInterface`](crate::asynch::AsyncDisplayInterface)) so that
/// [`Error`](crate::error::Error) can name the interface error type
/// (`I::Error`) for both the blocking and async drivers through a single
/// bound. Mirrors the `embedded-hal` `ErrorType` idiom.
pub trait ErrorType {
    /// Error type for interface operations
    ///
    /// Must implement [`Debug`] for error reporting.
    type Error: Debug;
}

/// ## Implementing
///
/// For most cases, use the provided [`Interface`] struct. If you need
/// custom behavior (e.g., different pin polarities, additional CS control),
/// implement this trait on your own type.
pub trait DisplayInterface: ErrorType {
    /// Send a command byte to the controller
    ///
    /// The implementation must:
    /// 1. Set DC pin low (command mode)
    /// 2. Send the command byte over SPI
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication or GPIO fails.
    fn send_command(&mut self, command: u8) -> InterfaceResult<(), Self::Error>;

    /// Send data bytes to the controller
    ///
    /// The implementation must:
    /// 1. Set DC pin high (data mode)
    /// 2. Send the data bytes over SPI
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication or GPIO fails.
    fn send_data(&mut self, data: &[u8]) -> InterfaceResult<(), Self::Error>;

    /// Perform hardware reset
    ///
    /// The implementation must pulse RST high, low, high, holding each
    /// level for at least 20ms.
    ///
    /// # Arguments
    ///
    /// * `delay` - Delay implementation for timing
    fn reset<D: DelayNs>(&mut self, delay: &mut D);

    /// Read the busy line
    ///
    /// Returns true while the panel is processing a refresh. The host must
    /// not issue new commands while the line is asserted.
    ///
    /// # Errors
    ///
    /// Returns an error if the GPIO read fails.
    fn is_busy(&mut self) -> InterfaceResult<bool, Self::Error>;

    /// Wait for the busy line to clear
    ///
    /// Polls the BUSY pin every [`BUSY_POLL_INTERVAL_MS`] until it reports
    /// not-busy. By default this polls indefinitely; a bounded timeout is
    /// an opt-in extension (see [`Interface::set_busy_timeout`]).
    ///
    /// # Arguments
    ///
    /// * `delay` - Delay implementation for polling interval
    ///
    /// # Errors
    ///
    /// Returns [`InterfaceError::Timeout`] if a timeout was configured and
    /// BUSY does not clear within it.
    fn busy_wait<D: DelayNs>(&mut self, delay: &mut D) -> InterfaceResult<(), Self::Error>;
}

/// Errors that can occur at the interface level
///
/// Generic over SPI and GPIO error types.
#[derive(Debug)]
pub enum InterfaceError<SpiErr, PinErr> {
    /// SPI communication error
    Spi(SpiErr),
    /// GPIO pin error
    Pin(PinErr),
    /// Timeout waiting for busy pin
    Timeout,
}

impl<SpiErr: Debug, PinErr: Debug> core::fmt::Display for InterfaceError<SpiErr, PinErr> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Spi(e) => write!(f, "SPI error: {e:?}"),
            Self::Pin(e) => write!(f, "Pin error: {e:?}"),
            Self::Timeout => write!(f, "Timeout waiting for display"),
        }
    }
}

impl<SpiErr: Debug, PinErr: Debug> core::error::Error for InterfaceError<SpiErr, PinErr> {}

/// Poll interval for busy-waiting, in milliseconds
pub const BUSY_POLL_INTERVAL_MS: u32 = 100;

/// Hardware interface implementation for the SSD1683
///
/// Implements [`DisplayInterface`] for embedded-hal v1.0 SPI and GPIO traits.
///
/// ## Type Parameters
///
/// * `SPI` - SPI device implementing [`SpiDevice`]
/// * `DC` - Data/Command pin implementing [`OutputPin`]
/// * `RST` - Reset pin implementing [`OutputPin`]
/// * `BUSY` - Busy pin implementing [`InputPin`]
pub struct Interface<SPI, DC, RST, BUSY> {
    /// SPI device for communication
    spi: SPI,
    /// Data/Command select pin (low=command, high=data)
    dc: DC,
    /// Reset pin (active low)
    rst: RST,
    /// Busy pin (active high)
    busy: BUSY,
    /// Timeout for busy-wait in milliseconds (0 = poll indefinitely)
    busy_timeout_ms: u32,
}

impl<SPI, DC, RST, BUSY> Interface<SPI, DC, RST, BUSY>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
    BUSY: InputPin,
{
    /// Create a new Interface
    ///
    /// # Arguments
    ///
    /// * `spi` - SPI device (must implement [`SpiDevice`])
    /// * `dc` - Data/Command pin (output, low=command, high=data)
    /// * `rst` - Reset pin (output, active low)
    /// * `busy` - Busy pin (input, active high)
    pub fn new(spi: SPI, dc: DC, rst: RST, busy: BUSY) -> Self {
        Self {
            spi,
            dc,
            rst,
            busy,
            busy_timeout_ms: 0,
        }
    }

    /// Set the busy-wait timeout in milliseconds
    ///
    /// Default is 0: poll indefinitely, assuming the hardware eventually
    /// asserts ready. Setting a bound makes [`DisplayInterface::busy_wait`]
    /// return [`InterfaceError::Timeout`] after exhaustion so callers can
    /// escalate to a hardware reset.
    pub fn set_busy_timeout(&mut self, timeout_ms: u32) -> &mut Self {
        self.busy_timeout_ms = timeout_ms;
        self
    }

    /// Get the current busy-wait timeout in milliseconds (0 = unbounded)
    pub fn busy_timeout(&self) -> u32 {
        self.busy_timeout_ms
    }
}

impl<SPI, DC, RST, BUSY, PinErr> ErrorType for Interface<SPI, DC, RST, BUSY>
where
    SPI: SpiDevice,
    SPI::Error: Debug,
    DC: OutputPin<Error = PinErr>,
    RST: OutputPin<Error = PinErr>,
    BUSY: InputPin<Error = PinErr>,
    PinErr: Debug,
{
    type Error = InterfaceError<SPI::Error, PinErr>;
}

impl<SPI, DC, RST, BUSY, PinErr> DisplayInterface for Interface<SPI, DC, RST, BUSY>
where
    SPI: SpiDevice,
    SPI::Error: Debug,
    DC: OutputPin<Error = PinErr>,
    RST: OutputPin<Error = PinErr>,
    BUSY: InputPin<Error = PinErr>,
    PinErr: Debug,
{
    fn send_command(&mut self, command: u8) -> InterfaceResult<(), Self::Error> {
        self.dc.set_low().map_err(InterfaceError::Pin)?;
        self.spi.write(&[command]).map_err(InterfaceError::Spi)?;
        Ok(())
    }

    fn send_data(&mut self, data: &[u8]) -> InterfaceResult<(), Self::Error> {
        self.dc.set_high().map_err(InterfaceError::Pin)?;
        self.spi.write(data).map_err(InterfaceError::Spi)?;
        Ok(())
    }

    fn reset<D: DelayNs>(&mut self, delay: &mut D) {
        // Reset sequence: HIGH -> LOW -> HIGH, 20ms per level
        let _ = self.rst.set_high();
        delay.delay_ms(20);
        let _ = self.rst.set_low();
        delay.delay_ms(20);
        let _ = self.rst.set_high();
        delay.delay_ms(20);
    }

    fn is_busy(&mut self) -> InterfaceResult<bool, Self::Error> {
        self.busy.is_high().map_err(InterfaceError::Pin)
    }

    fn busy_wait<D: DelayNs>(&mut self, delay: &mut D) -> InterfaceResult<(), Self::Error> {
        let mut elapsed_ms = 0u32;
        let timeout_ms = self.busy_timeout_ms;

        loop {
            let is_busy = match self.busy.is_high() {
                Ok(value) => value,
                Err(e) => return Err(InterfaceError::Pin(e)),
            };

            if !is_busy {
                return Ok(());
            }

            delay.delay_ms(BUSY_POLL_INTERVAL_MS);
            elapsed_ms = elapsed_ms.saturating_add(BUSY_POLL_INTERVAL_MS);
            if timeout_ms > 0 && elapsed_ms >= timeout_ms {
                return Err(InterfaceError::Timeout);
            }
        }
    }
}
