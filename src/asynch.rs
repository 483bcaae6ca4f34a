//! Async driver with cooperative refresh and completion signaling
//!
//! [`AsyncDisplay`] mirrors [`Display`](crate::Display) for cooperative
//! executors (e.g. embassy): the row transmission loop yields back to the
//! scheduler after every row, and refresh progress is published through two
//! [`Signal`]s in a caller-owned [`RefreshEvents`]:
//!
//! - `updated`: the frame has been transmitted and the panel commanded
//! - `complete`: the panel has settled and the busy line cleared
//!
//! Other tasks await either event without polling. Run `show()` as its own
//! task to keep the application loop responsive:
//!
//! ```text
//! static EVENTS: RefreshEvents = RefreshEvents::new();
//!
//! #[embassy_executor::task]
//! async fn refresh(mut display: ClockDisplay, mut delay: Delay) {
//!     loop {
//!         REDRAW.wait().await;
//!         if let Err(e) = display.show(&mut delay).await {
//!             error!("refresh failed: {:?}", e);
//!             return;
//!         }
//!     }
//! }
//!
//! // elsewhere: EVENTS.complete.wait().await;
//! ```
//!
//! A refresh cannot be cancelled once started; the busy-state check is the
//! sole mutual exclusion. Calling `show()` while a refresh is in flight
//! returns [`Error::Busy`] instead of queuing.

use core::fmt::Debug;

use embassy_futures::yield_now;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::digital::Wait;
use embedded_hal_async::spi::SpiDevice;
use log::debug;

use crate::color::Color;
use crate::command::{
    BORDER_WAVEFORM, DATA_ENTRY_MODE, DEEP_SLEEP, DISPLAY_UPDATE_CONTROL, DISPLAY_UPDATE_SEQUENCE,
    MASTER_ACTIVATION, SET_RAM_X_COUNTER, SET_RAM_X_RANGE, SET_RAM_Y_COUNTER, SET_RAM_Y_RANGE,
    SOFT_RESET, WRITE_RAM_CURRENT, WRITE_RAM_PREVIOUS,
};
use crate::config::Config;
use crate::display::{RefreshMode, RefreshState, ROW_SCRATCH_BYTES};
use crate::error::Error;

type DisplayResult<I> = core::result::Result<(), Error<I>>;

/// Trait for async hardware interface to the SSD1683 controller
///
/// The async counterpart of [`DisplayInterface`](crate::DisplayInterface):
/// same framing contract, but transmissions may suspend and the busy line
/// is awaited instead of polled.
#[allow(async_fn_in_trait)]
pub trait AsyncDisplayInterface: crate::interface::ErrorType {
    /// Send a command byte (DC low, then one byte over SPI)
    async fn send_command(&mut self, command: u8) -> Result<(), Self::Error>;

    /// Send data bytes (DC high, then payload over SPI)
    async fn send_data(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Perform hardware reset (RST high/low/high, 20ms per level)
    async fn reset<D: DelayNs>(&mut self, delay: &mut D);

    /// Read the busy line (true while the panel is processing)
    fn is_busy(&mut self) -> Result<bool, Self::Error>;

    /// Suspend until the busy line clears
    async fn wait_until_idle(&mut self) -> Result<(), Self::Error>;
}

/// Async hardware interface implementation
///
/// Built on embedded-hal-async: an async [`SpiDevice`] plus a busy pin
/// implementing [`Wait`] so that ready-waiting suspends on the pin edge
/// instead of polling.
pub struct AsyncInterface<SPI, DC, RST, BUSY> {
    /// SPI device for communication
    spi: SPI,
    /// Data/Command select pin (low=command, high=data)
    dc: DC,
    /// Reset pin (active low)
    rst: RST,
    /// Busy pin (active high)
    busy: BUSY,
}

impl<SPI, DC, RST, BUSY> AsyncInterface<SPI, DC, RST, BUSY>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
    BUSY: InputPin + Wait,
{
    /// Create a new async interface
    pub fn new(spi: SPI, dc: DC, rst: RST, busy: BUSY) -> Self {
        Self { spi, dc, rst, busy }
    }
}

impl<SPI, DC, RST, BUSY, PinErr> crate::interface::ErrorType
    for AsyncInterface<SPI, DC, RST, BUSY>
where
    SPI: SpiDevice,
    SPI::Error: Debug,
    DC: OutputPin<Error = PinErr>,
    RST: OutputPin<Error = PinErr>,
    BUSY: InputPin<Error = PinErr> + Wait,
    PinErr: Debug,
{
    type Error = crate::interface::InterfaceError<SPI::Error, PinErr>;
}

impl<SPI, DC, RST, BUSY, PinErr> AsyncDisplayInterface for AsyncInterface<SPI, DC, RST, BUSY>
where
    SPI: SpiDevice,
    SPI::Error: Debug,
    DC: OutputPin<Error = PinErr>,
    RST: OutputPin<Error = PinErr>,
    BUSY: InputPin<Error = PinErr> + Wait,
    PinErr: Debug,
{
    async fn send_command(&mut self, command: u8) -> Result<(), Self::Error> {
        self.dc
            .set_low()
            .map_err(crate::interface::InterfaceError::Pin)?;
        self.spi
            .write(&[command])
            .await
            .map_err(crate::interface::InterfaceError::Spi)?;
        Ok(())
    }

    async fn send_data(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.dc
            .set_high()
            .map_err(crate::interface::InterfaceError::Pin)?;
        self.spi
            .write(data)
            .await
            .map_err(crate::interface::InterfaceError::Spi)?;
        Ok(())
    }

    async fn reset<D: DelayNs>(&mut self, delay: &mut D) {
        let _ = self.rst.set_high();
        delay.delay_ms(20).await;
        let _ = self.rst.set_low();
        delay.delay_ms(20).await;
        let _ = self.rst.set_high();
        delay.delay_ms(20).await;
    }

    fn is_busy(&mut self) -> Result<bool, Self::Error> {
        self.busy
            .is_high()
            .map_err(crate::interface::InterfaceError::Pin)
    }

    async fn wait_until_idle(&mut self) -> Result<(), Self::Error> {
        self.busy
            .wait_for_low()
            .await
            .map_err(crate::interface::InterfaceError::Pin)
    }
}

/// Refresh completion events
///
/// Create one (usually as a `static`) and share it between the display task
/// and anyone interested in refresh progress. Both signals latch until
/// consumed; `show()` resets them when a new refresh starts.
pub struct RefreshEvents {
    /// Raised once the frame has been transmitted and the panel commanded
    pub updated: Signal<CriticalSectionRawMutex, ()>,
    /// Raised once the panel has settled and the busy line cleared
    pub complete: Signal<CriticalSectionRawMutex, ()>,
}

impl RefreshEvents {
    /// Create a new event pair, both unsignaled
    pub const fn new() -> Self {
        Self {
            updated: Signal::new(),
            complete: Signal::new(),
        }
    }

    fn reset(&self) {
        self.updated.reset();
        self.complete.reset();
    }
}

impl Default for RefreshEvents {
    fn default() -> Self {
        Self::new()
    }
}

/// Async display driver for the SSD1683
///
/// Same frame buffer, refresh state machine, and wire protocol as
/// [`Display`](crate::Display); the row transmission loop yields after
/// every row and completion is published through [`RefreshEvents`].
pub struct AsyncDisplay<'e, I, B>
where
    I: AsyncDisplayInterface,
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    /// Hardware interface
    interface: I,
    /// Display configuration
    config: Config,
    /// Frame buffer, exactly `rows * cols / 8` bytes
    buffer: B,
    /// Refresh state machine
    state: RefreshState,
    /// Selected refresh mode
    mode: RefreshMode,
    /// Shared completion events
    events: &'e RefreshEvents,
}

impl<'e, I, B> AsyncDisplay<'e, I, B>
where
    I: AsyncDisplayInterface,
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    /// Create a new AsyncDisplay instance
    ///
    /// Performs no hardware I/O; call [`init`](Self::init) once at startup.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferSizeMismatch`] unless the buffer is exactly
    /// `config.dimensions.buffer_size()` bytes.
    pub fn new(
        interface: I,
        config: Config,
        buffer: B,
        events: &'e RefreshEvents,
    ) -> Result<Self, Error<I>> {
        let expected = config.dimensions.buffer_size();
        let provided = buffer.as_ref().len();
        if provided != expected {
            return Err(Error::BufferSizeMismatch { expected, provided });
        }
        let mode = if config.start_partial {
            RefreshMode::Partial
        } else {
            RefreshMode::Full
        };
        Ok(Self {
            interface,
            config,
            buffer,
            state: RefreshState::Idle,
            mode,
            events,
        })
    }

    /// Cold-start initialization: full-mode setup, blank both registers,
    /// one full activation
    pub async fn init<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.configure_full(delay).await?;
        self.clear_frame().await?;
        self.activate(self.config.activate_full).await?;
        self.interface
            .wait_until_idle()
            .await
            .map_err(Error::Interface)?;
        Ok(())
    }

    /// Reconfigure the panel for full refresh
    ///
    /// See [`Display::init_full`](crate::Display::init_full); semantics are
    /// identical.
    pub async fn init_full<D: DelayNs>(&mut self, delay: &mut D, force: bool) -> DisplayResult<I> {
        if self.state != RefreshState::Idle {
            return Err(Error::Busy);
        }
        debug!("init_full: force={}", force);
        if self.mode == RefreshMode::Partial || force {
            self.configure_full(delay).await?;
        }
        self.mode = RefreshMode::Full;
        Ok(())
    }

    async fn configure_full<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.interface.reset(delay).await;
        self.wait_until_ready().await?;

        self.send_command(SOFT_RESET).await?;
        self.wait_until_ready().await?;

        self.send_command(DISPLAY_UPDATE_CONTROL).await?;
        let ctrl = self.config.update_control_full;
        self.send_data(&ctrl).await?;

        self.send_command(BORDER_WAVEFORM).await?;
        self.send_data(&[self.config.border_waveform_full]).await?;

        self.send_command(DATA_ENTRY_MODE).await?;
        self.send_data(&[self.config.data_entry_mode]).await?;

        self.set_window().await?;
        self.set_cursor().await?;

        self.wait_until_ready().await
    }

    /// Switch to full refresh mode (pure flag mutation)
    pub fn select_full_mode(&mut self) -> DisplayResult<I> {
        if self.state != RefreshState::Idle {
            return Err(Error::Busy);
        }
        self.mode = RefreshMode::Full;
        Ok(())
    }

    /// Switch to partial refresh mode (pure flag mutation)
    pub fn select_partial_mode(&mut self) -> DisplayResult<I> {
        if self.state != RefreshState::Idle {
            return Err(Error::Busy);
        }
        if !self.config.supports_partial {
            return Err(Error::PartialUnsupported);
        }
        debug!("select_partial_mode");
        self.mode = RefreshMode::Partial;
        Ok(())
    }

    /// Transmit the frame buffer and refresh the panel
    ///
    /// Yields to the scheduler after every transmitted row. Raises
    /// `events.updated` once the panel is commanded and `events.complete`
    /// once it has settled. Intended to run as its own task; other tasks
    /// await the events.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Busy`] if a refresh is already in flight; the
    /// request is rejected, never queued. On a transport fault the state
    /// stays non-idle and neither event fires.
    pub async fn show<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        if self.state != RefreshState::Idle {
            return Err(Error::Busy);
        }
        debug!("show: mode={:?}", self.mode);
        match self.mode {
            RefreshMode::Full => self.show_full().await,
            RefreshMode::Partial => self.show_partial(delay).await,
        }
    }

    async fn show_full(&mut self) -> DisplayResult<I> {
        self.state = RefreshState::RefreshingFull;
        self.events.reset();

        self.write_frame(WRITE_RAM_CURRENT).await?;
        self.write_frame(WRITE_RAM_PREVIOUS).await?;

        self.activate(self.config.activate_full).await?;
        self.events.updated.signal(());

        self.interface
            .wait_until_idle()
            .await
            .map_err(Error::Interface)?;
        self.events.complete.signal(());

        self.state = RefreshState::Idle;
        Ok(())
    }

    async fn show_partial<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.state = RefreshState::RefreshingPartial;
        self.events.reset();

        self.configure_partial(delay).await?;

        self.write_frame(WRITE_RAM_CURRENT).await?;

        self.activate(self.config.activate_partial).await?;
        self.events.updated.signal(());

        self.interface
            .wait_until_idle()
            .await
            .map_err(Error::Interface)?;
        self.events.complete.signal(());

        self.state = RefreshState::Idle;
        Ok(())
    }

    async fn configure_partial<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.interface.reset(delay).await;
        self.wait_until_ready().await?;

        self.send_command(BORDER_WAVEFORM).await?;
        self.send_data(&[self.config.border_waveform_partial])
            .await?;

        self.send_command(DISPLAY_UPDATE_CONTROL).await?;
        let ctrl = self.config.update_control_partial;
        self.send_data(&ctrl).await?;

        self.send_command(BORDER_WAVEFORM).await?;
        self.send_data(&[self.config.border_waveform_partial])
            .await?;

        self.send_command(DATA_ENTRY_MODE).await?;
        self.send_data(&[self.config.data_entry_mode]).await?;

        self.set_window().await?;
        self.set_cursor().await?;

        self.wait_until_ready().await
    }

    /// Blank both image registers, yielding after every row
    pub async fn clear_frame(&mut self) -> DisplayResult<I> {
        let row_bytes = self.config.dimensions.row_bytes();
        let blank = [0xFFu8; ROW_SCRATCH_BYTES];

        for register in [WRITE_RAM_CURRENT, WRITE_RAM_PREVIOUS] {
            self.send_command(register).await?;
            for _ in 0..self.config.dimensions.rows {
                self.send_data(&blank[..row_bytes]).await?;
                yield_now().await;
            }
        }
        Ok(())
    }

    /// Enter deep sleep
    pub async fn sleep(&mut self) -> DisplayResult<I> {
        self.send_command(DEEP_SLEEP).await?;
        self.send_data(&[self.config.deep_sleep_mode]).await?;
        Ok(())
    }

    /// Perform a hardware reset
    pub async fn reset<D: DelayNs>(&mut self, delay: &mut D) {
        self.interface.reset(delay).await;
    }

    /// Suspend until the busy line clears
    pub async fn wait_until_ready(&mut self) -> DisplayResult<I> {
        self.interface
            .wait_until_idle()
            .await
            .map_err(Error::Interface)
    }

    /// Whether the driver can accept a new refresh
    pub fn ready(&mut self) -> Result<bool, Error<I>> {
        if self.state != RefreshState::Idle {
            return Ok(false);
        }
        let hw_busy = self.interface.is_busy().map_err(Error::Interface)?;
        Ok(!hw_busy)
    }

    /// Shared completion events
    pub fn events(&self) -> &'e RefreshEvents {
        self.events
    }

    async fn write_frame(&mut self, register: u8) -> DisplayResult<I> {
        let rows = self.config.dimensions.rows as usize;
        let row_bytes = self.config.dimensions.row_bytes();
        let mut scratch = [0u8; ROW_SCRATCH_BYTES];

        self.send_command(register).await?;
        for row in 0..rows {
            let start = row * row_bytes;
            let src = &self.buffer.as_ref()[start..start + row_bytes];
            for (dst, byte) in scratch[..row_bytes].iter_mut().zip(src) {
                *dst = byte ^ 0xFF;
            }
            self.interface
                .send_data(&scratch[..row_bytes])
                .await
                .map_err(Error::Interface)?;
            yield_now().await;
        }
        Ok(())
    }

    async fn activate(&mut self, sequence: u8) -> DisplayResult<I> {
        self.send_command(DISPLAY_UPDATE_SEQUENCE).await?;
        self.send_data(&[sequence]).await?;
        self.send_command(MASTER_ACTIVATION).await?;
        Ok(())
    }

    async fn set_window(&mut self) -> DisplayResult<I> {
        let x_end = (self.config.dimensions.row_bytes() - 1) as u8;
        let y_end = self.config.dimensions.rows - 1;

        self.send_command(SET_RAM_X_RANGE).await?;
        self.send_data(&[0x00, x_end]).await?;

        self.send_command(SET_RAM_Y_RANGE).await?;
        self.send_data(&[0x00, 0x00, (y_end % 256) as u8, (y_end / 256) as u8])
            .await?;

        Ok(())
    }

    async fn set_cursor(&mut self) -> DisplayResult<I> {
        self.send_command(SET_RAM_X_COUNTER).await?;
        self.send_data(&[0x00]).await?;

        self.send_command(SET_RAM_Y_COUNTER).await?;
        self.send_data(&[0x00, 0x00]).await?;

        Ok(())
    }

    async fn send_command(&mut self, cmd: u8) -> DisplayResult<I> {
        self.interface
            .send_command(cmd)
            .await
            .map_err(Error::Interface)
    }

    async fn send_data(&mut self, data: &[u8]) -> DisplayResult<I> {
        self.interface
            .send_data(data)
            .await
            .map_err(Error::Interface)
    }

    /// Panel width in pixels
    pub fn width(&self) -> u16 {
        self.config.dimensions.cols
    }

    /// Panel height in pixels
    pub fn height(&self) -> u16 {
        self.config.dimensions.rows
    }

    /// Currently selected refresh mode
    pub fn mode(&self) -> RefreshMode {
        self.mode
    }

    // Drawing interface, identical to the blocking driver's

    /// Set a single pixel; out-of-bounds coordinates are ignored
    pub fn set_pixel(&mut self, x: u16, y: u16, color: Color) {
        let dims = self.config.dimensions;
        if x >= dims.cols || y >= dims.rows {
            return;
        }
        let index = y as usize * dims.row_bytes() + x as usize / 8;
        let bit = 0x80u8 >> (x % 8);
        let buffer = self.buffer.as_mut();
        if color.is_set() {
            buffer[index] |= bit;
        } else {
            buffer[index] &= !bit;
        }
    }

    /// Read a single pixel; `None` when out of bounds
    pub fn pixel(&self, x: u16, y: u16) -> Option<Color> {
        let dims = self.config.dimensions;
        if x >= dims.cols || y >= dims.rows {
            return None;
        }
        let index = y as usize * dims.row_bytes() + x as usize / 8;
        let bit = 0x80u8 >> (x % 8);
        Some(Color::from_bit(self.buffer.as_ref()[index] & bit != 0))
    }

    /// Fill the whole buffer with one color
    pub fn fill(&mut self, color: Color) {
        let byte = color.fill_byte();
        for b in self.buffer.as_mut() {
            *b = byte;
        }
    }

    /// Raw frame buffer bytes, row-major, MSB first
    pub fn buffer(&self) -> &[u8] {
        self.buffer.as_ref()
    }

    /// Mutable raw frame buffer bytes for block operations
    pub fn buffer_mut(&mut self) -> &mut [u8] {
        self.buffer.as_mut()
    }
}

#[cfg(feature = "graphics")]
impl<I, B> embedded_graphics_core::draw_target::DrawTarget for AsyncDisplay<'_, I, B>
where
    I: AsyncDisplayInterface,
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    type Color = Color;
    type Error = core::convert::Infallible;

    fn draw_iter<Iter>(&mut self, pixels: Iter) -> Result<(), Self::Error>
    where
        Iter: IntoIterator<Item = embedded_graphics_core::prelude::Pixel<Self::Color>>,
    {
        use embedded_graphics_core::geometry::Point;
        for embedded_graphics_core::prelude::Pixel(Point { x, y }, color) in pixels {
            if x < 0 || y < 0 || x > i32::from(u16::MAX) || y > i32::from(u16::MAX) {
                continue;
            }
            self.set_pixel(x as u16, y as u16, color);
        }
        Ok(())
    }
}

#[cfg(feature = "graphics")]
impl<I, B> embedded_graphics_core::geometry::OriginDimensions for AsyncDisplay<'_, I, B>
where
    I: AsyncDisplayInterface,
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    fn size(&self) -> embedded_graphics_core::geometry::Size {
        embedded_graphics_core::geometry::Size::new(u32::from(self.width()), u32::from(self.height()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Builder, Dimensions};
    use alloc::vec;
    use alloc::vec::Vec;
    use embassy_futures::block_on;

    #[derive(Debug)]
    struct MockBusError;

    #[derive(Debug)]
    struct MockAsyncInterface {
        commands: Vec<u8>,
        data: Vec<Vec<u8>>,
        command_data: Vec<(u8, Vec<u8>)>,
        last_command: Option<u8>,
        fail_after_data_writes: Option<usize>,
    }

    impl MockAsyncInterface {
        fn new() -> Self {
            Self {
                commands: Vec::new(),
                data: Vec::new(),
                command_data: Vec::new(),
                last_command: None,
                fail_after_data_writes: None,
            }
        }

        fn rows_written_to(&self, register: u8, row_bytes: usize) -> usize {
            self.command_data
                .iter()
                .filter(|(cmd, data)| *cmd == register && data.len() == row_bytes)
                .count()
        }
    }

    impl crate::interface::ErrorType for MockAsyncInterface {
        type Error = MockBusError;
    }

    impl AsyncDisplayInterface for MockAsyncInterface {
        async fn send_command(&mut self, command: u8) -> Result<(), Self::Error> {
            self.commands.push(command);
            self.last_command = Some(command);
            Ok(())
        }

        async fn send_data(&mut self, data: &[u8]) -> Result<(), Self::Error> {
            if let Some(limit) = self.fail_after_data_writes {
                if self.data.len() >= limit {
                    return Err(MockBusError);
                }
            }
            self.data.push(data.to_vec());
            if let Some(cmd) = self.last_command {
                self.command_data.push((cmd, data.to_vec()));
            }
            Ok(())
        }

        async fn reset<D: DelayNs>(&mut self, _delay: &mut D) {}

        fn is_busy(&mut self) -> Result<bool, Self::Error> {
            Ok(false)
        }

        async fn wait_until_idle(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    struct MockDelay;
    impl DelayNs for MockDelay {
        async fn delay_ns(&mut self, _ns: u32) {}
    }

    const ROW_BYTES: usize = 50;
    const ROWS: usize = 300;

    fn test_display(events: &RefreshEvents) -> AsyncDisplay<'_, MockAsyncInterface, Vec<u8>> {
        let config = Builder::new()
            .dimensions(Dimensions::WAVESHARE_4IN2_V2)
            .build()
            .unwrap();
        let buffer = vec![0u8; config.dimensions.buffer_size()];
        AsyncDisplay::new(MockAsyncInterface::new(), config, buffer, events).unwrap()
    }

    #[test]
    fn test_show_full_raises_both_events() {
        let events = RefreshEvents::new();
        let mut display = test_display(&events);
        let mut delay = MockDelay;

        block_on(display.show(&mut delay)).unwrap();

        assert!(events.updated.signaled());
        assert!(events.complete.signaled());
        assert_eq!(
            display.interface.rows_written_to(WRITE_RAM_CURRENT, ROW_BYTES),
            ROWS
        );
        assert_eq!(
            display
                .interface
                .rows_written_to(WRITE_RAM_PREVIOUS, ROW_BYTES),
            ROWS
        );

        // Latched until consumed, then cleared
        block_on(events.complete.wait());
        assert!(!events.complete.signaled());
        assert!(events.updated.signaled());
    }

    #[test]
    fn test_show_partial_raises_both_events() {
        let events = RefreshEvents::new();
        let mut display = test_display(&events);
        let mut delay = MockDelay;

        display.select_partial_mode().unwrap();
        block_on(display.show(&mut delay)).unwrap();

        assert!(events.updated.signaled());
        assert!(events.complete.signaled());
        assert_eq!(
            display.interface.rows_written_to(WRITE_RAM_CURRENT, ROW_BYTES),
            ROWS
        );
        assert_eq!(
            display
                .interface
                .rows_written_to(WRITE_RAM_PREVIOUS, ROW_BYTES),
            0
        );
        assert_eq!(
            display
                .interface
                .command_data
                .iter()
                .rev()
                .find(|(cmd, _)| *cmd == DISPLAY_UPDATE_SEQUENCE)
                .map(|(_, data)| data.clone()),
            Some(vec![0xFF])
        );
    }

    #[test]
    fn test_new_show_resets_previous_events() {
        let events = RefreshEvents::new();
        let mut display = test_display(&events);
        let mut delay = MockDelay;

        block_on(display.show(&mut delay)).unwrap();
        assert!(events.updated.signaled());

        // A new refresh starts from unsignaled events; each fires exactly
        // once per refresh
        block_on(display.show(&mut delay)).unwrap();
        block_on(events.updated.wait());
        assert!(!events.updated.signaled());
        block_on(events.complete.wait());
        assert!(!events.complete.signaled());
    }

    #[test]
    fn test_transport_fault_is_fail_stop() {
        let events = RefreshEvents::new();
        let mut display = test_display(&events);
        let mut delay = MockDelay;
        display.interface.fail_after_data_writes = Some(10);

        assert!(matches!(
            block_on(display.show(&mut delay)),
            Err(Error::Interface(MockBusError))
        ));
        // Neither event fired; driver stuck busy
        assert!(!events.updated.signaled());
        assert!(!events.complete.signaled());
        assert!(!display.ready().unwrap());
        assert!(matches!(
            block_on(display.show(&mut delay)),
            Err(Error::Busy)
        ));
    }

    #[test]
    fn test_init_clears_both_registers() {
        let events = RefreshEvents::new();
        let mut display = test_display(&events);
        let mut delay = MockDelay;

        block_on(display.init(&mut delay)).unwrap();

        assert!(display.interface.commands.contains(&SOFT_RESET));
        assert_eq!(
            display.interface.rows_written_to(WRITE_RAM_CURRENT, ROW_BYTES),
            ROWS
        );
        assert_eq!(
            display
                .interface
                .rows_written_to(WRITE_RAM_PREVIOUS, ROW_BYTES),
            ROWS
        );
        assert_eq!(display.mode(), RefreshMode::Full);
        assert!(display.ready().unwrap());
    }

    #[test]
    fn test_rows_are_inverted() {
        let events = RefreshEvents::new();
        let mut display = test_display(&events);
        let mut delay = MockDelay;

        display.set_pixel(0, 0, Color::Black);
        block_on(display.show(&mut delay)).unwrap();

        let first_row = display
            .interface
            .command_data
            .iter()
            .find(|(cmd, data)| *cmd == WRITE_RAM_CURRENT && data.len() == ROW_BYTES)
            .map(|(_, data)| data.clone())
            .unwrap();
        assert_eq!(first_row[0], 0x7F);
        assert!(first_row[1..].iter().all(|byte| *byte == 0xFF));
    }

    #[test]
    fn test_select_partial_unsupported() {
        let events = RefreshEvents::new();
        let config = Builder::new()
            .dimensions(Dimensions::WAVESHARE_4IN2_V2)
            .supports_partial(false)
            .build()
            .unwrap();
        let buffer = vec![0u8; config.dimensions.buffer_size()];
        let mut display =
            AsyncDisplay::new(MockAsyncInterface::new(), config, buffer, &events).unwrap();

        assert!(matches!(
            display.select_partial_mode(),
            Err(Error::PartialUnsupported)
        ));
    }
}
