//! Core display operations
//!
//! [`Display`] owns the frame buffer and the refresh state machine. Drawing
//! happens on the in-memory buffer ([`Display::set_pixel`] and friends, or
//! the `embedded-graphics` integration from the `graphics` feature);
//! [`Display::show`] then transmits the buffer row-by-row with the command
//! framing the panel expects for the selected refresh mode.

use embedded_hal::delay::DelayNs;
use log::debug;

use crate::color::Color;
use crate::command::{
    BORDER_WAVEFORM, DATA_ENTRY_MODE, DEEP_SLEEP, DISPLAY_UPDATE_CONTROL, DISPLAY_UPDATE_SEQUENCE,
    MASTER_ACTIVATION, SET_RAM_X_COUNTER, SET_RAM_X_RANGE, SET_RAM_Y_COUNTER, SET_RAM_Y_RANGE,
    SOFT_RESET, WRITE_LUT, WRITE_RAM_CURRENT, WRITE_RAM_PREVIOUS,
};
use crate::config::Config;
use crate::error::{Error, MAX_SOURCE_OUTPUTS};
use crate::interface::DisplayInterface;
use crate::lut::LUT_SIZE;

type DisplayResult<I> = core::result::Result<(), Error<I>>;

/// Scratch size for one inverted row, sized for the widest supported panel
pub(crate) const ROW_SCRATCH_BYTES: usize = (MAX_SOURCE_OUTPUTS as usize) / 8;

/// Refresh mode for display updates
///
/// Selected explicitly via [`Display::select_full_mode`] /
/// [`Display::select_partial_mode`]; never changes implicitly.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum RefreshMode {
    /// Full refresh (slow, visible flash, no ghosting)
    ///
    /// Transmits the frame to both image registers and runs the strong
    /// waveform. Required periodically to clean up partial-mode ghosting.
    #[default]
    Full,
    /// Partial refresh (fast, minimal flashing, may ghost over many cycles)
    ///
    /// Transmits the frame to the current-image register only; the
    /// controller diffs against the previous image it already holds.
    Partial,
}

/// Refresh state machine
///
/// `show()` refuses to start while a refresh is in flight. The state only
/// returns to `Idle` on successful completion; a transport fault leaves it
/// stuck as a deliberate fail-stop signal.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) enum RefreshState {
    /// No refresh in flight
    #[default]
    Idle,
    /// Full refresh in flight
    RefreshingFull,
    /// Partial refresh in flight
    RefreshingPartial,
}

/// Core display driver for the SSD1683
///
/// Owns the frame buffer (supplied at construction, never reallocated) and
/// tracks refresh mode and busy state. For async operation with completion
/// events, use [`AsyncDisplay`](crate::asynch::AsyncDisplay) (requires the
/// `asynch` feature).
pub struct Display<I, B>
where
    I: DisplayInterface,
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
}

impl<I, B> Display<I, B>
where
    I: DisplayInterface,
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    /// Create a new Display instance
    ///
    /// Performs no hardware I/O; call [`init`](Self::init) once at startup.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferSizeMismatch`] unless the buffer is exactly
    /// `config.dimensions.buffer_size()` bytes.
    pub fn new(interface: I, config: Config, buffer: B) -> Result<Self, Error<I>> {
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
        })
    }

    /// Cold-start initialization
    ///
    /// Runs the full-mode hardware setup, blanks both image registers, and
    /// runs one full activation so the panel starts from a clean white
    /// screen. The configured start mode is preserved: a driver built with
    /// `start_partial(true)` performs its first `show()` as a partial
    /// refresh against the blank baseline.
    pub fn init<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.configure_full(delay)?;
        self.clear_frame()?;
        self.activate(self.config.activate_full)?;
        self.wait_until_ready(delay)?;
        Ok(())
    }

    /// Reconfigure the panel for full refresh
    ///
    /// Required before the first full refresh after partial mode. Does
    /// nothing on hardware unless the driver is currently in partial mode
    /// or `force` is set; always leaves the mode at [`RefreshMode::Full`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Busy`] while a refresh is in flight.
    pub fn init_full<D: DelayNs>(&mut self, delay: &mut D, force: bool) -> DisplayResult<I> {
        if self.state != RefreshState::Idle {
            return Err(Error::Busy);
        }
        debug!("init_full: force={}", force);
        if self.mode == RefreshMode::Partial || force {
            self.configure_full(delay)?;
        }
        self.mode = RefreshMode::Full;
        Ok(())
    }

    /// The full-mode hardware setup sequence
    fn configure_full<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.interface.reset(delay);
        self.wait_until_ready(delay)?;

        self.send_command(SOFT_RESET)?;
        self.wait_until_ready(delay)?;

        self.send_command(DISPLAY_UPDATE_CONTROL)?;
        let ctrl = self.config.update_control_full;
        self.send_data(&ctrl)?;

        self.send_command(BORDER_WAVEFORM)?;
        self.send_data(&[self.config.border_waveform_full])?;

        self.send_command(DATA_ENTRY_MODE)?;
        self.send_data(&[self.config.data_entry_mode])?;

        self.set_window()?;
        self.set_cursor()?;

        self.wait_until_ready(delay)
    }

    /// Switch to full refresh mode
    ///
    /// Pure flag mutation, no hardware I/O. The hardware reconfiguration
    /// for full mode happens in [`init_full`](Self::init_full).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Busy`] while a refresh is in flight.
    pub fn select_full_mode(&mut self) -> DisplayResult<I> {
        if self.state != RefreshState::Idle {
            return Err(Error::Busy);
        }
        self.mode = RefreshMode::Full;
        Ok(())
    }

    /// Switch to partial refresh mode
    ///
    /// Pure flag mutation, no hardware I/O; subsequent [`show`](Self::show)
    /// calls use the partial command sequence until full mode is selected.
    ///
    /// # Errors
    ///
    /// - [`Error::Busy`] while a refresh is in flight
    /// - [`Error::PartialUnsupported`] on a panel configured without
    ///   partial refresh
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
    /// Uses the command sequence of the selected [`RefreshMode`] and blocks
    /// until the panel reports ready.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Busy`] if a refresh is already in flight; the
    /// request is rejected, never queued.
    pub fn show<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        if self.state != RefreshState::Idle {
            return Err(Error::Busy);
        }
        debug!("show: mode={:?}", self.mode);
        match self.mode {
            RefreshMode::Full => self.show_full(delay),
            RefreshMode::Partial => self.show_partial(delay),
        }
    }

    fn show_full<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.state = RefreshState::RefreshingFull;

        self.write_frame(WRITE_RAM_CURRENT)?;
        self.write_frame(WRITE_RAM_PREVIOUS)?;

        self.activate(self.config.activate_full)?;
        self.wait_until_ready(delay)?;

        self.state = RefreshState::Idle;
        Ok(())
    }

    fn show_partial<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.state = RefreshState::RefreshingPartial;

        self.configure_partial(delay)?;

        self.write_frame(WRITE_RAM_CURRENT)?;

        self.activate(self.config.activate_partial)?;
        self.wait_until_ready(delay)?;

        self.state = RefreshState::Idle;
        Ok(())
    }

    /// The partial-mode setup re-issued before every partial cycle
    ///
    /// The border-waveform and update-control payloads differ from the
    /// full-mode values; mixing them up ghosts or corrupts the image.
    /// The border waveform is written twice, as the panel vendor sequence
    /// does, bracketing the update control.
    fn configure_partial<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.interface.reset(delay);
        self.wait_until_ready(delay)?;

        self.send_command(BORDER_WAVEFORM)?;
        self.send_data(&[self.config.border_waveform_partial])?;

        self.send_command(DISPLAY_UPDATE_CONTROL)?;
        let ctrl = self.config.update_control_partial;
        self.send_data(&ctrl)?;

        self.send_command(BORDER_WAVEFORM)?;
        self.send_data(&[self.config.border_waveform_partial])?;

        self.send_command(DATA_ENTRY_MODE)?;
        self.send_data(&[self.config.data_entry_mode])?;

        self.set_window()?;
        self.set_cursor()?;

        self.wait_until_ready(delay)
    }

    /// Blank both image registers
    ///
    /// Transmits all-white rows directly; the in-memory buffer is neither
    /// read nor modified.
    pub fn clear_frame(&mut self) -> DisplayResult<I> {
        let row_bytes = self.config.dimensions.row_bytes();
        let blank = [0xFFu8; ROW_SCRATCH_BYTES];

        self.send_command(WRITE_RAM_CURRENT)?;
        for _ in 0..self.config.dimensions.rows {
            self.send_data(&blank[..row_bytes])?;
        }
        self.send_command(WRITE_RAM_PREVIOUS)?;
        for _ in 0..self.config.dimensions.rows {
            self.send_data(&blank[..row_bytes])?;
        }
        Ok(())
    }

    /// Enter deep sleep
    ///
    /// No sleeping state is tracked; the caller must run
    /// [`init_full`](Self::init_full) with `force` before further use.
    pub fn sleep(&mut self) -> DisplayResult<I> {
        self.send_command(DEEP_SLEEP)?;
        self.send_data(&[self.config.deep_sleep_mode])?;
        Ok(())
    }

    /// Perform a hardware reset
    pub fn reset<D: DelayNs>(&mut self, delay: &mut D) {
        self.interface.reset(delay);
    }

    /// Block until the busy line clears
    ///
    /// Polls every 100ms via the interface; see
    /// [`DisplayInterface::busy_wait`] for the optional timeout extension.
    pub fn wait_until_ready<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.interface.busy_wait(delay).map_err(Error::Interface)
    }

    /// Whether the driver can accept a new refresh
    ///
    /// True only when no refresh is in flight and the hardware busy line
    /// is clear.
    pub fn ready(&mut self) -> Result<bool, Error<I>> {
        if self.state != RefreshState::Idle {
            return Ok(false);
        }
        let hw_busy = self.interface.is_busy().map_err(Error::Interface)?;
        Ok(!hw_busy)
    }

    /// Load a custom waveform LUT
    ///
    /// Unused by the built-in mode set (which runs on OTP waveforms) but
    /// required for the panel's greyscale and fast modes; see
    /// [`crate::lut::LUT_ALL`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLutLength`] unless the LUT is exactly
    /// [`LUT_SIZE`] bytes.
    pub fn load_lut(&mut self, lut: &[u8]) -> DisplayResult<I> {
        if lut.len() != LUT_SIZE {
            return Err(Error::InvalidLutLength {
                expected: LUT_SIZE,
                provided: lut.len(),
            });
        }
        self.send_command(WRITE_LUT)?;
        self.send_data(lut)?;
        Ok(())
    }

    /// Transmit the frame buffer to one image register, row by row
    ///
    /// Each row is bit-inverted into a scratch buffer before transmission:
    /// the buffer's pixel sense (1 = black ink) is the opposite of the
    /// controller's wire sense. The buffer itself stays in the natural
    /// drawing sense.
    fn write_frame(&mut self, register: u8) -> DisplayResult<I> {
        let rows = self.config.dimensions.rows as usize;
        let row_bytes = self.config.dimensions.row_bytes();
        let mut scratch = [0u8; ROW_SCRATCH_BYTES];

        self.send_command(register)?;
        for row in 0..rows {
            let start = row * row_bytes;
            let src = &self.buffer.as_ref()[start..start + row_bytes];
            for (dst, byte) in scratch[..row_bytes].iter_mut().zip(src) {
                *dst = byte ^ 0xFF;
            }
            self.interface
                .send_data(&scratch[..row_bytes])
                .map_err(Error::Interface)?;
        }
        Ok(())
    }

    /// Issue the update sequence option and master activation
    fn activate(&mut self, sequence: u8) -> DisplayResult<I> {
        self.send_command(DISPLAY_UPDATE_SEQUENCE)?;
        self.send_data(&[sequence])?;
        self.send_command(MASTER_ACTIVATION)?;
        Ok(())
    }

    /// Set the RAM window to the whole panel
    ///
    /// X is byte-addressed on this controller, Y is row-addressed.
    fn set_window(&mut self) -> DisplayResult<I> {
        let x_end = (self.config.dimensions.row_bytes() - 1) as u8;
        let y_end = self.config.dimensions.rows - 1;

        self.send_command(SET_RAM_X_RANGE)?;
        self.send_data(&[0x00, x_end])?;

        self.send_command(SET_RAM_Y_RANGE)?;
        self.send_data(&[0x00, 0x00, (y_end % 256) as u8, (y_end / 256) as u8])?;

        Ok(())
    }

    /// Reset the RAM address counters to the window origin
    fn set_cursor(&mut self) -> DisplayResult<I> {
        self.send_command(SET_RAM_X_COUNTER)?;
        self.send_data(&[0x00])?;

        self.send_command(SET_RAM_Y_COUNTER)?;
        self.send_data(&[0x00, 0x00])?;

        Ok(())
    }

    /// Send a command to the display controller
    fn send_command(&mut self, cmd: u8) -> DisplayResult<I> {
        self.interface.send_command(cmd).map_err(Error::Interface)
    }

    /// Send data to the display controller
    fn send_data(&mut self, data: &[u8]) -> DisplayResult<I> {
        self.interface.send_data(data).map_err(Error::Interface)
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

    /// Access the underlying configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    // Drawing interface

    /// Set a single pixel
    ///
    /// Out-of-bounds coordinates are ignored.
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

    /// Read a single pixel
    ///
    /// Returns `None` for out-of-bounds coordinates.
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

    pub(crate) fn state(&self) -> RefreshState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Builder, Dimensions};
    use crate::lut::LUT_ALL;
    use alloc::vec;
    use alloc::vec::Vec;

    #[derive(Debug)]
    struct MockBusError;

    #[derive(Debug)]
    struct MockInterface {
        commands: Vec<u8>,
        data: Vec<Vec<u8>>,
        command_data: Vec<(u8, Vec<u8>)>,
        last_command: Option<u8>,
        fail_after_data_writes: Option<usize>,
    }

    impl MockInterface {
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

    impl crate::interface::ErrorType for MockInterface {
        type Error = MockBusError;
    }

    impl DisplayInterface for MockInterface {
        fn send_command(&mut self, command: u8) -> Result<(), Self::Error> {
            self.commands.push(command);
            self.last_command = Some(command);
            Ok(())
        }

        fn send_data(&mut self, data: &[u8]) -> Result<(), Self::Error> {
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

        fn reset<D: DelayNs>(&mut self, _delay: &mut D) {}

        fn is_busy(&mut self) -> Result<bool, Self::Error> {
            Ok(false)
        }

        fn busy_wait<D: DelayNs>(&mut self, _delay: &mut D) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    struct MockDelay;
    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    const ROW_BYTES: usize = 50;
    const ROWS: usize = 300;

    fn test_display() -> Display<MockInterface, Vec<u8>> {
        test_display_with(Builder::new().dimensions(Dimensions::WAVESHARE_4IN2_V2))
    }

    fn test_display_with(builder: Builder) -> Display<MockInterface, Vec<u8>> {
        let config = builder.build().unwrap();
        let buffer = vec![0u8; config.dimensions.buffer_size()];
        Display::new(MockInterface::new(), config, buffer).unwrap()
    }

    #[test]
    fn test_new_rejects_wrong_buffer_size() {
        let config = Builder::new()
            .dimensions(Dimensions::WAVESHARE_4IN2_V2)
            .build()
            .unwrap();
        let buffer = vec![0u8; config.dimensions.buffer_size() - 1];
        let result = Display::new(MockInterface::new(), config, buffer);
        assert!(matches!(
            result,
            Err(Error::BufferSizeMismatch { provided, .. }) if provided == ROWS * ROW_BYTES - 1
        ));
    }

    #[test]
    fn test_cold_start_clears_and_activates() {
        let mut display = test_display();
        let mut delay = MockDelay;
        display.init(&mut delay).unwrap();

        // Software reset issued during full-mode setup
        assert!(display.interface.commands.contains(&SOFT_RESET));

        // clear_frame() sends all-white rows to both registers
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
        assert!(
            display
                .interface
                .command_data
                .iter()
                .filter(|(cmd, _)| *cmd == WRITE_RAM_CURRENT || *cmd == WRITE_RAM_PREVIOUS)
                .all(|(_, data)| data.iter().all(|byte| *byte == 0xFF))
        );

        // Full activation follows the clear
        assert_eq!(
            display
                .interface
                .command_data
                .iter()
                .rev()
                .find(|(cmd, _)| *cmd == DISPLAY_UPDATE_SEQUENCE)
                .map(|(_, data)| data.clone()),
            Some(vec![0xF7])
        );
        assert_eq!(display.interface.commands.last(), Some(&MASTER_ACTIVATION));

        assert_eq!(display.state(), RefreshState::Idle);
        assert_eq!(display.mode(), RefreshMode::Full);
    }

    #[test]
    fn test_init_preserves_partial_start_mode() {
        let mut display = test_display_with(
            Builder::new()
                .dimensions(Dimensions::WAVESHARE_4IN2_V2)
                .start_partial(true),
        );
        let mut delay = MockDelay;
        display.init(&mut delay).unwrap();
        assert_eq!(display.mode(), RefreshMode::Partial);
    }

    #[test]
    fn test_show_full_transmits_both_registers() {
        let mut display = test_display();
        let mut delay = MockDelay;
        display.show(&mut delay).unwrap();

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
        assert_eq!(display.state(), RefreshState::Idle);
    }

    #[test]
    fn test_show_full_inverts_rows() {
        let mut display = test_display();
        let mut delay = MockDelay;
        display.buffer_mut().fill(0xA5);
        display.show(&mut delay).unwrap();

        assert!(
            display
                .interface
                .command_data
                .iter()
                .filter(|(cmd, _)| *cmd == WRITE_RAM_CURRENT || *cmd == WRITE_RAM_PREVIOUS)
                .all(|(_, data)| data.iter().all(|byte| *byte == 0x5A))
        );
        // One more inversion recovers the buffer content
        assert!(display.buffer().iter().all(|byte| *byte == 0xA5));
    }

    #[test]
    fn test_partial_cycle_sequence() {
        let mut display = test_display();
        let mut delay = MockDelay;
        display.select_partial_mode().unwrap();
        display.set_pixel(0, 0, Color::Black);
        display.show(&mut delay).unwrap();

        // Partial border/update-control bytes come before the window setup
        let commands = &display.interface.commands;
        let border_pos = commands.iter().position(|c| *c == BORDER_WAVEFORM);
        let window_pos = commands.iter().position(|c| *c == SET_RAM_X_RANGE);
        assert!(border_pos.unwrap() < window_pos.unwrap());
        assert_eq!(
            display
                .interface
                .command_data
                .iter()
                .find(|(cmd, _)| *cmd == BORDER_WAVEFORM)
                .map(|(_, data)| data.clone()),
            Some(vec![0x80])
        );
        assert_eq!(
            display
                .interface
                .command_data
                .iter()
                .find(|(cmd, _)| *cmd == DISPLAY_UPDATE_CONTROL)
                .map(|(_, data)| data.clone()),
            Some(vec![0x00, 0x00])
        );

        // Exactly one register written, one inverted row at a time
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
        let first_row = display
            .interface
            .command_data
            .iter()
            .find(|(cmd, data)| *cmd == WRITE_RAM_CURRENT && data.len() == ROW_BYTES)
            .map(|(_, data)| data.clone())
            .unwrap();
        // Pixel (0,0) set black: buffer 0x80 -> wire 0x7F
        assert_eq!(first_row[0], 0x7F);
        assert!(first_row[1..].iter().all(|byte| *byte == 0xFF));

        // Partial activation, ending idle in partial mode
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
        assert_eq!(display.state(), RefreshState::Idle);
        assert_eq!(display.mode(), RefreshMode::Partial);
    }

    #[test]
    fn test_partial_window_matches_panel() {
        let mut display = test_display();
        let mut delay = MockDelay;
        display.select_partial_mode().unwrap();
        display.show(&mut delay).unwrap();

        assert_eq!(
            display
                .interface
                .command_data
                .iter()
                .find(|(cmd, _)| *cmd == SET_RAM_X_RANGE)
                .map(|(_, data)| data.clone()),
            Some(vec![0x00, 0x31])
        );
        assert_eq!(
            display
                .interface
                .command_data
                .iter()
                .find(|(cmd, _)| *cmd == SET_RAM_Y_RANGE)
                .map(|(_, data)| data.clone()),
            Some(vec![0x00, 0x00, 0x2B, 0x01])
        );
    }

    #[test]
    fn test_mode_persists_until_explicitly_changed() {
        let mut display = test_display();
        let mut delay = MockDelay;
        display.select_partial_mode().unwrap();
        display.show(&mut delay).unwrap();
        display.show(&mut delay).unwrap();

        let partial_activations = display
            .interface
            .command_data
            .iter()
            .filter(|(cmd, data)| *cmd == DISPLAY_UPDATE_SEQUENCE && data == &vec![0xFF])
            .count();
        assert_eq!(partial_activations, 2);
        assert_eq!(display.mode(), RefreshMode::Partial);

        display.init_full(&mut delay, false).unwrap();
        assert_eq!(display.mode(), RefreshMode::Full);
        display.show(&mut delay).unwrap();
        assert_eq!(
            display
                .interface
                .command_data
                .iter()
                .rev()
                .find(|(cmd, _)| *cmd == DISPLAY_UPDATE_SEQUENCE)
                .map(|(_, data)| data.clone()),
            Some(vec![0xF7])
        );
    }

    #[test]
    fn test_init_full_reconfigures_only_from_partial_or_forced() {
        let mut display = test_display();
        let mut delay = MockDelay;

        // Already full, not forced: no hardware traffic
        display.init_full(&mut delay, false).unwrap();
        assert!(display.interface.commands.is_empty());

        display.init_full(&mut delay, true).unwrap();
        assert!(display.interface.commands.contains(&SOFT_RESET));
    }

    #[test]
    fn test_busy_rejection_after_transport_fault() {
        let mut display = test_display();
        let mut delay = MockDelay;
        // Fail partway through the row transmission loop
        display.interface.fail_after_data_writes = Some(10);

        assert!(matches!(
            display.show(&mut delay),
            Err(Error::Interface(MockBusError))
        ));
        // Fail-stop: state stuck, new refreshes rejected, not ready
        assert_eq!(display.state(), RefreshState::RefreshingFull);
        assert!(matches!(display.show(&mut delay), Err(Error::Busy)));
        assert!(matches!(display.select_partial_mode(), Err(Error::Busy)));
        assert!(matches!(
            display.init_full(&mut delay, true),
            Err(Error::Busy)
        ));
        assert!(!display.ready().unwrap());
    }

    #[test]
    fn test_clear_is_idempotent_and_ignores_buffer() {
        let mut display = test_display();
        display.fill(Color::Black);

        display.clear_frame().unwrap();
        let first: Vec<Vec<u8>> = display.interface.data.clone();
        display.clear_frame().unwrap();
        let second = &display.interface.data[first.len()..];

        assert_eq!(first.as_slice(), second);
        assert!(first.iter().all(|row| row.iter().all(|byte| *byte == 0xFF)));
        // Buffer content untouched
        assert!(display.buffer().iter().all(|byte| *byte == 0xFF));
    }

    #[test]
    fn test_select_partial_unsupported() {
        let mut display = test_display_with(
            Builder::new()
                .dimensions(Dimensions::WAVESHARE_4IN2_V2)
                .supports_partial(false),
        );
        assert!(matches!(
            display.select_partial_mode(),
            Err(Error::PartialUnsupported)
        ));
        assert_eq!(display.mode(), RefreshMode::Full);
    }

    #[test]
    fn test_sleep_issues_deep_sleep() {
        let mut display = test_display();
        display.sleep().unwrap();
        assert_eq!(display.interface.commands, vec![DEEP_SLEEP]);
        assert_eq!(display.interface.data, vec![vec![0x01]]);
    }

    #[test]
    fn test_load_lut_validates_length() {
        let mut display = test_display();
        assert!(matches!(
            display.load_lut(&[0u8; 10]),
            Err(Error::InvalidLutLength {
                expected: 233,
                provided: 10
            })
        ));
        display.load_lut(&LUT_ALL).unwrap();
        assert_eq!(display.interface.commands.last(), Some(&WRITE_LUT));
    }

    #[test]
    fn test_pixels_pack_msb_first() {
        let mut display = test_display();
        display.set_pixel(0, 0, Color::Black);
        display.set_pixel(7, 0, Color::Black);
        assert_eq!(display.buffer()[0], 0x81);

        display.set_pixel(8, 1, Color::Black);
        assert_eq!(display.buffer()[ROW_BYTES + 1], 0x80);

        assert_eq!(display.pixel(0, 0), Some(Color::Black));
        assert_eq!(display.pixel(1, 0), Some(Color::White));
        display.set_pixel(0, 0, Color::White);
        assert_eq!(display.pixel(0, 0), Some(Color::White));
    }

    #[test]
    fn test_out_of_bounds_pixels_ignored() {
        let mut display = test_display();
        display.set_pixel(400, 0, Color::Black);
        display.set_pixel(0, 300, Color::Black);
        assert!(display.buffer().iter().all(|byte| *byte == 0x00));
        assert_eq!(display.pixel(400, 0), None);
        assert_eq!(display.pixel(0, 300), None);
    }

    #[test]
    fn test_fill() {
        let mut display = test_display();
        display.fill(Color::Black);
        assert!(display.buffer().iter().all(|byte| *byte == 0xFF));
        display.fill(Color::White);
        assert!(display.buffer().iter().all(|byte| *byte == 0x00));
    }

    #[test]
    fn test_dimensions_exposed() {
        let display = test_display();
        assert_eq!(display.width(), 400);
        assert_eq!(display.height(), 300);
    }

    #[test]
    fn test_ready_when_idle() {
        let mut display = test_display();
        assert!(display.ready().unwrap());
    }
}
