//! Graphics support via embedded-graphics
//!
//! Implements [`DrawTarget`] directly on [`Display`]: the driver owns the
//! frame buffer and exposes the drawing capability itself, so the rendering
//! layer draws straight into panel memory without an intermediate wrapper.
//!
//! ## Example
//!
//! ```rust,no_run
//! use embedded_graphics::{
//!     mono_font::{ascii::FONT_6X10, MonoTextStyle},
//!     prelude::*,
//!     primitives::{Circle, PrimitiveStyle},
//!     text::Text,
//! };
//! use ssd1683::{Builder, Color, Dimensions, Display};
//! # use core::convert::Infallible;
//! # use embedded_hal::delay::DelayNs;
//! # use ssd1683::{DisplayInterface, ErrorType};
//! # #[derive(Debug)]
//! # struct MockInterface;
//! # impl ErrorType for MockInterface {
//! #     type Error = Infallible;
//! # }
//! # impl DisplayInterface for MockInterface {
//! #     fn send_command(&mut self, _command: u8) -> Result<(), Self::Error> { Ok(()) }
//! #     fn send_data(&mut self, _data: &[u8]) -> Result<(), Self::Error> { Ok(()) }
//! #     fn reset<D: DelayNs>(&mut self, _delay: &mut D) {}
//! #     fn is_busy(&mut self) -> Result<bool, Self::Error> { Ok(false) }
//! #     fn busy_wait<D: DelayNs>(&mut self, _delay: &mut D) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! # let mut delay = MockDelay;
//! let config = match Builder::new().dimensions(Dimensions::WAVESHARE_4IN2_V2).build() {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//! let buffer = [0u8; 300 * 400 / 8];
//! let mut display = match Display::new(MockInterface, config, buffer) {
//!     Ok(display) => display,
//!     Err(_) => return,
//! };
//!
//! let _ = Circle::new(Point::new(100, 50), 40)
//!     .into_styled(PrimitiveStyle::with_stroke(Color::Black, 2))
//!     .draw(&mut display);
//!
//! let _ = Text::new(
//!     "12:34:56",
//!     Point::new(10, 100),
//!     MonoTextStyle::new(&FONT_6X10, Color::Black),
//! )
//! .draw(&mut display);
//!
//! // Transmit to the panel
//! let _ = display.show(&mut delay);
//! ```

use core::convert::Infallible;
use embedded_graphics_core::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Point, Size},
    prelude::Pixel,
};

use crate::color::Color;
use crate::display::Display;
use crate::interface::DisplayInterface;

impl<I, B> DrawTarget for Display<I, B>
where
    I: DisplayInterface,
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    type Color = Color;
    type Error = Infallible;

    fn draw_iter<Iter>(&mut self, pixels: Iter) -> Result<(), Self::Error>
    where
        Iter: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(Point { x, y }, color) in pixels {
            if x < 0 || y < 0 || x > i32::from(u16::MAX) || y > i32::from(u16::MAX) {
                continue;
            }
            // set_pixel discards out-of-bounds coordinates
            self.set_pixel(x as u16, y as u16, color);
        }

        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill(color);
        Ok(())
    }
}

impl<I, B> OriginDimensions for Display<I, B>
where
    I: DisplayInterface,
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    fn size(&self) -> Size {
        Size::new(u32::from(self.width()), u32::from(self.height()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Builder, Dimensions};
    use alloc::vec;
    use alloc::vec::Vec;
    use embedded_graphics::prelude::*;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
    use embedded_hal::delay::DelayNs;

    #[derive(Debug)]
    struct MockInterface;

    impl crate::interface::ErrorType for MockInterface {
        type Error = core::convert::Infallible;
    }

    impl DisplayInterface for MockInterface {
        fn send_command(&mut self, _command: u8) -> Result<(), Self::Error> {
            Ok(())
        }

        fn send_data(&mut self, _data: &[u8]) -> Result<(), Self::Error> {
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

    fn test_display() -> Display<MockInterface, Vec<u8>> {
        let config = Builder::new()
            .dimensions(Dimensions::WAVESHARE_4IN2_V2)
            .build()
            .unwrap();
        let buffer = vec![0u8; config.dimensions.buffer_size()];
        Display::new(MockInterface, config, buffer).unwrap()
    }

    #[test]
    fn test_size_matches_panel() {
        let display = test_display();
        assert_eq!(display.size(), Size::new(400, 300));
    }

    #[test]
    fn test_draw_rectangle_sets_buffer_bits() {
        let mut display = test_display();
        Rectangle::new(Point::new(0, 0), Size::new(8, 2))
            .into_styled(PrimitiveStyle::with_fill(Color::Black))
            .draw(&mut display)
            .unwrap();

        assert_eq!(display.buffer()[0], 0xFF);
        assert_eq!(display.buffer()[50], 0xFF);
        assert_eq!(display.buffer()[1], 0x00);
    }

    #[test]
    fn test_negative_and_out_of_bounds_pixels_ignored() {
        let mut display = test_display();
        display
            .draw_iter([
                Pixel(Point::new(-1, 0), Color::Black),
                Pixel(Point::new(0, -5), Color::Black),
                Pixel(Point::new(400, 0), Color::Black),
                Pixel(Point::new(0, 300), Color::Black),
            ])
            .unwrap();
        assert!(display.buffer().iter().all(|byte| *byte == 0x00));
    }

    #[test]
    fn test_clear_fills_buffer() {
        let mut display = test_display();
        display.clear(Color::Black).unwrap();
        assert!(display.buffer().iter().all(|byte| *byte == 0xFF));
    }
}
