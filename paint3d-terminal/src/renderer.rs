/// Half-block colour output of a frame buffer
use std::io::{self, Write};

use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    QueueableCommand,
};
use paint3d_core::{FrameBuffer, Rgb, Surface};

/// Upper half block: the foreground colours the top pixel, the background
/// the bottom one
const HALF_BLOCK: char = '\u{2580}';

/// A [`Surface`] shown on a 24-bit colour terminal, two pixel rows per
/// character row
pub struct TerminalSurface<W: Write> {
    frame: FrameBuffer,
    out: W,
    status: String,
}

fn colour(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}

impl<W: Write> TerminalSurface<W> {
    /// A surface filling `columns` x `rows` character cells
    pub fn new(out: W, columns: u16, rows: u16) -> Self {
        Self {
            frame: FrameBuffer::new(columns as usize, rows as usize * 2),
            out,
            status: String::new(),
        }
    }

    pub fn resize(&mut self, columns: u16, rows: u16) {
        self.frame.resize(columns as usize, rows as usize * 2);
    }

    /// Text drawn over the top row on the next present
    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    pub fn writer(&mut self) -> &mut W {
        &mut self.out
    }

    fn draw_pixels(&mut self) -> io::Result<()> {
        let rows = self.frame.height() / 2;
        let mut current: Option<(Rgb, Rgb)> = None;

        for row in 0..rows {
            self.out.queue(cursor::MoveTo(0, row as u16))?;
            for x in 0..self.frame.width() {
                let top = self.frame.pixel(x, row * 2).unwrap_or(Rgb::BLACK);
                let bottom = self.frame.pixel(x, row * 2 + 1).unwrap_or(Rgb::BLACK);

                if current != Some((top, bottom)) {
                    self.out
                        .queue(SetForegroundColor(colour(top)))?
                        .queue(SetBackgroundColor(colour(bottom)))?;
                    current = Some((top, bottom));
                }
                self.out.queue(Print(HALF_BLOCK))?;
            }
        }
        self.out.queue(ResetColor)?;
        Ok(())
    }

    fn draw_status(&mut self) -> io::Result<()> {
        if self.status.is_empty() {
            return Ok(());
        }
        let width = self.frame.width();
        let text: String = self.status.chars().take(width).collect();
        self.out
            .queue(cursor::MoveTo(0, 0))?
            .queue(SetForegroundColor(Color::Yellow))?
            .queue(SetBackgroundColor(Color::Black))?
            .queue(Print(text))?
            .queue(ResetColor)?;
        Ok(())
    }
}

impl<W: Write> Surface for TerminalSurface<W> {
    fn width(&self) -> usize {
        self.frame.width()
    }

    fn height(&self) -> usize {
        self.frame.height()
    }

    fn clear(&mut self, colour: Rgb) {
        self.frame.clear(colour);
    }

    fn set_pixel(&mut self, x: i32, y: i32, colour: Rgb) {
        self.frame.set_pixel(x, y, colour);
    }

    fn present(&mut self) -> io::Result<()> {
        self.draw_pixels()?;
        self.draw_status()?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(surface: &mut TerminalSurface<Vec<u8>>) -> String {
        String::from_utf8(std::mem::take(surface.writer())).unwrap()
    }

    #[test]
    fn test_surface_has_two_pixel_rows_per_cell() {
        let surface = TerminalSurface::new(Vec::new(), 10, 4);
        assert_eq!(surface.width(), 10);
        assert_eq!(surface.height(), 8);
    }

    #[test]
    fn test_present_writes_one_block_per_cell() {
        let mut surface = TerminalSurface::new(Vec::new(), 6, 3);
        surface.clear(Rgb::BLACK);
        surface.present().unwrap();

        let text = output(&mut surface);
        assert_eq!(text.chars().filter(|c| *c == HALF_BLOCK).count(), 18);
        // A single colour pair is set once for the whole frame
        assert_eq!(text.matches("38;2;0;0;0").count(), 1);
    }

    #[test]
    fn test_present_colours_top_and_bottom_pixels() {
        let mut surface = TerminalSurface::new(Vec::new(), 2, 1);
        surface.clear(Rgb::BLACK);
        surface.set_pixel(0, 0, Rgb::new(255, 0, 0));
        surface.set_pixel(0, 1, Rgb::new(0, 0, 255));
        surface.present().unwrap();

        let text = output(&mut surface);
        assert!(text.contains("38;2;255;0;0"));
        assert!(text.contains("48;2;0;0;255"));
    }

    #[test]
    fn test_status_is_clipped_to_width() {
        let mut surface = TerminalSurface::new(Vec::new(), 4, 1);
        surface.set_status("mode: solid");
        surface.present().unwrap();

        let text = output(&mut surface);
        assert!(text.contains("mode"));
        assert!(!text.contains("mode:"));
    }

    #[test]
    fn test_resize() {
        let mut surface = TerminalSurface::new(Vec::new(), 4, 2);
        surface.resize(8, 5);
        assert_eq!((surface.width(), surface.height()), (8, 10));
    }
}
