//! Crossterm terminal output backend.
//!
//! The `Driver` wraps a buffered writer and provides methods for entering and
//! leaving the alternate screen and for drawing a frame of strips. Color
//! strings are parsed as named colors or `#rrggbb` hex values.

use std::io::{self, BufWriter, Stdout, Write};

use crossterm::{
    cursor, execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};

use super::strip::{CellStyle, Strip};

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Terminal output backend using crossterm.
///
/// Generic over the writer so frames can be captured in memory. The driver
/// does NOT automatically enter the alternate screen on creation; call
/// `enter_alt_screen` explicitly.
pub struct Driver<W: Write = Stdout> {
    writer: BufWriter<W>,
}

impl Driver<Stdout> {
    /// Create a new driver wrapping stdout.
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }

    /// Get the terminal size (columns, rows) via crossterm.
    pub fn terminal_size() -> io::Result<(u16, u16)> {
        terminal::size()
    }
}

impl Default for Driver<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Driver<W> {
    /// Create a driver over an arbitrary writer.
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
        }
    }

    /// Enter alternate screen and enable raw mode.
    pub fn enter_alt_screen(&mut self) -> io::Result<()> {
        execute!(self.writer, EnterAlternateScreen, cursor::Hide)?;
        terminal::enable_raw_mode()?;
        Ok(())
    }

    /// Leave alternate screen and disable raw mode.
    pub fn leave_alt_screen(&mut self) -> io::Result<()> {
        terminal::disable_raw_mode()?;
        execute!(self.writer, cursor::Show, LeaveAlternateScreen)?;
        Ok(())
    }

    /// Clear the screen and draw every strip at its position.
    ///
    /// Uses `queue!` for batching and flushes once at the end.
    pub fn draw(&mut self, strips: &[Strip]) -> io::Result<()> {
        queue!(self.writer, Clear(ClearType::All))?;
        for strip in strips {
            if strip.y < 0 || strip.x_offset < 0 {
                continue;
            }
            queue!(self.writer, cursor::MoveTo(strip.x_offset as u16, strip.y as u16))?;
            for cell in &strip.cells {
                self.apply_cell_style(&cell.style)?;
                queue!(self.writer, Print(cell.ch), SetAttribute(Attribute::Reset), ResetColor)?;
            }
        }
        self.flush()
    }

    /// Flush the internal write buffer to the terminal.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Consume the driver and return the inner writer.
    pub fn into_inner(self) -> io::Result<W> {
        self.writer.into_inner().map_err(|e| e.into_error())
    }

    /// Queue crossterm style commands for a given `CellStyle`.
    fn apply_cell_style(&mut self, style: &CellStyle) -> io::Result<()> {
        if let Some(color) = style.fg.as_deref().and_then(parse_color) {
            queue!(self.writer, SetForegroundColor(color))?;
        }
        if let Some(color) = style.bg.as_deref().and_then(parse_color) {
            queue!(self.writer, SetBackgroundColor(color))?;
        }
        if style.bold {
            queue!(self.writer, SetAttribute(Attribute::Bold))?;
        }
        if style.dim {
            queue!(self.writer, SetAttribute(Attribute::Dim))?;
        }
        if style.italic {
            queue!(self.writer, SetAttribute(Attribute::Italic))?;
        }
        if style.underline {
            queue!(self.writer, SetAttribute(Attribute::Underlined))?;
        }
        if style.reverse {
            queue!(self.writer, SetAttribute(Attribute::Reverse))?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Color parsing
// ---------------------------------------------------------------------------

/// Parse a color string into a crossterm `Color`.
///
/// Supports `#rrggbb`, `#rgb` and the crossterm named colors (case-insensitive,
/// with `dark_` variants and both `grey`/`gray` spellings).
pub fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim();

    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex_color(hex);
    }

    match s.to_ascii_lowercase().as_str() {
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "white" => Some(Color::White),
        "dark_red" | "darkred" => Some(Color::DarkRed),
        "dark_green" | "darkgreen" => Some(Color::DarkGreen),
        "dark_yellow" | "darkyellow" => Some(Color::DarkYellow),
        "dark_blue" | "darkblue" => Some(Color::DarkBlue),
        "dark_magenta" | "darkmagenta" => Some(Color::DarkMagenta),
        "dark_cyan" | "darkcyan" => Some(Color::DarkCyan),
        "dark_grey" | "dark_gray" | "darkgrey" | "darkgray" => Some(Color::DarkGrey),
        "grey" | "gray" => Some(Color::Grey),
        _ => None,
    }
}

/// Parse a hex color string (without the leading `#`).
fn parse_hex_color(hex: &str) -> Option<Color> {
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Color::Rgb { r, g, b })
        }
        3 => {
            let r = u8::from_str_radix(&hex[0..1], 16).ok()?;
            let g = u8::from_str_radix(&hex[1..2], 16).ok()?;
            let b = u8::from_str_radix(&hex[2..3], 16).ok()?;
            Some(Color::Rgb {
                r: r * 17,
                g: g * 17,
                b: b * 17,
            })
        }
        _ => None,
    }
}

// ===========================================================================
// Tests
// ===========================================================================
