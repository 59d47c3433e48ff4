//! Strip: a horizontal line of styled terminal cells.
//!
//! A `Strip` is the rendering primitive of the form. Each control produces
//! `Vec<Strip>` for the region it is given; the renderer stacks them and the
//! driver (or the snapshot helpers) turn them into terminal output.

// ---------------------------------------------------------------------------
// CellStyle
// ---------------------------------------------------------------------------

/// Visual style for a single terminal cell.
///
/// Colors are stored as optional strings parsed by the driver as named colors
/// or `#rrggbb` hex values.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CellStyle {
    pub fg: Option<String>,
    pub bg: Option<String>,
    pub bold: bool,
    pub dim: bool,
    pub italic: bool,
    pub underline: bool,
    pub reverse: bool,
}

impl CellStyle {
    /// Create a new `CellStyle` with all attributes unset/false.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the foreground color (builder pattern).
    pub fn fg(mut self, color: impl Into<String>) -> Self {
        self.fg = Some(color.into());
        self
    }

    /// Set bold (builder pattern).
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Set dim (builder pattern).
    pub fn dim(mut self) -> Self {
        self.dim = true;
        self
    }

    /// Set reverse video (builder pattern).
    pub fn reverse(mut self) -> Self {
        self.reverse = true;
        self
    }

    /// Field labels.
    pub fn label() -> Self {
        Self::new().bold()
    }

    /// Inline validation messages.
    pub fn error() -> Self {
        Self::new().fg("red")
    }

    /// Placeholder and hint text.
    pub fn hint() -> Self {
        Self::new().dim()
    }

    /// The focused part of a control.
    pub fn focused() -> Self {
        Self::new().reverse()
    }
}

// ---------------------------------------------------------------------------
// StyledCell
// ---------------------------------------------------------------------------

/// A single terminal cell: one character with associated style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledCell {
    pub ch: char,
    pub style: CellStyle,
}

impl StyledCell {
    /// Create a new styled cell.
    pub fn new(ch: char, style: CellStyle) -> Self {
        Self { ch, style }
    }

    /// A blank (space) cell with the given style.
    pub fn blank_styled(style: CellStyle) -> Self {
        Self { ch: ' ', style }
    }
}

impl Default for StyledCell {
    fn default() -> Self {
        Self::blank_styled(CellStyle::default())
    }
}

// ---------------------------------------------------------------------------
// Strip
// ---------------------------------------------------------------------------

/// A horizontal line of styled terminal cells.
///
/// Each Strip represents one row (at a given y position) starting at `x_offset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Strip {
    /// The row this strip occupies.
    pub y: i32,
    /// Starting x position for this strip's cells.
    pub x_offset: i32,
    /// The cells in left-to-right order.
    pub cells: Vec<StyledCell>,
}

impl Strip {
    /// Create a new empty strip at the given row and x offset.
    pub fn new(y: i32, x_offset: i32) -> Self {
        Self {
            y,
            x_offset,
            cells: Vec::new(),
        }
    }

    /// Create a strip holding `text`, truncated to `max_width` cells.
    pub fn text(y: i32, x_offset: i32, text: &str, style: CellStyle, max_width: i32) -> Self {
        let mut strip = Self::new(y, x_offset);
        let take = max_width.max(0) as usize;
        let truncated: String = text.chars().take(take).collect();
        strip.push_str(&truncated, style);
        strip
    }

    /// Push a single character with the given style.
    pub fn push(&mut self, ch: char, style: CellStyle) {
        self.cells.push(StyledCell::new(ch, style));
    }

    /// Push every character of `text` with the same style.
    pub fn push_str(&mut self, text: &str, style: CellStyle) {
        for ch in text.chars() {
            self.cells.push(StyledCell::new(ch, style.clone()));
        }
    }

    /// The width of this strip in cells.
    pub fn width(&self) -> i32 {
        self.cells.len() as i32
    }

    /// The characters of this strip as a `String`.
    pub fn plain_text(&self) -> String {
        self.cells.iter().map(|c| c.ch).collect()
    }

    /// Pad the strip to exactly `width` cells using spaces with the given style.
    ///
    /// If the strip is already wider than `width`, it is truncated.
    pub fn fill(&mut self, width: i32, style: CellStyle) {
        let w = width.max(0) as usize;
        if self.cells.len() < w {
            self.cells.resize(w, StyledCell::blank_styled(style));
        } else if self.cells.len() > w {
            self.cells.truncate(w);
        }
    }

    /// The rightmost x position (exclusive) of this strip.
    pub fn right(&self) -> i32 {
        self.x_offset + self.width()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
