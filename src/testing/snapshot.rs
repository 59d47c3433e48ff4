//! Snapshot rendering helpers.
//!
//! Functions for converting rendered strips into plain-text strings suitable
//! for snapshot testing and assertions.

use crate::controls::Control;
use crate::form::value::FieldValue;
use crate::geometry::Region;
use crate::render::strip::Strip;

/// Render one control to plain text, `width` x `height` cells at the origin.
///
/// # Examples
///
/// ```ignore
/// use formdeck::testing::render_control;
///
/// let text = render_control(&rating, Some(&FieldValue::Number(2)), 10);
/// assert_eq!(text, "★★☆☆☆ 2/5");
/// ```
pub fn render_control(control: &dyn Control, value: Option<&FieldValue>, width: i32) -> String {
    let height = control.height();
    let strips = control.render(Region::new(0, 0, width, height), value, false);
    strips_to_string(&strips, width, height)
}

/// Convert raw strips to a plain text string.
///
/// Builds a `width` x `height` grid of spaces, then overlays each strip's cells
/// at the appropriate (x, y) positions. Each row is right-trimmed of spaces, and
/// rows are joined with `'\n'`.
pub fn strips_to_string(strips: &[Strip], width: i32, height: i32) -> String {
    if width <= 0 || height <= 0 {
        return String::new();
    }

    let w = width as usize;
    let h = height as usize;
    let mut grid: Vec<Vec<char>> = vec![vec![' '; w]; h];

    for strip in strips {
        let y = strip.y;
        if y < 0 || y >= height {
            continue;
        }
        let row = y as usize;
        for (i, cell) in strip.cells.iter().enumerate() {
            let x = strip.x_offset + i as i32;
            if x < 0 || x >= width {
                continue;
            }
            grid[row][x as usize] = cell.ch;
        }
    }

    grid.into_iter()
        .map(|row| row.into_iter().collect::<String>().trim_end().to_owned())
        .collect::<Vec<_>>()
        .join("\n")
}
