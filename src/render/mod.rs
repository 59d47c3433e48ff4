//! Rendering pipeline: strip assembly and the terminal driver.

pub mod driver;
pub mod strip;

pub use driver::Driver;
pub use strip::{CellStyle, Strip, StyledCell};
