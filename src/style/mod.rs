pub mod color;
pub mod font;

pub use color::{Rgb, parse_color};
pub use font::{FontFamily, FontId, FontStyle, resolve_font};
