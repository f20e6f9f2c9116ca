//! Infrastructure layer providing external service integrations.
//!
//! CSV and PNG encoding, file access and the system clipboard.

pub mod clipboard;
pub mod glyphs;
pub mod persistence;
pub mod raster;
pub mod tabular;

pub use persistence::*;
pub use raster::{PngRasterizer, RasterSettings};
pub use tabular::*;
