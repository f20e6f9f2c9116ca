//! StrataSim - Stratigraphic Column Library
//!
//! Records sedimentary layers, derives each layer's depositional environment
//! from its lithology and draws the layers as a stratigraphic column, either
//! in the terminal or as a PNG image.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
pub use application::*;
