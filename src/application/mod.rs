//! Application layer managing state and business workflows.
//!
//! This module coordinates between the domain layer and presentation layer,
//! owning the session's layer store, the layer form and the configuration.

pub mod config;
pub mod form;
pub mod state;

pub use config::*;
pub use form::*;
pub use state::*;
