pub mod models;
pub mod store;
pub mod diagram;
pub mod errors;

pub use models::*;
pub use store::*;
pub use diagram::*;
pub use errors::*;
