pub mod commands;
pub mod formats;
pub mod model;
pub mod reports;
pub mod tabulator;
pub mod util;

pub use model::{Election, ElectionError};
pub use tabulator::TabulationOptions;
