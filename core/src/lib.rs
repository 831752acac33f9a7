pub mod error;
mod reading;
mod watering;

pub use reading::*;
pub use watering::*;

pub static CORE_VERSION: &str = env!("CARGO_PKG_VERSION");
