pub mod config;
pub mod feature;
pub mod properties;

pub use config::*;
pub use feature::*;
pub use properties::*;
