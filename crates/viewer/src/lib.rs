pub mod display;
pub mod engine;
pub mod orchestrator;
pub mod state;

pub use display::*;
pub use engine::*;
pub use orchestrator::*;
pub use state::*;

pub use basemaps::BasemapRef;
