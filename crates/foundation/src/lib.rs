pub mod fragment;
pub mod geo;

// Foundation crate: small, well-tested primitives only.
pub use fragment::*;
pub use geo::*;
