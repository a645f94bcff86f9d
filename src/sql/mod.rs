//! Safe SQL builder: identifiers from constants or validated settings, values as parameters.

mod builder;
pub mod params;
pub use builder::*;
pub use params::*;
