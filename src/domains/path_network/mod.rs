pub mod geometry;
pub mod path;
pub mod registry;
pub mod triangulation;
pub mod types;

pub use geometry::*;
pub use path::*;
pub use registry::*;
pub use triangulation::*;
pub use types::*;
