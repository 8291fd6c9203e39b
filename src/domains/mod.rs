pub mod crowd;
pub mod logger;
pub mod path_network;

pub use crowd::*;
pub use logger::*;
pub use path_network::*;
