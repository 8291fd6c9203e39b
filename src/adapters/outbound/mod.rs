pub mod buffered_logger;
pub mod event_log;
pub mod ground;
pub mod instantiator;
pub mod logging;
pub mod steering;

pub use buffered_logger::*;
pub use event_log::*;
pub use ground::*;
pub use instantiator::*;
pub use logging::*;
pub use steering::*;
