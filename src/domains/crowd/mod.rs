pub mod agent;
pub mod divergence;
pub mod events;
pub mod ports;
pub mod projections;
pub mod spawner;
pub mod state_machine;

pub use agent::*;
pub use divergence::*;
pub use events::*;
pub use ports::*;
pub use projections::*;
pub use spawner::*;
pub use state_machine::*;
