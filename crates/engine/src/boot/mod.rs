mod error;
mod phase;
mod sequencer;
mod subsystems;

pub use error::{BootError, InitFailure, InitStage, InvalidStateError};
pub use phase::BootPhase;
pub use sequencer::BootSequencer;
pub use subsystems::{SubsystemError, Subsystems};
