mod game_clock;
mod stats;

pub use game_clock::{FrameInfo, FrameReport, FrameSink, GameClock};
pub use stats::{FrameStatsHandle, FrameStatsSnapshot};
