//! Streams a tabular time-series as continuously interpolated records,
//! one per fixed tick, ramping numeric columns between consecutive rows.

pub mod config;
pub mod data;
pub mod emit;
pub mod engine;
pub mod error;

pub use config::PlayerConfig;
pub use data::model::{Cell, Dataset, Record};
pub use emit::{ChannelEmitter, Emitter, Frame, JsonLinesEmitter, Recorder};
pub use engine::{ManualScheduler, Phase, Player, Scheduler, ThreadScheduler};
pub use error::{DatasetError, EmitError, PlaybackError};
