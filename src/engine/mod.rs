/// Playback engine: the ramp state machine and what drives it.
///
/// ```text
///   Scheduler ──tick──▶ Player ──lock──▶ Playback ──Record──▶ Emitter
///   (clock)            (lifecycle)      (interp)
/// ```

pub mod clock;
pub mod interp;
pub mod playback;
pub mod player;

pub use clock::{ManualScheduler, Scheduler, Task, TaskHandle, ThreadScheduler};
pub use playback::{Phase, Playback, TickOutcome};
pub use player::{Player, PlayerStats};
