use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use log::{debug, info, warn};

use super::clock::{Scheduler, TaskHandle};
use super::playback::{Phase, Playback};
use crate::config::PlayerConfig;
use crate::data::model::Dataset;
use crate::emit::Emitter;
use crate::error::PlaybackError;

/// Counters kept across runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerStats {
    /// Ticks that ran the state machine.
    pub ticks: u64,
    /// Records the emitter accepted.
    pub emitted: u64,
    /// Records the emitter failed to take.
    pub emit_failures: u64,
    /// Runs that reached end-of-data.
    pub completed_runs: u64,
}

struct Shared {
    playback: Playback,
    emitter: Box<dyn Emitter + Send>,
    /// Bumped by every stop; ticks from an older schedule see a mismatch.
    epoch: u64,
    stats: PlayerStats,
    /// Set while the emitter keeps failing, so a streak logs one warning.
    failing: bool,
}

// ---------------------------------------------------------------------------
// Player – lifecycle around the state machine
// ---------------------------------------------------------------------------

/// Drives a [`Playback`] from a [`Scheduler`] and feeds an [`Emitter`].
///
/// All state sits behind one mutex, so `start`/`stop` are safe to call from
/// another thread while a clock is ticking. Once `stop` returns, no tick of
/// the cancelled schedule will run.
pub struct Player<S: Scheduler> {
    shared: Arc<Mutex<Shared>>,
    scheduler: S,
    task: Option<TaskHandle>,
    tick_period: Duration,
}

impl<S: Scheduler> Player<S> {
    pub fn new<E>(config: PlayerConfig, scheduler: S, emitter: E) -> Self
    where
        E: Emitter + Send + 'static,
    {
        let tick_period = config.tick_period();
        let playback = Playback::new(
            Arc::new(Dataset::empty(Vec::new())),
            tick_period.as_millis() as u64,
            config.ramp_ms,
        );
        Player {
            shared: Arc::new(Mutex::new(Shared {
                playback,
                emitter: Box::new(emitter),
                epoch: 0,
                stats: PlayerStats::default(),
                failing: false,
            })),
            scheduler,
            task: None,
            tick_period,
        }
    }

    /// Replace the dataset wholesale. Any playback in progress is stopped.
    pub fn load_dataset(&mut self, dataset: Dataset) {
        self.stop();
        info!(
            "Loaded {} rows with columns {:?}",
            dataset.len(),
            dataset.columns()
        );
        lock(&self.shared).playback.set_dataset(Arc::new(dataset));
    }

    /// Restart playback from the first row.
    ///
    /// On an empty dataset nothing is scheduled and the player stays idle.
    pub fn start(&mut self) -> Result<(), PlaybackError> {
        self.stop();
        let epoch = {
            let mut shared = lock(&self.shared);
            if let Err(e) = shared.playback.start() {
                warn!("not starting: {e}");
                return Err(e);
            }
            info!(
                "starting playback of {} rows, ramp {} ms",
                shared.playback.dataset().len(),
                shared.playback.ramp_ms()
            );
            shared.epoch
        };

        let shared = Arc::clone(&self.shared);
        let task = Box::new(move || run_tick(&shared, epoch));
        self.task = Some(self.scheduler.schedule_repeating(self.tick_period, task));
        Ok(())
    }

    /// Cancel the schedule. Calling this while already stopped is a no-op.
    pub fn stop(&mut self) {
        let mut shared = lock(&self.shared);
        shared.epoch += 1;
        if shared.playback.is_running() {
            info!("stopping playback at row {:?}", shared.playback.cursor());
            shared.playback.stop();
        }
        if let Some(task) = self.task.take() {
            task.cancel();
        }
    }

    /// Applies to ramp computations from the next tick on. Clamped to 1 ms.
    pub fn set_ramp_ms(&self, ramp_ms: u64) {
        lock(&self.shared).playback.set_ramp_ms(ramp_ms);
    }

    pub fn ramp_ms(&self) -> u64 {
        lock(&self.shared).playback.ramp_ms()
    }

    pub fn is_running(&self) -> bool {
        lock(&self.shared).playback.is_running()
    }

    pub fn phase(&self) -> Phase {
        lock(&self.shared).playback.phase()
    }

    pub fn stats(&self) -> PlayerStats {
        lock(&self.shared).stats
    }

    pub fn dataset(&self) -> Arc<Dataset> {
        Arc::clone(lock(&self.shared).playback.dataset())
    }

    /// A copy of the state machine, for inspection.
    pub fn snapshot(&self) -> Playback {
        lock(&self.shared).playback.clone()
    }
}

impl<S: Scheduler> Drop for Player<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Body of the scheduled task.
fn run_tick(shared: &Mutex<Shared>, epoch: u64) -> ControlFlow<()> {
    let mut guard = lock(shared);
    let shared = &mut *guard;
    if shared.epoch != epoch || !shared.playback.is_running() {
        return ControlFlow::Break(());
    }

    shared.stats.ticks += 1;
    match shared.playback.tick(shared.emitter.as_mut()) {
        Ok(_) => {
            shared.stats.emitted += 1;
            if shared.failing {
                info!("emitter recovered");
                shared.failing = false;
            }
        }
        Err(e) => {
            shared.stats.emit_failures += 1;
            if shared.failing {
                debug!("emitter failed: {e}");
            } else {
                warn!("emitter failed: {e}");
                shared.failing = true;
            }
        }
    }

    if shared.playback.is_running() {
        return ControlFlow::Continue(());
    }

    info!(
        "end of data after {} rows",
        shared.playback.cursor().map_or(0, |c| c + 1)
    );
    shared.stats.completed_runs += 1;
    if let Err(e) = shared.emitter.finish() {
        warn!("emitter failed to finish: {e}");
    }
    ControlFlow::Break(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::Recorder;
    use crate::engine::clock::ManualScheduler;

    fn dataset(rows: &[&str]) -> Dataset {
        Dataset::new(
            vec!["x".to_string()],
            rows.iter().map(|r| vec![r.to_string()]).collect(),
        )
        .unwrap()
    }

    fn player(ramp_ms: u64) -> (Player<ManualScheduler>, ManualScheduler, Recorder) {
        let clock = ManualScheduler::new();
        let rec = Recorder::default();
        let cfg = PlayerConfig {
            tick_ms: 16,
            ramp_ms,
        };
        (Player::new(cfg, clock.clone(), rec.clone()), clock, rec)
    }

    #[test]
    fn empty_dataset_does_not_schedule() {
        let (mut p, clock, rec) = player(100);
        p.load_dataset(dataset(&[]));
        assert_eq!(p.start(), Err(PlaybackError::EmptyDataset));
        assert_eq!(clock.active(), 0);
        assert_eq!(p.phase(), Phase::Idle);
        clock.advance(3);
        assert!(rec.is_empty());
    }

    #[test]
    fn start_emits_nothing_until_first_tick() {
        let (mut p, clock, rec) = player(100);
        p.load_dataset(dataset(&["1", "2"]));
        p.start().unwrap();
        assert!(rec.is_empty());
        clock.advance(1);
        assert_eq!(rec.len(), 1);
    }

    #[test]
    fn stop_is_immediate_and_idempotent() {
        let (mut p, clock, rec) = player(1000);
        p.load_dataset(dataset(&["1", "2"]));
        p.start().unwrap();
        clock.advance(3);
        p.stop();
        p.stop();
        clock.advance(10);
        assert_eq!(rec.len(), 3);
        assert_eq!(p.phase(), Phase::Stopped);
        assert_eq!(clock.active(), 0);
    }

    #[test]
    fn restart_replaces_old_schedule() {
        let (mut p, clock, rec) = player(1000);
        p.load_dataset(dataset(&["1", "2"]));
        p.start().unwrap();
        p.start().unwrap();
        clock.advance(4);
        assert_eq!(rec.len(), 4);
        assert_eq!(p.stats().ticks, 4);
    }

    #[test]
    fn end_of_data_finishes_emitter_once() {
        let (mut p, clock, rec) = player(32);
        p.load_dataset(dataset(&["0", "1"]));
        p.start().unwrap();
        clock.advance(10);
        assert_eq!(rec.len(), 2);
        assert!(rec.finished());
        assert_eq!(p.stats().completed_runs, 1);
        assert_eq!(clock.active(), 0);
    }

    #[test]
    fn emitter_failures_do_not_stop_ticking() {
        let clock = ManualScheduler::new();
        let mut accepted = 0;
        let emitter = move |_: &crate::data::model::Record| {
            accepted += 1;
            if accepted % 3 == 0 {
                Ok(())
            } else {
                Err(crate::error::EmitError::Full)
            }
        };
        let cfg = PlayerConfig {
            tick_ms: 16,
            ramp_ms: 1000,
        };
        let mut p = Player::new(cfg, clock.clone(), emitter);
        p.load_dataset(dataset(&["1", "2"]));
        p.start().unwrap();
        clock.advance(6);
        let stats = p.stats();
        assert_eq!(stats.ticks, 6);
        assert_eq!(stats.emitted, 2);
        assert_eq!(stats.emit_failures, 4);
        assert!(p.is_running());
    }

    #[test]
    fn load_stops_running_playback() {
        let (mut p, clock, rec) = player(1000);
        p.load_dataset(dataset(&["1", "2"]));
        p.start().unwrap();
        clock.advance(1);
        p.load_dataset(dataset(&["5"]));
        clock.advance(5);
        assert_eq!(rec.len(), 1);
        assert_eq!(p.phase(), Phase::Idle);
        assert_eq!(p.dataset().len(), 1);
    }
}
