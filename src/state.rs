use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};

use rusty_ramp::{
    ChannelEmitter, Dataset, Frame, Phase, Player, PlayerConfig, Record, ThreadScheduler,
};

use crate::color::ColorMap;

/// Number of emitted records kept for the live plot.
pub const HISTORY_LEN: usize = 1200;

/// Frames the clock thread may queue before the UI drains them. Once full,
/// further records are dropped rather than buffered.
pub const FRAME_QUEUE_LEN: usize = HISTORY_LEN;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Player ticking on a background clock thread.
    pub player: Player<ThreadScheduler>,

    /// Records coming back from the player.
    frames: Receiver<Frame>,

    /// Recent records, oldest first, tagged with their tick number.
    pub history: VecDeque<(u64, Record)>,

    /// Ticks received since the last start.
    pub ticks_received: u64,

    /// Column order of the loaded dataset.
    pub columns: Vec<String>,

    /// One colour per column.
    pub color_map: ColorMap,

    /// Ramp duration as edited in the toolbar.
    pub ramp_ms: u64,

    /// Loaded file, if any.
    pub source: Option<PathBuf>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether the last run reached end-of-data.
    pub finished: bool,

    /// Player's completed-run count when the current run started.
    runs_at_start: u64,
}

impl AppState {
    pub fn new(config: PlayerConfig) -> Self {
        Self::with_queue_len(config, FRAME_QUEUE_LEN)
    }

    fn with_queue_len(config: PlayerConfig, queue_len: usize) -> Self {
        let (tx, frames) = mpsc::sync_channel(queue_len);
        let player = Player::new(config, ThreadScheduler, ChannelEmitter::new(tx));
        Self {
            player,
            frames,
            history: VecDeque::with_capacity(HISTORY_LEN),
            ticks_received: 0,
            columns: Vec::new(),
            color_map: ColorMap::default(),
            ramp_ms: config.ramp_ms.max(1),
            source: None,
            status_message: None,
            finished: false,
            runs_at_start: 0,
        }
    }

    /// Ingest a newly loaded dataset. Playback stops.
    pub fn set_dataset(&mut self, dataset: Dataset, path: &Path) {
        self.columns = dataset.columns().to_vec();
        self.color_map = ColorMap::new(&self.columns);
        self.player.load_dataset(dataset);
        self.clear_history();
        self.source = Some(path.to_path_buf());
        self.status_message = None;
    }

    pub fn start(&mut self) {
        self.player.set_ramp_ms(self.ramp_ms);
        self.clear_history();
        match self.player.start() {
            Ok(()) => self.status_message = None,
            Err(e) => self.status_message = Some(format!("Error: {e}")),
        }
    }

    pub fn stop(&mut self) {
        self.player.stop();
    }

    /// Push the toolbar's ramp duration to the player.
    pub fn apply_ramp(&mut self) {
        self.ramp_ms = self.ramp_ms.max(1);
        self.player.set_ramp_ms(self.ramp_ms);
    }

    pub fn phase(&self) -> Phase {
        self.player.phase()
    }

    /// The most recent record, if any arrived.
    pub fn latest(&self) -> Option<&Record> {
        self.history.back().map(|(_, r)| r)
    }

    /// Move everything the player has emitted into the history buffer.
    /// Returns whether any frame arrived.
    pub fn drain_frames(&mut self) -> bool {
        let mut drained = false;
        while let Ok(frame) = self.frames.try_recv() {
            drained = true;
            match frame {
                Frame::Record(record) => {
                    if self.history.len() == HISTORY_LEN {
                        self.history.pop_front();
                    }
                    self.history.push_back((self.ticks_received, record));
                    self.ticks_received += 1;
                }
                Frame::EndOfData => {
                    log::info!("playback reached end of data");
                    self.finished = true;
                }
            }
        }
        // The end-of-data frame is lost when the queue was full at the time.
        if !self.finished && self.player.stats().completed_runs > self.runs_at_start {
            self.finished = true;
        }
        drained
    }

    fn clear_history(&mut self) {
        // Frames from a previous run may still be queued.
        while self.frames.try_recv().is_ok() {}
        self.history.clear();
        self.ticks_received = 0;
        self.finished = false;
        self.runs_at_start = self.player.stats().completed_runs;
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::{Duration, Instant};

    use super::*;

    fn config() -> PlayerConfig {
        PlayerConfig {
            tick_ms: 1,
            ramp_ms: 1,
        }
    }

    fn dataset(rows: usize) -> Dataset {
        Dataset::new(
            vec!["v".to_string()],
            (0..rows).map(|i| vec![i.to_string()]).collect(),
        )
        .unwrap()
    }

    fn wait_until_stopped(state: &AppState) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while state.player.is_running() {
            assert!(Instant::now() < deadline, "playback never finished");
            thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn frames_queued_after_stop_are_still_drained() {
        let mut state = AppState::new(config());
        state.set_dataset(dataset(3), Path::new("three.csv"));
        state.start();
        wait_until_stopped(&state);

        assert!(state.drain_frames());
        assert!(!state.history.is_empty());
        let last = state.latest().and_then(|r| r.get("v")).and_then(|c| c.as_f64());
        assert_eq!(last, Some(2.0));
        assert!(state.finished);
        assert!(!state.drain_frames());
    }

    #[test]
    fn full_queue_drops_frames_instead_of_growing() {
        let mut state = AppState::with_queue_len(config(), 2);
        state.set_dataset(dataset(20), Path::new("twenty.csv"));
        state.start();
        wait_until_stopped(&state);

        assert!(state.drain_frames());
        assert_eq!(state.history.len(), 2);
        assert!(state.player.stats().emit_failures > 0);
        assert!(state.finished);
    }
}
