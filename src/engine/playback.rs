use std::sync::Arc;

use log::debug;

use super::interp::interpolate;
use crate::data::model::{Dataset, Record, TypedRow};
use crate::data::parse::parse_row;
use crate::emit::Emitter;
use crate::error::{EmitError, PlaybackError};

/// Observable state of the ramp state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing loaded, or never started.
    Idle,
    /// A settled row with nothing to ramp toward: one-row data or the last row.
    Holding,
    /// Ramping from the settled row toward the target row.
    Ramping,
    /// Halted by `stop()` or by running out of rows.
    Stopped,
}

/// What a single tick did to the state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Re-emitted the settled row, no state change.
    Held,
    /// Emitted an interpolated row at `fraction`; the ramp continues.
    Ramped { fraction: f64 },
    /// The ramp completed and the next row is now the target.
    Advanced,
    /// The ramp completed and no rows remain; playback has stopped.
    Finished,
}

// ---------------------------------------------------------------------------
// Playback – the ramp state machine
// ---------------------------------------------------------------------------

/// Owns all mutable playback state. Driven by [`Playback::tick`], which the
/// caller must serialise; nothing here locks.
#[derive(Debug, Clone)]
pub struct Playback {
    dataset: Arc<Dataset>,
    /// Index of the last row pulled from the dataset.
    cursor: Option<usize>,
    settled: Option<TypedRow>,
    target: Option<TypedRow>,
    elapsed_ms: u64,
    ramp_ms: u64,
    tick_ms: u64,
    running: bool,
    started: bool,
}

impl Playback {
    pub fn new(dataset: Arc<Dataset>, tick_ms: u64, ramp_ms: u64) -> Self {
        Playback {
            dataset,
            cursor: None,
            settled: None,
            target: None,
            elapsed_ms: 0,
            ramp_ms: ramp_ms.max(1),
            tick_ms: tick_ms.max(1),
            running: false,
            started: false,
        }
    }

    /// Swap in a new dataset. Playback halts and state returns to idle.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        self.dataset = dataset;
        self.running = false;
        self.started = false;
        self.reset();
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    /// Clear the row pointer, both anchors and the ramp clock.
    pub fn reset(&mut self) {
        self.cursor = None;
        self.settled = None;
        self.target = None;
        self.elapsed_ms = 0;
    }

    /// Reset and prime the first one or two rows.
    ///
    /// Emits nothing; the first record comes from the first [`Playback::tick`].
    pub fn start(&mut self) -> Result<(), PlaybackError> {
        self.running = false;
        self.reset();
        let Some(first) = self.next_row() else {
            self.started = false;
            return Err(PlaybackError::EmptyDataset);
        };
        self.settled = Some(first);
        self.target = self.next_row();
        self.running = true;
        self.started = true;
        Ok(())
    }

    /// Halt ticking. State is kept for inspection.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Set the duration of subsequent ramp computations, clamped to 1 ms.
    /// A ramp in progress keeps its elapsed time unscaled.
    pub fn set_ramp_ms(&mut self, ramp_ms: u64) {
        self.ramp_ms = ramp_ms.max(1);
    }

    pub fn ramp_ms(&self) -> u64 {
        self.ramp_ms
    }

    pub fn tick_ms(&self) -> u64 {
        self.tick_ms
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn settled(&self) -> Option<&TypedRow> {
        self.settled.as_ref()
    }

    pub fn target(&self) -> Option<&TypedRow> {
        self.target.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn phase(&self) -> Phase {
        match (self.running, &self.settled, &self.target) {
            (false, _, _) if self.started => Phase::Stopped,
            (false, _, _) | (true, None, _) => Phase::Idle,
            (true, Some(_), None) => Phase::Holding,
            (true, Some(_), Some(_)) => Phase::Ramping,
        }
    }

    /// Current ramp progress, or `None` while holding.
    pub fn fraction(&self) -> Option<f64> {
        self.target
            .as_ref()
            .map(|_| (self.elapsed_ms as f64 / self.ramp_ms as f64).min(1.0))
    }

    /// Advance one tick period and hand exactly one record to `emitter`.
    ///
    /// State advances even if the emitter fails; the failure is returned
    /// after the step is complete. Ticking an engine that is not running
    /// emits nothing and reports `Held`.
    pub fn tick<E: Emitter + ?Sized>(&mut self, emitter: &mut E) -> Result<TickOutcome, EmitError> {
        let Some(settled) = &self.settled else {
            return Ok(TickOutcome::Held);
        };
        if !self.running {
            return Ok(TickOutcome::Held);
        }

        let Some(target) = &self.target else {
            let record = Record::new(self.dataset.columns(), settled.clone());
            emitter.emit(&record)?;
            return Ok(TickOutcome::Held);
        };

        let fraction = (self.elapsed_ms as f64 / self.ramp_ms as f64).min(1.0);
        let record = Record::new(
            self.dataset.columns(),
            interpolate(settled, target, fraction),
        );
        let sent = emitter.emit(&record);

        self.elapsed_ms = self.elapsed_ms.saturating_add(self.tick_ms);
        let outcome = if self.elapsed_ms >= self.ramp_ms {
            self.complete_ramp()
        } else {
            TickOutcome::Ramped { fraction }
        };
        sent.map(|()| outcome)
    }

    fn complete_ramp(&mut self) -> TickOutcome {
        self.settled = self.target.take();
        self.elapsed_ms = 0;
        self.target = self.next_row();
        match self.target {
            Some(_) => {
                debug!("ramp complete, now targeting row {:?}", self.cursor);
                TickOutcome::Advanced
            }
            None => {
                debug!("ramp complete, no rows after {:?}", self.cursor);
                self.running = false;
                TickOutcome::Finished
            }
        }
    }

    /// Pull and type the row after the cursor.
    fn next_row(&mut self) -> Option<TypedRow> {
        let index = self.cursor.map_or(0, |c| c + 1);
        let raw = self.dataset.row(index)?;
        self.cursor = Some(index);
        Some(parse_row(raw))
    }
}
