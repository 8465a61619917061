use std::io::Write;
use std::sync::mpsc::{SyncSender, TrySendError};
use std::sync::{Arc, Mutex};

use crate::data::model::Record;
use crate::error::EmitError;

// ---------------------------------------------------------------------------
// Emitter – where each tick's record goes
// ---------------------------------------------------------------------------

/// A sink that receives one record per producing tick.
///
/// Emitters are called synchronously from inside the tick; they must not
/// block for long and must not call back into the player.
pub trait Emitter {
    fn emit(&mut self, record: &Record) -> Result<(), EmitError>;

    /// Called once when playback runs out of rows.
    fn finish(&mut self) -> Result<(), EmitError> {
        Ok(())
    }
}

impl<F> Emitter for F
where
    F: FnMut(&Record) -> Result<(), EmitError>,
{
    fn emit(&mut self, record: &Record) -> Result<(), EmitError> {
        self(record)
    }
}

// ---------------------------------------------------------------------------
// JSON lines
// ---------------------------------------------------------------------------

/// Writes each record as one JSON object per line and flushes.
pub struct JsonLinesEmitter<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesEmitter<W> {
    pub fn new(out: W) -> Self {
        JsonLinesEmitter { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Emitter for JsonLinesEmitter<W> {
    fn emit(&mut self, record: &Record) -> Result<(), EmitError> {
        serde_json::to_writer(&mut self.out, record)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), EmitError> {
        self.out.flush()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

/// Message sent by [`ChannelEmitter`].
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Record(Record),
    EndOfData,
}

/// Forwards records to another thread, e.g. the UI.
///
/// The channel is bounded and never blocks the clock: a full queue rejects
/// the record with [`EmitError::Full`] and playback carries on.
pub struct ChannelEmitter {
    tx: SyncSender<Frame>,
}

impl ChannelEmitter {
    pub fn new(tx: SyncSender<Frame>) -> Self {
        ChannelEmitter { tx }
    }

    fn send(&self, frame: Frame) -> Result<(), EmitError> {
        self.tx.try_send(frame).map_err(|e| match e {
            TrySendError::Full(_) => EmitError::Full,
            TrySendError::Disconnected(_) => EmitError::Disconnected,
        })
    }
}

impl Emitter for ChannelEmitter {
    fn emit(&mut self, record: &Record) -> Result<(), EmitError> {
        self.send(Frame::Record(record.clone()))
    }

    fn finish(&mut self) -> Result<(), EmitError> {
        self.send(Frame::EndOfData)
    }
}

// ---------------------------------------------------------------------------
// Recorder
// ---------------------------------------------------------------------------

/// Keeps every record in memory. Clones share the same buffer, so one copy
/// can be handed to a player while another is inspected.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    records: Arc<Mutex<Vec<Record>>>,
    finished: Arc<Mutex<bool>>,
}

impl Recorder {
    pub fn records(&self) -> Vec<Record> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether [`Emitter::finish`] has been called.
    pub fn finished(&self) -> bool {
        *self
            .finished
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Emitter for Recorder {
    fn emit(&mut self, record: &Record) -> Result<(), EmitError> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(record.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), EmitError> {
        *self
            .finished
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Cell;
    use std::sync::mpsc;

    fn record() -> Record {
        Record::new(
            &["x".to_string(), "label".to_string()],
            vec![Cell::Numeric(1.6), Cell::Text("start".into())],
        )
    }

    #[test]
    fn json_lines_writes_one_object_per_line() {
        let mut emitter = JsonLinesEmitter::new(Vec::new());
        emitter.emit(&record()).unwrap();
        emitter.emit(&record()).unwrap();
        let text = String::from_utf8(emitter.into_inner()).unwrap();
        assert_eq!(
            text,
            "{\"x\":1.6,\"label\":\"start\"}\n{\"x\":1.6,\"label\":\"start\"}\n"
        );
    }

    #[test]
    fn channel_reports_disconnect() {
        let (tx, rx) = mpsc::sync_channel(4);
        let mut emitter = ChannelEmitter::new(tx);
        emitter.emit(&record()).unwrap();
        emitter.finish().unwrap();
        assert_eq!(rx.recv().unwrap(), Frame::Record(record()));
        assert_eq!(rx.recv().unwrap(), Frame::EndOfData);
        drop(rx);
        assert!(matches!(
            emitter.emit(&record()),
            Err(EmitError::Disconnected)
        ));
    }

    #[test]
    fn full_channel_rejects_without_blocking() {
        let (tx, rx) = mpsc::sync_channel(2);
        let mut emitter = ChannelEmitter::new(tx);
        emitter.emit(&record()).unwrap();
        emitter.emit(&record()).unwrap();
        assert!(matches!(emitter.emit(&record()), Err(EmitError::Full)));
        assert!(matches!(emitter.finish(), Err(EmitError::Full)));

        rx.recv().unwrap();
        emitter.emit(&record()).unwrap();
        assert_eq!(rx.try_iter().count(), 2);
    }

    #[test]
    fn recorder_clones_share_storage() {
        let rec = Recorder::default();
        let mut sink = rec.clone();
        sink.emit(&record()).unwrap();
        sink.finish().unwrap();
        assert_eq!(rec.len(), 1);
        assert!(rec.finished());
    }
}
