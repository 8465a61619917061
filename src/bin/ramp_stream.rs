//! Headless player: plays a CSV/JSON table and writes one JSON object per
//! tick to stdout.
//!
//! Usage: `ramp-stream <file> [ramp_ms]`
//!
//! Timing defaults come from `RAMP_TICK_MS` / `RAMP_MS`; a positional
//! `ramp_ms` wins over the environment. Logs go to stderr (`RUST_LOG`).

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use rusty_ramp::data::loader::load_file;
use rusty_ramp::{JsonLinesEmitter, Player, PlayerConfig, ThreadScheduler};

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next().map(PathBuf::from) else {
        bail!("usage: ramp-stream <file> [ramp_ms]");
    };
    let mut config = PlayerConfig::from_env();
    if let Some(raw) = args.next() {
        config.ramp_ms = raw
            .parse()
            .with_context(|| format!("ramp_ms must be an integer, got '{raw}'"))?;
    }

    let dataset =
        load_file(&path).with_context(|| format!("loading {}", path.display()))?;

    let emitter = JsonLinesEmitter::new(std::io::stdout());
    let mut player = Player::new(config, ThreadScheduler, emitter);
    player.load_dataset(dataset);
    player.start()?;

    let mut last = player.stats();
    while player.is_running() {
        thread::sleep(Duration::from_millis(100));
        let now = player.stats();
        if now.emit_failures > last.emit_failures && now.emitted == last.emitted {
            player.stop();
            bail!("stdout is no longer accepting records");
        }
        last = now;
    }

    let stats = player.stats();
    log::info!(
        "done: {} ticks, {} records, {} failures",
        stats.ticks,
        stats.emitted,
        stats.emit_failures
    );
    Ok(())
}
