//! Writes a demo automation curve to `sample_curve.csv` (or the path given
//! as the first argument).
//!
//! Columns: `time` (s), `cutoff` (Hz), `gain` (dB), `pan` (-1..1),
//! `section` (text label that snaps at row boundaries), `note` (sparse text).

use std::path::PathBuf;

use anyhow::{Context, Result};

fn main() -> Result<()> {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_curve.csv"));

    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(["time", "cutoff", "gain", "pan", "section", "note"])?;

    let rows = 32;
    for i in 0..rows {
        let t = i as f64 * 0.5;
        let phase = t * std::f64::consts::TAU / 8.0;
        let cutoff = 800.0 + 600.0 * phase.sin();
        let gain = -12.0 + 6.0 * (phase * 0.5).cos();
        let pan = (phase * 0.25).sin();
        let section = match i * 4 / rows {
            0 => "intro",
            1 => "verse",
            2 => "chorus",
            _ => "outro",
        };
        let note = if i % 8 == 0 { "marker" } else { "" };

        writer.write_record([
            format!("{t:.2}"),
            format!("{cutoff:.3}"),
            format!("{gain:.3}"),
            format!("{pan:.4}"),
            section.to_string(),
            note.to_string(),
        ])?;
    }
    writer.flush()?;

    log::info!("wrote {rows} rows to {}", path.display());
    println!("Wrote {}", path.display());
    Ok(())
}
