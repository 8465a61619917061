mod app;
mod color;
mod state;
mod ui;

use app::RustyRampApp;
use eframe::egui;
use rusty_ramp::PlayerConfig;

fn main() -> eframe::Result {
    env_logger::init();

    let config = PlayerConfig::from_env();
    log::debug!("player config: {config:?}");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Ramp – Row Playback",
        options,
        Box::new(move |_cc| Ok(Box::new(RustyRampApp::new(config)))),
    )
}
