#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use chantier_roadmap::app::RoadmapApp;
use chantier_roadmap::config::RoadmapSettings;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn main() -> eframe::Result<()> {
    let settings = RoadmapSettings::load(&RoadmapSettings::default_path());
    init_tracing(&settings.log_filter);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 400.0])
            .with_title("Chantier Roadmap"),
        ..Default::default()
    };

    eframe::run_native(
        "Chantier Roadmap",
        options,
        Box::new(|cc| Ok(Box::new(RoadmapApp::new(cc)))),
    )
}
