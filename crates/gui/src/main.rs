mod app;

use app::PinmarkApp;
use pinmark_lib::config::AppSettings;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pinmark_gui=info,pinmark_lib=info".into()),
        )
        .init();

    let settings = parse_settings_arg().unwrap_or_else(AppSettings::load);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Pinmark")
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "pinmark-gui",
        native_options,
        Box::new(move |cc| Ok(Box::new(PinmarkApp::new(cc, settings)))),
    ) {
        tracing::error!("Failed to start application: {e}");
    }
}

/// `--settings <path>` overrides the stored settings file
fn parse_settings_arg() -> Option<AppSettings> {
    let args: Vec<String> = std::env::args().collect();
    let index = args.iter().position(|a| a == "--settings")?;
    let path = args.get(index + 1)?;
    match std::fs::read_to_string(path) {
        Ok(json) => match AppSettings::from_json(&json) {
            Ok(settings) => {
                tracing::info!("Loaded settings from {path}");
                Some(settings)
            }
            Err(e) => {
                tracing::error!("{e} ({path})");
                None
            }
        },
        Err(e) => {
            tracing::error!("Failed to read settings file {path}: {e}");
            None
        }
    }
}
