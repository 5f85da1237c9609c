#![windows_subsystem = "windows"]

use clap::Parser;
use eframe::egui;

use frame::app::FrameApp;
use frame::cli::CliArgs;
use frame::editor::Editor;
use frame::ops::clipboard::backend_for_mode;
use frame::settings::AppSettings;
use frame::text::{DEFAULT_TEXT_SIZE, TextRenderer};
use frame::{log_info, log_warn, logger};

fn main() -> Result<(), eframe::Error> {
    let args = CliArgs::parse();

    // Initialize session log (overwrites previous session log)
    logger::init();

    let mut settings = AppSettings::load();
    // First launch: leave a template behind so the keys are discoverable.
    if AppSettings::settings_path().is_some_and(|p| !p.exists())
        && let Err(e) = settings.save()
    {
        log_warn!("Could not write default settings: {}", e);
    }
    args.apply(&mut settings);

    let text = TextRenderer::load_default(DEFAULT_TEXT_SIZE);
    let mut editor = Editor::new(settings.clone(), text);
    if let Some(cb) = backend_for_mode(settings.clipboard) {
        editor = editor.with_clipboard(cb);
    }

    let files = args.expand_files();
    if !files.is_empty() {
        log_info!("Preloading {} file(s)", files.len());
        editor.submit_paths(files);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([settings.canvas_width as f32, settings.canvas_height as f32])
            .with_title(settings.title.clone()),
        ..Default::default()
    };

    eframe::run_native(
        "frame",
        options,
        Box::new(move |cc| Box::new(FrameApp::new(cc, editor))),
    )
}
