use image::{Rgba, RgbaImage};

use frame::editor::Editor;
use frame::input::InputFrame;
use frame::io::{FileIngest, IngestEvent};
use frame::settings::AppSettings;
use frame::text::TextRenderer;

fn write_png(path: &std::path::Path, w: u32, h: u32) {
    RgbaImage::from_pixel(w, h, Rgba([10, 20, 30, 255])).save(path).unwrap();
}

fn editor() -> Editor {
    Editor::new(AppSettings::default(), TextRenderer::without_font(7.0, 14.0))
}

#[test]
fn directory_drop_loads_images_and_reports_failures() {
    let dir = tempfile::tempdir().unwrap();
    write_png(&dir.path().join("a.png"), 4, 3);
    std::fs::create_dir(dir.path().join("nested")).unwrap();
    write_png(&dir.path().join("nested").join("b.png"), 2, 2);
    std::fs::write(dir.path().join("broken.png"), b"not a png").unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

    let mut ed = editor();
    ed.submit_paths(vec![dir.path().to_path_buf()]);
    // The walk itself is queued; files are only counted once it reports.
    assert_eq!(ed.pending_files(), 1);
    ed.finish_ingest();

    assert_eq!(ed.canvas.len(), 2);
    assert_eq!(ed.pending_files(), 0);
    let status = ed.status().unwrap();
    assert!(status.starts_with("broken.png"), "{}", status);
}

#[test]
fn explicit_unsupported_file_fails_without_stopping_others() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.png");
    let bad = dir.path().join("readme.md");
    write_png(&good, 5, 5);
    std::fs::write(&bad, b"# hi").unwrap();

    let mut ingest = FileIngest::new();
    ingest.submit_paths(vec![bad, good]);
    let events = ingest.wait_all();
    assert_eq!(events.len(), 2);

    let loaded: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            IngestEvent::Loaded { name, image } => Some((name.as_str(), image.dimensions())),
            _ => None,
        })
        .collect();
    assert_eq!(loaded, vec![("good.png", (5, 5))]);

    let failed: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            IngestEvent::Failed { name, error } => Some((name.as_str(), error.as_str())),
            _ => None,
        })
        .collect();
    assert_eq!(failed, vec![("readme.md", "unsupported file type")]);
}

#[test]
fn frames_pick_up_finished_decodes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("one.png");
    write_png(&path, 6, 6);

    let mut ed = editor();
    ed.submit_paths(vec![path]);
    for _ in 0..1000 {
        ed.update(&InputFrame::hover(0, 0));
        if ed.pending_files() == 0 {
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(5));
    }
    assert_eq!(ed.canvas.len(), 1);
    assert_eq!(ed.canvas.image.get_pixel(0, 0)[3], 255);
}

#[test]
fn dropped_bytes_decode_like_files() {
    let mut bytes = Vec::new();
    RgbaImage::from_pixel(3, 7, Rgba([1, 2, 3, 255]))
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageOutputFormat::Png)
        .unwrap();

    let mut ed = editor();
    ed.submit_bytes("drop.png".into(), bytes);
    ed.submit_bytes("junk.png".into(), vec![0, 1, 2]);
    ed.finish_ingest();
    assert_eq!(ed.canvas.len(), 1);
    assert!(ed.status().unwrap().starts_with("junk.png"));
}
