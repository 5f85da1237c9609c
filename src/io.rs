// ============================================================================
// FILE INGESTION: decode dropped / command-line images off the UI thread
// ============================================================================

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use image::RgbaImage;

/// Extensions the ingestion pipeline will try to decode.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "webp", "bmp", "tga", "ico", "tif", "tiff",
];

/// Result of one ingested item, delivered to the frame loop.
#[derive(Debug)]
pub enum IngestEvent {
    Loaded { name: String, image: RgbaImage },
    Failed { name: String, error: String },
}

pub fn is_supported_path(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

pub fn decode_file(path: &Path) -> Result<RgbaImage, String> {
    Ok(image::open(path).map_err(|e| e.to_string())?.to_rgba8())
}

pub fn decode_bytes(bytes: &[u8]) -> Result<RgbaImage, String> {
    Ok(image::load_from_memory(bytes).map_err(|e| e.to_string())?.to_rgba8())
}

/// Expand `paths` into individual files; directories are walked recursively
/// in name order and only supported extensions are kept from them. Explicit
/// file arguments are kept as-is so unsupported ones are reported, not
/// silently dropped.
pub fn collect_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for p in paths {
        if p.is_dir() {
            walk_dir(p, &mut out);
        } else {
            out.push(p.clone());
        }
    }
    out
}

fn walk_dir(dir: &Path, out: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            log_warn!("Cannot read directory {}: {}", dir.display(), e);
            return;
        }
    };
    let mut children: Vec<PathBuf> = entries.filter_map(|e| e.ok().map(|e| e.path())).collect();
    children.sort();
    for child in children {
        if child.is_dir() {
            walk_dir(&child, out);
        } else if is_supported_path(&child) {
            out.push(child);
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// What the rayon jobs send back. A directory walk reports how many files it
/// queued so the pending count can grow once they are known.
enum Message {
    Queued(usize),
    Done(IngestEvent),
}

/// Background decoder. Directory walks and decodes both run on the rayon
/// pool; results come back through a channel that the frame loop drains
/// with [`drain`].
///
/// `pending` counts outstanding walks plus outstanding decodes, so it stays
/// above zero from submission until the last result is drained.
///
/// [`drain`]: FileIngest::drain
pub struct FileIngest {
    sender: mpsc::Sender<Message>,
    receiver: mpsc::Receiver<Message>,
    pending: usize,
}

impl Default for FileIngest {
    fn default() -> Self {
        Self::new()
    }
}

impl FileIngest {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            pending: 0,
        }
    }

    /// Walks and decodes submitted but not yet drained.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Queue a walk of `paths`; each file it finds gets its own decode job.
    pub fn submit_paths(&mut self, paths: Vec<PathBuf>) {
        if paths.is_empty() {
            return;
        }
        self.pending += 1;
        let sender = self.sender.clone();
        rayon::spawn(move || {
            let files = match catch_unwind(AssertUnwindSafe(|| collect_files(&paths))) {
                Ok(files) => files,
                Err(payload) => {
                    log_err!("Directory walk panicked: {}", panic_message(payload.as_ref()));
                    Vec::new()
                }
            };
            if sender.send(Message::Queued(files.len())).is_err() {
                return;
            }
            for path in files {
                let name = display_name(&path);
                spawn_job(sender.clone(), name, move || {
                    if !is_supported_path(&path) {
                        return Err("unsupported file type".to_string());
                    }
                    decode_file(&path)
                });
            }
        });
    }

    /// Decode an in-memory payload (web drops, pasted bytes).
    pub fn submit_bytes(&mut self, name: String, bytes: Vec<u8>) {
        self.pending += 1;
        spawn_job(self.sender.clone(), name, move || decode_bytes(&bytes));
    }

    fn receive(&mut self, msg: Message, out: &mut Vec<IngestEvent>) {
        match msg {
            Message::Queued(n) => {
                self.pending = (self.pending + n).saturating_sub(1);
            }
            Message::Done(event) => {
                self.pending = self.pending.saturating_sub(1);
                out.push(event);
            }
        }
    }

    /// Everything that finished since the last call. Never blocks.
    pub fn drain(&mut self) -> Vec<IngestEvent> {
        let mut out = Vec::new();
        while let Ok(msg) = self.receiver.try_recv() {
            self.receive(msg, &mut out);
        }
        out
    }

    /// Block until every pending item has been reported. Startup and tests.
    pub fn wait_all(&mut self) -> Vec<IngestEvent> {
        let mut out = self.drain();
        while self.pending > 0 {
            match self.receiver.recv() {
                Ok(msg) => self.receive(msg, &mut out),
                Err(_) => break,
            }
        }
        out
    }

    #[cfg(test)]
    fn submit_job<F>(&mut self, name: &str, job: F)
    where
        F: FnOnce() -> Result<RgbaImage, String> + Send + 'static,
    {
        self.pending += 1;
        spawn_job(self.sender.clone(), name.to_string(), job);
    }
}

/// Run one decode on the pool. A panicking decoder still reports, as
/// `Failed`, so the pending count always reaches zero.
fn spawn_job<F>(sender: mpsc::Sender<Message>, name: String, job: F)
where
    F: FnOnce() -> Result<RgbaImage, String> + Send + 'static,
{
    rayon::spawn(move || {
        let result = match catch_unwind(AssertUnwindSafe(job)) {
            Ok(result) => result,
            Err(payload) => Err(format!("decoder panicked: {}", panic_message(payload.as_ref()))),
        };
        let event = match result {
            Ok(image) => IngestEvent::Loaded { name, image },
            Err(error) => IngestEvent::Failed { name, error },
        };
        let _ = sender.send(Message::Done(event));
    });
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_extensions_are_case_insensitive() {
        assert!(is_supported_path(Path::new("a/b/photo.PNG")));
        assert!(is_supported_path(Path::new("scan.tiff")));
        assert!(!is_supported_path(Path::new("notes.txt")));
        assert!(!is_supported_path(Path::new("noext")));
    }

    #[test]
    fn decode_bytes_rejects_garbage() {
        assert!(decode_bytes(b"definitely not an image").is_err());
    }

    #[test]
    fn panicking_decoder_reports_failure() {
        let mut ingest = FileIngest::new();
        ingest.submit_job("bad.png", || panic!("boom"));
        ingest.submit_job("ok.png", || Ok(RgbaImage::new(2, 2)));
        let events = ingest.wait_all();
        assert_eq!(ingest.pending(), 0);
        assert_eq!(events.len(), 2);
        let failed = events.iter().find_map(|e| match e {
            IngestEvent::Failed { name, error } => Some((name.as_str(), error.as_str())),
            _ => None,
        });
        assert_eq!(failed, Some(("bad.png", "decoder panicked: boom")));
    }

    #[test]
    fn empty_walk_settles_to_zero() {
        let dir = tempfile::tempdir().unwrap();
        let mut ingest = FileIngest::new();
        ingest.submit_paths(vec![dir.path().to_path_buf()]);
        assert_eq!(ingest.pending(), 1);
        assert!(ingest.wait_all().is_empty());
        assert_eq!(ingest.pending(), 0);
    }
}
