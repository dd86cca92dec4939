//! File watching for live reload.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use cwrap_skeleton::SKELETON_FILE;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as async_mpsc;

/// Events emitted by the file watcher.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchEvent {
    /// A route's skeleton was written
    SkeletonModified(PathBuf),

    /// Compiled output or a static asset changed
    AssetModified(PathBuf),

    /// File was created
    Created(PathBuf),

    /// File was deleted
    Deleted(PathBuf),
}

impl WatchEvent {
    pub fn path(&self) -> &Path {
        match self {
            WatchEvent::SkeletonModified(p)
            | WatchEvent::AssetModified(p)
            | WatchEvent::Created(p)
            | WatchEvent::Deleted(p) => p,
        }
    }
}

/// Extensions that trigger a reload when modified.
const RELOAD_EXTENSIONS: [&str; 5] = ["html", "css", "js", "json", "ico"];

/// File watcher for detecting changes.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Create a new file watcher for the given paths.
    ///
    /// Paths that do not exist yet are ignored. Returns the watcher and a
    /// channel to receive events.
    pub fn new(
        paths: &[PathBuf],
    ) -> Result<(Self, async_mpsc::Receiver<WatchEvent>), std::io::Error> {
        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })
        .map_err(std::io::Error::other)?;

        for path in paths {
            if path.exists() {
                watcher
                    .watch(path, RecursiveMode::Recursive)
                    .map_err(std::io::Error::other)?;
            }
        }

        std::thread::spawn(move || {
            let mut last_event_time: Option<Instant> = None;
            let debounce_duration = Duration::from_millis(100);

            while let Ok(event) = sync_rx.recv() {
                // A build writes many files at once
                let now = Instant::now();
                if last_event_time.is_some_and(|t| now.duration_since(t) < debounce_duration) {
                    continue;
                }

                for path in event.paths {
                    if let Some(e) = classify_event(&path, &event.kind) {
                        last_event_time = Some(now);
                        let _ = async_tx.blocking_send(e);
                    }
                }
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

/// Classify a notify event into a WatchEvent.
fn classify_event(path: &Path, kind: &notify::EventKind) -> Option<WatchEvent> {
    use notify::EventKind;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let is_skeleton = path.file_name().and_then(|n| n.to_str()) == Some(SKELETON_FILE);

    match kind {
        EventKind::Create(_) => Some(WatchEvent::Created(path.to_path_buf())),
        EventKind::Remove(_) => Some(WatchEvent::Deleted(path.to_path_buf())),
        EventKind::Modify(_) if is_skeleton => Some(WatchEvent::SkeletonModified(path.to_path_buf())),
        EventKind::Modify(_) if RELOAD_EXTENSIONS.contains(&ext) => {
            Some(WatchEvent::AssetModified(path.to_path_buf()))
        }
        _ => None,
    }
}
