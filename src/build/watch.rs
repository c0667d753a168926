//! File watching for automatic rebuilds.
//!
//! Uses `notify-debouncer-full` to watch every registered directory.
//! Changes within the debounce window arrive as one batch.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use notify::event::{MetadataKind, ModifyKind};
use notify::{
    Config as NotifyConfig, EventKind, PollWatcher, RecommendedWatcher, RecursiveMode, Watcher,
};
use notify_debouncer_full::{
    DebounceEventResult, Debouncer, RecommendedCache, new_debouncer, new_debouncer_opt,
};

use super::paths::{canonical_or_self, is_hidden_below};
use super::registry::Registration;
use crate::config::WatchConfig;

// =============================================================================
// Errors
// =============================================================================

#[derive(thiserror::Error, Debug)]
pub enum WatchError {
    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),
}

// =============================================================================
// Watch events
// =============================================================================

/// Events sent from the file watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// Files changed below a watched directory.
    Changed(Vec<PathBuf>),
    /// Watcher error occurred.
    Error(String),
}

// =============================================================================
// Path filtering
// =============================================================================

/// Decides which reported paths are worth a rebuild.
#[derive(Clone)]
pub struct ChangeFilter {
    /// Watched directories; hidden components are only checked below these.
    roots: Vec<PathBuf>,
    /// Output directory; changes there are our own writes.
    output_dir: PathBuf,
}

impl ChangeFilter {
    pub fn new(roots: Vec<PathBuf>, output_dir: &Path) -> Self {
        Self {
            roots,
            output_dir: canonical_or_self(output_dir),
        }
    }

    /// Whether a change at `path` should be reported.
    pub fn accepts(&self, path: &Path) -> bool {
        if path.starts_with(&self.output_dir) {
            return false;
        }

        let root = self
            .roots
            .iter()
            .filter(|root| path.starts_with(root))
            .max_by_key(|root| root.components().count());

        match root {
            Some(root) => !is_hidden_below(root, path),
            None => false,
        }
    }
}

// =============================================================================
// File watcher
// =============================================================================

/// A file watcher that can use either native or polling backend.
pub enum FileWatcher {
    /// Native file system watcher (recommended for local development).
    Native {
        _debouncer: Debouncer<RecommendedWatcher, RecommendedCache>,
        rx: Receiver<WatchEvent>,
    },
    /// Polling-based watcher (for network filesystems, Docker, etc.).
    Polling {
        _debouncer: Debouncer<PollWatcher, RecommendedCache>,
        rx: Receiver<WatchEvent>,
    },
}

impl FileWatcher {
    /// Start watching every registered directory.
    pub fn new(
        config: &WatchConfig,
        registrations: &[Registration],
        output_dir: &Path,
    ) -> Result<Self, WatchError> {
        let debounce_timeout = Duration::from_millis(config.debounce_ms);

        // Create channel for events
        let (tx, rx) = mpsc::channel();

        let filter = ChangeFilter::new(
            registrations.iter().map(|r| r.path.clone()).collect(),
            output_dir,
        );

        // Callback to convert notify events to our WatchEvent type
        let callback = move |result: DebounceEventResult| match result {
            Ok(events) => {
                let mut changed: Vec<PathBuf> = Vec::new();
                for event in events.iter().filter(|e| is_relevant_event(&e.kind)) {
                    for path in &event.paths {
                        if filter.accepts(path) && !changed.contains(path) {
                            changed.push(path.clone());
                        }
                    }
                }

                if !changed.is_empty() {
                    let _ = tx.send(WatchEvent::Changed(changed));
                }
            }
            Err(errors) => {
                for e in errors {
                    let _ = tx.send(WatchEvent::Error(e.to_string()));
                }
            }
        };

        if config.poll {
            let poll_interval = Duration::from_millis(config.poll_interval_ms);
            let notify_config = NotifyConfig::default().with_poll_interval(poll_interval);

            let mut debouncer = new_debouncer_opt::<_, PollWatcher, RecommendedCache>(
                debounce_timeout,
                None,
                callback,
                RecommendedCache::default(),
                notify_config,
            )?;

            add_registrations_to_debouncer(&mut debouncer, registrations)?;

            Ok(FileWatcher::Polling {
                _debouncer: debouncer,
                rx,
            })
        } else {
            let mut debouncer = new_debouncer(debounce_timeout, None, callback)?;

            add_registrations_to_debouncer(&mut debouncer, registrations)?;

            Ok(FileWatcher::Native {
                _debouncer: debouncer,
                rx,
            })
        }
    }

    fn rx(&self) -> &Receiver<WatchEvent> {
        match self {
            FileWatcher::Native { rx, .. } => rx,
            FileWatcher::Polling { rx, .. } => rx,
        }
    }

    /// Receive the next watch event, giving up after `timeout`.
    #[cfg(test)]
    pub fn recv_timeout(&self, timeout: Duration) -> Option<WatchEvent> {
        self.rx().recv_timeout(timeout).ok()
    }

    /// Blocking iterator over watch events.
    ///
    /// Ends when the watcher stops or once `stop` is set; the flag is
    /// checked every `STOP_CHECK_INTERVAL`.
    pub fn events_until<'a>(
        &'a self,
        stop: &'a AtomicBool,
    ) -> impl Iterator<Item = WatchEvent> + 'a {
        std::iter::from_fn(move || {
            while !stop.load(Ordering::Acquire) {
                match self.rx().recv_timeout(STOP_CHECK_INTERVAL) {
                    Ok(event) => return Some(event),
                    Err(RecvTimeoutError::Timeout) => continue,
                    Err(RecvTimeoutError::Disconnected) => return None,
                }
            }
            None
        })
    }
}

const STOP_CHECK_INTERVAL: Duration = Duration::from_millis(200);

/// Add every registered directory to a debouncer.
fn add_registrations_to_debouncer<W: Watcher, C: notify_debouncer_full::FileIdCache>(
    debouncer: &mut Debouncer<W, C>,
    registrations: &[Registration],
) -> Result<(), WatchError> {
    for registration in registrations {
        let mode = if registration.recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        debouncer.watch(&registration.path, mode)?;
    }
    Ok(())
}

/// Check if an event kind is relevant for rebuilds.
///
/// The polling backend reports edits to existing files as a write time
/// change rather than a data change.
fn is_relevant_event(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_)
            | EventKind::Remove(_)
            | EventKind::Modify(ModifyKind::Data(_))
            | EventKind::Modify(ModifyKind::Name(_))
            | EventKind::Modify(ModifyKind::Metadata(MetadataKind::WriteTime))
            | EventKind::Modify(ModifyKind::Any)
    )
}
