//! Finding component folders under a root and loading them

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use walkdir::WalkDir;

use crate::config::ScanConfig;
use crate::model::ComponentFolder;

/// Cooperative cancellation, checked between folders
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ScanProgress<'a> {
    pub done: usize,
    pub total: usize,
    pub folder: &'a Path,
}

/// A path the scan could not look at
#[derive(Debug, Clone)]
pub struct SkippedPath {
    pub path: Option<PathBuf>,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct Discovery {
    pub folders: Vec<PathBuf>,
    pub skipped: Vec<SkippedPath>,
}

#[derive(Debug, Default)]
pub struct ScanResults {
    pub folders: Vec<ComponentFolder>,
    pub skipped: Vec<SkippedPath>,
    pub cancelled: bool,
}

impl ScanResults {
    pub fn has_errors(&self) -> bool {
        self.folders.iter().any(ComponentFolder::has_errors)
    }
}

/// Whether `path`, with `/` separators, contains one of the excluded fragments
pub fn is_excluded(path: &Path, exclude: &[String]) -> bool {
    let mut normalized = path.to_string_lossy().replace('\\', "/");
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    exclude.iter().any(|fragment| normalized.contains(fragment.as_str()))
}

/// Whether `dir` directly holds the marker file (ASCII case-insensitive)
pub fn is_component_folder(dir: &Path, marker: &str) -> bool {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(path = %dir.display(), "cannot list directory: {}", e);
            return false;
        }
    };
    entries.flatten().any(|entry| {
        entry.file_name().to_string_lossy().eq_ignore_ascii_case(marker)
            && entry.path().is_file()
    })
}

/// Walk `root` for component folders. Recursion stops at each one found.
pub fn discover(root: &Path, config: &ScanConfig) -> Discovery {
    let mut discovery = Discovery::default();
    let mut walker = WalkDir::new(root).sort_by_file_name().into_iter();

    loop {
        let entry = match walker.next() {
            None => break,
            Some(Ok(entry)) => entry,
            Some(Err(e)) => {
                let path = e.path().map(Path::to_path_buf);
                tracing::warn!(path = ?path, "skipping: {}", e);
                discovery.skipped.push(SkippedPath {
                    path,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        if !entry.file_type().is_dir() {
            continue;
        }
        if is_excluded(entry.path(), &config.exclude) {
            tracing::debug!(path = %entry.path().display(), "excluded");
            walker.skip_current_dir();
            continue;
        }
        if is_component_folder(entry.path(), &config.marker) {
            discovery.folders.push(entry.path().to_path_buf());
            walker.skip_current_dir();
        }
    }

    discovery
}

fn load_folder(root: &Path, dir: &Path, extension: &str) -> std::io::Result<ComponentFolder> {
    tracing::debug!(path = %dir.display(), "loading folder");
    let mut folder = ComponentFolder::new(root, dir);
    folder.load(extension)?;
    Ok(folder)
}

/// Discover, load and compare every component folder under `root`.
///
/// Folders come back sorted by path whatever `config.jobs` is. A cancelled
/// scan returns the folders finished so far.
pub fn scan<F>(root: &Path, config: &ScanConfig, cancel: &CancelFlag, progress: F) -> ScanResults
where
    F: FnMut(ScanProgress<'_>),
{
    let discovery = discover(root, config);
    scan_discovered(root, discovery, config, cancel, progress)
}

/// Load the folders of an existing discovery. Its skipped paths are carried
/// into the results.
pub fn scan_discovered<F>(
    root: &Path,
    discovery: Discovery,
    config: &ScanConfig,
    cancel: &CancelFlag,
    mut progress: F,
) -> ScanResults
where
    F: FnMut(ScanProgress<'_>),
{
    let total = discovery.folders.len();
    tracing::info!(root = %root.display(), folders = total, "scanning");

    let mut results = ScanResults {
        skipped: discovery.skipped,
        ..ScanResults::default()
    };
    let mut loaded: Vec<(usize, ComponentFolder)> = Vec::with_capacity(total);
    let mut processed = 0usize;
    let mut record = |index: usize, dir: &Path, outcome: std::io::Result<ComponentFolder>, results: &mut ScanResults| {
        processed += 1;
        match outcome {
            Ok(folder) => loaded.push((index, folder)),
            Err(e) => {
                tracing::warn!(path = %dir.display(), "skipping folder: {}", e);
                results.skipped.push(SkippedPath {
                    path: Some(dir.to_path_buf()),
                    reason: e.to_string(),
                });
            }
        }
    };

    if config.jobs <= 1 || total <= 1 {
        for (index, dir) in discovery.folders.iter().enumerate() {
            if cancel.is_cancelled() {
                break;
            }
            let outcome = load_folder(root, dir, &config.extension);
            record(index, dir, outcome, &mut results);
            progress(ScanProgress {
                done: index + 1,
                total,
                folder: dir,
            });
        }
    } else {
        let folders = &discovery.folders;
        let next = AtomicUsize::new(0);
        let (tx, rx) = mpsc::channel();

        thread::scope(|scope| {
            for _ in 0..config.jobs.min(total) {
                let tx = tx.clone();
                let next = &next;
                scope.spawn(move || loop {
                    if cancel.is_cancelled() {
                        break;
                    }
                    let index = next.fetch_add(1, Ordering::SeqCst);
                    let Some(dir) = folders.get(index) else {
                        break;
                    };
                    let outcome = load_folder(root, dir, &config.extension);
                    if tx.send((index, outcome)).is_err() {
                        break;
                    }
                });
            }
            drop(tx);

            for (done, (index, outcome)) in rx.iter().enumerate() {
                let dir = &folders[index];
                record(index, dir, outcome, &mut results);
                progress(ScanProgress {
                    done: done + 1,
                    total,
                    folder: dir,
                });
            }
        });
    }

    results.cancelled = cancel.is_cancelled() && processed < total;
    loaded.sort_by_key(|(index, _)| *index);
    results.folders = loaded.into_iter().map(|(_, folder)| folder).collect();
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclusion_matches_normalized_paths() {
        let exclude = vec!["/getuname/".to_string()];
        assert!(is_excluded(Path::new("/src/getuname"), &exclude));
        assert!(is_excluded(Path::new("/src/getuname/sub"), &exclude));
        assert!(is_excluded(Path::new(r"C:\src\getuname\res"), &exclude));
        assert!(!is_excluded(Path::new("/src/getuname2"), &exclude));
        assert!(!is_excluded(Path::new("/src/other"), &exclude));
    }

    #[test]
    fn test_cancel_flag_is_shared() {
        let flag = CancelFlag::new();
        let clone = flag.clone();
        assert!(!flag.is_cancelled());
        clone.cancel();
        assert!(flag.is_cancelled());
    }
}
