//! Project scanning: discovers source files under a root, extracts one class per file on a
//! bounded worker pool, then builds the relationship graph over the joined results.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use ignore::WalkBuilder;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::ScanConfig;
use crate::errors::ScanError;
use crate::extractor::{ClassRecord, ProjectStructure, assemble_class, build_project};

/// Why a discovered file contributed nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Could not be read as UTF-8 text.
    Unreadable(String),
    /// Extraction exceeded the per-file timeout.
    TimedOut,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Unreadable(msg) => write!(f, "unreadable: {}", msg),
            SkipReason::TimedOut => write!(f, "timed out"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: SkipReason,
}

#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub structure: ProjectStructure,
    pub skipped: Vec<SkippedFile>,
    /// Every file discovery matched, including skipped and class-less ones.
    pub files_seen: usize,
    /// Files read successfully that declared no class.
    pub files_without_class: usize,
}

enum FileResult {
    Class(Box<ClassRecord>),
    NoClass,
    Skipped(SkipReason),
}

pub struct ProjectScanner {
    config: ScanConfig,
}

impl ProjectScanner {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Matching source files under `root`, sorted.
    pub fn discover(&self, root: &Path) -> Result<Vec<PathBuf>, ScanError> {
        let mut builder = WalkBuilder::new(root);
        let respect = self.config.respect_gitignore;
        builder
            .hidden(false)
            .git_ignore(respect)
            .git_global(respect)
            .git_exclude(respect)
            .ignore(respect)
            .parents(respect)
            .follow_links(false)
            .require_git(false);

        let exclude = self.config.exclude_dirs.clone();
        builder.filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            !(is_dir
                && entry.depth() > 0
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| exclude.iter().any(|d| d == name)))
        });

        let mut files = Vec::new();
        for result in builder.build() {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) if err.depth() == Some(0) => {
                    return Err(ScanError::Walk(root.to_path_buf(), err));
                }
                Err(err) => {
                    warn!("Skipping unreadable entry under {:?}: {}", root, err);
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            if self.has_source_extension(entry.path()) {
                files.push(entry.into_path());
            }
        }
        files.sort();
        debug!("Discovered {} source files under {:?}", files.len(), root);
        Ok(files)
    }

    fn has_source_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.config
                    .extensions
                    .iter()
                    .any(|wanted| wanted.eq_ignore_ascii_case(ext))
            })
    }

    /// Scans every matching file under `root` and derives the project structure.
    ///
    /// Only a missing or non-directory root is fatal; per-file problems are reported
    /// in [`ScanOutcome::skipped`]. Setting `cancel` aborts the scan with
    /// [`ScanError::Cancelled`] instead of returning a partial structure.
    pub async fn scan(
        &self,
        root: &Path,
        cancel: Arc<AtomicBool>,
    ) -> Result<ScanOutcome, ScanError> {
        if !root.exists() {
            return Err(ScanError::RootNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(ScanError::RootNotADirectory(root.to_path_buf()));
        }

        let paths = self.discover(root)?;
        info!("Scanning {} files under {:?}", paths.len(), root);

        let semaphore = Arc::new(Semaphore::new(self.config.effective_concurrency()));
        let timeout = self.config.file_timeout();
        let mut handles: Vec<JoinHandle<FileResult>> = Vec::with_capacity(paths.len());

        for path in &paths {
            if cancel.load(Ordering::SeqCst) {
                abort_all(handles);
                return Err(ScanError::Cancelled);
            }
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| ScanError::Cancelled)?;
            let path = path.clone();
            handles.push(tokio::spawn(async move {
                match timeout {
                    Some(limit) => tokio::time::timeout(limit, process_file(path, permit))
                        .await
                        .unwrap_or(FileResult::Skipped(SkipReason::TimedOut)),
                    None => process_file(path, permit).await,
                }
            }));
        }

        let mut classes = Vec::new();
        let mut skipped = Vec::new();
        let mut files_without_class = 0;

        let mut pending = paths.iter().zip(handles);
        while let Some((path, handle)) = pending.next() {
            if cancel.load(Ordering::SeqCst) {
                handle.abort();
                abort_all(pending.by_ref().map(|(_, h)| h));
                return Err(ScanError::Cancelled);
            }
            match handle.await? {
                FileResult::Class(class) => classes.push(*class),
                FileResult::NoClass => files_without_class += 1,
                FileResult::Skipped(reason) => {
                    warn!("Skipping {:?}: {}", path, reason);
                    skipped.push(SkippedFile {
                        path: path.clone(),
                        reason,
                    });
                }
            }
        }

        if classes.is_empty() {
            warn!("No classes found under {:?}", root);
        }

        let structure = build_project(classes);
        info!(
            "Scan complete: {} classes, {} relationships, {} files skipped",
            structure.classes.len(),
            structure.relationships.len(),
            skipped.len()
        );

        Ok(ScanOutcome {
            structure,
            skipped,
            files_seen: paths.len(),
            files_without_class,
        })
    }
}

fn abort_all<I>(handles: I)
where
    I: IntoIterator<Item = JoinHandle<FileResult>>,
{
    for handle in handles {
        handle.abort();
    }
}

/// Runs `work` on the blocking pool, holding `permit` until `work` returns, even if
/// the caller stops waiting on the handle.
fn run_guarded<F, T>(permit: OwnedSemaphorePermit, work: F) -> JoinHandle<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let _permit = permit;
        work()
    })
}

async fn process_file(path: PathBuf, permit: OwnedSemaphorePermit) -> FileResult {
    let text = match tokio::fs::read_to_string(&path).await {
        Ok(text) => text,
        Err(e) => return FileResult::Skipped(SkipReason::Unreadable(e.to_string())),
    };
    let file_path = path.to_string_lossy().to_string();
    match run_guarded(permit, move || assemble_class(&file_path, &text)).await {
        Ok(Some(class)) => FileResult::Class(Box::new(class)),
        Ok(None) => {
            debug!("No class header in {:?}", path);
            FileResult::NoClass
        }
        Err(e) => FileResult::Skipped(SkipReason::Unreadable(format!(
            "extraction task failed: {}",
            e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_discover_filters_extensions_and_excluded_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "src/B.java", "class B {}");
        write(root, "src/A.java", "class A {}");
        write(root, "src/notes.md", "# notes");
        write(root, "target/Gen.java", "class Gen {}");
        write(root, "build/Old.JAVA", "class Old {}");

        let scanner = ProjectScanner::new(ScanConfig::default());
        let files = scanner.discover(root).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["A.java", "B.java"]);
    }

    #[test]
    fn test_discover_honours_gitignore() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, ".gitignore", "generated/\n");
        write(root, "generated/Skip.java", "class Skip {}");
        write(root, "Keep.java", "class Keep {}");

        let scanner = ProjectScanner::new(ScanConfig::default());
        assert_eq!(scanner.discover(root).unwrap().len(), 1);

        let config = ScanConfig {
            respect_gitignore: false,
            ..ScanConfig::default()
        };
        assert_eq!(ProjectScanner::new(config).discover(root).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_permit_outlives_abandoned_extraction() {
        let semaphore = Arc::new(Semaphore::new(1));
        let permit = semaphore.clone().acquire_owned().await.unwrap();
        let (release, wait) = std::sync::mpsc::channel::<()>();

        let mut handle = run_guarded(permit, move || wait.recv().is_ok());
        let waited =
            tokio::time::timeout(std::time::Duration::from_millis(10), &mut handle).await;
        assert!(waited.is_err());
        // The caller gave up, but the blocking work still owns the slot.
        assert_eq!(semaphore.available_permits(), 0);

        release.send(()).unwrap();
        assert!(handle.await.unwrap());
        assert_eq!(semaphore.available_permits(), 1);
    }

    #[test]
    fn test_skip_reason_display() {
        assert_eq!(SkipReason::TimedOut.to_string(), "timed out");
        assert_eq!(
            SkipReason::Unreadable("bad utf-8".into()).to_string(),
            "unreadable: bad utf-8"
        );
    }
}
