use crate::engine::TMP_MARKER;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::{error, info, warn};
use walkdir::{DirEntry, WalkDir};

const STALE_AFTER: Duration = Duration::from_secs(300);

pub(crate) async fn purge_tmp(root: &Path) {
    let root = root.to_path_buf();
    let now = SystemTime::now();

    match tokio::task::spawn_blocking(move || remove_stale(&root, now, STALE_AFTER)).await {
        Ok((removed, failed)) if removed > 0 || failed > 0 => {
            info!(removed, failed, "Cleaned up temporary files");
        },
        Err(e) => {
            error!(error = %e, "Temp file cleanup task panicked");
        },
        _ => {},
    }
}

fn remove_stale(root: &Path, now: SystemTime, threshold: Duration) -> (usize, usize) {
    let mut removed = 0;
    let mut failed = 0;

    WalkDir::new(root)
        .max_depth(1)
        .into_iter()
        .flatten()
        .filter(|entry| is_tmp(entry) && is_stale(entry, now, threshold))
        .for_each(|entry| match std::fs::remove_file(entry.path()) {
            Ok(()) => removed += 1,
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "Temp file removal failed");
                failed += 1;
            },
        });

    (removed, failed)
}

fn is_tmp(entry: &DirEntry) -> bool {
    entry.file_type().is_file()
        && entry.file_name().to_str().is_some_and(|name| name.contains(TMP_MARKER))
}

fn is_stale(entry: &DirEntry, now: SystemTime, threshold: Duration) -> bool {
    entry
        .metadata()
        .ok()
        .and_then(|m| m.modified().ok())
        .and_then(|modified| now.duration_since(modified).ok())
        .is_none_or(|age| age > threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn only_stale_temp_files_are_removed() {
        let dir = tempdir().unwrap();
        let tmp = dir.path().join(format!("draft.kv{TMP_MARKER}7"));
        let value = dir.path().join("draft.kv");
        std::fs::write(&tmp, b"partial").unwrap();
        std::fs::write(&value, b"complete").unwrap();

        let later = SystemTime::now() + Duration::from_secs(3600);
        let (removed, failed) = remove_stale(dir.path(), later, STALE_AFTER);

        assert_eq!((removed, failed), (1, 0));
        assert!(!tmp.exists());
        assert!(value.exists());
    }

    #[test]
    fn fresh_temp_files_survive() {
        let dir = tempdir().unwrap();
        let tmp = dir.path().join(format!("draft.kv{TMP_MARKER}1"));
        std::fs::write(&tmp, b"in flight").unwrap();

        let now = SystemTime::now() + Duration::from_secs(1);
        let (removed, _) = remove_stale(dir.path(), now, STALE_AFTER);

        assert_eq!(removed, 0);
        assert!(tmp.exists());
    }
}
