use super::schema::{FileState, RemoteFileHandle};
use crate::error::{Error, Result};
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};

/// File operations against the remote service. Every call is one blocking
/// round-trip.
pub trait RemoteFiles {
    /// Upload a local file. `display_name` defaults to the file name.
    fn upload(&self, path: &Path, display_name: Option<&str>) -> Result<RemoteFileHandle>;

    fn list(&self) -> Result<Vec<RemoteFileHandle>>;

    /// Fails with [`Error::NotFound`] when the id can't be resolved.
    fn get(&self, id: &str) -> Result<RemoteFileHandle>;

    /// Fails with [`Error::DeleteFailed`], including for unknown ids.
    fn delete(&self, id: &str) -> Result<()>;

    /// Upload an in-memory buffer. The bytes go through a temp file that
    /// keeps `filename`'s extension and is removed on every exit path.
    fn upload_bytes(
        &self,
        data: &[u8],
        filename: &str,
        display_name: Option<&str>,
    ) -> Result<RemoteFileHandle> {
        let suffix = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();

        let mut tmp = tempfile::Builder::new()
            .prefix("gfilesearch-")
            .suffix(&suffix)
            .tempfile()
            .map_err(|e| Error::UploadFailed(format!("failed to create temp file: {}", e)))?;
        tmp.write_all(data)
            .and_then(|_| tmp.flush())
            .map_err(|e| Error::UploadFailed(format!("failed to write temp file: {}", e)))?;

        // `tmp` is dropped (and deleted) when this returns, whatever the outcome.
        self.upload(tmp.path(), Some(display_name.unwrap_or(filename)))
    }

    /// Poll until the file leaves `PROCESSING`.
    fn wait_until_active(
        &self,
        id: &str,
        timeout: Duration,
        interval: Duration,
    ) -> Result<RemoteFileHandle> {
        let started = Instant::now();
        loop {
            let handle = self.get(id)?;
            match handle.state {
                FileState::Active => return Ok(handle),
                FileState::Failed => {
                    return Err(Error::UploadFailed(format!(
                        "remote processing failed for {}",
                        handle.id
                    )))
                }
                FileState::Processing if started.elapsed() >= timeout => {
                    return Err(Error::Request(format!(
                        "{} still processing after {}s",
                        handle.id,
                        timeout.as_secs()
                    )))
                }
                FileState::Processing => {
                    tracing::debug!("{} still processing, waiting", handle.id);
                    std::thread::sleep(interval);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::cell::{Cell, RefCell};
    use std::path::PathBuf;

    /// Records the path it was handed and whether the file existed then.
    struct Recorder {
        seen: RefCell<Option<(PathBuf, String, String)>>,
        fail: bool,
        states: RefCell<Vec<FileState>>,
        polls: Cell<usize>,
    }

    impl Recorder {
        fn new(fail: bool) -> Self {
            Self {
                seen: RefCell::new(None),
                fail,
                states: RefCell::new(Vec::new()),
                polls: Cell::new(0),
            }
        }

        fn handle(state: FileState) -> RemoteFileHandle {
            RemoteFileHandle {
                id: "files/x".into(),
                display_name: "x".into(),
                uri: "https://example.invalid/files/x".into(),
                state,
                size_bytes: 0,
                uploaded_at: Utc::now(),
                mime_type: "text/plain".into(),
            }
        }
    }

    impl RemoteFiles for Recorder {
        fn upload(&self, path: &Path, display_name: Option<&str>) -> Result<RemoteFileHandle> {
            let content = std::fs::read_to_string(path).unwrap();
            *self.seen.borrow_mut() = Some((
                path.to_path_buf(),
                display_name.unwrap_or_default().to_string(),
                content,
            ));
            if self.fail {
                return Err(Error::UploadFailed("boom".into()));
            }
            Ok(Self::handle(FileState::Active))
        }

        fn list(&self) -> Result<Vec<RemoteFileHandle>> {
            Ok(Vec::new())
        }

        fn get(&self, _id: &str) -> Result<RemoteFileHandle> {
            self.polls.set(self.polls.get() + 1);
            let state = self.states.borrow_mut().pop().unwrap_or(FileState::Active);
            Ok(Self::handle(state))
        }

        fn delete(&self, _id: &str) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn upload_bytes_keeps_extension_and_cleans_up() {
        let store = Recorder::new(false);
        store.upload_bytes(b"hello world", "notes.txt", None).unwrap();

        let (path, name, content) = store.seen.borrow().clone().unwrap();
        assert_eq!(path.extension().unwrap(), "txt");
        assert_eq!(name, "notes.txt");
        assert_eq!(content, "hello world");
        assert!(!path.exists(), "temp file left behind");
    }

    #[test]
    fn upload_bytes_cleans_up_on_remote_failure() {
        let store = Recorder::new(true);
        let err = store
            .upload_bytes(b"data", "report.csv", Some("Q3 report"))
            .unwrap_err();
        assert!(matches!(err, Error::UploadFailed(_)));

        let (path, name, _) = store.seen.borrow().clone().unwrap();
        assert_eq!(name, "Q3 report");
        assert!(!path.exists(), "temp file left behind");
    }

    #[test]
    fn wait_until_active_polls_through_processing() {
        let store = Recorder::new(false);
        // popped from the back
        *store.states.borrow_mut() = vec![
            FileState::Active,
            FileState::Processing,
            FileState::Processing,
        ];
        let handle = store
            .wait_until_active("files/x", Duration::from_secs(5), Duration::from_millis(1))
            .unwrap();
        assert_eq!(handle.state, FileState::Active);
        assert_eq!(store.polls.get(), 3);
    }

    #[test]
    fn wait_until_active_reports_failed_processing() {
        let store = Recorder::new(false);
        *store.states.borrow_mut() = vec![FileState::Failed];
        let err = store
            .wait_until_active("files/x", Duration::from_secs(5), Duration::from_millis(1))
            .unwrap_err();
        assert!(matches!(err, Error::UploadFailed(_)));
    }

    #[test]
    fn wait_until_active_gives_up_after_timeout() {
        let store = Recorder::new(false);
        *store.states.borrow_mut() = vec![FileState::Processing; 3];
        let err = store
            .wait_until_active("files/x", Duration::ZERO, Duration::from_millis(1))
            .unwrap_err();
        assert!(matches!(err, Error::Request(_)));
        assert_eq!(store.polls.get(), 1);
    }
}
