use std::{
    fs, io,
    path::PathBuf,
    sync::{Mutex, PoisonError},
};

/// Storage primitive behind the record store: the whole document as one
/// opaque string. `load` returns `None` when no document exists yet.
pub trait DocumentBackend: Send + Sync {
    fn load(&self) -> io::Result<Option<String>>;
    fn save(&self, contents: &str) -> io::Result<()>;
}

/// Backend persisting the document to a single file on disk.
///
/// Writes go to a sibling temp file first and are renamed over the
/// target, so a crash mid-write never leaves a half-written document.
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DocumentBackend for FileBackend {
    fn load(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn save(&self, contents: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &self.path)
    }
}

/// In-memory backend for tests and dry runs.
#[derive(Default)]
pub struct MemoryBackend {
    contents: Mutex<Option<String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Mutex::new(Some(contents.into())),
        }
    }
}

impl DocumentBackend for MemoryBackend {
    fn load(&self) -> io::Result<Option<String>> {
        let guard = self
            .contents
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(guard.clone())
    }

    fn save(&self, contents: &str) -> io::Result<()> {
        let mut guard = self
            .contents
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Some(contents.to_string());
        Ok(())
    }
}
