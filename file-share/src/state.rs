use std::{
    io,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use bytes::Bytes;
use log::{info, warn};
use tokio::fs;
use wire::codec::DEFAULT_MAX_LENGTH;

use crate::{
    errors::FileError,
    message::{validate_filename, FILENAME_FIELD_LEN},
};

// Uploads land here first and are renamed into place once complete.
const PARTIAL_PREFIX: &str = ".upload-";

/// The directory a file sharing server exposes. Cloning is cheap; every
/// connection task holds its own handle.
#[derive(Debug, Clone)]
pub struct SharedDir {
    shared: Arc<Shared>,
}

#[derive(Debug)]
struct Shared {
    root: PathBuf,
    uploads: AtomicU64,
    /// Largest envelope payload this server sends or accepts.
    max_frame_len: u64,
}

impl SharedDir {
    /// Opens `root`, creating it if needed.
    pub async fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        Self::open_with_limit(root, DEFAULT_MAX_LENGTH).await
    }

    /// Like [`SharedDir::open`], with frames capped at `max_frame_len` bytes.
    /// A file is only served when it fits in one reply frame.
    pub async fn open_with_limit(
        root: impl Into<PathBuf>,
        max_frame_len: u64,
    ) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        info!("Sharing directory {}", root.display());

        Ok(Self {
            shared: Arc::new(Shared {
                root,
                uploads: AtomicU64::new(0),
                max_frame_len: max_frame_len.max(FILENAME_FIELD_LEN as u64),
            }),
        })
    }

    pub fn max_frame_len(&self) -> u64 {
        self.shared.max_frame_len
    }

    fn path_of(&self, filename: &str) -> Result<PathBuf, FileError> {
        validate_filename(filename)?;
        Ok(self.shared.root.join(filename))
    }

    pub async fn read(&self, filename: &str) -> Result<Bytes, FileError> {
        let path = self.path_of(filename)?;
        let not_found = |e: io::Error| match e.kind() {
            io::ErrorKind::NotFound => FileError::NotFound(filename.to_string()),
            _ => e.into(),
        };

        let size = fs::metadata(&path).await.map_err(not_found)?.len();
        self.check_size(filename, size)?;

        let contents = fs::read(&path).await.map_err(not_found)?;
        // The file may have grown since the size check.
        self.check_size(filename, contents.len() as u64)?;
        Ok(Bytes::from(contents))
    }

    fn check_size(&self, filename: &str, size: u64) -> Result<(), FileError> {
        if size > self.shared.max_frame_len {
            return Err(FileError::TooLarge {
                filename: filename.to_string(),
                size,
                max: self.shared.max_frame_len,
            });
        }
        Ok(())
    }

    /// Writes the whole file under a temporary name, then renames it, so a
    /// concurrent reader or writer never sees a half written file.
    pub async fn write(&self, filename: &str, contents: &[u8]) -> Result<(), FileError> {
        let path = self.path_of(filename)?;
        let upload = self.shared.uploads.fetch_add(1, Ordering::Relaxed);
        let partial = self
            .shared
            .root
            .join(format!("{PARTIAL_PREFIX}{upload}-{filename}"));

        let written = match fs::write(&partial, contents).await {
            Ok(()) => fs::rename(&partial, &path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            warn!("Unable to store {}: {}", partial.display(), e);
            let _ = fs::remove_file(&partial).await;
            return Err(e.into());
        }

        Ok(())
    }

    /// Sorted names in the shared directory, in-progress uploads excluded.
    pub async fn list(&self) -> Result<Vec<String>, FileError> {
        Ok(list_dir(&self.shared.root).await?)
    }
}

/// Sorted entry names of `dir`, without in-progress uploads. Also used by the
/// client for its local listing.
pub async fn list_dir(dir: &Path) -> io::Result<Vec<String>> {
    let mut entries = fs::read_dir(dir).await?;
    let mut names = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        match entry.file_name().into_string() {
            Ok(name) if name.starts_with(PARTIAL_PREFIX) => {}
            Ok(name) => names.push(name),
            Err(name) => warn!("Skipping non UTF-8 entry {:?}", name),
        }
    }

    names.sort();
    Ok(names)
}
