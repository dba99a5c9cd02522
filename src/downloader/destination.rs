use crate::utils::with_collision_token;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::sync::Mutex;

/// Maximum number of rename attempts when resolving file collisions
const MAX_RENAME_ATTEMPTS: u32 = 9999;

/// Directory images are written into.
///
/// Picking a free name and creating the file happen under one lock, so
/// concurrent downloads never settle on the same disambiguated name, and the
/// file is opened with `create_new` so an existing file is never overwritten.
#[derive(Debug)]
pub struct Destination {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl Destination {
    /// Create the directory (and its parents) if missing
    pub async fn prepare(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        ::log::debug!("Destination directory ready: {}", dir.display());
        Ok(Self {
            dir,
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Create a new, empty file named `name`, or `name` with the lowest free
    /// collision token if that name is taken.
    pub async fn create_unique(&self, name: &str) -> io::Result<(PathBuf, File)> {
        let _guard = self.lock.lock().await;

        for attempt in 0..=MAX_RENAME_ATTEMPTS {
            let candidate = if attempt == 0 {
                name.to_string()
            } else {
                with_collision_token(name, attempt)
            };
            let path = self.dir.join(&candidate);

            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => {
                    if attempt > 0 {
                        ::log::debug!("{} exists, using {}", name, candidate);
                    }
                    return Ok((path, file));
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            }
        }

        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!(
                "could not find a free name for {} after {} attempts",
                name, MAX_RENAME_ATTEMPTS
            ),
        ))
    }

    /// Remove a file left behind by a failed download
    pub async fn discard(&self, path: &Path) {
        if let Err(e) = fs::remove_file(path).await {
            ::log::warn!("Failed to remove partial file {}: {}", path.display(), e);
        }
    }
}
