//! Collision-free file creation in the upload and audio directories.
//!
//! Names are claimed with `create_new`, so two requests landing in the same
//! second never share a file. On a clash a numeric suffix is appended
//! before the extension: `name.ext`, `name_1.ext`, `name_2.ext`, ...

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::{File, OpenOptions};

/// Highest numeric suffix tried before giving up.
const MAX_SUFFIX: u32 = 999;

/// A freshly created, empty file owned by the caller.
#[derive(Debug)]
pub struct ReservedFile {
    pub file: File,
    pub path: PathBuf,
    pub file_name: String,
}

/// Atomically create `<stem>.<ext>` in `dir`, or the first free
/// `<stem>_<n>.<ext>` if that name is taken.
pub async fn reserve(dir: &Path, stem: &str, ext: &str) -> io::Result<ReservedFile> {
    for n in 0..=MAX_SUFFIX {
        let file_name = if n == 0 {
            format!("{stem}.{ext}")
        } else {
            format!("{stem}_{n}.{ext}")
        };
        let path = dir.join(&file_name);

        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => {
                return Ok(ReservedFile {
                    file,
                    path,
                    file_name,
                })
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }

    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("no free name for {stem}.{ext} in {}", dir.display()),
    ))
}
