//! The upload directory and the two artifacts written into it per upload.
//!
//! The image is phase one: once it is under its final name the upload is
//! considered received. The sidecar is phase two. Anything that stops the
//! request between the phases leaves an image with no sidecar; the reverse is
//! never produced.

use chrono::{DateTime, Utc};

use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::UploadError;
use crate::parts::File;
use crate::record::UploadRecord;

/// Mode for stored images, matching what a plain `create` under a 022 umask gives
#[cfg(unix)]
const IMAGE_MODE: u32 = 0o644;

/// Longest path component common filesystems accept, in bytes
const NAME_MAX: usize = 255;

const SIDECAR_SUFFIX: &str = ".json";

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

/// An image that has been moved to its final name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub filename: String,
    pub path: PathBuf,
}

impl UploadStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        UploadStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the directory if needed. Existing contents are left alone.
    pub fn bootstrap(&self) -> io::Result<()> {
        fs::create_dir_all(&self.dir)
    }

    pub fn sidecar_path(&self, filename: &str) -> PathBuf {
        self.dir.join(format!("{}{}", filename, SIDECAR_SUFFIX))
    }

    /// Moves `file` to `{millis}-{sanitized name}`. If that name (or its
    /// sidecar) is already taken the millisecond prefix is advanced until a
    /// free name is found, so nothing on disk is ever overwritten.
    pub fn persist_image(
        &self,
        file: File,
        now: DateTime<Utc>,
    ) -> Result<StoredImage, UploadError> {
        #[cfg(unix)]
        file.set_permissions(IMAGE_MODE)?;

        let mut stamp = now.timestamp_millis();
        let mut file = file;
        loop {
            let filename = stamped_name(stamp, file.sanitized_file_name());
            if self.sidecar_path(&filename).exists() {
                stamp += 1;
                continue;
            }

            match file.persist_noclobber(self.dir.join(&filename)) {
                Ok(path) => return Ok(StoredImage { filename, path }),
                Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                    log::warn!("{} already exists, advancing timestamp", filename);
                    file = e.file;
                    stamp += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Writes `{filename}.json` and returns its path
    pub fn write_record(&self, record: &UploadRecord) -> Result<PathBuf, UploadError> {
        let path = self.sidecar_path(&record.filename);
        fs::write(&path, record.to_json_pretty()?)?;
        Ok(path)
    }
}

/// `{stamp}-{name}`, with `name` cut so the sidecar name still fits in `NAME_MAX`
fn stamped_name(stamp: i64, name: &str) -> String {
    let prefix = format!("{}-", stamp);
    let budget = NAME_MAX.saturating_sub(prefix.len() + SIDECAR_SUFFIX.len());
    format!("{}{}", prefix, fit_name(name, budget))
}

/// Cuts `name` to at most `max` bytes on a char boundary, keeping the extension
fn fit_name(name: &str, max: usize) -> Cow<'_, str> {
    if name.len() <= max {
        return Cow::Borrowed(name);
    }

    let (stem, ext) = match name.rfind('.') {
        Some(i) if i > 0 && name.len() - i < max => name.split_at(i),
        _ => (name, ""),
    };
    let keep = (0..=max - ext.len()).rev().find(|&i| stem.is_char_boundary(i)).unwrap_or(0);
    Cow::Owned(format!("{}{}", &stem[..keep], ext))
}
