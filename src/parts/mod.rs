//! A `FromRequest` wrapper around multipart/form-data.
//!
//! File parts are spooled to temp files as they stream in, text parts are
//! buffered in memory. Handlers take what they need by field name and let the
//! rest drop, which removes any unclaimed temp files.

use bytes::Bytes;
use tempfile::NamedTempFile;

use std::io::Cursor;
use std::path::{Path, PathBuf};

mod actix;

/// The parts of a multipart/form-data request
#[derive(Debug)]
pub struct Parts {
    pub texts: TextParts,
    pub files: FileParts,
}

/// The text parts of a multipart/form-data request
#[derive(Debug, Default)]
pub struct TextParts(pub Vec<(String, Bytes)>);

/// The file parts of a multipart/form-data request
#[derive(Debug, Default)]
pub struct FileParts(pub Vec<(String, File)>);

/// A tempfile wrapper that includes the original filename
#[derive(Debug)]
pub struct File {
    inner: NamedTempFile,
    original_file_name: Option<String>,
    sanitized_file_name: String,
}

/// Returned by [`File::persist_noclobber`]. Hands the file back so the caller
/// can retry under another name.
#[derive(Debug, thiserror::Error)]
#[error("failed to persist uploaded file: {error}")]
pub struct PersistError {
    #[source]
    pub error: std::io::Error,
    pub file: File,
}

#[derive(Debug)]
enum Part {
    Text(Bytes),
    File(File),
}

enum Buffer {
    Cursor(Cursor<Vec<u8>>),
    File(NamedTempFile),
}

/// `FromRequest` configurator, registered as `web::Data<PartsConfig>`
#[derive(Default, Debug, Clone)]
pub struct PartsConfig {
    text_fields: Option<Vec<String>>,
    temp_dir: Option<PathBuf>,
}

impl PartsConfig {
    /// Any form names that should always be interpreted as text, even when the
    /// client attaches a filename
    pub fn with_text_fields(mut self, text_fields: Vec<String>) -> Self {
        self.text_fields = Some(text_fields);
        self
    }

    /// To use a different location than the tempfile default. Files persisted
    /// into this same directory are moved with a plain rename.
    pub fn with_temp_dir<I: Into<PathBuf>>(mut self, temp_dir: I) -> Self {
        self.temp_dir = Some(temp_dir.into());
        self
    }

    fn is_text_field(&self, name: &str) -> bool {
        self.text_fields.iter().flatten().any(|x| x == name)
    }
}

impl Parts {
    /// Builds a [`PartsConfig`] starting from the defaults
    pub fn configure<F: FnOnce(PartsConfig) -> PartsConfig>(f: F) -> PartsConfig {
        f(PartsConfig::default())
    }
}

impl TextParts {
    /// Returns the values for the given name and removes them from the container
    pub fn remove(&mut self, key: &str) -> Vec<Bytes> {
        let (taken, untaken) = self.0.drain(..).partition::<Vec<_>, _>(|(k, _)| k == key);
        self.0 = untaken;
        taken.into_iter().map(|(_, v)| v).collect()
    }
}

impl FileParts {
    /// Returns any files for the given names and removes them from the container
    pub fn remove(&mut self, key: &str) -> Vec<File> {
        let mut taken = Vec::with_capacity(self.0.len());
        let mut untaken = Vec::with_capacity(self.0.len());

        for (k, v) in self.0.drain(..) {
            if k == key {
                taken.push(v);
            } else {
                untaken.push((k, v));
            }
        }

        self.0 = untaken;

        taken
    }
}

impl File {
    pub(crate) fn new(
        inner: NamedTempFile,
        original_file_name: Option<String>,
        content_type: Option<&mime::Mime>,
    ) -> Self {
        let sanitized_file_name =
            sanitized_or_generated(original_file_name.as_deref(), content_type);
        File { inner, original_file_name, sanitized_file_name }
    }

    /// The filename provided in the multipart/form-data request
    pub fn original_file_name(&self) -> Option<&str> {
        self.original_file_name.as_deref()
    }

    /// The sanitized version of the original file name, or generated name if none provided
    pub fn sanitized_file_name(&self) -> &str {
        &self.sanitized_file_name
    }

    /// Moves the tempfile to `path`, failing if anything already exists there.
    /// Returns the full path.
    pub fn persist_noclobber<P: AsRef<Path>>(self, path: P) -> Result<PathBuf, PersistError> {
        let File { inner, original_file_name, sanitized_file_name } = self;
        let path = path.as_ref();
        match inner.persist_noclobber(path) {
            Ok(_) => Ok(path.to_path_buf()),
            Err(e) => Err(PersistError {
                error: e.error,
                file: File { inner: e.file, original_file_name, sanitized_file_name },
            }),
        }
    }
}

#[cfg(unix)]
impl File {
    /// Tempfiles are created 0600; set the mode the persisted file should carry
    pub fn set_permissions(&self, mode: u32) -> std::io::Result<()> {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(self.inner.path(), std::fs::Permissions::from_mode(mode))
    }
}

/// Strips path separators, reserved characters and reserved names from the
/// client's filename. Falls back to a random name with an extension guessed
/// from the MIME type when nothing usable is left.
fn sanitized_or_generated(original: Option<&str>, content_type: Option<&mime::Mime>) -> String {
    let sanitized = original.map(sanitize_filename::sanitize).unwrap_or_default();
    if !sanitized.is_empty() {
        return sanitized;
    }

    let uuid = uuid::Uuid::new_v4().simple();
    match content_type.and_then(mime_guess::get_mime_extensions).and_then(|x| x.first()) {
        Some(ext) => format!("{}.{}", uuid, ext),
        None => uuid.to_string(),
    }
}
