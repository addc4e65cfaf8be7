use clap::Parser;

use std::io;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "labelled-upload", version, about = "Stores uploaded images next to a JSON label")]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "UPLOAD_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Where images and sidecars are written [default: `uploads` beside the executable]
    #[arg(long, env = "UPLOAD_DIR")]
    pub upload_dir: Option<PathBuf>,
}

impl Config {
    pub fn resolve_upload_dir(&self) -> io::Result<PathBuf> {
        match self.upload_dir {
            Some(ref dir) => Ok(dir.clone()),
            None => default_upload_dir(),
        }
    }
}

/// `uploads/` in the directory holding the running executable
pub fn default_upload_dir() -> io::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    let base = exe.parent().ok_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "executable has no parent directory")
    })?;
    Ok(base.join("uploads"))
}
