use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use super::DagIo;

/// Win32 file primitives; DAGs default to `%LOCALAPPDATA%\Okcash`
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsIo;

impl DagIo for WindowsIo {
    fn mkdir(&self, dirname: &Path) -> std::io::Result<()> {
        std::fs::create_dir_all(dirname)
    }

    fn open_existing(&self, path: &Path) -> std::io::Result<File> {
        OpenOptions::new().read(true).write(true).open(path)
    }

    fn create(&self, path: &Path) -> std::io::Result<File> {
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
    }

    fn file_size(&self, file: &File) -> std::io::Result<u64> {
        Ok(file.metadata()?.len())
    }

    fn join_path(&self, dirname: &Path, filename: &str) -> PathBuf {
        dirname.join(filename)
    }

    fn default_dirname(&self) -> Option<PathBuf> {
        dirs::data_local_dir().map(|dir| dir.join("Okcash"))
    }
}
