use std::fs::{DirBuilder, File, OpenOptions};
use std::os::unix::fs::DirBuilderExt;
use std::path::{Path, PathBuf};

use super::DagIo;

/// rwxrwxr-x, as DAG directories are shared between node processes of one user
const DIR_MODE: u32 = 0o775;

/// POSIX file primitives; DAGs default to `$HOME/.okcash`
#[derive(Debug, Clone, Copy, Default)]
pub struct PosixIo;

impl DagIo for PosixIo {
    fn mkdir(&self, dirname: &Path) -> std::io::Result<()> {
        DirBuilder::new().recursive(true).mode(DIR_MODE).create(dirname)
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
        // dirs falls back to the passwd entry when HOME is unset
        let home = dirs::home_dir().filter(|h| !h.as_os_str().is_empty())?;
        Some(home.join(".okcash"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    #[test]
    fn test_mkdir_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("dag");
        PosixIo.mkdir(&target).unwrap();
        PosixIo.mkdir(&target).unwrap();
        let mode = std::fs::metadata(&target).unwrap().permissions().mode();
        assert!(mode & 0o700 == 0o700);
    }

    #[test]
    fn test_open_existing_requires_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing");
        assert!(PosixIo.open_existing(&path).is_err());

        let file = PosixIo.create(&path).unwrap();
        assert_eq!(PosixIo.file_size(&file).unwrap(), 0);
        assert!(PosixIo.open_existing(&path).is_ok());
    }

    #[test]
    fn test_join_and_default_dir() {
        let joined = PosixIo.join_path(Path::new("/var/lib/okcash"), "full-R23-00");
        assert_eq!(joined, PathBuf::from("/var/lib/okcash/full-R23-00"));

        if let Some(dir) = PosixIo.default_dirname() {
            assert!(dir.ends_with(".okcash"));
        }
    }
}
