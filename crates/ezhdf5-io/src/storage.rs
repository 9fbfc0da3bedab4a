//! Reading and writing container images on disk.

use std::fs::{self, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use ezhdf5_format::Container;

use crate::error::{EngineError, Result};

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> EngineError + '_ {
    move |source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Load and decode the container stored at `path`.
pub(crate) fn load(path: &Path) -> Result<Container> {
    let mut file = fs::File::open(path).map_err(io_err(path))?;
    let len = file.seek(SeekFrom::End(0)).map_err(io_err(path))? as usize;
    file.seek(SeekFrom::Start(0)).map_err(io_err(path))?;
    let mut data = vec![0u8; len];
    file.read_exact(&mut data).map_err(io_err(path))?;
    Ok(Container::decode(&data)?)
}

/// Encode `container` and replace the file at `path` with it.
pub(crate) fn store(path: &Path, container: &Container) -> Result<()> {
    let bytes = container.encode();
    let mut file = fs::File::create(path).map_err(io_err(path))?;
    file.write_all(&bytes).map_err(io_err(path))?;
    file.flush().map_err(io_err(path))
}

/// Write an empty container to `path`. With `exclusive`, fail if the file
/// already exists.
pub(crate) fn create(path: &Path, exclusive: bool) -> Result<Container> {
    let container = Container::new();
    let mut options = OpenOptions::new();
    options.write(true);
    if exclusive {
        options.create_new(true);
    } else {
        options.create(true).truncate(true);
    }
    let mut file = options.open(path).map_err(io_err(path))?;
    file.write_all(&container.encode()).map_err(io_err(path))?;
    file.flush().map_err(io_err(path))?;
    Ok(container)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.ezh5");
        let created = create(&path, false).unwrap();
        let loaded = load(&path).unwrap();
        assert_eq!(created, loaded);
    }

    #[test]
    fn exclusive_create_refuses_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("taken.ezh5");
        create(&path, true).unwrap();
        let err = create(&path, true).unwrap_err();
        match err {
            EngineError::Io { source, .. } => {
                assert_eq!(source.kind(), io::ErrorKind::AlreadyExists)
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("nope.ezh5")).unwrap_err();
        assert!(matches!(err, EngineError::Io { .. }));
    }

    #[test]
    fn load_foreign_file_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foreign.bin");
        fs::write(&path, b"plain text, not a container").unwrap();
        let err = load(&path).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Format(ezhdf5_format::FormatError::SignatureNotFound)
        ));
    }

    #[test]
    fn store_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.ezh5");
        create(&path, false).unwrap();
        let mut c = Container::new();
        c.add_object(
            ezhdf5_format::ObjectId::ROOT,
            "g",
            ezhdf5_format::Object::Group(Default::default()),
        )
        .unwrap();
        store(&path, &c).unwrap();
        assert_eq!(load(&path).unwrap(), c);
    }
}
