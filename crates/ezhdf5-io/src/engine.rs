//! The process-wide storage engine.
//!
//! Every open file, group and dataset is addressed by a [`Hid`] issued from a
//! single handle table. Containers are held in memory while any handle
//! references them; closing a writable file handle writes the container back
//! to disk, and the container is dropped (after a final flush if modified)
//! when its last handle closes. Opening a path that is already open shares
//! the in-memory container.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use ezhdf5_format::container::split_path;
use ezhdf5_format::{Container, DatasetObject, Dataspace, Datatype, FormatError, Object, ObjectId, RawData};
use log::{debug, trace};

use crate::error::{EngineError, Result};
use crate::hid::{Hid, ObjectKind};
use crate::storage;

#[derive(Debug, Clone, Copy)]
struct HandleEntry {
    kind: ObjectKind,
    slot: u64,
    object: ObjectId,
}

#[derive(Debug)]
struct OpenFile {
    path: PathBuf,
    writable: bool,
    container: Container,
    /// Handles of any kind referencing this container.
    refs: usize,
    dirty: bool,
}

/// Handle table plus the containers it references.
#[derive(Debug, Default)]
pub struct Engine {
    next_hid: i64,
    next_slot: u64,
    handles: HashMap<Hid, HandleEntry>,
    files: HashMap<u64, OpenFile>,
}

static ENGINE: OnceLock<Mutex<Engine>> = OnceLock::new();

/// Lock the process-wide engine.
///
/// Each call holds the lock only as long as the returned guard lives; do not
/// keep a guard across calls that may close handles.
pub fn engine() -> MutexGuard<'static, Engine> {
    ENGINE
        .get_or_init(|| Mutex::new(Engine::new()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

fn canonical(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).map_err(|source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    })
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- handle table ----

    fn alloc(&mut self, kind: ObjectKind, slot: u64, object: ObjectId) -> Hid {
        let hid = Hid(self.next_hid);
        self.next_hid += 1;
        self.handles.insert(hid, HandleEntry { kind, slot, object });
        if let Some(file) = self.files.get_mut(&slot) {
            file.refs += 1;
        }
        trace!("allocated {kind} handle {hid} for object {}", object.0);
        hid
    }

    fn entry(&self, hid: Hid) -> Result<HandleEntry> {
        self.handles
            .get(&hid)
            .copied()
            .ok_or(EngineError::InvalidHandle(hid))
    }

    fn entry_of(&self, hid: Hid, kind: ObjectKind) -> Result<HandleEntry> {
        let entry = self.entry(hid)?;
        if entry.kind != kind {
            return Err(EngineError::WrongKind {
                name: hid.to_string(),
                expected: kind,
                actual: entry.kind,
            });
        }
        Ok(entry)
    }

    /// A file or group handle, usable as the base of a relative name.
    fn location(&self, hid: Hid) -> Result<HandleEntry> {
        let entry = self.entry(hid)?;
        if entry.kind == ObjectKind::Dataset {
            return Err(EngineError::WrongKind {
                name: hid.to_string(),
                expected: ObjectKind::Group,
                actual: ObjectKind::Dataset,
            });
        }
        Ok(entry)
    }

    fn file(&self, slot: u64) -> Result<&OpenFile> {
        self.files
            .get(&slot)
            .ok_or(EngineError::InvalidHandle(Hid::INVALID))
    }

    fn file_mut(&mut self, slot: u64) -> Result<&mut OpenFile> {
        self.files
            .get_mut(&slot)
            .ok_or(EngineError::InvalidHandle(Hid::INVALID))
    }

    fn writable_file(&mut self, slot: u64) -> Result<&mut OpenFile> {
        let file = self.file_mut(slot)?;
        if !file.writable {
            return Err(EngineError::ReadOnly(file.path.clone()));
        }
        Ok(file)
    }

    fn slot_for_path(&self, path: &Path) -> Option<u64> {
        self.files
            .iter()
            .find(|(_, f)| f.path == path)
            .map(|(slot, _)| *slot)
    }

    fn insert_file(&mut self, path: PathBuf, writable: bool, container: Container) -> u64 {
        let slot = self.next_slot;
        self.next_slot += 1;
        self.files.insert(
            slot,
            OpenFile {
                path,
                writable,
                container,
                refs: 0,
                dirty: false,
            },
        );
        slot
    }

    /// Drop one reference to `slot`, flushing and evicting the container when
    /// it was the last.
    fn release(&mut self, slot: u64) -> Result<()> {
        let Some(file) = self.files.get_mut(&slot) else {
            return Ok(());
        };
        file.refs = file.refs.saturating_sub(1);
        if file.refs > 0 {
            return Ok(());
        }
        let result = if file.dirty && file.writable {
            storage::store(&file.path, &file.container)
        } else {
            Ok(())
        };
        if let Some(file) = self.files.remove(&slot) {
            debug!("released container {}", file.path.display());
        }
        result
    }

    fn lookup(&self, slot: u64, from: ObjectId, name: &str) -> Result<Option<ObjectId>> {
        let file = self.file(slot)?;
        file.container.find(from, name).map_err(|e| match e {
            FormatError::InvalidName => EngineError::InvalidName(name.to_string()),
            other => EngineError::Format(other),
        })
    }

    fn lookup_existing(&self, loc: Hid, name: &str) -> Result<(HandleEntry, ObjectId)> {
        let base = self.location(loc)?;
        let id = self
            .lookup(base.slot, base.object, name)?
            .ok_or_else(|| EngineError::NotFound(name.to_string()))?;
        Ok((base, id))
    }

    fn kind_of(&self, slot: u64, id: ObjectId) -> Result<ObjectKind> {
        match self.file(slot)?.container.object(id) {
            Some(Object::Group(_)) => Ok(ObjectKind::Group),
            Some(Object::Dataset(_)) => Ok(ObjectKind::Dataset),
            None => Err(EngineError::InvalidHandle(Hid::INVALID)),
        }
    }

    fn create_object(&mut self, loc: Hid, name: &str, object: Object) -> Result<(u64, ObjectId)> {
        let base = self.location(loc)?;
        let (absolute, segments) =
            split_path(name).map_err(|_| EngineError::InvalidName(name.to_string()))?;
        let Some((leaf, intermediate)) = segments.split_last() else {
            return Err(EngineError::AlreadyExists(name.to_string()));
        };
        if u32::try_from(leaf.len()).is_err() {
            return Err(EngineError::InvalidName(name.to_string()));
        }
        let start = if absolute { ObjectId::ROOT } else { base.object };
        let file = self.writable_file(base.slot)?;
        let parent = file
            .container
            .walk(start, intermediate)
            .ok_or_else(|| EngineError::NotFound(name.to_string()))?;
        if !matches!(file.container.object(parent), Some(Object::Group(_))) {
            return Err(EngineError::NotFound(name.to_string()));
        }
        let id = file
            .container
            .add_object(parent, leaf, object)
            .ok_or_else(|| EngineError::AlreadyExists(name.to_string()))?;
        file.dirty = true;
        Ok((base.slot, id))
    }

    fn dataset(&self, hid: Hid) -> Result<(HandleEntry, &DatasetObject)> {
        let entry = self.entry_of(hid, ObjectKind::Dataset)?;
        match self.file(entry.slot)?.container.object(entry.object) {
            Some(Object::Dataset(ds)) => Ok((entry, ds)),
            _ => Err(EngineError::InvalidHandle(hid)),
        }
    }

    fn dataset_mut(&mut self, hid: Hid) -> Result<&mut DatasetObject> {
        let entry = self.entry_of(hid, ObjectKind::Dataset)?;
        let file = self.writable_file(entry.slot)?;
        file.dirty = true;
        match file.container.object_mut(entry.object) {
            Some(Object::Dataset(ds)) => Ok(ds),
            _ => Err(EngineError::InvalidHandle(hid)),
        }
    }

    // ---- files ----

    /// Create a container at `path`. With `exclusive`, an existing file is an
    /// error; otherwise it is truncated.
    pub fn create_file(&mut self, path: &Path, exclusive: bool) -> Result<Hid> {
        if let Ok(existing) = fs::canonicalize(path) {
            if self.slot_for_path(&existing).is_some() {
                return Err(EngineError::FileAlreadyOpen(existing));
            }
        }
        let container = storage::create(path, exclusive)?;
        let path = canonical(path)?;
        debug!("created container {}", path.display());
        let slot = self.insert_file(path, true, container);
        Ok(self.alloc(ObjectKind::File, slot, ObjectId::ROOT))
    }

    /// Open an existing container.
    pub fn open_file(&mut self, path: &Path, writable: bool) -> Result<Hid> {
        let path = canonical(path)?;
        let slot = match self.slot_for_path(&path) {
            Some(slot) => {
                let file = self.file(slot)?;
                if writable && !file.writable {
                    return Err(EngineError::FileAlreadyOpen(path));
                }
                debug!("reusing open container {}", path.display());
                slot
            }
            None => {
                let container = storage::load(&path)?;
                debug!(
                    "opened container {} ({} objects, writable: {writable})",
                    path.display(),
                    container.len()
                );
                self.insert_file(path, writable, container)
            }
        };
        Ok(self.alloc(ObjectKind::File, slot, ObjectId::ROOT))
    }

    /// Write the container referenced by `hid` to disk. Read-only containers
    /// are left untouched.
    pub fn flush(&mut self, hid: Hid) -> Result<()> {
        let entry = self.entry(hid)?;
        let file = self.file_mut(entry.slot)?;
        if !file.writable {
            return Ok(());
        }
        storage::store(&file.path, &file.container)?;
        file.dirty = false;
        debug!("flushed container {}", file.path.display());
        Ok(())
    }

    // ---- links ----

    /// Whether `name` resolves to an object relative to `loc`.
    pub fn exists(&self, loc: Hid, name: &str) -> Result<bool> {
        let base = self.location(loc)?;
        Ok(self.lookup(base.slot, base.object, name)?.is_some())
    }

    /// The kind of the object at `name`, if any.
    pub fn object_kind(&self, loc: Hid, name: &str) -> Result<Option<ObjectKind>> {
        let base = self.location(loc)?;
        match self.lookup(base.slot, base.object, name)? {
            Some(id) => Ok(Some(self.kind_of(base.slot, id)?)),
            None => Ok(None),
        }
    }

    pub fn create_group(&mut self, loc: Hid, name: &str) -> Result<Hid> {
        let (slot, id) = self.create_object(loc, name, Object::Group(Default::default()))?;
        debug!("created group {name}");
        Ok(self.alloc(ObjectKind::Group, slot, id))
    }

    pub fn open_group(&mut self, loc: Hid, name: &str) -> Result<Hid> {
        let (base, id) = self.lookup_existing(loc, name)?;
        let kind = self.kind_of(base.slot, id)?;
        if kind != ObjectKind::Group {
            return Err(EngineError::WrongKind {
                name: name.to_string(),
                expected: ObjectKind::Group,
                actual: kind,
            });
        }
        debug!("opened group {name}");
        Ok(self.alloc(ObjectKind::Group, base.slot, id))
    }

    // ---- datasets ----

    /// Create a dataset of the given persisted type and extent, zero-filled.
    pub fn create_dataset(
        &mut self,
        loc: Hid,
        name: &str,
        datatype: &Datatype,
        dataspace: &Dataspace,
    ) -> Result<Hid> {
        let object = Object::Dataset(DatasetObject::zeroed(datatype.clone(), dataspace.clone()));
        let (slot, id) = self.create_object(loc, name, object)?;
        debug!("created dataset {name} ({datatype}, {:?})", dataspace.dimensions);
        Ok(self.alloc(ObjectKind::Dataset, slot, id))
    }

    pub fn open_dataset(&mut self, loc: Hid, name: &str) -> Result<Hid> {
        let (base, id) = self.lookup_existing(loc, name)?;
        let kind = self.kind_of(base.slot, id)?;
        if kind != ObjectKind::Dataset {
            return Err(EngineError::WrongKind {
                name: name.to_string(),
                expected: ObjectKind::Dataset,
                actual: kind,
            });
        }
        trace!("opened dataset {name}");
        Ok(self.alloc(ObjectKind::Dataset, base.slot, id))
    }

    /// The persisted type of a dataset.
    pub fn dataset_type(&self, ds: Hid) -> Result<Datatype> {
        Ok(self.dataset(ds)?.1.datatype.clone())
    }

    /// The extent of a dataset.
    pub fn dataset_space(&self, ds: Hid) -> Result<Dataspace> {
        Ok(self.dataset(ds)?.1.dataspace.clone())
    }

    /// Replace the whole contents of a fixed-size dataset with `buf`, laid out
    /// as `mem_type`.
    pub fn write_raw(&mut self, ds: Hid, mem_type: &Datatype, buf: &[u8]) -> Result<()> {
        let target = self.dataset_mut(ds)?;
        check_fixed(target, mem_type, buf.len())?;
        target.data = RawData::Fixed(buf.to_vec());
        trace!("wrote {} bytes to {ds}", buf.len());
        Ok(())
    }

    /// Copy the whole contents of a fixed-size dataset into `buf`, laid out as
    /// `mem_type`.
    pub fn read_raw(&self, ds: Hid, mem_type: &Datatype, buf: &mut [u8]) -> Result<()> {
        let (_, source) = self.dataset(ds)?;
        check_fixed(source, mem_type, buf.len())?;
        match &source.data {
            RawData::Fixed(bytes) if bytes.len() == buf.len() => buf.copy_from_slice(bytes),
            RawData::Fixed(bytes) => {
                return Err(EngineError::Format(FormatError::DataSizeMismatch {
                    expected: buf.len() as u64,
                    actual: bytes.len() as u64,
                }))
            }
            RawData::VarStrings(_) => {
                return Err(EngineError::TypeMismatch {
                    stored: source.datatype.to_string(),
                    given: mem_type.to_string(),
                })
            }
        }
        trace!("read {} bytes from {ds}", buf.len());
        Ok(())
    }

    /// Replace the contents of a variable-length string dataset.
    pub fn write_strings(&mut self, ds: Hid, mem_type: &Datatype, strings: &[&str]) -> Result<()> {
        let target = self.dataset_mut(ds)?;
        check_strings(target, mem_type, strings.len())?;
        target.data = RawData::VarStrings(strings.iter().map(|s| s.to_string()).collect());
        trace!("wrote {} strings to {ds}", strings.len());
        Ok(())
    }

    /// Read every element of a variable-length string dataset.
    pub fn read_strings(&self, ds: Hid, mem_type: &Datatype) -> Result<Vec<String>> {
        let (_, source) = self.dataset(ds)?;
        let n = source.dataspace.num_elements() as usize;
        check_strings(source, mem_type, n)?;
        match &source.data {
            RawData::VarStrings(strings) => Ok(strings.clone()),
            RawData::Fixed(_) => Err(EngineError::TypeMismatch {
                stored: source.datatype.to_string(),
                given: mem_type.to_string(),
            }),
        }
    }

    // ---- close ----

    /// Close a file handle. A writable container is written to disk.
    pub fn close_file(&mut self, hid: Hid) -> Result<()> {
        if !hid.is_valid() {
            return Ok(());
        }
        let entry = self.entry_of(hid, ObjectKind::File)?;
        self.handles.remove(&hid);
        trace!("closed file handle {hid}");
        let flushed = match self.files.get_mut(&entry.slot) {
            Some(file) if file.writable => {
                let result = storage::store(&file.path, &file.container);
                if result.is_ok() {
                    file.dirty = false;
                    debug!("flushed container {} on close", file.path.display());
                }
                result
            }
            _ => Ok(()),
        };
        let released = self.release(entry.slot);
        flushed.and(released)
    }

    pub fn close_group(&mut self, hid: Hid) -> Result<()> {
        self.close_object(hid, ObjectKind::Group)
    }

    pub fn close_dataset(&mut self, hid: Hid) -> Result<()> {
        self.close_object(hid, ObjectKind::Dataset)
    }

    fn close_object(&mut self, hid: Hid, kind: ObjectKind) -> Result<()> {
        if !hid.is_valid() {
            return Ok(());
        }
        let entry = self.entry_of(hid, kind)?;
        self.handles.remove(&hid);
        trace!("closed {kind} handle {hid}");
        self.release(entry.slot)
    }

    // ---- introspection ----

    /// Address of the object behind `hid`; equal addresses mean the same
    /// object.
    pub fn object_address(&self, hid: Hid) -> Result<u64> {
        Ok(self.entry(hid)?.object.0 as u64)
    }

    /// Link names under a file or group handle, in name order.
    pub fn member_names(&self, hid: Hid) -> Result<Vec<String>> {
        let entry = self.location(hid)?;
        self.file(entry.slot)?
            .container
            .member_names(entry.object)
            .ok_or(EngineError::InvalidHandle(hid))
    }

    /// Number of group and dataset handles open in the container of `hid`.
    pub fn open_object_count(&self, hid: Hid) -> Result<usize> {
        let slot = self.entry(hid)?.slot;
        Ok(self
            .handles
            .values()
            .filter(|e| e.slot == slot && e.kind != ObjectKind::File)
            .count())
    }

    /// The role of an open handle.
    pub fn handle_kind(&self, hid: Hid) -> Result<ObjectKind> {
        Ok(self.entry(hid)?.kind)
    }
}

fn check_fixed(ds: &DatasetObject, mem_type: &Datatype, len: usize) -> Result<()> {
    if ds.datatype.is_vlen_string() || !ds.datatype.is_compatible(mem_type) {
        return Err(EngineError::TypeMismatch {
            stored: ds.datatype.to_string(),
            given: mem_type.to_string(),
        });
    }
    let size = mem_type.type_size() as usize;
    let expected = (ds.dataspace.num_elements() as usize).saturating_mul(size);
    if len != expected {
        return Err(EngineError::ExtentMismatch {
            stored: ds.dataspace.dimensions.clone(),
            given: vec![(len / size.max(1)) as u64],
        });
    }
    Ok(())
}

fn check_strings(ds: &DatasetObject, mem_type: &Datatype, count: usize) -> Result<()> {
    if !ds.datatype.is_vlen_string() || !ds.datatype.is_compatible(mem_type) {
        return Err(EngineError::TypeMismatch {
            stored: ds.datatype.to_string(),
            given: mem_type.to_string(),
        });
    }
    if count as u64 != ds.dataspace.num_elements() {
        return Err(EngineError::ExtentMismatch {
            stored: ds.dataspace.dimensions.clone(),
            given: vec![count as u64],
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ezhdf5_format::type_builders::{vlen_string, NATIVE_DOUBLE, NATIVE_INT32};
    use ezhdf5_format::{CharacterSet, StringPadding};

    fn fresh() -> (tempfile::TempDir, PathBuf, Engine, Hid) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.ezh5");
        let mut eng = Engine::new();
        let file = eng.create_file(&path, false).unwrap();
        (dir, path, eng, file)
    }

    #[test]
    fn group_create_then_open_same_address() {
        let (_dir, _path, mut eng, file) = fresh();
        let g1 = eng.create_group(file, "a").unwrap();
        let g2 = eng.open_group(file, "a").unwrap();
        assert_ne!(g1, g2);
        assert_eq!(
            eng.object_address(g1).unwrap(),
            eng.object_address(g2).unwrap()
        );
        assert_eq!(eng.member_names(file).unwrap(), vec!["a".to_string()]);
        eng.close_group(g1).unwrap();
        eng.close_group(g2).unwrap();
        assert_eq!(eng.open_object_count(file).unwrap(), 0);
    }

    #[test]
    fn duplicate_create_is_already_exists() {
        let (_dir, _path, mut eng, file) = fresh();
        let g = eng.create_group(file, "a").unwrap();
        eng.close_group(g).unwrap();
        let err = eng.create_group(file, "a").unwrap_err();
        assert!(matches!(err, EngineError::AlreadyExists(_)));
        let err = eng
            .create_dataset(file, "a", &NATIVE_INT32, &Dataspace::scalar())
            .unwrap_err();
        assert!(matches!(err, EngineError::AlreadyExists(_)));
    }

    #[test]
    fn nested_name_resolves_relative_and_absolute() {
        let (_dir, _path, mut eng, file) = fresh();
        let a = eng.create_group(file, "a").unwrap();
        let b = eng.create_group(a, "b").unwrap();
        assert!(eng.exists(file, "a/b").unwrap());
        assert!(eng.exists(b, "/a").unwrap());
        assert!(!eng.exists(a, "c").unwrap());
        let missing_parent = eng.create_group(file, "x/y").unwrap_err();
        assert!(matches!(missing_parent, EngineError::NotFound(_)));
    }

    #[test]
    fn invalid_names() {
        let (_dir, _path, eng, file) = fresh();
        assert!(matches!(
            eng.exists(file, ""),
            Err(EngineError::InvalidName(_))
        ));
        assert!(matches!(
            eng.exists(file, "."),
            Err(EngineError::InvalidName(_))
        ));
    }

    #[test]
    fn raw_round_trip_and_checks() {
        let (_dir, _path, mut eng, file) = fresh();
        let ds = eng
            .create_dataset(file, "v", &NATIVE_DOUBLE, &Dataspace::simple(&[3]))
            .unwrap();
        let values = [1.0f64, 2.0, 3.0];
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_ne_bytes()).collect();
        eng.write_raw(ds, &NATIVE_DOUBLE, &bytes).unwrap();

        let mut out = vec![0u8; 24];
        eng.read_raw(ds, &NATIVE_DOUBLE, &mut out).unwrap();
        assert_eq!(out, bytes);

        let mut short = vec![0u8; 16];
        assert!(matches!(
            eng.read_raw(ds, &NATIVE_DOUBLE, &mut short),
            Err(EngineError::ExtentMismatch { .. })
        ));
        let mut as_int = vec![0u8; 12];
        assert!(matches!(
            eng.read_raw(ds, &NATIVE_INT32, &mut as_int),
            Err(EngineError::TypeMismatch { .. })
        ));
        eng.close_dataset(ds).unwrap();
    }

    #[test]
    fn strings_round_trip() {
        let (_dir, _path, mut eng, file) = fresh();
        let file_type = vlen_string(StringPadding::SpacePad, CharacterSet::Utf8);
        let mem_type = vlen_string(StringPadding::NullTerminate, CharacterSet::Utf8);
        let ds = eng
            .create_dataset(file, "s", &file_type, &Dataspace::scalar())
            .unwrap();
        eng.write_strings(ds, &mem_type, &["grüß dich"]).unwrap();
        assert_eq!(
            eng.read_strings(ds, &mem_type).unwrap(),
            vec!["grüß dich".to_string()]
        );
        assert!(matches!(
            eng.write_raw(ds, &NATIVE_INT32, &[0u8; 4]),
            Err(EngineError::TypeMismatch { .. })
        ));
        eng.close_dataset(ds).unwrap();
    }

    #[test]
    fn close_flushes_and_reopen_reads_back() {
        let (_dir, path, mut eng, file) = fresh();
        let ds = eng
            .create_dataset(file, "x", &NATIVE_INT32, &Dataspace::scalar())
            .unwrap();
        eng.write_raw(ds, &NATIVE_INT32, &42i32.to_ne_bytes()).unwrap();
        eng.close_dataset(ds).unwrap();
        eng.close_file(file).unwrap();

        let file = eng.open_file(&path, false).unwrap();
        let ds = eng.open_dataset(file, "x").unwrap();
        let mut out = [0u8; 4];
        eng.read_raw(ds, &NATIVE_INT32, &mut out).unwrap();
        assert_eq!(i32::from_ne_bytes(out), 42);
        eng.close_dataset(ds).unwrap();
        eng.close_file(file).unwrap();
    }

    #[test]
    fn read_only_rejects_writes() {
        let (_dir, path, mut eng, file) = fresh();
        eng.close_file(file).unwrap();
        let file = eng.open_file(&path, false).unwrap();
        assert!(matches!(
            eng.create_group(file, "g"),
            Err(EngineError::ReadOnly(_))
        ));
        eng.close_file(file).unwrap();
    }

    #[test]
    fn open_twice_shares_container() {
        let (_dir, path, mut eng, file) = fresh();
        let second = eng.open_file(&path, true).unwrap();
        let g = eng.create_group(second, "shared").unwrap();
        assert!(eng.exists(file, "shared").unwrap());
        assert!(matches!(
            eng.create_file(&path, false),
            Err(EngineError::FileAlreadyOpen(_))
        ));
        eng.close_group(g).unwrap();
        eng.close_file(second).unwrap();
        eng.close_file(file).unwrap();
    }

    #[test]
    fn object_handle_keeps_container_alive() {
        let (_dir, path, mut eng, file) = fresh();
        let g = eng.create_group(file, "g").unwrap();
        eng.close_file(file).unwrap();
        let child = eng.create_group(g, "late").unwrap();
        eng.close_group(child).unwrap();
        eng.close_group(g).unwrap();

        let file = eng.open_file(&path, false).unwrap();
        assert!(eng.exists(file, "g/late").unwrap());
        eng.close_file(file).unwrap();
    }

    #[test]
    fn wrong_role_close_is_rejected() {
        let (_dir, _path, mut eng, file) = fresh();
        let g = eng.create_group(file, "g").unwrap();
        assert!(matches!(
            eng.close_dataset(g),
            Err(EngineError::WrongKind { .. })
        ));
        assert!(matches!(
            eng.close_group(file),
            Err(EngineError::WrongKind { .. })
        ));
        eng.close_group(g).unwrap();
        assert!(matches!(
            eng.close_group(g),
            Err(EngineError::InvalidHandle(_))
        ));
        eng.close_group(Hid::INVALID).unwrap();
    }

    #[test]
    fn kind_queries() {
        let (_dir, _path, mut eng, file) = fresh();
        let ds = eng
            .create_dataset(file, "d", &NATIVE_INT32, &Dataspace::scalar())
            .unwrap();
        assert_eq!(eng.handle_kind(ds).unwrap(), ObjectKind::Dataset);
        assert_eq!(eng.handle_kind(file).unwrap(), ObjectKind::File);
        assert_eq!(
            eng.object_kind(file, "d").unwrap(),
            Some(ObjectKind::Dataset)
        );
        assert_eq!(eng.object_kind(file, "nope").unwrap(), None);
        assert!(matches!(
            eng.open_group(file, "d"),
            Err(EngineError::WrongKind { .. })
        ));
        assert!(matches!(
            eng.exists(ds, "x"),
            Err(EngineError::WrongKind { .. })
        ));
        eng.close_dataset(ds).unwrap();
    }
}
