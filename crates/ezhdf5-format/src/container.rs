//! In-memory object tree of one container and its on-disk encoding.
//!
//! Objects live in an arena indexed by [`ObjectId`]; the root group is always
//! object 0. Groups map link names to object ids in name order. Datasets
//! carry their persisted datatype, dataspace and raw data.
//!
//! Encoded layout (all integers little-endian):
//!
//! ```text
//! 0       8   signature
//! 8       1   format version
//! 9       3   reserved
//! 12      4   object count
//! 16      ..  objects in id order
//! end-4   4   CRC-32C of all preceding bytes
//! ```

use std::collections::BTreeMap;

use byteorder::{ByteOrder, LittleEndian};

use crate::dataspace::Dataspace;
use crate::datatype::Datatype;
use crate::error::{ensure_len, FormatError};
use crate::signature::{check_signature, EZH5_SIGNATURE};

/// Current container format version.
pub const FORMAT_VERSION: u8 = 1;

const HEADER_SIZE: usize = 16;
const KIND_GROUP: u8 = 0;
const KIND_DATASET: u8 = 1;
const STORAGE_FIXED: u8 = 0;
const STORAGE_VLEN_STRINGS: u8 = 1;

/// Index of an object in the container; doubles as its address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub u32);

impl ObjectId {
    /// The root group.
    pub const ROOT: ObjectId = ObjectId(0);
}

/// Raw element storage of a dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum RawData {
    /// Fixed-size elements, packed.
    Fixed(Vec<u8>),
    /// One string per element of a variable-length string dataset.
    VarStrings(Vec<String>),
}

/// A dataset object.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetObject {
    pub datatype: Datatype,
    pub dataspace: Dataspace,
    pub data: RawData,
}

impl DatasetObject {
    /// A dataset of the given type and extent filled with zero bytes (or
    /// empty strings).
    pub fn zeroed(datatype: Datatype, dataspace: Dataspace) -> Self {
        let n = dataspace.num_elements() as usize;
        let data = if datatype.is_vlen_string() {
            RawData::VarStrings(vec![String::new(); n])
        } else {
            RawData::Fixed(vec![0u8; n * datatype.type_size() as usize])
        };
        DatasetObject {
            datatype,
            dataspace,
            data,
        }
    }
}

/// A node of the object tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Group(BTreeMap<String, ObjectId>),
    Dataset(DatasetObject),
}

/// Split a link path into its segments.
///
/// Returns `(absolute, segments)`. Repeated slashes collapse. A path with no
/// segments is valid only when it is absolute (the root itself). Segments
/// equal to `"."` are rejected.
pub fn split_path(path: &str) -> Result<(bool, Vec<&str>), FormatError> {
    let absolute = path.starts_with('/');
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if (segments.is_empty() && !absolute) || segments.iter().any(|s| *s == ".") {
        return Err(FormatError::InvalidName);
    }
    Ok((absolute, segments))
}

/// The object tree of one container.
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    objects: Vec<Object>,
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Container {
    /// An empty container holding only the root group.
    pub fn new() -> Self {
        Container {
            objects: vec![Object::Group(BTreeMap::new())],
        }
    }

    /// Number of objects including the root.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the object table is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn object(&self, id: ObjectId) -> Option<&Object> {
        self.objects.get(id.0 as usize)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.objects.get_mut(id.0 as usize)
    }

    /// Follow `segments` from `from`, descending through groups only.
    pub fn walk(&self, from: ObjectId, segments: &[&str]) -> Option<ObjectId> {
        let mut current = from;
        for segment in segments {
            match self.object(current)? {
                Object::Group(links) => current = *links.get(*segment)?,
                Object::Dataset(_) => return None,
            }
        }
        Some(current)
    }

    /// Resolve `path` relative to `from` (or the root when absolute).
    pub fn find(&self, from: ObjectId, path: &str) -> Result<Option<ObjectId>, FormatError> {
        let (absolute, segments) = split_path(path)?;
        let start = if absolute { ObjectId::ROOT } else { from };
        Ok(self.walk(start, &segments))
    }

    /// Append `object` and link it as `name` under the group `parent`.
    ///
    /// Returns `None`, leaving the tree unchanged, when `parent` is not a
    /// group or already has a link called `name`.
    pub fn add_object(&mut self, parent: ObjectId, name: &str, object: Object) -> Option<ObjectId> {
        let id = ObjectId(self.objects.len() as u32);
        match self.objects.get_mut(parent.0 as usize)? {
            Object::Group(links) if !links.contains_key(name) => {
                links.insert(name.to_string(), id);
            }
            _ => return None,
        }
        self.objects.push(object);
        Some(id)
    }

    /// Link names of a group, in name order.
    pub fn member_names(&self, id: ObjectId) -> Option<Vec<String>> {
        match self.object(id)? {
            Object::Group(links) => Some(links.keys().cloned().collect()),
            Object::Dataset(_) => None,
        }
    }

    /// Serialize the container to its file image.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_SIZE + 64 * self.objects.len());
        buf.extend_from_slice(&EZH5_SIGNATURE);
        buf.push(FORMAT_VERSION);
        buf.extend_from_slice(&[0u8; 3]);
        buf.extend_from_slice(&(self.objects.len() as u32).to_le_bytes());

        for object in &self.objects {
            match object {
                Object::Group(links) => {
                    buf.push(KIND_GROUP);
                    buf.extend_from_slice(&(links.len() as u32).to_le_bytes());
                    for (name, target) in links {
                        buf.extend_from_slice(&(name.len() as u32).to_le_bytes());
                        buf.extend_from_slice(name.as_bytes());
                        buf.extend_from_slice(&target.0.to_le_bytes());
                    }
                }
                Object::Dataset(ds) => {
                    buf.push(KIND_DATASET);
                    let dt = ds.datatype.serialize();
                    buf.extend_from_slice(&(dt.len() as u32).to_le_bytes());
                    buf.extend_from_slice(&dt);
                    let sp = ds.dataspace.serialize();
                    buf.extend_from_slice(&(sp.len() as u32).to_le_bytes());
                    buf.extend_from_slice(&sp);
                    match &ds.data {
                        RawData::Fixed(bytes) => {
                            buf.push(STORAGE_FIXED);
                            buf.extend_from_slice(&(bytes.len() as u64).to_le_bytes());
                            buf.extend_from_slice(bytes);
                        }
                        RawData::VarStrings(strings) => {
                            buf.push(STORAGE_VLEN_STRINGS);
                            buf.extend_from_slice(&(strings.len() as u64).to_le_bytes());
                            for s in strings {
                                buf.extend_from_slice(&(s.len() as u64).to_le_bytes());
                                buf.extend_from_slice(s.as_bytes());
                            }
                        }
                    }
                }
            }
        }

        let checksum = crc32c::crc32c(&buf);
        buf.extend_from_slice(&checksum.to_le_bytes());
        buf
    }

    /// Parse a file image produced by [`encode`](Self::encode).
    pub fn decode(data: &[u8]) -> Result<Container, FormatError> {
        check_signature(data)?;
        ensure_len(data, 0, HEADER_SIZE + 4)?;

        let checksum_pos = data.len() - 4;
        let expected = LittleEndian::read_u32(&data[checksum_pos..]);
        let computed = crc32c::crc32c(&data[..checksum_pos]);
        if expected != computed {
            return Err(FormatError::ChecksumMismatch { expected, computed });
        }

        let version = data[8];
        if version != FORMAT_VERSION {
            return Err(FormatError::UnsupportedVersion(version));
        }
        let count = LittleEndian::read_u32(&data[12..16]);

        let body = &data[..checksum_pos];
        let mut cursor = Cursor {
            data: body,
            pos: HEADER_SIZE,
        };
        let mut objects = Vec::with_capacity((count as usize).min(1024));
        for _ in 0..count {
            objects.push(decode_object(&mut cursor)?);
        }

        for object in &objects {
            if let Object::Group(links) = object {
                for (name, target) in links {
                    if target.0 >= count {
                        return Err(FormatError::DanglingLink {
                            name: name.clone(),
                            target: target.0,
                        });
                    }
                }
            }
        }
        match objects.first() {
            Some(Object::Group(_)) => {}
            Some(Object::Dataset(_)) => return Err(FormatError::InvalidObjectKind(KIND_DATASET)),
            None => {
                return Err(FormatError::DanglingLink {
                    name: "/".to_string(),
                    target: 0,
                })
            }
        }

        Ok(Container { objects })
    }
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn bytes(&mut self, n: usize) -> Result<&'a [u8], FormatError> {
        ensure_len(self.data, self.pos, n)?;
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, FormatError> {
        Ok(self.bytes(1)?[0])
    }

    fn u32(&mut self) -> Result<u32, FormatError> {
        Ok(LittleEndian::read_u32(self.bytes(4)?))
    }

    fn u64(&mut self) -> Result<u64, FormatError> {
        Ok(LittleEndian::read_u64(self.bytes(8)?))
    }

    fn string(&mut self, len: usize) -> Result<String, FormatError> {
        let raw = self.bytes(len)?;
        std::str::from_utf8(raw)
            .map(str::to_string)
            .map_err(|_| FormatError::InvalidName)
    }
}

fn decode_object(cursor: &mut Cursor<'_>) -> Result<Object, FormatError> {
    match cursor.u8()? {
        KIND_GROUP => {
            let n = cursor.u32()?;
            let mut links = BTreeMap::new();
            for _ in 0..n {
                let len = cursor.u32()? as usize;
                let name = cursor.string(len)?;
                let target = ObjectId(cursor.u32()?);
                links.insert(name, target);
            }
            Ok(Object::Group(links))
        }
        KIND_DATASET => {
            let len = cursor.u32()? as usize;
            let (datatype, _) = Datatype::parse(cursor.bytes(len)?)?;
            let len = cursor.u32()? as usize;
            let dataspace = Dataspace::parse(cursor.bytes(len)?)?;
            let data = match cursor.u8()? {
                STORAGE_FIXED => {
                    let len = cursor.u64()? as usize;
                    RawData::Fixed(cursor.bytes(len)?.to_vec())
                }
                STORAGE_VLEN_STRINGS => {
                    let n = cursor.u64()? as usize;
                    let mut strings = Vec::with_capacity(n.min(1024));
                    for _ in 0..n {
                        let len = cursor.u64()? as usize;
                        strings.push(cursor.string(len)?);
                    }
                    RawData::VarStrings(strings)
                }
                tag => return Err(FormatError::InvalidStorageTag(tag)),
            };
            check_data_size(&datatype, &dataspace, &data)?;
            Ok(Object::Dataset(DatasetObject {
                datatype,
                dataspace,
                data,
            }))
        }
        kind => Err(FormatError::InvalidObjectKind(kind)),
    }
}

fn check_data_size(
    datatype: &Datatype,
    dataspace: &Dataspace,
    data: &RawData,
) -> Result<(), FormatError> {
    let elements = dataspace.num_elements();
    let (expected, actual) = match data {
        RawData::Fixed(bytes) if !datatype.is_vlen_string() => (
            elements.saturating_mul(u64::from(datatype.type_size())),
            bytes.len() as u64,
        ),
        RawData::VarStrings(strings) if datatype.is_vlen_string() => {
            (elements, strings.len() as u64)
        }
        RawData::Fixed(_) => return Err(FormatError::InvalidStorageTag(STORAGE_FIXED)),
        RawData::VarStrings(_) => return Err(FormatError::InvalidStorageTag(STORAGE_VLEN_STRINGS)),
    };
    if expected != actual {
        return Err(FormatError::DataSizeMismatch { expected, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatype::{CharacterSet, StringPadding};
    use crate::type_builders::{vlen_string, NATIVE_DOUBLE, NATIVE_INT32};

    fn sample() -> Container {
        let mut c = Container::new();
        let a = c
            .add_object(ObjectId::ROOT, "a", Object::Group(BTreeMap::new()))
            .unwrap();
        let mut x = DatasetObject::zeroed(NATIVE_INT32.clone(), Dataspace::scalar());
        x.data = RawData::Fixed(42i32.to_ne_bytes().to_vec());
        c.add_object(a, "x", Object::Dataset(x)).unwrap();
        let y = DatasetObject::zeroed(NATIVE_DOUBLE.clone(), Dataspace::simple(&[3]));
        c.add_object(a, "y", Object::Dataset(y)).unwrap();
        let mut s = DatasetObject::zeroed(
            vlen_string(StringPadding::SpacePad, CharacterSet::Utf8),
            Dataspace::scalar(),
        );
        s.data = RawData::VarStrings(vec!["héllo".to_string()]);
        c.add_object(ObjectId::ROOT, "s", Object::Dataset(s)).unwrap();
        c
    }

    #[test]
    fn encode_decode_preserves_tree() {
        let c = sample();
        let bytes = c.encode();
        let decoded = Container::decode(&bytes).unwrap();
        assert_eq!(decoded, c);
        assert_eq!(decoded.find(ObjectId::ROOT, "/a/x").unwrap(), Some(ObjectId(2)));
    }

    #[test]
    fn corrupted_byte_is_checksum_mismatch() {
        let mut bytes = sample().encode();
        let mid = bytes.len() / 2;
        bytes[mid] ^= 0xFF;
        assert!(matches!(
            Container::decode(&bytes),
            Err(FormatError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn foreign_file_is_rejected() {
        let bytes = b"not a container at all, just text".to_vec();
        assert_eq!(
            Container::decode(&bytes),
            Err(FormatError::SignatureNotFound)
        );
    }

    #[test]
    fn unsupported_version() {
        let mut bytes = Container::new().encode();
        bytes[8] = 9;
        let n = bytes.len() - 4;
        let crc = crc32c::crc32c(&bytes[..n]);
        bytes[n..].copy_from_slice(&crc.to_le_bytes());
        assert_eq!(
            Container::decode(&bytes),
            Err(FormatError::UnsupportedVersion(9))
        );
    }

    #[test]
    fn find_relative_and_absolute() {
        let c = sample();
        let a = c.find(ObjectId::ROOT, "a").unwrap().unwrap();
        assert_eq!(c.find(a, "y").unwrap(), Some(ObjectId(3)));
        assert_eq!(c.find(a, "/s").unwrap(), Some(ObjectId(4)));
        assert_eq!(c.find(a, "missing").unwrap(), None);
        assert_eq!(c.find(a, "/").unwrap(), Some(ObjectId::ROOT));
    }

    #[test]
    fn walk_stops_at_dataset() {
        let c = sample();
        assert_eq!(c.find(ObjectId::ROOT, "a/x/deeper").unwrap(), None);
    }

    #[test]
    fn invalid_names() {
        assert_eq!(split_path(""), Err(FormatError::InvalidName));
        assert_eq!(split_path("."), Err(FormatError::InvalidName));
        assert_eq!(split_path("a/./b"), Err(FormatError::InvalidName));
        assert_eq!(split_path("a//b").unwrap(), (false, vec!["a", "b"]));
    }

    #[test]
    fn add_object_rejects_duplicates() {
        let mut c = sample();
        let before = c.len();
        assert!(c
            .add_object(ObjectId::ROOT, "a", Object::Group(BTreeMap::new()))
            .is_none());
        assert!(c
            .add_object(ObjectId(2), "under_dataset", Object::Group(BTreeMap::new()))
            .is_none());
        assert_eq!(c.len(), before);
    }

    #[test]
    fn member_names_sorted() {
        let c = sample();
        assert_eq!(
            c.member_names(ObjectId::ROOT).unwrap(),
            vec!["a".to_string(), "s".to_string()]
        );
        assert_eq!(c.member_names(ObjectId(2)), None);
    }
}
