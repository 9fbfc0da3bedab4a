use std::collections::BTreeMap;

use ezhdf5_format::datatype::MAX_DATATYPE_DEPTH;
use ezhdf5_format::type_builders::{
    vlen_string, CompoundTypeBuilder, NATIVE_DOUBLE, NATIVE_FLOAT, NATIVE_UINT16, NATIVE_UINT8,
};
use ezhdf5_format::{
    CharacterSet, Container, DatasetObject, Dataspace, Datatype, FormatError, Object, ObjectId,
    RawData, StringPadding,
};

fn complex_double() -> Datatype {
    CompoundTypeBuilder::new(16)
        .insert("r", 0, NATIVE_DOUBLE.clone())
        .insert("i", 8, NATIVE_DOUBLE.clone())
        .build()
        .unwrap()
}

fn nested_tree() -> Container {
    let mut c = Container::new();
    let mut parent = ObjectId::ROOT;
    for name in ["a", "b", "c"] {
        parent = c
            .add_object(parent, name, Object::Group(BTreeMap::new()))
            .unwrap();
    }
    let mut z = DatasetObject::zeroed(complex_double(), Dataspace::simple(&[2]));
    let mut bytes = Vec::new();
    for v in [1.0f64, -1.0, 0.5, 2.0] {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    z.data = RawData::Fixed(bytes);
    c.add_object(parent, "z", Object::Dataset(z)).unwrap();

    let m = DatasetObject::zeroed(NATIVE_FLOAT.clone(), Dataspace::simple(&[3, 4]));
    c.add_object(ObjectId::ROOT, "m", Object::Dataset(m)).unwrap();
    let u = DatasetObject::zeroed(NATIVE_UINT16.clone(), Dataspace::scalar());
    c.add_object(ObjectId::ROOT, "u", Object::Dataset(u)).unwrap();

    let mut s = DatasetObject::zeroed(
        vlen_string(StringPadding::SpacePad, CharacterSet::Utf8),
        Dataspace::scalar(),
    );
    s.data = RawData::VarStrings(vec!["naïve".to_string()]);
    c.add_object(ObjectId::ROOT, "s", Object::Dataset(s)).unwrap();
    c
}

#[test]
fn nested_tree_survives_encoding() {
    let c = nested_tree();
    let decoded = Container::decode(&c.encode()).unwrap();
    assert_eq!(decoded, c);

    let z = decoded.find(ObjectId::ROOT, "/a/b/c/z").unwrap().unwrap();
    match decoded.object(z) {
        Some(Object::Dataset(ds)) => {
            assert_eq!(ds.datatype.to_string(), "compound{r: f64, i: f64}");
            assert_eq!(ds.dataspace.dimensions, vec![2]);
        }
        other => panic!("expected dataset, got {other:?}"),
    }
    assert_eq!(
        decoded.member_names(ObjectId::ROOT).unwrap(),
        vec!["a", "m", "s", "u"]
    );
}

#[test]
fn relative_and_absolute_lookup_agree() {
    let c = nested_tree();
    let a = c.find(ObjectId::ROOT, "a").unwrap().unwrap();
    assert_eq!(
        c.find(a, "b/c/z").unwrap(),
        c.find(ObjectId::ROOT, "/a/b/c/z").unwrap()
    );
    assert_eq!(c.find(a, "/m").unwrap(), c.find(ObjectId::ROOT, "m").unwrap());
    assert_eq!(c.find(a, "missing").unwrap(), None);
    assert_eq!(c.find(ObjectId::ROOT, "m/below").unwrap(), None);
}

#[test]
fn truncated_images_are_rejected() {
    let bytes = nested_tree().encode();
    for len in 0..bytes.len() {
        assert!(
            Container::decode(&bytes[..len]).is_err(),
            "prefix of {len} bytes decoded"
        );
    }
}

#[test]
fn foreign_file_is_not_a_container() {
    let mut bytes = nested_tree().encode();
    bytes[1..4].copy_from_slice(b"HDF");
    assert_eq!(
        Container::decode(&bytes),
        Err(FormatError::SignatureNotFound)
    );
}

#[test]
fn short_raw_data_is_rejected() {
    let mut c = Container::new();
    let mut ds = DatasetObject::zeroed(NATIVE_DOUBLE.clone(), Dataspace::simple(&[4]));
    ds.data = RawData::Fixed(vec![0u8; 24]);
    c.add_object(ObjectId::ROOT, "short", Object::Dataset(ds)).unwrap();
    assert_eq!(
        Container::decode(&c.encode()),
        Err(FormatError::DataSizeMismatch {
            expected: 32,
            actual: 24
        })
    );
}

#[test]
fn long_link_names_round_trip() {
    let mut c = Container::new();
    let name = "n".repeat(70_000);
    c.add_object(ObjectId::ROOT, &name, Object::Group(BTreeMap::new()))
        .unwrap();
    let decoded = Container::decode(&c.encode()).unwrap();
    assert_eq!(decoded.member_names(ObjectId::ROOT).unwrap(), vec![name]);
}

#[test]
fn deeply_nested_descriptor_is_rejected() {
    let mut datatype = NATIVE_UINT8.clone();
    for _ in 0..MAX_DATATYPE_DEPTH + 8 {
        datatype = Datatype::VariableLength {
            is_string: false,
            padding: None,
            charset: None,
            base_type: Box::new(datatype),
        };
    }
    let mut c = Container::new();
    let ds = DatasetObject::zeroed(datatype, Dataspace::scalar());
    c.add_object(ObjectId::ROOT, "deep", Object::Dataset(ds)).unwrap();
    assert_eq!(
        Container::decode(&c.encode()),
        Err(FormatError::DatatypeTooDeep(MAX_DATATYPE_DEPTH + 1))
    );
}
