use std::thread;

use ezhdf5_io::ezhdf5_format::type_builders::NATIVE_UINT64;
use ezhdf5_io::ezhdf5_format::Container;
use ezhdf5_io::{engine, Dataspace, EngineError, ObjectKind};

#[test]
fn threads_share_one_engine() {
    let dir = tempfile::tempdir().unwrap();
    let workers: Vec<_> = (0..8u64)
        .map(|i| {
            let path = dir.path().join(format!("t{i}.ezh5"));
            thread::spawn(move || {
                let file = engine().create_file(&path, true).unwrap();
                let ds = engine()
                    .create_dataset(file, "id", &NATIVE_UINT64, &Dataspace::scalar())
                    .unwrap();
                engine()
                    .write_raw(ds, &NATIVE_UINT64, &i.to_ne_bytes())
                    .unwrap();
                engine().close_dataset(ds).unwrap();
                engine().close_file(file).unwrap();
                path
            })
        })
        .collect();

    for (i, worker) in workers.into_iter().enumerate() {
        let path = worker.join().unwrap();
        let file = engine().open_file(&path, false).unwrap();
        let ds = engine().open_dataset(file, "/id").unwrap();
        let mut buf = [0u8; 8];
        engine().read_raw(ds, &NATIVE_UINT64, &mut buf).unwrap();
        assert_eq!(u64::from_ne_bytes(buf), i as u64);
        engine().close_dataset(ds).unwrap();
        engine().close_file(file).unwrap();
    }
}

#[test]
fn closed_handles_are_invalid_everywhere() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("closed.ezh5");
    let file = engine().create_file(&path, false).unwrap();
    let group = engine().create_group(file, "g").unwrap();
    assert_eq!(engine().handle_kind(group).unwrap(), ObjectKind::Group);
    engine().close_group(group).unwrap();

    assert!(matches!(
        engine().close_group(group),
        Err(EngineError::InvalidHandle(_))
    ));
    assert!(matches!(
        engine().member_names(group),
        Err(EngineError::InvalidHandle(_))
    ));
    engine().close_file(file).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    let container = Container::decode(&bytes).unwrap();
    assert_eq!(container.len(), 2);
}
