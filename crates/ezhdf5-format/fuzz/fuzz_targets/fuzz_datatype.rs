#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok((dt, _)) = ezhdf5_format::Datatype::parse(data) {
        let _ = ezhdf5_format::Datatype::parse(&dt.serialize());
    }
});
