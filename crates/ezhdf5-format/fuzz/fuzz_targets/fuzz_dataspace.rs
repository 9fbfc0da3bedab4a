#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(space) = ezhdf5_format::Dataspace::parse(data) {
        let _ = space.num_elements();
    }
});
