#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) {
        let report = interpersona_core::schema::check(&value, "fuzz.json", true, None);
        // anything check accepts must load
        if report.pass {
            let bytes = serde_json::to_vec(&value).unwrap();
            assert!(interpersona_core::reference::ReferenceData::from_json(&bytes).is_ok());
        }
    }
});
