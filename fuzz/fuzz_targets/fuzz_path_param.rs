//! Fuzz target: typed parsing of arbitrary path parameter text.
//!
//! Parameters are parsed by the type of the field they land in. Arbitrary
//! text must never panic, and a string field must receive the text verbatim.

#![no_main]

use libfuzzer_sys::fuzz_target;
use portkit_http::{decode_fields, PathParams};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Numeric {
    #[allow(dead_code)]
    value: u32,
}

#[derive(Debug, Deserialize)]
struct Text {
    value: String,
}

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };
    let params: PathParams = [("value", raw)].into_iter().collect();

    let _ = decode_fields::<Numeric>(&params, b"");

    match decode_fields::<Text>(&params, b"") {
        Ok(text) => assert_eq!(text.value, raw),
        Err(e) => panic!("string field must accept any parameter: {e}"),
    }
});
