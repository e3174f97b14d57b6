//! Fuzz target: merging a path parameter with an arbitrary request body.
//!
//! Verifies that no body, valid JSON or not, makes the merge panic, and
//! that a decoded body `id` always takes precedence over the path.

#![no_main]

use libfuzzer_sys::fuzz_target;
use portkit_http::{decode_fields, PathParams};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Target {
    id: i64,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

fuzz_target!(|data: &[u8]| {
    let params: PathParams = [("id", "17")].into_iter().collect();
    let Ok(target) = decode_fields::<Target>(&params, data) else {
        return;
    };
    let _ = (target.name, target.tags);

    // A body that sets `id` must win over the path value.
    if let Ok(serde_json::Value::Object(body)) = serde_json::from_slice::<serde_json::Value>(data) {
        if let Some(id) = body.get("id").and_then(serde_json::Value::as_i64) {
            assert_eq!(target.id, id);
        }
    }
});
