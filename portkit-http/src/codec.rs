//! Reference codecs: path parameters + JSON body in, JSON out.
//!
//! Decoding merges two sources into one request value:
//!
//! 1. the router's path parameters, parsed according to the type of the
//!    field they land in (`/items/{id}` fills an integer `id` with `42`, a
//!    string field with `"42"`);
//! 2. the JSON body, whose top-level keys override parameters of the same
//!    name.
//!
//! An empty body counts as `{}`. Unknown keys from either source are ignored
//! unless the request type opts into `#[serde(deny_unknown_fields)]`.

use std::collections::BTreeMap;

use axum::extract::Request;
use portkit_core::{BoxError, Context};
use serde::{
    de::{self, value::MapDeserializer, DeserializeOwned, IntoDeserializer, Unexpected, Visitor},
    Deserializer, Serialize,
};
use serde_json::Value;

use crate::{CodecError, PathParams, ResponseSink};

/// Decode an axum request into `Req` from its path parameters and JSON body.
///
/// The body is read in full with no size cap of its own. [`HttpServer`]
/// wraps every body in a limit of
/// [`HttpConfig::max_body_bytes`](crate::HttpConfig::max_body_bytes) before
/// decoding; callers that run this decoder in a bare core `Server` must wrap
/// the body themselves (e.g. `http_body_util::Limited`), and an exceeded
/// limit then surfaces as [`CodecError::BodyTooLarge`].
///
/// [`HttpServer`]: crate::HttpServer
///
/// # Errors
/// Returns a boxed [`CodecError`] if the parameters or body cannot be read,
/// the body is not valid JSON, or the merged input does not fit `Req`.
pub async fn decode_request<Req>(ctx: Context, req: Request) -> Result<Req, BoxError>
where
    Req: DeserializeOwned + Send + 'static,
{
    let (mut parts, body) = req.into_parts();
    let params = PathParams::from_parts(&mut parts).await?;
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(|e| CodecError::from_body_error(e.into_inner()))?;

    tracing::trace!(
        request_id = %ctx.request_id(),
        params = params.len(),
        body_bytes = bytes.len(),
        "decoding request"
    );

    Ok(decode_fields(&params, &bytes)?)
}

/// Merge path parameters and a raw JSON body into `Req`. Body keys win.
///
/// Path parameters are parsed by the type of the field they land in. This
/// needs the field type to be known at the point of the call: behind
/// `#[serde(flatten)]` or an untagged enum serde buffers values without a
/// target type, so a parameter arrives there as a string and only fits
/// string-like fields.
///
/// # Errors
/// - [`CodecError::MalformedBody`] if `body` is not valid JSON.
/// - [`CodecError::BodyShape`] if `body` is not an object but `params` is
///   non-empty.
/// - [`CodecError::Schema`] if the merged input does not deserialize into
///   `Req` (missing field, type mismatch, unparseable parameter).
pub fn decode_fields<Req: DeserializeOwned>(
    params: &PathParams,
    body: &[u8],
) -> Result<Req, CodecError> {
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Object(serde_json::Map::new())
    } else {
        serde_json::from_slice::<Value>(body).map_err(CodecError::MalformedBody)?
    };

    let object = match body {
        Value::Object(object) => object,
        other if params.is_empty() => {
            return serde::Deserialize::deserialize(other).map_err(CodecError::Schema);
        }
        _ => return Err(CodecError::BodyShape),
    };

    let mut fields: BTreeMap<String, Field> = params
        .iter()
        .map(|(k, v)| (k.to_owned(), Field::Param(v.to_owned())))
        .collect();
    for (key, value) in object {
        fields.insert(key, Field::Body(value));
    }

    serde::Deserialize::deserialize(MapDeserializer::new(fields.into_iter())).map_err(CodecError::Schema)
}

/// Serialize `resp` as JSON and write it to `sink`.
///
/// Serialization completes before anything is written, so a failure leaves
/// the sink untouched. No status or headers are set.
///
/// # Errors
/// Returns a boxed [`CodecError::Serialize`] or
/// [`CodecError::ResponseTooLarge`].
pub fn encode_json_response<Resp: Serialize>(
    _ctx: &Context,
    sink: &mut ResponseSink,
    resp: Resp,
) -> Result<(), BoxError> {
    let bytes = serde_json::to_vec(&resp).map_err(CodecError::Serialize)?;
    sink.write_all(&bytes)?;
    Ok(())
}

/// One value of the merged request map.
enum Field {
    /// Raw path parameter text, parsed on demand by the target field type.
    Param(String),
    /// A JSON value from the request body.
    Body(Value),
}

impl<'de> IntoDeserializer<'de, serde_json::Error> for Field {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self {
        self
    }
}

macro_rules! parse_param {
    ($($method:ident => $visit:ident($ty:ty),)*) => {$(
        fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
            match self {
                Field::Body(v) => v.$method(visitor),
                Field::Param(s) => match s.trim().parse::<$ty>() {
                    Ok(n) => visitor.$visit(n),
                    Err(_) => Err(de::Error::invalid_value(Unexpected::Str(&s), &visitor)),
                },
            }
        }
    )*};
}

macro_rules! param_as_string {
    ($($method:ident,)*) => {$(
        fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
            match self {
                Field::Body(v) => v.$method(visitor),
                Field::Param(s) => visitor.visit_string(s),
            }
        }
    )*};
}

macro_rules! param_rejected {
    ($($method:ident,)*) => {$(
        fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
            match self {
                Field::Body(v) => v.$method(visitor),
                Field::Param(s) => Err(de::Error::invalid_type(Unexpected::Str(&s), &visitor)),
            }
        }
    )*};
}

impl<'de> Deserializer<'de> for Field {
    type Error = serde_json::Error;

    param_as_string! {
        deserialize_any,
        deserialize_str,
        deserialize_string,
        deserialize_identifier,
        deserialize_ignored_any,
    }

    parse_param! {
        deserialize_bool => visit_bool(bool),
        deserialize_i8 => visit_i8(i8),
        deserialize_i16 => visit_i16(i16),
        deserialize_i32 => visit_i32(i32),
        deserialize_i64 => visit_i64(i64),
        deserialize_i128 => visit_i128(i128),
        deserialize_u8 => visit_u8(u8),
        deserialize_u16 => visit_u16(u16),
        deserialize_u32 => visit_u32(u32),
        deserialize_u64 => visit_u64(u64),
        deserialize_u128 => visit_u128(u128),
        deserialize_f32 => visit_f32(f32),
        deserialize_f64 => visit_f64(f64),
        deserialize_char => visit_char(char),
    }

    param_rejected! {
        deserialize_seq,
        deserialize_map,
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self {
            Field::Body(v) => v.deserialize_bytes(visitor),
            Field::Param(s) => visitor.visit_byte_buf(s.into_bytes()),
        }
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self {
            Field::Body(v) => v.deserialize_byte_buf(visitor),
            Field::Param(s) => visitor.visit_byte_buf(s.into_bytes()),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self {
            Field::Body(v) => v.deserialize_option(visitor),
            Field::Param(_) => visitor.visit_some(self),
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self {
            Field::Body(v) => v.deserialize_unit(visitor),
            Field::Param(_) => visitor.visit_unit(),
        }
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        match self {
            Field::Body(v) => v.deserialize_unit_struct(name, visitor),
            Field::Param(_) => visitor.visit_unit(),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        match self {
            Field::Body(v) => v.deserialize_newtype_struct(name, visitor),
            Field::Param(_) => visitor.visit_newtype_struct(self),
        }
    }

    fn deserialize_tuple<V: Visitor<'de>>(
        self,
        len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        match self {
            Field::Body(v) => v.deserialize_tuple(len, visitor),
            Field::Param(s) => Err(de::Error::invalid_type(Unexpected::Str(&s), &visitor)),
        }
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        match self {
            Field::Body(v) => v.deserialize_tuple_struct(name, len, visitor),
            Field::Param(s) => Err(de::Error::invalid_type(Unexpected::Str(&s), &visitor)),
        }
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        match self {
            Field::Body(v) => v.deserialize_struct(name, fields, visitor),
            Field::Param(s) => Err(de::Error::invalid_type(Unexpected::Str(&s), &visitor)),
        }
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        match self {
            Field::Body(v) => v.deserialize_enum(name, variants, visitor),
            Field::Param(s) => visitor
                .visit_enum(<String as IntoDeserializer<'de, serde_json::Error>>::into_deserializer(s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use axum::http::StatusCode;
    use proptest::prelude::*;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        #[serde(rename = "ID")]
        id: i64,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Lookup {
        id: u32,
        #[serde(default)]
        name: Option<String>,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "lowercase")]
    enum Scope {
        Public,
        Private,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Tagged {
        code: String,
        scope: Scope,
        active: bool,
        label: Option<String>,
    }

    #[derive(Debug, Serialize)]
    struct Reply {
        #[serde(rename = "Result")]
        result: String,
    }

    fn decode<Req: DeserializeOwned>(pairs: &[(&str, &str)], body: &str) -> Result<Req, CodecError> {
        let params: PathParams = pairs.iter().copied().collect();
        decode_fields(&params, body.as_bytes())
    }

    #[test]
    fn path_param_populates_integer_field() {
        let item: Item = match decode(&[("ID", "42")], "{}") {
            Ok(i) => i,
            Err(e) => panic!("decode failed: {e}"),
        };
        assert_eq!(item, Item { id: 42 });
    }

    #[test]
    fn body_value_overrides_path_param() {
        let lookup: Lookup = match decode(&[("id", "1")], r#"{"id": 2}"#) {
            Ok(l) => l,
            Err(e) => panic!("decode failed: {e}"),
        };
        assert_eq!(lookup.id, 2, "body must win over path parameter");
    }

    #[test]
    fn empty_body_counts_as_empty_object() {
        for body in ["", "  \n"] {
            let lookup: Lookup = match decode(&[("id", "5")], body) {
                Ok(l) => l,
                Err(e) => panic!("decode of {body:?} failed: {e}"),
            };
            assert_eq!(lookup, Lookup { id: 5, name: None });
        }
    }

    #[test]
    fn body_fills_fields_absent_from_path() {
        let lookup: Lookup = match decode(&[("id", "5")], r#"{"name": "ada"}"#) {
            Ok(l) => l,
            Err(e) => panic!("decode failed: {e}"),
        };
        assert_eq!(lookup, Lookup { id: 5, name: Some("ada".to_owned()) });
    }

    #[test]
    fn truncated_body_is_malformed() {
        let result = decode::<Item>(&[("ID", "42")], r#"{"ID":"#);
        assert!(
            matches!(result, Err(CodecError::MalformedBody(_))),
            "expected MalformedBody, got {result:?}"
        );
    }

    #[test]
    fn non_numeric_param_for_integer_field_is_schema_error() {
        let result = decode::<Item>(&[("ID", "abc")], "");
        assert!(matches!(result, Err(CodecError::Schema(_))), "got {result:?}");
    }

    #[test]
    fn missing_required_field_is_schema_error() {
        let result = decode::<Lookup>(&[], "{}");
        assert!(matches!(result, Err(CodecError::Schema(_))), "got {result:?}");
    }

    #[test]
    fn params_follow_field_types() {
        let tagged: Tagged = match decode(
            &[("code", "007"), ("scope", "private"), ("active", "true"), ("label", "x")],
            "",
        ) {
            Ok(t) => t,
            Err(e) => panic!("decode failed: {e}"),
        };
        assert_eq!(
            tagged,
            Tagged {
                code: "007".to_owned(),
                scope: Scope::Private,
                active: true,
                label: Some("x".to_owned()),
            }
        );
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let lookup: Lookup = match decode(&[("id", "3"), ("tenant", "acme")], r#"{"extra": [1]}"#) {
            Ok(l) => l,
            Err(e) => panic!("decode failed: {e}"),
        };
        assert_eq!(lookup.id, 3);
    }

    #[test]
    fn non_object_body_with_params_is_rejected() {
        let result = decode::<Lookup>(&[("id", "1")], "[1]");
        assert!(matches!(result, Err(CodecError::BodyShape)), "got {result:?}");
    }

    #[test]
    fn non_object_body_without_params_decodes_directly() {
        let ids: Vec<u32> = match decode(&[], "[1, 2, 3]") {
            Ok(v) => v,
            Err(e) => panic!("decode failed: {e}"),
        };
        assert_eq!(ids, [1, 2, 3]);
    }

    #[test]
    fn encode_json_response_writes_payload_only() {
        let mut sink = ResponseSink::new();
        let reply = Reply { result: "ok".to_owned() };
        if let Err(e) = encode_json_response(&Context::new(), &mut sink, reply) {
            panic!("encode failed: {e}");
        }
        assert_eq!(sink.body(), br#"{"Result":"ok"}"#);
        assert_eq!(sink.status(), StatusCode::OK);
        assert!(sink.headers().is_empty(), "reference encoder must not set headers");
    }

    #[test]
    fn serialization_failure_leaves_sink_untouched() {
        let mut sink = ResponseSink::new();
        let unserializable: BTreeMap<(u8, u8), u8> = BTreeMap::from([((1, 2), 3)]);
        let err = match encode_json_response(&Context::new(), &mut sink, unserializable) {
            Ok(()) => panic!("tuple map keys must fail to serialize"),
            Err(e) => e,
        };
        assert!(matches!(err.downcast_ref::<CodecError>(), Some(CodecError::Serialize(_))));
        assert!(sink.body().is_empty());
    }

    #[test]
    fn oversized_response_is_not_written() {
        let mut sink = ResponseSink::with_limit(Some(4));
        let reply = Reply { result: "too long".to_owned() };
        let err = match encode_json_response(&Context::new(), &mut sink, reply) {
            Ok(()) => panic!("write over the limit must fail"),
            Err(e) => e,
        };
        assert!(matches!(
            err.downcast_ref::<CodecError>(),
            Some(CodecError::ResponseTooLarge { limit: 4, .. })
        ));
        assert!(sink.body().is_empty());
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Inner<T> {
        id: T,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Outer<T> {
        #[serde(flatten)]
        inner: Inner<T>,
        name: String,
    }

    #[test]
    fn flattened_fields_see_params_as_strings() {
        let text: Outer<String> = match decode(&[("id", "42")], r#"{"name": "ada"}"#) {
            Ok(o) => o,
            Err(e) => panic!("decode failed: {e}"),
        };
        assert_eq!(text.inner.id, "42");

        let typed = decode::<Outer<u32>>(&[("id", "42")], r#"{"name": "ada"}"#);
        assert!(matches!(typed, Err(CodecError::Schema(_))), "got {typed:?}");

        let from_body: Outer<u32> = match decode(&[], r#"{"id": 42, "name": "ada"}"#) {
            Ok(o) => o,
            Err(e) => panic!("decode failed: {e}"),
        };
        assert_eq!(from_body.inner.id, 42);
    }

    fn raw_request(body: &'static str) -> Request {
        match Request::builder().uri("/").body(axum::body::Body::from(body)) {
            Ok(r) => r,
            Err(e) => panic!("failed to build request: {e}"),
        }
    }

    #[tokio::test]
    async fn decode_request_reads_unbounded_body_without_limit() {
        let long = r#"{"id": 1, "name": "a name well past any small limit"}"#;
        let lookup: Lookup = match decode_request(Context::new(), raw_request(long)).await {
            Ok(l) => l,
            Err(e) => panic!("decode failed: {e}"),
        };
        assert_eq!(lookup.id, 1);
    }

    #[tokio::test]
    async fn decode_request_honours_caller_body_limit() {
        let req = raw_request(r#"{"id": 1, "name": "too long"}"#)
            .map(|body| axum::body::Body::new(http_body_util::Limited::new(body, 8)));
        let err = match decode_request::<Lookup>(Context::new(), req).await {
            Ok(l) => panic!("limit must be enforced, decoded {l:?}"),
            Err(e) => e,
        };
        assert!(
            matches!(err.downcast_ref::<CodecError>(), Some(CodecError::BodyTooLarge)),
            "got {err:?}"
        );
    }

    proptest! {
        #[test]
        fn body_id_always_wins_over_path_id(path_id in any::<u32>(), body_id in any::<u32>()) {
            let path = path_id.to_string();
            let body = format!(r#"{{"id": {body_id}}}"#);
            let lookup: Lookup = match decode(&[("id", path.as_str())], &body) {
                Ok(l) => l,
                Err(e) => return Err(TestCaseError::fail(format!("decode failed: {e}"))),
            };
            prop_assert_eq!(lookup.id, body_id);
        }

        #[test]
        fn path_id_used_when_body_is_silent(path_id in any::<u32>()) {
            let path = path_id.to_string();
            let lookup: Lookup = match decode(&[("id", path.as_str())], "{}") {
                Ok(l) => l,
                Err(e) => return Err(TestCaseError::fail(format!("decode failed: {e}"))),
            };
            prop_assert_eq!(lookup.id, path_id);
        }
    }
}
