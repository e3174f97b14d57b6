//! Path parameters supplied by the router.
//!
//! The router is an external collaborator; this module is the narrow seam
//! through which its matched `key → value` pairs reach the decoder.

use axum::{
    extract::{rejection::RawPathParamsRejection, FromRequestParts, RawPathParams},
    http::request::Parts,
};

use crate::CodecError;

/// Route-matched path parameters, in route order, already percent-decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(Vec<(String, String)>);

impl PathParams {
    /// Create an empty parameter list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract the parameters the router attached to the request.
    ///
    /// A request that never went through a router (or matched a route with
    /// no parameters) yields an empty list.
    ///
    /// # Errors
    /// Returns [`CodecError::InvalidPathParam`] if a parameter is not valid
    /// UTF-8 after percent-decoding.
    pub async fn from_parts(parts: &mut Parts) -> Result<Self, CodecError> {
        match RawPathParams::from_request_parts(parts, &()).await {
            Ok(raw) => Ok(raw.iter().collect()),
            Err(RawPathParamsRejection::MissingPathParams(_)) => Ok(Self::new()),
            Err(rejection) => Err(CodecError::InvalidPathParam(rejection.to_string())),
        }
    }

    /// Append a parameter.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    /// Look up a parameter by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PathParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl IntoIterator for PathParams {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
