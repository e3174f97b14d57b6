//! Demo HTTP gateway built on the Portkit pipeline.
//!
//! Serves a small in-memory user directory. Every route is an
//! [`HttpServer`](portkit_http::HttpServer) wrapping a transport-agnostic
//! endpoint.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod directory;
pub mod error;
pub mod routes;
