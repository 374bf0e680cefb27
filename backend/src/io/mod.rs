//! # IO Layer
//!
//! The HTTP-facing side of the backend: the REST handlers and the
//! authenticated-identity extractor.

pub mod auth;
pub mod rest;
