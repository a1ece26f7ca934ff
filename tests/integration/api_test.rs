//! API endpoint integration tests
//!
//! Drives the composed router over the in-memory thread store, the mock
//! content catalog, and template tutor replies.

#![allow(dead_code)]

mod chat;
mod common;
mod conversations;
