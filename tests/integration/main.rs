//! Integration tests for ocm-control.
//!
//! Each test drives the public [`Client`](ocm_control::Client) API end to end,
//! either against a `wiremock` server speaking the OCM REST API or against
//! the in-memory control plane.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test --test integration
//!
//! # With logs
//! RUST_LOG=ocm_control=debug cargo test --test integration -- --nocapture
//! ```

mod admin_tests;
mod common;
mod role_link_tests;
