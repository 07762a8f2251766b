//! Synchronous API client core for the todo service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network. The caller executes the actual HTTP round-trip,
//! which keeps this crate deterministic and free of any runtime.
//!
//! DTOs are defined independently from the server crate; the integration
//! tests run both against each other to catch schema drift.

pub mod client;
pub mod error;
pub mod http;
pub mod types;

pub use client::TodoClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{CreateTodo, MetricsSnapshot, Todo, UpdateTodo};
