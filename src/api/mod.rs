//! API client module for Storage Crab Desktop.
//!
//! Provides the HTTP transport, the stateless request helpers, the login and
//! file listing calls, and the request/response types of the backend API.

pub mod auth;
pub mod client;
pub mod error;
pub mod files;
pub mod requests;
#[cfg(test)]
pub mod testing;
pub mod types;

pub use client::{ApiClient, ApiRequest, Endpoints, Method, Transport};
pub use error::{RequestError, RequestResult};
