//! Typed API client for the campus facilities service.
//!
//! # Overview
//! Students file complaints and maintenance requests; staff and admins
//! assign and resolve them. This crate is the client those frontends use:
//! `ApiClient` issues authenticated JSON (and multipart) calls against a
//! single base URL and normalizes every outcome into `ApiResponse<T>` or
//! `ApiError`. The `services` module binds the complaints, requests and
//! staff resources onto it.
//!
//! # Design
//! - `ClientConfig` is built by the caller; the client never reads the
//!   environment.
//! - The bearer token comes from an injected `TokenProvider`, read on every
//!   call.
//! - Request building and response parsing are pure; a `Transport` does the
//!   I/O (`HttpTransport` by default).
//! - The mock server keeps its own copies of the DTO shapes; the lifecycle
//!   test in `tests/integration.rs` fails when the two disagree.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod multipart;
pub mod services;
pub mod transport;
pub mod types;

pub use auth::{Anonymous, SessionStorage, StoredToken, TokenProvider, TOKEN_KEY};
pub use client::{parse_response, ApiClient, ApiResponse};
pub use config::ClientConfig;
pub use error::{ApiError, ErrorKind};
pub use http::{Endpoint, HeaderOverride, HttpMethod, HttpRequest, HttpResponse, RequestBody};
pub use multipart::FormData;
pub use services::{ComplaintService, RequestService, StaffService};
pub use transport::{HttpTransport, Transport, TransportError};
pub use types::{
    Assignment, Attachment, Complaint, ComplaintStatus, ComplaintUpdate, MaintenanceRequest, NewComplaint,
    NewRequest, NewStaff, Priority, RequestStatus, RequestUpdate, Staff, StaffRole, StaffUpdate,
};
