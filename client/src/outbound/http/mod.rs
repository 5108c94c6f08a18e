//! HTTP adapters for the wiki REST API.
//!
//! One shared [`ApiClient`] owns the connection pool and the header policy;
//! each port gets a thin adapter that interprets statuses and decodes DTOs.

mod api_client;
mod auth;
mod dto;
mod pages;
mod public;
mod rooms;
mod search;

pub use api_client::{ApiClient, ApiClientError, TENANT_HEADER, TRACE_HEADER};
pub use auth::HttpAuthGateway;
pub use pages::HttpPageDirectory;
pub use public::HttpPublicShare;
pub use rooms::HttpRoomDirectory;
pub use search::HttpPageSearch;
