//! # Quill Shared
//!
//! Wire types shared between the API server and its clients.
//! Kept free of server dependencies so a client can compile it as-is.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse, ListResponse};
