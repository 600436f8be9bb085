//! # Quill Core
//!
//! The domain layer of the Quill blog backend.
//! This crate contains business logic only: entities, ports, authorization
//! rules and the services built on them. Storage and crypto live in
//! `quill-infra`.

pub mod domain;
pub mod error;
pub mod pagination;
pub mod policy;
pub mod ports;
pub mod services;
pub mod slug;
pub mod validation;

pub use error::{DomainError, RepoError};
