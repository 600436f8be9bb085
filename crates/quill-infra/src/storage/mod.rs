//! Image storage implementations.

mod local;

pub use local::{DEFAULT_MAX_IMAGE_BYTES, LocalImageStore};
