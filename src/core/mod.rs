//! Core types shared across the writer, scanner, and coordinator.

mod error;
mod urlutil;

pub use error::ArchiveError;
pub use urlutil::{file_name, is_data, resolve};
