//! Filesystem module.
//!
//! Provides:
//! - Path and directory management
//! - Filename generation and manipulation

pub mod naming;
pub mod paths;

pub use naming::{
    file_stem, media_filename, media_stem, sanitize_filename, sanitize_path_component,
};
pub use paths::{account_folder_in, ensure_dir};
