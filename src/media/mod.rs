//! Media module for candidate representation, filtering and probing.

pub mod candidate;
pub mod filter;
pub mod probe;

pub use candidate::MediaCandidate;
pub use filter::{filter_candidates, meets_resolution};
pub use probe::{archived_extension, is_archived_extension, probe_image, ImageInfo};
