//! Fetch request construction.

use crate::config::{normalize_handle, Config};
use crate::error::{Error, Result};

/// One user-initiated fetch operation for a single account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    account_handle: String,
    min_resolution: u32,
    limit: usize,
    upload_to_remote: bool,
}

impl FetchRequest {
    /// Create a validated request.
    pub fn new(
        account_handle: &str,
        min_resolution: u32,
        limit: usize,
        upload_to_remote: bool,
    ) -> Result<Self> {
        let account_handle = normalize_handle(account_handle)?;

        if min_resolution == 0 {
            return Err(Error::ConfigValidation {
                field: "min_resolution".to_string(),
                message: "Minimum resolution must be greater than 0".to_string(),
            });
        }

        if limit == 0 {
            return Err(Error::ConfigValidation {
                field: "limit".to_string(),
                message: "Limit must be greater than 0".to_string(),
            });
        }

        Ok(Self {
            account_handle,
            min_resolution,
            limit,
            upload_to_remote,
        })
    }

    /// Create a request for `handle` using the configured options.
    pub fn from_config(config: &Config, handle: &str) -> Result<Self> {
        Self::new(
            handle,
            config.options.min_resolution,
            config.options.limit,
            config.options.upload_to_remote,
        )
    }

    pub fn account_handle(&self) -> &str {
        &self.account_handle
    }

    pub fn min_resolution(&self) -> u32 {
        self.min_resolution
    }

    /// Number of successful downloads wanted.
    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn upload_to_remote(&self) -> bool {
        self.upload_to_remote
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_request() {
        let request = FetchRequest::new("@natgeo", 800, 5, true).unwrap();
        assert_eq!(request.account_handle(), "natgeo");
        assert_eq!(request.min_resolution(), 800);
        assert_eq!(request.limit(), 5);
        assert!(request.upload_to_remote());
    }

    #[test]
    fn test_invalid_request() {
        assert!(FetchRequest::new("", 800, 5, false).is_err());
        assert!(FetchRequest::new("natgeo", 0, 5, false).is_err());
        assert!(FetchRequest::new("natgeo", 800, 0, false).is_err());
    }

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.options.min_resolution = 1080;
        config.options.limit = 3;

        let request = FetchRequest::from_config(&config, "nasa").unwrap();
        assert_eq!(request.min_resolution(), 1080);
        assert_eq!(request.limit(), 3);
        assert!(!request.upload_to_remote());
    }
}
