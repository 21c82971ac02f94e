//! Configuration management for photobook.
//!
//! Configuration comes from command-line arguments via clap, with environment
//! variable fallbacks using the `PHOTOBOOK_` prefix:
//!
//! - `PHOTOBOOK_ACCESS_KEY` - Unsplash access key (required)
//! - `PHOTOBOOK_API_BASE` - API base URL (default: https://api.unsplash.com)
//! - `PHOTOBOOK_DATA_DIR` - Data directory (default: `<documents>/photobook`)
//! - `PHOTOBOOK_PAGE_SIZE` - Default results per page (default: 20)
//! - `PHOTOBOOK_IMAGE_CACHE_BYTES` - Decoded-image cache size (default: 50MB)
//! - `PHOTOBOOK_IMAGE_CACHE_ENTRIES` - Decoded-image cache entries (default: 256)
//! - `PHOTOBOOK_TRANSPORT_CACHE_BYTES` - Per-tier transport cache size (default: 20KiB)
//! - `PHOTOBOOK_REQUEST_TIMEOUT` - Image read timeout in seconds (default: 30)
//! - `PHOTOBOOK_RESOURCE_TIMEOUT` - Image total timeout in seconds (default: 60)

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use url::Url;

use crate::api::{
    parse_base, DEFAULT_API_BASE, DEFAULT_IMAGE_CACHE_CAPACITY, DEFAULT_IMAGE_CACHE_ENTRIES,
    DEFAULT_PER_PAGE,
};
use crate::error::ConfigError;
use crate::transport::{
    ImageTimeouts, DEFAULT_REQUEST_TIMEOUT, DEFAULT_RESOURCE_TIMEOUT,
    DEFAULT_TRANSPORT_CACHE_BYTES,
};

/// Largest page size the API accepts.
pub const MAX_PAGE_SIZE: u32 = 30;

/// Name of the application directory under the documents directory.
pub const APP_DIR_NAME: &str = "photobook";

// =============================================================================
// CLI
// =============================================================================

/// photobook - search Unsplash and keep a local shelf of saved photos.
#[derive(Parser, Debug, Clone)]
#[command(name = "photobook")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub config: Config,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Search photos and print one per line
    Search(SearchArgs),

    /// Download an image and add it to the saved photos
    Save {
        /// Absolute image URL (e.g. a photo's `urls.regular`)
        url: String,
    },

    /// List saved photos, dropping entries whose files are gone
    Saved,

    /// Delete a saved photo
    Remove {
        /// Key of the stored image
        key: String,
    },

    /// Delete every saved photo
    Clear,
}

/// Arguments of the `search` subcommand.
#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Free-text query
    pub query: String,

    /// Zero-based page number
    #[arg(long, default_value_t = 0)]
    pub page: u32,

    /// Results per page (defaults to --page-size)
    #[arg(long)]
    pub per_page: Option<u32>,
}

impl SearchArgs {
    /// Validate the explicit page size, if one was given.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.per_page {
            Some(per_page) => check_page_size("per_page", per_page),
            None => Ok(()),
        }
    }
}

fn check_page_size(name: &'static str, value: u32) -> Result<(), ConfigError> {
    if value == 0 || value > MAX_PAGE_SIZE {
        return Err(ConfigError::Invalid {
            name,
            reason: format!("must be between 1 and {}", MAX_PAGE_SIZE),
        });
    }
    Ok(())
}

// =============================================================================
// Shared Configuration
// =============================================================================

/// Settings shared by all subcommands.
#[derive(Args, Debug, Clone)]
pub struct Config {
    /// Unsplash access key, sent as `Authorization: Client-ID <key>`.
    #[arg(long, env = "PHOTOBOOK_ACCESS_KEY", hide_env_values = true, global = true, default_value = "")]
    pub access_key: String,

    /// Base URL of the photo API.
    #[arg(long, default_value = DEFAULT_API_BASE, env = "PHOTOBOOK_API_BASE", global = true)]
    pub api_base: String,

    /// Directory holding stored images and preferences.
    #[arg(long, env = "PHOTOBOOK_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Default number of results per page.
    #[arg(long, default_value_t = DEFAULT_PER_PAGE, env = "PHOTOBOOK_PAGE_SIZE", global = true)]
    pub page_size: u32,

    /// Maximum bytes held by the decoded-image cache.
    #[arg(long, default_value_t = DEFAULT_IMAGE_CACHE_CAPACITY, env = "PHOTOBOOK_IMAGE_CACHE_BYTES", global = true)]
    pub image_cache_bytes: usize,

    /// Maximum entries held by the decoded-image cache.
    #[arg(long, default_value_t = DEFAULT_IMAGE_CACHE_ENTRIES, env = "PHOTOBOOK_IMAGE_CACHE_ENTRIES", global = true)]
    pub image_cache_entries: usize,

    /// Byte budget of each transport cache tier (memory and disk).
    #[arg(long, default_value_t = DEFAULT_TRANSPORT_CACHE_BYTES, env = "PHOTOBOOK_TRANSPORT_CACHE_BYTES", global = true)]
    pub transport_cache_bytes: usize,

    /// Image download read timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT.as_secs(), env = "PHOTOBOOK_REQUEST_TIMEOUT", global = true)]
    pub request_timeout: u64,

    /// Image download total timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_RESOURCE_TIMEOUT.as_secs(), env = "PHOTOBOOK_RESOURCE_TIMEOUT", global = true)]
    pub resource_timeout: u64,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false, global = true)]
    pub verbose: bool,
}

impl Config {
    /// Validate settings needed by every command.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_page_size("page_size", self.page_size)?;

        if self.image_cache_bytes == 0 || self.image_cache_entries == 0 {
            return Err(ConfigError::Invalid {
                name: "image cache",
                reason: "size and entries must be greater than 0".to_string(),
            });
        }

        if self.transport_cache_bytes == 0 {
            return Err(ConfigError::Invalid {
                name: "transport cache",
                reason: "size must be greater than 0".to_string(),
            });
        }

        if self.request_timeout == 0 || self.request_timeout > self.resource_timeout {
            return Err(ConfigError::Invalid {
                name: "timeouts",
                reason: format!(
                    "request timeout ({}s) must be non-zero and at most the resource timeout ({}s)",
                    self.request_timeout, self.resource_timeout
                ),
            });
        }

        if self.data_dir.is_none() && dirs::document_dir().is_none() {
            return Err(ConfigError::Missing {
                name: "data directory",
                hint: "--data-dir or PHOTOBOOK_DATA_DIR",
            });
        }

        Ok(())
    }

    /// Validate settings needed to talk to the API.
    pub fn validate_remote(&self) -> Result<(), ConfigError> {
        self.validate()?;

        if self.access_key.trim().is_empty() {
            return Err(ConfigError::Missing {
                name: "access key",
                hint: "--access-key or PHOTOBOOK_ACCESS_KEY",
            });
        }

        self.api_base_url()?;
        Ok(())
    }

    /// The parsed API base URL.
    pub fn api_base_url(&self) -> Result<Url, ConfigError> {
        parse_base(&self.api_base).map_err(|_| ConfigError::Invalid {
            name: "api_base",
            reason: format!("'{}' is not an absolute base URL", self.api_base),
        })
    }

    /// Resolved data directory: `--data-dir`, else `<documents>/photobook`.
    pub fn resolved_data_dir(&self) -> Option<PathBuf> {
        self.data_dir
            .clone()
            .or_else(|| dirs::document_dir().map(|docs| docs.join(APP_DIR_NAME)))
    }

    /// Timeouts of the image transport.
    pub fn image_timeouts(&self) -> ImageTimeouts {
        ImageTimeouts {
            request: Duration::from_secs(self.request_timeout),
            resource: Duration::from_secs(self.resource_timeout),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
