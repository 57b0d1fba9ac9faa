// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Fallback engine configuration.
//!
//! Layered from built-in defaults, an optional TOML file and `LOOM_FALLBACK_*`
//! environment variables, in increasing precedence.

mod error;
mod sources;

pub use error::ConfigError;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const DEFAULT_RESERVED_NAME_PREFIX: &str = "__";
pub const DEFAULT_CHAIN_CAPACITY: usize = 4;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FallbackConfigLayer {
	pub reserved_name_prefix: Option<String>,
	pub chain_capacity: Option<usize>,
	pub warm_repositories: Option<Vec<String>>,
}

impl FallbackConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.reserved_name_prefix.is_some() {
			self.reserved_name_prefix = other.reserved_name_prefix;
		}
		if other.chain_capacity.is_some() {
			self.chain_capacity = other.chain_capacity;
		}
		if other.warm_repositories.is_some() {
			self.warm_repositories = other.warm_repositories;
		}
	}

	pub fn finalize(self) -> Result<FallbackConfig, ConfigError> {
		let reserved_name_prefix = self
			.reserved_name_prefix
			.unwrap_or_else(|| DEFAULT_RESERVED_NAME_PREFIX.to_string());
		if reserved_name_prefix.is_empty() {
			return Err(ConfigError::InvalidValue {
				key: "reserved_name_prefix".to_string(),
				message: "must not be empty".to_string(),
			});
		}

		let chain_capacity = self.chain_capacity.unwrap_or(DEFAULT_CHAIN_CAPACITY);
		if chain_capacity == 0 {
			return Err(ConfigError::InvalidValue {
				key: "chain_capacity".to_string(),
				message: "must be at least 1".to_string(),
			});
		}

		Ok(FallbackConfig {
			reserved_name_prefix,
			chain_capacity,
			warm_repositories: self.warm_repositories.unwrap_or_default(),
		})
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FallbackConfig {
	/// Records whose name starts with this prefix are system records and never
	/// fall back, unless they hold standard values.
	pub reserved_name_prefix: String,
	/// Initial capacity of the visited-locale list used during a chain walk.
	pub chain_capacity: usize,
	/// Repositories whose mappings are built at startup.
	pub warm_repositories: Vec<String>,
}

impl Default for FallbackConfig {
	fn default() -> Self {
		Self {
			reserved_name_prefix: DEFAULT_RESERVED_NAME_PREFIX.to_string(),
			chain_capacity: DEFAULT_CHAIN_CAPACITY,
			warm_repositories: Vec::new(),
		}
	}
}

/// Load configuration from defaults, `/etc/loom/fallback.toml` and the environment.
pub fn load_config() -> Result<FallbackConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<FallbackConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<FallbackConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = FallbackConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	let config = merged.finalize()?;
	info!(
		reserved_name_prefix = %config.reserved_name_prefix,
		chain_capacity = config.chain_capacity,
		warm_repositories = config.warm_repositories.len(),
		"fallback configuration loaded"
	);
	Ok(config)
}
