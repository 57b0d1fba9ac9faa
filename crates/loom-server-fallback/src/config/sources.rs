// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: defaults, TOML files and environment variables.

use std::path::PathBuf;

use tracing::{debug, trace};

use super::{ConfigError, FallbackConfigLayer};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<FallbackConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<FallbackConfigLayer, ConfigError> {
		Ok(FallbackConfigLayer::default())
	}
}

/// TOML file configuration source. A missing file yields an empty layer.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new("/etc/loom/fallback.toml")
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<FallbackConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(FallbackConfigLayer::default());
		}

		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: FallbackConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed fallback config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// - `LOOM_FALLBACK_RESERVED_PREFIX`
/// - `LOOM_FALLBACK_CHAIN_CAPACITY`
/// - `LOOM_FALLBACK_WARM_REPOSITORIES` (comma-separated)
pub struct EnvSource;

impl EnvSource {
	/// Builds a layer from an arbitrary variable lookup.
	pub fn load_from(
		lookup: impl Fn(&str) -> Option<String>,
	) -> Result<FallbackConfigLayer, ConfigError> {
		let var = |name: &str| lookup(name).filter(|s| !s.is_empty());

		let chain_capacity = match var("LOOM_FALLBACK_CHAIN_CAPACITY") {
			Some(raw) => Some(raw.trim().parse::<usize>().map_err(|e| {
				ConfigError::InvalidValue {
					key: "LOOM_FALLBACK_CHAIN_CAPACITY".to_string(),
					message: e.to_string(),
				}
			})?),
			None => None,
		};

		let warm_repositories = var("LOOM_FALLBACK_WARM_REPOSITORIES").map(|raw| {
			raw
				.split(',')
				.map(str::trim)
				.filter(|name| !name.is_empty())
				.map(String::from)
				.collect()
		});

		Ok(FallbackConfigLayer {
			reserved_name_prefix: var("LOOM_FALLBACK_RESERVED_PREFIX"),
			chain_capacity,
			warm_repositories,
		})
	}
}

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<FallbackConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Self::load_from(|key| std::env::var(key).ok())
	}
}
