// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Locale fallback resolution for Loom content repositories.
//!
//! This crate provides:
//! - [`FallbackGraphCache`] - per-repository locale fallback mappings, built
//!   lazily and rebuilt when a locale definition is saved
//! - [`FallbackResolver`] - record lookup that substitutes content from the
//!   fallback chain when the requested locale has none
//! - [`spawn_save_listener`] - adapter feeding broadcast repository events
//!   into the cache
//! - [`FallbackConfig`] - layered configuration
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use loom_server_fallback::{FallbackContext, FallbackGraphCache, FallbackResolver, ResolveArgs};
//!
//! let cache = Arc::new(FallbackGraphCache::new());
//! let resolver = FallbackResolver::new(Arc::clone(&cache));
//!
//! let mut args = ResolveArgs::by_id(repository, record_id, Locale::new("de"), Version::Latest);
//! resolver.resolve(&mut args, &FallbackContext::new()).await?;
//! ```

pub mod cache;
pub mod config;
pub mod events;
pub mod mapping;
pub mod repository;
pub mod resolver;

pub use cache::{FallbackGraphCache, SaveOrigin};
pub use config::{load_config, load_config_with_file, ConfigError, FallbackConfig, FallbackConfigLayer};
pub use events::{spawn_save_listener, RepositoryEvent};
pub use mapping::MappingSnapshot;
pub use repository::{ContentRepository, RecordRef, SecurityCheck};
pub use resolver::{FallbackContext, FallbackOverride, FallbackResolver, ResolveArgs};

pub use loom_fallback_core::{FallbackError, Locale, LocaleKey, Record, RecordId, Result, Version};
