// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Cache of locale fallback mappings, one per repository.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, instrument, warn};

use loom_fallback_core::{Locale, Record, Result};

use crate::config::FallbackConfig;
use crate::mapping::{LanguageMapping, MappingSnapshot};
use crate::repository::ContentRepository;

/// Where a record save was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOrigin {
	/// Saved through this process.
	Local,
	/// Saved elsewhere and replicated to this process.
	Replicated,
}

/// Locale fallback mappings keyed by repository name.
///
/// Mappings are built lazily on first lookup and rebuilt wholesale when a
/// locale definition is saved. The slot table lock only covers get-or-create;
/// builds are serialized per repository, so rebuilding one repository never
/// blocks another.
#[derive(Default)]
pub struct FallbackGraphCache {
	mappings: Mutex<HashMap<String, Arc<LanguageMapping>>>,
}

impl std::fmt::Debug for FallbackGraphCache {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FallbackGraphCache")
			.field("repositories", &self.repositories())
			.finish()
	}
}

impl FallbackGraphCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the direct fallback of `locale`, if it has one.
	pub async fn fallback_locale(
		&self,
		locale: &Locale,
		repository: &dyn ContentRepository,
	) -> Result<Option<Locale>> {
		if locale.is_unset() {
			return Ok(None);
		}

		let snapshot = self.snapshot(repository).await?;
		Ok(snapshot.fallback_of(locale).cloned())
	}

	/// Returns every locale whose fallback chain passes through `locale`.
	pub async fn dependent_locales(
		&self,
		locale: &Locale,
		repository: &dyn ContentRepository,
	) -> Result<Vec<Locale>> {
		if locale.is_unset() {
			return Ok(Vec::new());
		}

		let snapshot = self.snapshot(repository).await?;
		Ok(snapshot.dependents_of(locale).to_vec())
	}

	/// Returns the published mapping for `repository`, building it on first use.
	pub async fn snapshot(&self, repository: &dyn ContentRepository) -> Result<Arc<MappingSnapshot>> {
		self.mapping(repository.name()).ensure_loaded(repository).await
	}

	/// Rebuilds the mapping for `repository` unconditionally.
	pub async fn reload(&self, repository: &dyn ContentRepository) -> Result<Arc<MappingSnapshot>> {
		self.mapping(repository.name()).load(repository).await
	}

	/// Handles a record save. Returns whether a mapping was rebuilt.
	///
	/// Only locale definitions matter, and only for repositories that have a
	/// mapping slot; others are built from scratch on first lookup anyway. A
	/// save that lands while the first build is still listing locales waits for
	/// that build and then rebuilds, so the change is never lost.
	#[instrument(
		skip(self, repository, record),
		fields(repository = %repository.name(), record = %record.id())
	)]
	pub async fn notify_saved(
		&self,
		repository: &dyn ContentRepository,
		record: &Record,
		origin: SaveOrigin,
	) -> Result<bool> {
		if !record.is_locale_definition() {
			return Ok(false);
		}

		let Some(mapping) = self.existing(repository.name()) else {
			debug!("no mapping for repository, nothing to invalidate");
			return Ok(false);
		};

		mapping.load(repository).await?;
		Ok(true)
	}

	/// Attaches a newly created repository instance.
	///
	/// When the instance's name already has a mapping slot, the mapping is
	/// rebuilt against the new instance. Returns whether that happened.
	#[instrument(skip(self, repository), fields(repository = %repository.name()))]
	pub async fn repository_created(&self, repository: &dyn ContentRepository) -> Result<bool> {
		let Some(mapping) = self.existing(repository.name()) else {
			return Ok(false);
		};

		mapping.load(repository).await?;
		Ok(true)
	}

	/// Builds mappings ahead of the first lookup. Returns how many were built.
	pub async fn warm(&self, repositories: &[Arc<dyn ContentRepository>]) -> Result<usize> {
		for repository in repositories {
			self.snapshot(repository.as_ref()).await?;
		}
		Ok(repositories.len())
	}

	/// Warms the repositories named in `config.warm_repositories`.
	///
	/// Names with no matching repository in `available` are logged and skipped.
	pub async fn warm_configured(
		&self,
		config: &FallbackConfig,
		available: &[Arc<dyn ContentRepository>],
	) -> Result<usize> {
		let mut selected = Vec::with_capacity(config.warm_repositories.len());
		for name in &config.warm_repositories {
			match available.iter().find(|r| r.name() == name.as_str()) {
				Some(repository) => selected.push(Arc::clone(repository)),
				None => warn!(repository = %name, "configured warm repository is not available"),
			}
		}
		self.warm(&selected).await
	}

	/// Names of repositories that have a mapping slot, sorted.
	pub fn repositories(&self) -> Vec<String> {
		let mut names: Vec<String> = self.mappings.lock().keys().cloned().collect();
		names.sort();
		names
	}

	fn mapping(&self, repository: &str) -> Arc<LanguageMapping> {
		let mut mappings = self.mappings.lock();
		Arc::clone(
			mappings
				.entry(repository.to_string())
				.or_insert_with(|| Arc::new(LanguageMapping::new(repository))),
		)
	}

	fn existing(&self, repository: &str) -> Option<Arc<LanguageMapping>> {
		self.mappings.lock().get(repository).cloned()
	}
}
