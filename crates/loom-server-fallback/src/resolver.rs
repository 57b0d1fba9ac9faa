// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Record lookup with locale fallback.

use std::sync::Arc;

use tracing::{debug, instrument};

use loom_fallback_core::{Locale, Record, RecordId, Result, Version};

use crate::cache::FallbackGraphCache;
use crate::config::FallbackConfig;
use crate::repository::{ContentRepository, RecordRef, SecurityCheck};

/// Caller-controlled switch that overrides the per-request fallback flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackOverride {
	/// Defer to [`ResolveArgs::allow_fallback`].
	#[default]
	Unset,
	ForceOn,
	ForceOff,
}

/// Request-scoped context passed alongside [`ResolveArgs`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackContext {
	pub fallback_override: FallbackOverride,
}

impl FallbackContext {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn forced_on() -> Self {
		Self {
			fallback_override: FallbackOverride::ForceOn,
		}
	}

	pub fn forced_off() -> Self {
		Self {
			fallback_override: FallbackOverride::ForceOff,
		}
	}

	/// Whether fallback applies given the request's own flag.
	pub fn permits(&self, allow_fallback: bool) -> bool {
		match self.fallback_override {
			FallbackOverride::ForceOn => true,
			FallbackOverride::ForceOff => false,
			FallbackOverride::Unset => allow_fallback,
		}
	}
}

/// A record lookup flowing through the resolver.
pub struct ResolveArgs {
	pub locale: Option<Locale>,
	/// Preferred over `path` when both are set.
	pub id: Option<RecordId>,
	pub path: Option<String>,
	pub version: Version,
	pub repository: Arc<dyn ContentRepository>,
	pub security: SecurityCheck,
	pub allow_fallback: bool,
	/// Set by an earlier stage that fully handled the lookup.
	pub handled: bool,
	pub result: Option<Record>,
}

impl std::fmt::Debug for ResolveArgs {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ResolveArgs")
			.field("locale", &self.locale)
			.field("id", &self.id)
			.field("path", &self.path)
			.field("version", &self.version)
			.field("repository", &self.repository.name())
			.field("security", &self.security)
			.field("allow_fallback", &self.allow_fallback)
			.field("handled", &self.handled)
			.field("result", &self.result.as_ref().map(Record::id))
			.finish()
	}
}

impl ResolveArgs {
	pub fn by_id(
		repository: Arc<dyn ContentRepository>,
		id: RecordId,
		locale: Locale,
		version: Version,
	) -> Self {
		Self {
			locale: Some(locale),
			id: Some(id),
			path: None,
			version,
			repository,
			security: SecurityCheck::default(),
			allow_fallback: true,
			handled: false,
			result: None,
		}
	}

	pub fn by_path(
		repository: Arc<dyn ContentRepository>,
		path: impl Into<String>,
		locale: Locale,
		version: Version,
	) -> Self {
		Self {
			locale: Some(locale),
			id: None,
			path: Some(path.into()),
			version,
			repository,
			security: SecurityCheck::default(),
			allow_fallback: true,
			handled: false,
			result: None,
		}
	}

	pub fn with_security(mut self, security: SecurityCheck) -> Self {
		self.security = security;
		self
	}

	pub fn with_allow_fallback(mut self, allow: bool) -> Self {
		self.allow_fallback = allow;
		self
	}

	pub fn with_result(mut self, result: Record) -> Self {
		self.result = Some(result);
		self
	}

	pub fn handled(mut self) -> Self {
		self.handled = true;
		self
	}

	fn target(&self) -> Option<RecordRef> {
		match (&self.id, &self.path) {
			(Some(id), _) => Some(RecordRef::Id(*id)),
			(None, Some(path)) => Some(RecordRef::Path(path.clone())),
			(None, None) => None,
		}
	}
}

/// Substitutes content from fallback locales for records with no content in
/// the requested locale.
#[derive(Debug, Clone)]
pub struct FallbackResolver {
	cache: Arc<FallbackGraphCache>,
	reserved_name_prefix: String,
	chain_capacity: usize,
}

impl FallbackResolver {
	pub fn new(cache: Arc<FallbackGraphCache>) -> Self {
		Self::with_config(cache, &FallbackConfig::default())
	}

	pub fn with_config(cache: Arc<FallbackGraphCache>, config: &FallbackConfig) -> Self {
		Self {
			cache,
			reserved_name_prefix: config.reserved_name_prefix.clone(),
			chain_capacity: config.chain_capacity,
		}
	}

	pub fn cache(&self) -> &Arc<FallbackGraphCache> {
		&self.cache
	}

	/// Resolves `args`, replacing `args.result` with a stand-in when the
	/// requested locale has no content and a fallback locale does.
	///
	/// The order of checks:
	/// 1. No requested locale: nothing to do
	/// 2. Fallback disabled by the override or the request flag
	/// 3. Lookup already handled by an earlier stage
	/// 4. Fetch the base record unless one was supplied
	/// 5. Base record missing or its template disables fallback
	/// 6. Walk the fallback chain and synthesize a stand-in
	#[instrument(skip(self, args, context), fields(repository = %args.repository.name(), record = ?args.id))]
	pub async fn resolve(&self, args: &mut ResolveArgs, context: &FallbackContext) -> Result<()> {
		let requested = match &args.locale {
			Some(locale) if !locale.is_unset() => locale.clone(),
			_ => {
				debug!("no requested locale, fallback not applicable");
				return Ok(());
			}
		};

		if !context.permits(args.allow_fallback) {
			debug!(
				fallback_override = ?context.fallback_override,
				allow_fallback = args.allow_fallback,
				"fallback disabled for request"
			);
			return Ok(());
		}

		if args.handled {
			return Ok(());
		}

		if args.result.is_none() {
			if let Some(target) = args.target() {
				args.result = args
					.repository
					.fetch_record(&target, &requested, args.version, args.security)
					.await?;
			}
		}

		let Some(base) = args.result.as_ref() else {
			return Ok(());
		};

		if !base.fallback_enabled {
			debug!(record = %base.id(), "fallback disabled for record template");
			return Ok(());
		}

		if let Some(source) = self.walk_chain(args, base, &requested).await? {
			debug!(
				record = %base.id(),
				locale = %requested,
				source_locale = %source.locale,
				"substituting fallback content"
			);
			let stand_in = base.stand_in(&source);
			args.result = Some(stand_in);
		}

		Ok(())
	}

	/// Follows the fallback chain from `base` until a record with content is
	/// found. Returns `None` when the chain ends, revisits a locale, or leads
	/// back to the requested locale.
	async fn walk_chain(
		&self,
		args: &ResolveArgs,
		base: &Record,
		requested: &Locale,
	) -> Result<Option<Record>> {
		let repository = args.repository.as_ref();
		let mut visited: Vec<Locale> = Vec::with_capacity(self.chain_capacity);
		let mut candidate = Some(base.clone());
		let mut current = requested.clone();

		while let Some(record) = candidate.as_ref().filter(|r| self.needs_fallback(r)) {
			let id = record.id();
			visited.push(current.clone());

			let Some(next) = self.cache.fallback_locale(&current, repository).await? else {
				debug!(locale = %current, "fallback chain ended without content");
				return Ok(None);
			};

			if visited.contains(&next) {
				debug!(locale = %current, fallback = %next, "fallback cycle detected");
				return Ok(None);
			}

			candidate = repository
				.fetch_record(&RecordRef::Id(id), &next, Version::Latest, args.security)
				.await?;
			current = next;
		}

		match candidate {
			Some(record) if current != *requested => Ok(Some(record)),
			_ => Ok(None),
		}
	}

	/// A placeholder variant with no saved content. Reserved system records
	/// never fall back, except standard values holders.
	fn needs_fallback(&self, record: &Record) -> bool {
		let reserved = record.name().starts_with(&self.reserved_name_prefix)
			&& !record.standard_values_holder;
		!reserved && record.temporary_version
	}
}
