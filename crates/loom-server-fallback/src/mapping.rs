// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-repository locale fallback mapping.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use loom_fallback_core::{Locale, LocaleKey, Result};

use crate::repository::ContentRepository;

/// Immutable view of a repository's fallback graph.
///
/// `dependents_of` is always the closure of `fallback_of` from the same
/// build; a snapshot is replaced as a whole, never edited.
#[derive(Debug, Clone, Default)]
pub struct MappingSnapshot {
	generation: u64,
	locale_count: usize,
	fallback_of: HashMap<LocaleKey, Locale>,
	dependents_of: HashMap<LocaleKey, Vec<Locale>>,
}

impl MappingSnapshot {
	/// Builds a snapshot from `(locale, fallback)` edges in repository order.
	pub fn from_edges(generation: u64, locale_count: usize, edges: Vec<(Locale, Locale)>) -> Self {
		let dependents_of = compute_dependents(&edges);
		let fallback_of = edges
			.into_iter()
			.map(|(locale, fallback)| (locale.key(), fallback))
			.collect();

		Self {
			generation,
			locale_count,
			fallback_of,
			dependents_of,
		}
	}

	/// Build counter, starting at 1 for the first build of a repository.
	pub fn generation(&self) -> u64 {
		self.generation
	}

	/// Number of locales the repository listed when this snapshot was built.
	pub fn locale_count(&self) -> usize {
		self.locale_count
	}

	pub fn fallback_of(&self, locale: &Locale) -> Option<&Locale> {
		self.fallback_of.get(&locale.key())
	}

	pub fn dependents_of(&self, locale: &Locale) -> &[Locale] {
		self
			.dependents_of
			.get(&locale.key())
			.map(Vec::as_slice)
			.unwrap_or(&[])
	}

	pub fn fallbacks(&self) -> &HashMap<LocaleKey, Locale> {
		&self.fallback_of
	}

	pub fn dependents(&self) -> &HashMap<LocaleKey, Vec<Locale>> {
		&self.dependents_of
	}
}

/// Computes, for every fallback target, the locales that reach it.
///
/// A target's direct dependents come first, followed by the subtree of each
/// direct dependent in turn. A locale is counted once and never expanded
/// twice, so cycles terminate and the target never lists itself.
pub(crate) fn compute_dependents(edges: &[(Locale, Locale)]) -> HashMap<LocaleKey, Vec<Locale>> {
	let mut reverse: HashMap<LocaleKey, Vec<&Locale>> = HashMap::new();
	let mut targets: Vec<LocaleKey> = Vec::new();

	for (locale, fallback) in edges {
		let sources = reverse.entry(fallback.key()).or_default();
		if sources.is_empty() {
			targets.push(fallback.key());
		}
		sources.push(locale);
	}

	targets
		.into_iter()
		.map(|target| {
			let mut visited: HashSet<LocaleKey> = HashSet::from([target.clone()]);
			let mut dependents = Vec::new();
			collect_dependents(&reverse, &target, &mut visited, &mut dependents);
			(target, dependents)
		})
		.collect()
}

fn collect_dependents(
	reverse: &HashMap<LocaleKey, Vec<&Locale>>,
	target: &LocaleKey,
	visited: &mut HashSet<LocaleKey>,
	dependents: &mut Vec<Locale>,
) {
	let tier_start = dependents.len();
	for &dependent in reverse.get(target).into_iter().flatten() {
		if visited.insert(dependent.key()) {
			dependents.push(dependent.clone());
		}
	}

	let tier: Vec<LocaleKey> = dependents[tier_start..].iter().map(Locale::key).collect();
	for key in &tier {
		collect_dependents(reverse, key, visited, dependents);
	}
}

/// Fallback mapping for a single repository.
///
/// Builds are serialized by `rebuild`; readers take the published snapshot
/// without waiting on a build in progress. A rebuild requested while another
/// build runs waits for it and then lists locales again.
pub(crate) struct LanguageMapping {
	repository: String,
	rebuild: Mutex<()>,
	current: RwLock<Option<Arc<MappingSnapshot>>>,
}

impl LanguageMapping {
	pub(crate) fn new(repository: impl Into<String>) -> Self {
		Self {
			repository: repository.into(),
			rebuild: Mutex::new(()),
			current: RwLock::new(None),
		}
	}

	pub(crate) fn snapshot(&self) -> Option<Arc<MappingSnapshot>> {
		self.current.read().clone()
	}

	/// Returns the published snapshot, building it first if there is none.
	pub(crate) async fn ensure_loaded(
		&self,
		repository: &dyn ContentRepository,
	) -> Result<Arc<MappingSnapshot>> {
		if let Some(snapshot) = self.snapshot() {
			return Ok(snapshot);
		}

		let _guard = self.rebuild.lock().await;
		// Another caller may have finished the first build while we waited.
		if let Some(snapshot) = self.snapshot() {
			return Ok(snapshot);
		}
		self.load_locked(repository).await
	}

	/// Rebuilds the mapping from the repository's current locales.
	pub(crate) async fn load(&self, repository: &dyn ContentRepository) -> Result<Arc<MappingSnapshot>> {
		let _guard = self.rebuild.lock().await;
		self.load_locked(repository).await
	}

	#[instrument(skip(self, repository), fields(repository = %self.repository))]
	async fn load_locked(&self, repository: &dyn ContentRepository) -> Result<Arc<MappingSnapshot>> {
		let locales = repository.list_locales().await?;

		let mut by_name: HashMap<LocaleKey, &Locale> = HashMap::with_capacity(locales.len());
		for locale in &locales {
			by_name.entry(locale.key()).or_insert(locale);
		}

		let mut edges = Vec::new();
		let mut seen = HashSet::with_capacity(locales.len());
		for locale in &locales {
			if !seen.insert(locale.key()) {
				debug!(locale = %locale, "duplicate locale name, skipping");
				continue;
			}

			let Some(origin) = locale.origin() else {
				debug!(locale = %locale, "locale has no origin record, skipping");
				continue;
			};

			let Some(definition) = repository.fetch_record_by_origin(origin).await? else {
				debug!(locale = %locale, origin = %origin, "origin record not found, skipping");
				continue;
			};

			let fallback_name = definition.fallback_locale_name();
			if fallback_name.is_empty() {
				continue;
			}

			match by_name.get(&LocaleKey::new(fallback_name)) {
				Some(&fallback) => edges.push((locale.clone(), fallback.clone())),
				None => {
					debug!(
						locale = %locale,
						fallback = %fallback_name,
						"fallback locale is not defined in repository, skipping"
					);
				}
			}
		}

		let generation = self
			.snapshot()
			.map(|previous| previous.generation() + 1)
			.unwrap_or(1);
		let snapshot = Arc::new(MappingSnapshot::from_edges(generation, locales.len(), edges));

		*self.current.write() = Some(Arc::clone(&snapshot));

		info!(
			generation,
			locales = snapshot.locale_count(),
			fallbacks = snapshot.fallbacks().len(),
			"built locale fallback mapping"
		);

		Ok(snapshot)
	}
}
