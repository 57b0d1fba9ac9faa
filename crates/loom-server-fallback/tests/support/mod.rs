// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use loom_fallback_core::{FallbackError, FieldId, TemplateId, FALLBACK_LOCALE_FIELD};
use loom_server_fallback::{
	ContentRepository, Locale, LocaleKey, Record, RecordId, RecordRef, Result, SecurityCheck,
	Version,
};

pub const PAGE: TemplateId = TemplateId(Uuid::from_u128(0xa0));
pub const TITLE: FieldId = FieldId(Uuid::from_u128(0xb1));
pub const FOOTER: FieldId = FieldId(Uuid::from_u128(0xb2));

#[derive(Default)]
struct State {
	locales: Vec<Locale>,
	definitions: HashMap<RecordId, Record>,
	records: HashMap<(RecordId, LocaleKey), Record>,
	paths: HashMap<String, RecordId>,
	fetches: Vec<(RecordId, String, Version, SecurityCheck)>,
	failing: bool,
}

/// In-memory repository. Fetching a known record under a locale it has no
/// variant for returns a temporary placeholder, like a real content store.
pub struct InMemoryRepository {
	name: String,
	state: Mutex<State>,
	list_calls: AtomicUsize,
	list_delay: Mutex<Option<Duration>>,
	list_hold: Mutex<Option<Duration>>,
}

impl InMemoryRepository {
	pub fn new(name: &str) -> Arc<Self> {
		Arc::new(Self {
			name: name.to_string(),
			state: Mutex::new(State::default()),
			list_calls: AtomicUsize::new(0),
			list_delay: Mutex::new(None),
			list_hold: Mutex::new(None),
		})
	}

	/// Defines `name` with a locale definition record falling back to `fallback`.
	pub fn define_locale(&self, name: &str, fallback: &str) -> Record {
		let origin = RecordId::new();
		let definition = Record::locale_definition(origin, &self.name, name, fallback);
		let mut state = self.state.lock().unwrap();
		state.locales.push(Locale::new(name).with_origin(origin));
		state.definitions.insert(origin, definition.clone());
		definition
	}

	pub fn add_locale_without_origin(&self, name: &str) {
		self.state.lock().unwrap().locales.push(Locale::new(name));
	}

	pub fn add_locale_with_missing_origin(&self, name: &str) {
		self
			.state
			.lock()
			.unwrap()
			.locales
			.push(Locale::new(name).with_origin(RecordId::new()));
	}

	/// Changes the fallback of an existing locale; returns the saved definition.
	pub fn set_fallback(&self, name: &str, fallback: &str) -> Record {
		let mut state = self.state.lock().unwrap();
		let origin = state
			.locales
			.iter()
			.find(|l| l.key() == LocaleKey::new(name))
			.and_then(Locale::origin)
			.expect("locale has an origin");
		let definition = state.definitions.get_mut(&origin).expect("definition exists");
		definition.fields.insert(FALLBACK_LOCALE_FIELD, fallback.to_string());
		definition.clone()
	}

	pub fn put(&self, record: Record) {
		let key = (record.id(), record.locale.key());
		self.state.lock().unwrap().records.insert(key, record);
	}

	pub fn put_path(&self, path: &str, id: RecordId) {
		self.state.lock().unwrap().paths.insert(path.to_string(), id);
	}

	pub fn set_failing(&self, failing: bool) {
		self.state.lock().unwrap().failing = failing;
	}

	pub fn set_list_delay(&self, delay: Duration) {
		*self.list_delay.lock().unwrap() = Some(delay);
	}

	/// Delays `list_locales` after it has read the current locales, so edits
	/// made during the delay are missing from that listing.
	pub fn set_list_hold(&self, hold: Duration) {
		*self.list_hold.lock().unwrap() = Some(hold);
	}

	pub fn list_calls(&self) -> usize {
		self.list_calls.load(Ordering::SeqCst)
	}

	/// Locale names fetched, in order.
	pub fn fetched_locales(&self) -> Vec<String> {
		self
			.state
			.lock()
			.unwrap()
			.fetches
			.iter()
			.map(|(_, locale, _, _)| locale.clone())
			.collect()
	}

	pub fn fetches(&self) -> Vec<(RecordId, String, Version, SecurityCheck)> {
		self.state.lock().unwrap().fetches.clone()
	}
}

#[async_trait]
impl ContentRepository for InMemoryRepository {
	fn name(&self) -> &str {
		&self.name
	}

	async fn list_locales(&self) -> Result<Vec<Locale>> {
		self.list_calls.fetch_add(1, Ordering::SeqCst);
		let delay = *self.list_delay.lock().unwrap();
		if let Some(delay) = delay {
			tokio::time::sleep(delay).await;
		}

		let locales = {
			let state = self.state.lock().unwrap();
			if state.failing {
				return Err(FallbackError::RepositoryUnavailable(self.name.clone()));
			}
			state.locales.clone()
		};

		let hold = *self.list_hold.lock().unwrap();
		if let Some(hold) = hold {
			tokio::time::sleep(hold).await;
		}
		Ok(locales)
	}

	async fn fetch_record(
		&self,
		target: &RecordRef,
		locale: &Locale,
		version: Version,
		security: SecurityCheck,
	) -> Result<Option<Record>> {
		let mut state = self.state.lock().unwrap();
		if state.failing {
			return Err(FallbackError::repository(&self.name, "fetch failed"));
		}

		let id = match target {
			RecordRef::Id(id) => *id,
			RecordRef::Path(path) => match state.paths.get(path) {
				Some(id) => *id,
				None => return Ok(None),
			},
		};
		state
			.fetches
			.push((id, locale.name().to_string(), version, security));

		if let Some(record) = state.records.get(&(id, locale.key())) {
			return Ok(Some(record.clone()));
		}

		// Known record without a variant in this locale: placeholder.
		let placeholder = state
			.records
			.iter()
			.find(|((record_id, _), _)| *record_id == id)
			.map(|(_, existing)| {
				let mut placeholder = Record::new(
					id,
					existing.name(),
					existing.template_id(),
					&self.name,
					locale.clone(),
				)
				.with_version(version)
				.with_fallback_enabled(existing.fallback_enabled)
				.temporary();
				placeholder.standard_values_holder = existing.standard_values_holder;
				placeholder
			});
		Ok(placeholder)
	}

	async fn fetch_record_by_origin(&self, origin: RecordId) -> Result<Option<Record>> {
		let state = self.state.lock().unwrap();
		if state.failing {
			return Err(FallbackError::repository(&self.name, "fetch failed"));
		}
		Ok(state.definitions.get(&origin).cloned())
	}
}

/// A page record with a title, saved in `locale`.
pub fn page(repository: &str, id: RecordId, locale: &str, title: &str) -> Record {
	Record::new(id, "home", PAGE, repository, Locale::new(locale)).with_field(TITLE, title)
}
