// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;

use async_trait::async_trait;

use loom_fallback_core::{Locale, Record, RecordId, Result, Version};

/// How a record is addressed in a fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordRef {
	Id(RecordId),
	Path(String),
}

impl fmt::Display for RecordRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			RecordRef::Id(id) => write!(f, "{}", id),
			RecordRef::Path(path) => f.write_str(path),
		}
	}
}

/// Security check mode passed through to the repository unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecurityCheck {
	#[default]
	Enable,
	Disable,
}

/// Content repository consulted by the fallback engine.
///
/// A record that does not exist is `Ok(None)`. Errors are reserved for
/// unexpected failures and propagate to the caller without retry.
#[async_trait]
pub trait ContentRepository: Send + Sync {
	/// Name identifying the repository. Mappings are cached per name.
	fn name(&self) -> &str;

	/// All locales currently known to the repository.
	async fn list_locales(&self) -> Result<Vec<Locale>>;

	async fn fetch_record(
		&self,
		target: &RecordRef,
		locale: &Locale,
		version: Version,
		security: SecurityCheck,
	) -> Result<Option<Record>>;

	/// Fetches the record a locale's origin points at.
	async fn fetch_record_by_origin(&self, origin: RecordId) -> Result<Option<Record>>;
}
