// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Locale identity.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::RecordId;

/// Case-insensitive lookup key for a locale name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocaleKey(String);

impl LocaleKey {
	pub fn new(name: &str) -> Self {
		Self(name.to_lowercase())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for LocaleKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for LocaleKey {
	fn from(name: &str) -> Self {
		Self::new(name)
	}
}

/// A named language/region variant under which content can exist.
///
/// Two locales are equal when their names match case-insensitively; the
/// origin record does not take part in equality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Locale {
	name: String,
	/// Record defining this locale, if the repository has one.
	origin: Option<RecordId>,
}

impl Locale {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			origin: None,
		}
	}

	pub fn with_origin(mut self, origin: RecordId) -> Self {
		self.origin = Some(origin);
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn origin(&self) -> Option<RecordId> {
		self.origin
	}

	pub fn key(&self) -> LocaleKey {
		LocaleKey::new(&self.name)
	}

	/// An unset locale has an empty name and never takes part in fallback.
	pub fn is_unset(&self) -> bool {
		self.name.is_empty()
	}
}

impl PartialEq for Locale {
	fn eq(&self, other: &Self) -> bool {
		self.key() == other.key()
	}
}

impl Eq for Locale {}

impl Hash for Locale {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.key().hash(state);
	}
}

impl fmt::Display for Locale {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.name)
	}
}
