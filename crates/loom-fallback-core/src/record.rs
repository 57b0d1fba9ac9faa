// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Content records as seen by the fallback engine.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Locale;

/// Unique identifier for a record. Shared by every locale variant of the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub Uuid);

impl RecordId {
	pub fn new() -> Self {
		Self(Uuid::new_v4())
	}
}

impl Default for RecordId {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Display for RecordId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl FromStr for RecordId {
	type Err = uuid::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(Self(Uuid::parse_str(s)?))
	}
}

/// Identifier of the template a record is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TemplateId(pub Uuid);

impl fmt::Display for TemplateId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Identifier of a field on a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldId(pub Uuid);

impl fmt::Display for FieldId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Template of records that define a locale.
pub const LOCALE_DEFINITION_TEMPLATE: TemplateId =
	TemplateId(Uuid::from_u128(0xf68f_13a6_3395_426a_b9a1_fa2d_c60d_94eb));

/// Field on a locale definition naming the locale it falls back to.
pub const FALLBACK_LOCALE_FIELD: FieldId =
	FieldId(Uuid::from_u128(0x892b_e5b6_fa5f_4cd2_9da1_0f1a_2a74_f23c));

/// Record version selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Version {
	#[default]
	Latest,
	Number(u32),
}

impl fmt::Display for Version {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Version::Latest => f.write_str("latest"),
			Version::Number(n) => write!(f, "{}", n),
		}
	}
}

/// Structural part of a record, independent of locale and version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDefinition {
	pub id: RecordId,
	pub name: String,
	pub template_id: TemplateId,
}

/// A record variant for one locale and version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
	pub definition: RecordDefinition,
	pub repository: String,
	pub locale: Locale,
	pub version: Version,
	/// Values set directly on this variant.
	pub fields: BTreeMap<FieldId, String>,
	/// Values inherited from the template's standard values holder.
	pub standard_values: BTreeMap<FieldId, String>,
	/// Whether the record's template allows locale fallback.
	pub fallback_enabled: bool,
	/// Set when no saved version exists for this locale/version.
	pub temporary_version: bool,
	/// Set on the record holding a template's standard values.
	pub standard_values_holder: bool,
	/// Locale the field data actually came from, when it differs from `locale`.
	pub original_locale: Option<Locale>,
}

impl Record {
	pub fn new(
		id: RecordId,
		name: impl Into<String>,
		template_id: TemplateId,
		repository: impl Into<String>,
		locale: Locale,
	) -> Self {
		Self {
			definition: RecordDefinition {
				id,
				name: name.into(),
				template_id,
			},
			repository: repository.into(),
			locale,
			version: Version::Number(1),
			fields: BTreeMap::new(),
			standard_values: BTreeMap::new(),
			fallback_enabled: true,
			temporary_version: false,
			standard_values_holder: false,
			original_locale: None,
		}
	}

	/// Builds the definition record for `locale`, falling back to `fallback`.
	pub fn locale_definition(
		id: RecordId,
		repository: impl Into<String>,
		locale: &str,
		fallback: &str,
	) -> Self {
		Self::new(
			id,
			locale,
			LOCALE_DEFINITION_TEMPLATE,
			repository,
			Locale::new(""),
		)
		.with_field(FALLBACK_LOCALE_FIELD, fallback)
	}

	pub fn with_version(mut self, version: Version) -> Self {
		self.version = version;
		self
	}

	pub fn with_field(mut self, field: FieldId, value: impl Into<String>) -> Self {
		self.fields.insert(field, value.into());
		self
	}

	pub fn with_standard_value(mut self, field: FieldId, value: impl Into<String>) -> Self {
		self.standard_values.insert(field, value.into());
		self
	}

	pub fn with_fallback_enabled(mut self, enabled: bool) -> Self {
		self.fallback_enabled = enabled;
		self
	}

	/// Marks this variant as a placeholder with no saved content.
	pub fn temporary(mut self) -> Self {
		self.temporary_version = true;
		self
	}

	pub fn standard_values_holder(mut self) -> Self {
		self.standard_values_holder = true;
		self
	}

	pub fn id(&self) -> RecordId {
		self.definition.id
	}

	pub fn name(&self) -> &str {
		&self.definition.name
	}

	pub fn template_id(&self) -> TemplateId {
		self.definition.template_id
	}

	/// Reads a field, preferring a directly-set value over a standard value.
	pub fn field(&self, field: &FieldId) -> Option<&str> {
		self
			.fields
			.get(field)
			.or_else(|| self.standard_values.get(field))
			.map(String::as_str)
	}

	pub fn is_locale_definition(&self) -> bool {
		self.definition.template_id == LOCALE_DEFINITION_TEMPLATE
	}

	/// Name of the fallback locale on a locale definition, empty when unset.
	pub fn fallback_locale_name(&self) -> &str {
		self.field(&FALLBACK_LOCALE_FIELD).unwrap_or("")
	}

	/// Locale the record's field data originates from.
	pub fn source_locale(&self) -> &Locale {
		self.original_locale.as_ref().unwrap_or(&self.locale)
	}

	pub fn is_stand_in(&self) -> bool {
		self.original_locale.is_some()
	}

	/// Presents `source`'s data under this record's identity, locale and version.
	///
	/// Only values set directly on `source` are carried over. Values `source`
	/// inherits from a standard values holder are not copied.
	pub fn stand_in(&self, source: &Record) -> Record {
		Record {
			definition: RecordDefinition {
				id: self.definition.id,
				..source.definition.clone()
			},
			repository: self.repository.clone(),
			locale: self.locale.clone(),
			version: self.version,
			fields: source.fields.clone(),
			standard_values: BTreeMap::new(),
			fallback_enabled: self.fallback_enabled,
			temporary_version: false,
			standard_values_holder: self.standard_values_holder,
			original_locale: Some(source.locale.clone()),
		}
	}
}
