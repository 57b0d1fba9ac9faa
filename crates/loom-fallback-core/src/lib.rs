// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for Loom locale fallback resolution.
//!
//! This crate provides the shared data model used by the fallback engine
//! (`loom-server-fallback`) and by repository implementations:
//! - [`Locale`] and [`LocaleKey`] - case-insensitive locale identity
//! - [`Record`] - a record variant for one locale and version
//! - [`FallbackError`] - errors surfaced by repositories and the engine
//!
//! # Example
//!
//! ```
//! use loom_fallback_core::{Locale, Record, RecordId};
//!
//! let definition = Record::locale_definition(RecordId::new(), "master", "en-GB", "en");
//! assert!(definition.is_locale_definition());
//! assert_eq!(definition.fallback_locale_name(), "en");
//!
//! assert_eq!(Locale::new("EN-gb"), Locale::new("en-GB"));
//! ```

pub mod error;
pub mod locale;
pub mod record;

pub use error::{FallbackError, Result};
pub use locale::{Locale, LocaleKey};
pub use record::{
	FieldId, Record, RecordDefinition, RecordId, TemplateId, Version, FALLBACK_LOCALE_FIELD,
	LOCALE_DEFINITION_TEMPLATE,
};
