// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for fallback resolution.

use thiserror::Error;

/// Result type for fallback operations.
pub type Result<T> = std::result::Result<T, FallbackError>;

/// Errors that can occur while building fallback mappings or resolving records.
///
/// Missing records and misconfigured locales are not errors; they surface as
/// `None` or as locales absent from the mapping.
#[derive(Debug, Error)]
pub enum FallbackError {
	#[error("repository error in {repository}: {message}")]
	Repository { repository: String, message: String },

	#[error("repository {0} is unavailable")]
	RepositoryUnavailable(String),
}

impl FallbackError {
	pub fn repository(repository: impl Into<String>, message: impl Into<String>) -> Self {
		Self::Repository {
			repository: repository.into(),
			message: message.into(),
		}
	}
}
