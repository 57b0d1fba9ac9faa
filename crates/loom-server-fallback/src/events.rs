// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Adapter feeding repository events from a broadcast channel into the cache.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use loom_fallback_core::Record;

use crate::cache::{FallbackGraphCache, SaveOrigin};
use crate::repository::ContentRepository;

/// Event published by a repository host.
#[derive(Clone)]
pub enum RepositoryEvent {
	/// A record was saved.
	Saved { record: Record, origin: SaveOrigin },
	/// A new repository instance was created.
	Created(Arc<dyn ContentRepository>),
}

impl std::fmt::Debug for RepositoryEvent {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			RepositoryEvent::Saved { record, origin } => f
				.debug_struct("Saved")
				.field("repository", &record.repository)
				.field("record", &record.id())
				.field("origin", origin)
				.finish(),
			RepositoryEvent::Created(repository) => f
				.debug_tuple("Created")
				.field(&repository.name())
				.finish(),
		}
	}
}

/// Spawns a task forwarding events for `repository` to the cache.
///
/// Events for other repositories are ignored. A `Created` event for the same
/// name swaps the handle used for later rebuilds. If the receiver lags, the
/// mapping is reloaded since saves may have been missed. The task ends when
/// the channel closes.
pub fn spawn_save_listener(
	cache: Arc<FallbackGraphCache>,
	repository: Arc<dyn ContentRepository>,
	mut events: broadcast::Receiver<RepositoryEvent>,
) -> JoinHandle<()> {
	tokio::spawn(async move {
		let mut repository = repository;
		loop {
			let result = match events.recv().await {
				Ok(RepositoryEvent::Saved { record, origin }) => {
					if record.repository != repository.name() {
						continue;
					}
					cache
						.notify_saved(repository.as_ref(), &record, origin)
						.await
						.map(|_| ())
				}
				Ok(RepositoryEvent::Created(created)) => {
					if created.name() != repository.name() {
						continue;
					}
					repository = created;
					cache.repository_created(repository.as_ref()).await.map(|_| ())
				}
				Err(broadcast::error::RecvError::Lagged(missed)) => {
					warn!(
						repository = %repository.name(),
						missed,
						"repository event listener lagged, reloading mapping"
					);
					cache.reload(repository.as_ref()).await.map(|_| ())
				}
				Err(broadcast::error::RecvError::Closed) => {
					debug!(repository = %repository.name(), "repository event channel closed");
					break;
				}
			};

			if let Err(e) = result {
				error!(
					repository = %repository.name(),
					error = %e,
					"failed to rebuild locale fallback mapping"
				);
			}
		}
	})
}
