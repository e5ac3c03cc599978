// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog change notifications and their delivery to caches
//!
//! Events carry no payload beyond "something of this kind changed". Mutations
//! made through the local store are broadcast immediately. Events from other
//! sessions are queued and only delivered when the store next reads a catalog
//! table, so any store read may flush a cache that is in the middle of a fill.

use crate::catalog::error::CatalogResult;
use crate::catalog::types::{GraphId, RelationId};
use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::sync::{Arc, Weak};

/// Kinds of catalog change a cache can react to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogEvent {
    /// A namespace (and therefore possibly a graph) was created, renamed or dropped
    NamespaceChanged,

    /// A relation changed; `None` means the sender could not name it
    RelationChanged(Option<RelationId>),

    /// An edge schema row was added or removed for `graph`
    EdgeSchemaChanged { graph: GraphId },
}

/// Receiver of catalog change events
pub trait InvalidationListener: Send + Sync {
    fn on_event(&self, event: &CatalogEvent) -> CatalogResult<()>;
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InvalidationStats {
    pub broadcast: u64,
    pub enqueued: u64,
    pub accepted: u64,
}

/// Process-local fan-out of catalog events
#[derive(Default)]
pub struct InvalidationBus {
    listeners: RwLock<Vec<Weak<dyn InvalidationListener>>>,
    pending: Mutex<VecDeque<CatalogEvent>>,
    stats: Mutex<InvalidationStats>,
}

impl InvalidationBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. The bus holds it weakly; dropping the last `Arc`
    /// unsubscribes it.
    pub fn subscribe<L>(&self, listener: &Arc<L>)
    where
        L: InvalidationListener + 'static,
    {
        let weak: Weak<L> = Arc::downgrade(listener);
        let weak: Weak<dyn InvalidationListener> = weak;
        self.listeners.write().push(weak);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .read()
            .iter()
            .filter(|l| l.strong_count() > 0)
            .count()
    }

    /// Deliver `event` to every listener now
    pub fn broadcast(&self, event: CatalogEvent) -> CatalogResult<()> {
        self.stats.lock().broadcast += 1;
        self.dispatch(&event)
    }

    /// Queue `event` for delivery at the next [`accept_pending`](Self::accept_pending)
    pub fn enqueue(&self, event: CatalogEvent) {
        self.stats.lock().enqueued += 1;
        self.pending.lock().push_back(event);
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Deliver every queued event, including ones queued while delivering
    pub fn accept_pending(&self) -> CatalogResult<()> {
        loop {
            // The queue lock is released before listeners run
            let next = self.pending.lock().pop_front();
            let Some(event) = next else {
                return Ok(());
            };
            self.stats.lock().accepted += 1;
            self.dispatch(&event)?;
        }
    }

    pub fn stats(&self) -> InvalidationStats {
        self.stats.lock().clone()
    }

    fn dispatch(&self, event: &CatalogEvent) -> CatalogResult<()> {
        let live: Vec<Arc<dyn InvalidationListener>> = {
            let mut listeners = self.listeners.write();
            listeners.retain(|l| l.strong_count() > 0);
            listeners.iter().filter_map(Weak::upgrade).collect()
        };

        log::debug!("delivering {:?} to {} listener(s)", event, live.len());

        let mut first_error = None;
        for listener in live {
            if let Err(e) = listener.on_event(event) {
                log::warn!("invalidation listener failed on {:?}: {}", event, e);
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
