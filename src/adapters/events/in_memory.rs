//! In-memory interaction bus.
//!
//! Delivers published events to every live subscription whose kind and
//! filter match, running the matching handlers concurrently. Used by tests,
//! the console demo, and embedders that feed platform events in themselves.

use futures::future::join_all;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};
use tokio::sync::watch;

use crate::domain::foundation::{DomainError, ErrorCode, SubscriptionId};
use crate::ports::{
    InteractionBus, InteractionEvent, InteractionFilter, InteractionHandler, InteractionKind,
    Subscription,
};

/// Most recent published events kept for inspection.
pub const PUBLISHED_HISTORY: usize = 256;

struct Entry {
    kind: InteractionKind,
    filter: InteractionFilter,
    handler: Arc<dyn InteractionHandler>,
}

struct Registry {
    entries: RwLock<HashMap<SubscriptionId, Entry>>,
    published: RwLock<VecDeque<InteractionEvent>>,
    failing: RwLock<HashSet<InteractionKind>>,
    registered: AtomicUsize,
    disposed: AtomicUsize,
    active_tx: watch::Sender<usize>,
}

impl Registry {
    fn remove(&self, id: &SubscriptionId) {
        let remaining = {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            if entries.remove(id).is_some() {
                self.disposed.fetch_add(1, Ordering::SeqCst);
            }
            entries.len()
        };
        self.active_tx.send_replace(remaining);
    }
}

/// In-process interaction bus.
///
/// # Example
///
/// ```ignore
/// let bus = InMemoryInteractionBus::new();
/// let listener = InputListener::buttons(display, Arc::new(bus.clone()), ctx, policy);
///
/// bus.publish(InteractionEvent::message_sent(user, channel, "two")).await;
/// assert_eq!(bus.registered_count(), bus.disposed_count());
/// ```
#[derive(Clone)]
pub struct InMemoryInteractionBus {
    registry: Arc<Registry>,
}

impl InMemoryInteractionBus {
    pub fn new() -> Self {
        let (active_tx, _) = watch::channel(0);
        Self {
            registry: Arc::new(Registry {
                entries: RwLock::new(HashMap::new()),
                published: RwLock::new(VecDeque::new()),
                failing: RwLock::new(HashSet::new()),
                registered: AtomicUsize::new(0),
                disposed: AtomicUsize::new(0),
                active_tx,
            }),
        }
    }

    /// Delivers an event to all matching subscriptions.
    ///
    /// Returns how many handlers were invoked. Handler errors are logged and
    /// do not affect other handlers.
    pub async fn publish(&self, event: InteractionEvent) -> usize {
        {
            let mut published = self
                .registry
                .published
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            if published.len() == PUBLISHED_HISTORY {
                published.pop_front();
            }
            published.push_back(event.clone());
        }

        // Collect handlers first so no lock is held across await points.
        let handlers: Vec<Arc<dyn InteractionHandler>> = {
            let entries = self
                .registry
                .entries
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            entries
                .values()
                .filter(|entry| entry.kind == event.kind && (entry.filter)(&event))
                .map(|entry| Arc::clone(&entry.handler))
                .collect()
        };

        let invoked = handlers.len();
        let results = join_all(handlers.iter().map(|h| h.handle(event.clone()))).await;
        for (handler, result) in handlers.iter().zip(results) {
            if let Err(e) = result {
                tracing::warn!(handler = handler.name(), kind = %event.kind, "Interaction handler failed: {}", e);
            }
        }
        invoked
    }

    /// Makes subsequent subscriptions of `kind` fail with a transport error.
    pub fn fail_subscribes(&self, kind: InteractionKind, fail: bool) {
        let mut failing = self
            .registry
            .failing
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if fail {
            failing.insert(kind);
        } else {
            failing.remove(&kind);
        }
    }

    // === Test Helpers ===

    /// Total subscriptions ever registered.
    pub fn registered_count(&self) -> usize {
        self.registry.registered.load(Ordering::SeqCst)
    }

    /// Total subscriptions disposed.
    pub fn disposed_count(&self) -> usize {
        self.registry.disposed.load(Ordering::SeqCst)
    }

    /// Subscriptions currently live.
    pub fn active_count(&self) -> usize {
        self.registry
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Live subscriptions of one kind.
    pub fn active_of_kind(&self, kind: InteractionKind) -> usize {
        self.registry
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|entry| entry.kind == kind)
            .count()
    }

    /// The last `PUBLISHED_HISTORY` events passed to `publish`, oldest first.
    pub fn published_events(&self) -> Vec<InteractionEvent> {
        self.registry
            .published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Waits until at least `count` subscriptions are live.
    pub async fn wait_for_active(&self, count: usize) {
        let mut rx = self.registry.active_tx.subscribe();
        // The sender lives in the registry, so the channel cannot close here.
        let _ = rx.wait_for(|active| *active >= count).await;
    }

    /// Waits until at least `count` subscriptions have ever been registered.
    ///
    /// Unlike `wait_for_active`, this cannot be satisfied by a previous
    /// round whose subscriptions are still being disposed.
    pub async fn wait_for_registered(&self, count: usize) {
        let mut rx = self.registry.active_tx.subscribe();
        let registered = &self.registry.registered;
        let _ = rx
            .wait_for(|_| registered.load(Ordering::SeqCst) >= count)
            .await;
    }
}

impl Default for InMemoryInteractionBus {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionBus for InMemoryInteractionBus {
    fn subscribe(
        &self,
        kind: InteractionKind,
        filter: InteractionFilter,
        handler: Arc<dyn InteractionHandler>,
    ) -> Result<Box<dyn Subscription>, DomainError> {
        if self
            .registry
            .failing
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&kind)
        {
            return Err(DomainError::new(
                ErrorCode::SubscribeFailed,
                format!("Subscribing to {} is unavailable", kind),
            ));
        }
        let id = SubscriptionId::new();
        let active = {
            let mut entries = self
                .registry
                .entries
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            entries.insert(
                id,
                Entry {
                    kind,
                    filter,
                    handler,
                },
            );
            entries.len()
        };
        self.registry.registered.fetch_add(1, Ordering::SeqCst);
        self.registry.active_tx.send_replace(active);

        Ok(Box::new(InMemorySubscription {
            id,
            kind,
            registry: Arc::downgrade(&self.registry),
        }))
    }
}

struct InMemorySubscription {
    id: SubscriptionId,
    kind: InteractionKind,
    registry: Weak<Registry>,
}

impl Subscription for InMemorySubscription {
    fn id(&self) -> SubscriptionId {
        self.id
    }

    fn kind(&self) -> InteractionKind {
        self.kind
    }

    fn dispose(self: Box<Self>) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(&self.id);
        }
    }
}
