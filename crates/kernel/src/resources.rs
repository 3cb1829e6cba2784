use crate::scene::SceneKind;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    Geometry,
    Material,
}

/// Handle to a GPU-side resource owned by a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceHandle {
    pub kind: ResourceKind,
    pub id: u64,
}

impl std::fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}#{}", self.kind, self.id)
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ResourceError {
    #[error("{0} was already released")]
    DoubleRelease(ResourceHandle),
    #[error("{0} was never acquired")]
    UnknownHandle(ResourceHandle),
}

/// A record produced by every lifecycle transition in a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LifecycleEvent {
    Acquired { handle: ResourceHandle, label: String },
    Released { handle: ResourceHandle, label: String },
    SceneConstructed { kind: SceneKind, generation: u64 },
    SceneDisposed { kind: SceneKind, generation: u64 },
    /// A pending frame request was revoked before it ran.
    FrameCancelled { frame: u64 },
}

/// Oldest lifecycle events are dropped once the log holds this many.
pub const MAX_EVENTS: usize = 1024;

/// Tracks every resource acquired by scenes so each is released exactly once.
#[derive(Debug, Default)]
pub struct ResourceLedger {
    live: BTreeMap<ResourceHandle, String>,
    released: BTreeSet<ResourceHandle>,
    next_id: u64,
    /// Log of lifecycle transitions, bounded by [`MAX_EVENTS`].
    event_log: Vec<LifecycleEvent>,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&mut self, kind: ResourceKind, label: impl Into<String>) -> ResourceHandle {
        self.next_id += 1;
        let handle = ResourceHandle {
            kind,
            id: self.next_id,
        };
        let label = label.into();
        tracing::trace!(%handle, %label, "resource acquired");
        self.live.insert(handle, label.clone());
        self.push_event(LifecycleEvent::Acquired { handle, label });
        handle
    }

    pub fn release(&mut self, handle: ResourceHandle) -> Result<(), ResourceError> {
        let Some(label) = self.live.remove(&handle) else {
            return Err(if self.released.contains(&handle) {
                ResourceError::DoubleRelease(handle)
            } else {
                ResourceError::UnknownHandle(handle)
            });
        };
        tracing::trace!(%handle, %label, "resource released");
        self.released.insert(handle);
        self.push_event(LifecycleEvent::Released { handle, label });
        Ok(())
    }

    /// Release every handle in `handles`, reporting the first failure after
    /// attempting all of them.
    pub fn release_all(
        &mut self,
        handles: impl IntoIterator<Item = ResourceHandle>,
    ) -> Result<usize, ResourceError> {
        let mut released = 0;
        let mut first_error = None;
        for handle in handles {
            match self.release(handle) {
                Ok(()) => released += 1,
                Err(err) => {
                    tracing::warn!(%err, "resource release failed");
                    first_error.get_or_insert(err);
                }
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(released),
        }
    }

    pub fn is_live(&self, handle: ResourceHandle) -> bool {
        self.live.contains_key(&handle)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn released_count(&self) -> usize {
        self.released.len()
    }

    pub fn record(&mut self, event: LifecycleEvent) {
        self.push_event(event);
    }

    /// Read-only access to the event log.
    pub fn events(&self) -> &[LifecycleEvent] {
        &self.event_log
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<LifecycleEvent> {
        std::mem::take(&mut self.event_log)
    }

    fn push_event(&mut self, event: LifecycleEvent) {
        if self.event_log.len() >= MAX_EVENTS {
            let excess = self.event_log.len() + 1 - MAX_EVENTS;
            self.event_log.drain(..excess);
        }
        self.event_log.push(event);
    }
}
