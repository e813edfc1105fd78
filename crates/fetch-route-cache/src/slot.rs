//! Memoized single-flight cache slots.

use std::fmt;

use fetch_route_core::RouteDataError;
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of resolving a route's data.
pub type RouteDataResult = Result<Value, RouteDataError>;

/// A memoized, cloneable future over a route's data.
///
/// Every clone observes the same single resolution.
pub type RouteDataFuture = Shared<BoxFuture<'static, RouteDataResult>>;

/// Wrap an already-known result in a memoized future that is settled up front.
pub fn settled(result: RouteDataResult) -> RouteDataFuture {
    let future = futures::future::ready(result).boxed().shared();
    // Poll once so `peek` reports the value without anyone awaiting it.
    let _ = future.clone().now_or_never();
    future
}

/// Observable state of a slot.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotState {
    /// A network round-trip is outstanding.
    Pending,
    /// Data is available.
    Resolved(Value),
    /// The round-trip failed.
    Failed(RouteDataError),
}

/// Status of a slot without its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Pending,
    Resolved,
    Failed,
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Resolved => write!(f, "resolved"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// One cache entry: a memoized future tagged with a unique id.
///
/// A slot created by a fetch remembers the slot it displaced, so a failed
/// fetch can hand the key back.
#[derive(Clone)]
pub struct CacheSlot {
    id: u64,
    future: RouteDataFuture,
    fallback: Option<Box<CacheSlot>>,
}

impl CacheSlot {
    pub(crate) fn new(id: u64, future: RouteDataFuture) -> Self {
        Self {
            id,
            future,
            fallback: None,
        }
    }

    pub(crate) fn with_fallback(mut self, fallback: Option<CacheSlot>) -> Self {
        self.fallback = fallback.map(Box::new);
        self
    }

    /// The slot displaced by this one.
    pub(crate) fn fallback(&self) -> Option<&CacheSlot> {
        self.fallback.as_deref()
    }

    /// Copy of this slot with `id` unlinked from its fallback chain.
    ///
    /// `None` when the chain does not contain `id`.
    pub(crate) fn without(&self, id: u64) -> Option<Self> {
        let fallback = self.fallback.as_deref()?;
        let fallback = if fallback.id == id {
            fallback.fallback.clone()
        } else {
            Some(Box::new(fallback.without(id)?))
        };
        Some(Self {
            id: self.id,
            future: self.future.clone(),
            fallback,
        })
    }

    pub(crate) fn resolved(id: u64, data: Value) -> Self {
        Self::new(id, settled(Ok(data)))
    }

    /// Unique id of this slot within its module.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// A handle on the memoized future.
    pub fn future(&self) -> RouteDataFuture {
        self.future.clone()
    }

    /// Current state of the slot.
    pub fn state(&self) -> SlotState {
        match self.future.peek() {
            None => SlotState::Pending,
            Some(Ok(value)) => SlotState::Resolved(value.clone()),
            Some(Err(err)) => SlotState::Failed(err.clone()),
        }
    }

    /// Current status of the slot.
    pub fn status(&self) -> SlotStatus {
        match self.future.peek() {
            None => SlotStatus::Pending,
            Some(Ok(_)) => SlotStatus::Resolved,
            Some(Err(_)) => SlotStatus::Failed,
        }
    }
}

impl fmt::Debug for CacheSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheSlot")
            .field("id", &self.id)
            .field("status", &self.status())
            .field("fallback", &self.fallback.as_ref().map(|slot| slot.id))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fetch_route_core::TransportError;
    use serde_json::json;

    #[test]
    fn test_resolved_slot_is_settled_immediately() {
        let slot = CacheSlot::resolved(1, json!({ "x": 1 }));

        assert_eq!(slot.status(), SlotStatus::Resolved);
        assert_eq!(slot.state(), SlotState::Resolved(json!({ "x": 1 })));
    }

    #[test]
    fn test_failed_slot_state() {
        let err = RouteDataError::from(TransportError::Connection("down".to_string()));
        let slot = CacheSlot::new(2, settled(Err(err.clone())));

        assert_eq!(slot.state(), SlotState::Failed(err));
    }

    #[test]
    fn test_pending_slot_state() {
        let future = futures::future::pending::<RouteDataResult>().boxed().shared();
        let slot = CacheSlot::new(3, future);

        assert_eq!(slot.status(), SlotStatus::Pending);
    }

    #[test]
    fn test_without_unlinks_fallback() {
        let pending = || futures::future::pending::<RouteDataResult>().boxed().shared();
        let stale = CacheSlot::resolved(1, json!("stale"));
        let first = CacheSlot::new(2, pending()).with_fallback(Some(stale));
        let second = CacheSlot::new(3, pending()).with_fallback(Some(first));

        let spliced = second.without(2).unwrap();

        assert_eq!(spliced.id(), 3);
        assert_eq!(spliced.fallback().unwrap().id(), 1);
        assert!(second.without(9).is_none());
    }

    #[tokio::test]
    async fn test_slot_future_clones_share_result() {
        let slot = CacheSlot::resolved(4, json!("data"));
        let a = slot.future();
        let b = slot.future();

        assert!(a.ptr_eq(&b));
        assert_eq!(a.await.unwrap(), json!("data"));
        assert_eq!(b.await.unwrap(), json!("data"));
    }
}
