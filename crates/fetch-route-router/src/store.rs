//! Application store hosting the route-data module.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use fetch_route_cache::{RouteAction, RouteDataFuture, RouteDataModule, RouteDataState};
use fetch_route_core::Namespace;
use parking_lot::RwLock;

/// Error raised by a state container.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("a different module is already registered under '{0}'")]
    DuplicateModule(String),

    #[error("no module registered under '{0}'")]
    UnknownModule(String),

    #[error("unknown action '{0}'")]
    UnknownAction(String),

    #[error("action '{found}' dispatched as '{expected}'")]
    ActionMismatch { expected: String, found: String },
}

/// A store that modules register into under a namespace.
pub trait StateContainer: Send + Sync {
    /// Register `module` under `namespace`.
    ///
    /// Registering the same module twice is a no-op. A different module
    /// under a taken namespace is an error.
    fn register_module(
        &self,
        namespace: &Namespace,
        module: Arc<RouteDataModule>,
    ) -> Result<(), StoreError>;

    /// Remove whatever is registered under `namespace`.
    fn unregister_module(&self, namespace: &Namespace) -> Result<(), StoreError>;

    fn has_module(&self, namespace: &Namespace) -> bool;
}

/// In-memory store keyed by namespace.
#[derive(Default)]
pub struct ReactiveStore {
    modules: RwLock<HashMap<Namespace, Arc<RouteDataModule>>>,
}

impl ReactiveStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The module registered under `namespace`.
    pub fn module(&self, namespace: &Namespace) -> Option<Arc<RouteDataModule>> {
        self.modules.read().get(namespace).cloned()
    }

    /// State snapshot of the module under `namespace`.
    pub fn state(&self, namespace: &Namespace) -> Option<RouteDataState> {
        self.module(namespace).map(|module| module.state())
    }

    /// Dispatch an action by its qualified name (`"fetch-route/getRouteData"`).
    pub fn dispatch(
        &self,
        qualified: &str,
        action: RouteAction,
    ) -> Result<RouteDataFuture, StoreError> {
        let (path, name) = qualified.rsplit_once('/').unwrap_or(("", qualified));
        let namespace = Namespace::parse(path);

        let module = self
            .module(&namespace)
            .ok_or_else(|| StoreError::UnknownModule(namespace.as_path()))?;

        if !RouteAction::NAMES.iter().any(|known| *known == name) {
            return Err(StoreError::UnknownAction(qualified.to_string()));
        }
        if action.name() != name {
            return Err(StoreError::ActionMismatch {
                expected: name.to_string(),
                found: action.name().to_string(),
            });
        }

        Ok(module.dispatch(action))
    }

    /// Registered namespaces, sorted.
    pub fn namespaces(&self) -> Vec<Namespace> {
        let mut namespaces: Vec<_> = self.modules.read().keys().cloned().collect();
        namespaces.sort_by_key(Namespace::as_path);
        namespaces
    }
}

impl StateContainer for ReactiveStore {
    fn register_module(
        &self,
        namespace: &Namespace,
        module: Arc<RouteDataModule>,
    ) -> Result<(), StoreError> {
        let mut modules = self.modules.write();
        match modules.get(namespace) {
            Some(existing) if Arc::ptr_eq(existing, &module) => Ok(()),
            Some(_) => Err(StoreError::DuplicateModule(namespace.as_path())),
            None => {
                modules.insert(namespace.clone(), module);
                Ok(())
            }
        }
    }

    fn unregister_module(&self, namespace: &Namespace) -> Result<(), StoreError> {
        self.modules
            .write()
            .remove(namespace)
            .map(|_| ())
            .ok_or_else(|| StoreError::UnknownModule(namespace.as_path()))
    }

    fn has_module(&self, namespace: &Namespace) -> bool {
        self.modules.read().contains_key(namespace)
    }
}

impl fmt::Debug for ReactiveStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveStore")
            .field("namespaces", &self.namespaces())
            .finish()
    }
}

/// Handle returned by `connect`; unregisters the module when invoked.
#[must_use = "dropping an Unsync keeps the module registered"]
pub struct Unsync {
    store: Arc<dyn StateContainer>,
    namespace: Namespace,
}

impl Unsync {
    pub(crate) fn new(store: Arc<dyn StateContainer>, namespace: Namespace) -> Self {
        Self { store, namespace }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Remove the module from the store.
    pub fn unsync(self) -> Result<(), StoreError> {
        self.store.unregister_module(&self.namespace)
    }
}

impl fmt::Debug for Unsync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsync")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}
