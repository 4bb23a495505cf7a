//! Route entries: one compiled pattern plus the handlers it accepts.
//!
//! A route is decided once, at registration, to be either one handler shared
//! by a set of methods (`any`, `pattern`) or one handler per method (`get`,
//! `post`, `object`…). Re-registering a pattern merges into its existing
//! entry, see [`Route::merge`].

use std::collections::HashMap;
use std::sync::Arc;

use crate::handler::{BoxedHandler, Handler};
use crate::method::{Method, MethodSet};
use crate::pattern::Pattern;

/// The handlers attached to a route.
pub(crate) enum Handlers {
    Uniform { methods: MethodSet, handler: BoxedHandler },
    PerMethod(HashMap<Method, BoxedHandler>),
}

impl Handlers {
    pub(crate) fn methods(&self) -> MethodSet {
        match self {
            Self::Uniform { methods, .. } => *methods,
            Self::PerMethod(map) => map.keys().copied().collect(),
        }
    }

    fn get(&self, method: Method) -> Option<&BoxedHandler> {
        match self {
            Self::Uniform { methods, handler } => methods.contains(method).then_some(handler),
            Self::PerMethod(map) => map.get(&method),
        }
    }

    fn into_map(self) -> HashMap<Method, BoxedHandler> {
        match self {
            Self::Uniform { methods, handler } => {
                methods.iter().map(|m| (m, Arc::clone(&handler))).collect()
            }
            Self::PerMethod(map) => map,
        }
    }
}

/// One entry of the route table.
pub(crate) struct Route {
    pub(crate) pattern: Pattern,
    handlers: Handlers,
}

impl Route {
    pub(crate) fn new(pattern: Pattern, handlers: Handlers) -> Self {
        Self { pattern, handlers }
    }

    pub(crate) fn methods(&self) -> MethodSet {
        self.handlers.methods()
    }

    pub(crate) fn handler(&self, method: Method) -> Option<&BoxedHandler> {
        self.handlers.get(method)
    }

    /// Folds a later registration for the same pattern into this entry.
    ///
    /// Methods only in `incoming` are added; methods in both take the
    /// incoming handler (last registration wins). A uniform entry stays
    /// uniform when the incoming registration covers all of its methods;
    /// otherwise it becomes per-method.
    pub(crate) fn merge(&mut self, incoming: Handlers) {
        let current = std::mem::replace(&mut self.handlers, Handlers::PerMethod(HashMap::new()));
        self.handlers = match (current, incoming) {
            (Handlers::Uniform { methods: old, .. }, Handlers::Uniform { methods, handler })
                if methods.union(old) == methods =>
            {
                Handlers::Uniform { methods, handler }
            }
            (current, incoming) => {
                let mut map = current.into_map();
                map.extend(incoming.into_map());
                Handlers::PerMethod(map)
            }
        };
    }
}

// ── MethodMap ─────────────────────────────────────────────────────────────────

/// Per-method handlers for [`Router::object`](crate::Router::object).
///
/// ```rust
/// use waypost::{Method, MethodMap, Params, Request, Response};
///
/// async fn list(_: Request, _: Params) -> Response { Response::text("[]") }
/// async fn create(_: Request, _: Params) -> Response { Response::text("{}") }
///
/// let users = MethodMap::new()
///     .on(Method::Get, list)
///     .on(Method::Post, create);
/// assert_eq!(users.methods().to_string(), "GET, POST");
/// ```
#[derive(Default)]
pub struct MethodMap(HashMap<Method, BoxedHandler>);

impl MethodMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `handler` for `method`, replacing any earlier one.
    pub fn on(mut self, method: Method, handler: impl Handler) -> Self {
        self.0.insert(method, handler.into_boxed_handler());
        self
    }

    pub fn methods(&self) -> MethodSet {
        self.0.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn into_handlers(self) -> Handlers {
        Handlers::PerMethod(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{Params, Request};
    use crate::response::Response;

    async fn a(_: Request, _: Params) -> Response { Response::text("a") }
    async fn b(_: Request, _: Params) -> Response { Response::text("b") }

    fn uniform(methods: MethodSet, handler: impl Handler) -> Handlers {
        Handlers::Uniform { methods, handler: handler.into_boxed_handler() }
    }

    fn single(method: Method, handler: impl Handler) -> Handlers {
        MethodMap::new().on(method, handler).into_handlers()
    }

    fn route(handlers: Handlers) -> Route {
        Route::new(Pattern::compile("/x").unwrap(), handlers)
    }

    #[test]
    fn merge_adds_new_methods() {
        let mut r = route(single(Method::Get, a));
        r.merge(single(Method::Post, b));
        assert_eq!(r.methods(), MethodSet::from([Method::Get, Method::Post]));
    }

    #[test]
    fn merge_replaces_existing_method() {
        let mut r = route(single(Method::Get, a));
        let first = Arc::clone(r.handler(Method::Get).unwrap());
        r.merge(single(Method::Get, b));
        assert_eq!(r.methods().len(), 1);
        assert!(!Arc::ptr_eq(&first, r.handler(Method::Get).unwrap()));
    }

    #[test]
    fn uniform_superset_stays_uniform() {
        let mut r = route(uniform(MethodSet::from(Method::Get), a));
        r.merge(uniform(MethodSet::ALL, b));
        assert!(matches!(r.handlers, Handlers::Uniform { methods, .. } if methods == MethodSet::ALL));
    }

    #[test]
    fn partial_override_of_uniform_splits_per_method() {
        let mut r = route(uniform(MethodSet::ALL, a));
        let shared = Arc::clone(r.handler(Method::Put).unwrap());
        r.merge(single(Method::Delete, b));
        assert!(matches!(r.handlers, Handlers::PerMethod(_)));
        assert_eq!(r.methods(), MethodSet::ALL);
        assert!(Arc::ptr_eq(&shared, r.handler(Method::Put).unwrap()));
        assert!(!Arc::ptr_eq(&shared, r.handler(Method::Delete).unwrap()));
    }
}
