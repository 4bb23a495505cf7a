//! Ordered route table, registration API and per-request dispatch.
//!
//! Routes are scanned in registration order and the first pattern that
//! matches wins, so register specific routes (`/users/me`) before general
//! ones (`/users/:id`). The table is built once at startup and is read-only
//! while serving: [`Server::serve`](crate::Server::serve) takes the router by
//! value and shares it behind an `Arc`.

use std::collections::HashMap;
use std::io;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use futures_util::FutureExt;
use serde_json::{Map, Value, json};
use tracing::{debug, error, warn};

use crate::assets::StaticDir;
use crate::error::{Error, Result};
use crate::error_page::{ErrorKind, ErrorResponder};
use crate::handler::{BoxedHandler, Handler, SyncHandler};
use crate::method::{Method, MethodSet};
use crate::negotiate::{self, Target};
use crate::pattern::Pattern;
use crate::request::{Params, Request};
use crate::response::{ContentType, IntoResponse, Response};
use crate::route::{Handlers, MethodMap, Route};
use crate::template::{Context, Template, TemplateEngine, View};

/// The application router.
///
/// Every registration returns `Result<Self>` so a bad pattern or an empty
/// method set stops startup at the `?`:
///
/// ```rust
/// use waypost::{Params, Request, Response, Router};
///
/// async fn show(_req: Request, params: Params) -> Response {
///     Response::text(format!("user {}", params.get("id").unwrap_or("?")))
/// }
///
/// # fn main() -> waypost::Result<()> {
/// let app = Router::new()
///     .get("/users/:id", show)?
///     .page("/about", "<h1>About</h1>")?;
/// assert_eq!(app.routes().count(), 2);
/// # Ok(())
/// # }
/// ```
///
/// # Re-registration
///
/// Registering a pattern that is already in the table extends that entry
/// instead of adding a second one. A method registered twice keeps the most
/// recent handler.
pub struct Router {
    routes: Vec<Route>,
    positions: HashMap<String, usize>,
    engine: Option<Box<dyn TemplateEngine>>,
    errors: ErrorResponder,
    assets: StaticDir,
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            positions: HashMap::new(),
            engine: None,
            errors: ErrorResponder::default(),
            assets: StaticDir::new("./pub"),
        }
    }

    // ── Setup ─────────────────────────────────────────────────────────────────

    /// Directory asset requests are served from. Defaults to `./pub`.
    pub fn static_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.assets = StaticDir::new(dir);
        self
    }

    /// Installs the engine that compiles [`View::Source`] templates.
    pub fn with_engine(mut self, engine: impl TemplateEngine) -> Self {
        self.engine = Some(Box::new(engine));
        self
    }

    /// Installs the HTML error page, rendered with `{status, statusText}`.
    ///
    /// Without one, every error response is JSON.
    pub fn set_error_page(mut self, page: impl Into<View>) -> Result<Self> {
        let template = self.compile(page.into())?;
        self.errors.set_page(template);
        Ok(self)
    }

    // ── Registration ──────────────────────────────────────────────────────────

    pub fn get(self, pattern: &str, handler: impl Handler) -> Result<Self> {
        self.on(Method::Get, pattern, handler)
    }

    pub fn post(self, pattern: &str, handler: impl Handler) -> Result<Self> {
        self.on(Method::Post, pattern, handler)
    }

    pub fn put(self, pattern: &str, handler: impl Handler) -> Result<Self> {
        self.on(Method::Put, pattern, handler)
    }

    pub fn patch(self, pattern: &str, handler: impl Handler) -> Result<Self> {
        self.on(Method::Patch, pattern, handler)
    }

    pub fn delete(self, pattern: &str, handler: impl Handler) -> Result<Self> {
        self.on(Method::Delete, pattern, handler)
    }

    /// Registers `handler` for one method.
    pub fn on(self, method: Method, pattern: &str, handler: impl Handler) -> Result<Self> {
        self.object(pattern, MethodMap::new().on(method, handler))
    }

    /// Registers one handler for all five methods.
    pub fn any(self, pattern: &str, handler: impl Handler) -> Result<Self> {
        self.pattern(MethodSet::ALL, pattern, handler)
    }

    /// Registers one handler shared by every method in `methods`.
    pub fn pattern(self, methods: impl Into<MethodSet>, pattern: &str, handler: impl Handler) -> Result<Self> {
        let methods = methods.into();
        self.insert(pattern, Handlers::Uniform { methods, handler: handler.into_boxed_handler() })
    }

    /// Registers a separate handler per method.
    pub fn object(self, pattern: &str, handlers: MethodMap) -> Result<Self> {
        self.insert(pattern, handlers.into_handlers())
    }

    /// Registers a templated GET route. See [`templ_with`](Self::templ_with).
    pub fn templ(self, pattern: &str, view: impl Into<View>, context: impl Into<Context>) -> Result<Self> {
        self.templ_with(Method::Get, pattern, view, context)
    }

    /// Registers a route that renders `view` as `text/html`.
    ///
    /// The render context is `{request, pathParams, ...context}`; keys from
    /// `context` override the first two. A [`Context::Producer`] runs on every
    /// request. Source views are compiled here, once. A render failure answers
    /// `500 Internal Error`.
    pub fn templ_with(
        self,
        methods: impl Into<MethodSet>,
        pattern: &str,
        view: impl Into<View>,
        context: impl Into<Context>,
    ) -> Result<Self> {
        let methods = methods.into();
        let template = self.compile(view.into())?;
        let context = context.into();
        let source = pattern.to_owned();

        let handler: BoxedHandler = Arc::new(SyncHandler(move |req: &Request, params: &Params| {
            let ctx = render_context(req, params, context.resolve());
            match template.render(&ctx) {
                Ok(body) => Response::html(body),
                Err(e) => {
                    error!(pattern = %source, "template render failed: {e}");
                    ErrorKind::InternalError.into_response()
                }
            }
        }));
        self.insert(pattern, Handlers::Uniform { methods, handler })
    }

    /// Registers a GET route answering with a fixed HTML document.
    pub fn page(self, pattern: &str, html: impl Into<String>) -> Result<Self> {
        let body = Bytes::from(html.into());
        let handler: BoxedHandler = Arc::new(SyncHandler(move |_: &Request, _: &Params| {
            Response::bytes_raw(ContentType::Html.as_str(), body.clone())
        }));
        self.insert(pattern, Handlers::Uniform { methods: MethodSet::from(Method::Get), handler })
    }

    fn compile(&self, view: View) -> Result<Template> {
        view.compile(self.engine.as_deref())
    }

    fn insert(mut self, pattern: &str, handlers: Handlers) -> Result<Self> {
        let methods = handlers.methods();
        if methods.is_empty() {
            return Err(Error::config(format!("route `{pattern}` registered with no methods")));
        }

        let compiled = Pattern::compile(pattern)?;
        if let Some(&pos) = self.positions.get(compiled.shape()) {
            let route = &mut self.routes[pos];
            if route.pattern.names() != compiled.names() {
                return Err(Error::config(format!(
                    "pattern `{pattern}` overlaps `{}` with different placeholder names",
                    route.pattern.as_str()
                )));
            }
            route.merge(handlers);
            debug!(pattern, added = %methods, methods = %route.methods(), "route extended");
            return Ok(self);
        }

        if let Target::Asset(_) = negotiate::classify(pattern) {
            warn!(pattern, "route ends in a static file extension and is shadowed by asset serving");
        }
        self.positions.insert(compiled.shape().to_owned(), self.routes.len());
        self.routes.push(Route::new(compiled, handlers));
        debug!(pattern, %methods, "route registered");
        Ok(self)
    }

    // ── Introspection ─────────────────────────────────────────────────────────

    /// Registered patterns with the methods each accepts, in scan order.
    pub fn routes(&self) -> impl Iterator<Item = (&str, MethodSet)> {
        self.routes.iter().map(|r| (r.pattern.as_str(), r.methods()))
    }

    /// Resolves `method` and `path` against the route table.
    ///
    /// The asset check is not applied here; see [`serve`](Self::serve) for
    /// the full decision.
    pub fn lookup(&self, method: &http::Method, path: &str) -> Lookup<'_> {
        let Some((route, params)) = self
            .routes
            .iter()
            .find_map(|route| route.pattern.matches(path).map(|params| (route, params)))
        else {
            return Lookup::NotFound;
        };

        let pattern = route.pattern.as_str();
        match Method::from_http(method).and_then(|m| route.handler(m)) {
            Some(handler) => Lookup::Found { pattern, handler: Arc::clone(handler), params },
            None => Lookup::MethodNotAllowed { pattern, allowed: route.methods() },
        }
    }

    // ── Dispatch ──────────────────────────────────────────────────────────────

    /// Produces the response for one request.
    ///
    /// Asset paths are answered from the static root. Everything else goes
    /// through the route table: no match is `404`, a match without a handler
    /// for the verb is `405` (with an `allow` header), otherwise the handler's
    /// response is returned as is. A handler that panics is answered with
    /// `500`; the panic does not reach the host server.
    pub async fn serve(&self, req: Request) -> Response {
        let html = negotiate::prefers_html(req.header("accept"));
        let method = req.method().clone();
        let path = req.path().to_owned();

        let res = match negotiate::classify(&path) {
            Target::Asset(content_type) => self.serve_asset(&path, content_type).await,
            Target::Dynamic => self.dispatch(req).await,
        };

        let res = match res.deferred {
            Some(kind) => self.errors.respond(kind, html),
            None => res,
        };
        debug!(%method, path = %path, status = res.status, "request served");
        res
    }

    async fn serve_asset(&self, path: &str, content_type: &'static str) -> Response {
        match self.assets.open(path).await {
            Ok(bytes) => Response::builder().typed(content_type, bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => ErrorKind::NotFound.into_response(),
            Err(e) => {
                error!(path, root = %self.assets.root().display(), "asset read failed: {e}");
                ErrorKind::InternalError.into_response()
            }
        }
    }

    async fn dispatch(&self, req: Request) -> Response {
        let (handler, params) = match self.lookup(req.method(), req.path()) {
            Lookup::Found { handler, params, .. } => (handler, params),
            Lookup::MethodNotAllowed { allowed, .. } => {
                return ErrorKind::MethodNotAllowed { allowed }.into_response();
            }
            Lookup::NotFound => return ErrorKind::NotFound.into_response(),
        };

        // Calling inside the async block puts synchronous panics under catch_unwind too.
        let fut = async move { handler.call(req, params).await };
        match AssertUnwindSafe(fut).catch_unwind().await {
            Ok(res) => res,
            Err(_) => {
                error!("handler panicked");
                ErrorKind::InternalError.into_response()
            }
        }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

fn render_context(req: &Request, params: &Params, extra: Map<String, Value>) -> Value {
    let headers: Map<String, Value> = req.headers().iter()
        .filter_map(|(k, v)| Some((k.as_str().to_owned(), Value::from(v.to_str().ok()?))))
        .collect();

    let mut ctx = Map::new();
    ctx.insert("request".to_owned(), json!({
        "method": req.method().as_str(),
        "path": req.path(),
        "query": req.query(),
        "headers": headers,
    }));
    ctx.insert("pathParams".to_owned(), json!(params));
    ctx.extend(extra);
    Value::Object(ctx)
}

// ── Lookup ────────────────────────────────────────────────────────────────────

/// Outcome of resolving a request against the route table.
pub enum Lookup<'r> {
    /// The first matching route accepts the method.
    Found { pattern: &'r str, handler: BoxedHandler, params: Params },
    /// A route matches the path but has no handler for the method.
    MethodNotAllowed { pattern: &'r str, allowed: MethodSet },
    NotFound,
}

impl std::fmt::Debug for Lookup<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Found { pattern, params, .. } => f
                .debug_struct("Found")
                .field("pattern", pattern)
                .field("params", params)
                .finish_non_exhaustive(),
            Self::MethodNotAllowed { pattern, allowed } => f
                .debug_struct("MethodNotAllowed")
                .field("pattern", pattern)
                .field("allowed", allowed)
                .finish(),
            Self::NotFound => f.write_str("NotFound"),
        }
    }
}
