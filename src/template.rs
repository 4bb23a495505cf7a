//! Template seam.
//!
//! waypost does not ship a template language. A [`Template`] is whatever
//! render function the application's engine compiled; the router only calls
//! it with a JSON context. Source text can be handed to the router directly
//! when a [`TemplateEngine`] is installed, in which case it is compiled once,
//! at registration.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{Error, Result};

type RenderFn = dyn Fn(&Value) -> Result<String> + Send + Sync + 'static;

/// A compiled template: context in, markup out.
///
/// ```rust
/// use waypost::Template;
///
/// let page = Template::new(|ctx| Ok(format!("<p>{}</p>", ctx["test"])));
/// assert_eq!(page.render(&serde_json::json!({"test": 42})).unwrap(), "<p>42</p>");
/// ```
#[derive(Clone)]
pub struct Template(Arc<RenderFn>);

impl Template {
    pub fn new<F>(render: F) -> Self
    where
        F: Fn(&Value) -> Result<String> + Send + Sync + 'static,
    {
        Self(Arc::new(render))
    }

    pub fn render(&self, ctx: &Value) -> Result<String> {
        (self.0)(ctx)
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Template(..)")
    }
}

/// Compiles template source text into a [`Template`].
///
/// Implement this for an adapter around your engine of choice and install it
/// with [`Router::with_engine`](crate::Router::with_engine).
pub trait TemplateEngine: Send + Sync + 'static {
    fn compile(&self, source: &str) -> Result<Template>;
}

// ── View ──────────────────────────────────────────────────────────────────────

/// What a templated route renders: source awaiting compilation, or a
/// template the caller already compiled.
#[derive(Clone, Debug)]
pub enum View {
    Source(String),
    Compiled(Template),
}

impl View {
    /// Resolves to a compiled template, compiling source with `engine`.
    pub(crate) fn compile(self, engine: Option<&dyn TemplateEngine>) -> Result<Template> {
        match self {
            Self::Compiled(template) => Ok(template),
            Self::Source(source) => engine
                .ok_or_else(|| Error::config("template source given but no template engine is installed"))?
                .compile(&source),
        }
    }
}

impl From<Template> for View {
    fn from(t: Template) -> Self { Self::Compiled(t) }
}

impl From<&str> for View {
    fn from(s: &str) -> Self { Self::Source(s.to_owned()) }
}

impl From<String> for View {
    fn from(s: String) -> Self { Self::Source(s) }
}

// ── Context ───────────────────────────────────────────────────────────────────

/// Extra values merged into a templated route's render context.
///
/// `Static` is built once; `Producer` runs on every request, so the page can
/// show fresh data without a custom handler.
#[derive(Clone)]
pub enum Context {
    Static(Map<String, Value>),
    Producer(Arc<dyn Fn() -> Map<String, Value> + Send + Sync + 'static>),
}

impl Context {
    pub fn empty() -> Self {
        Self::Static(Map::new())
    }

    pub fn producer<F>(f: F) -> Self
    where
        F: Fn() -> Map<String, Value> + Send + Sync + 'static,
    {
        Self::Producer(Arc::new(f))
    }

    pub(crate) fn resolve(&self) -> Map<String, Value> {
        match self {
            Self::Static(map) => map.clone(),
            Self::Producer(f) => f(),
        }
    }
}

impl Default for Context {
    fn default() -> Self { Self::empty() }
}

impl From<Map<String, Value>> for Context {
    fn from(map: Map<String, Value>) -> Self { Self::Static(map) }
}

/// Accepts `json!({...})`. The context spreads into the top level of the
/// render object, so a non-object value is dropped with a warning.
impl From<Value> for Context {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Static(map),
            Value::Null => Self::empty(),
            other => {
                warn!(value = %other, "template context is not a JSON object, ignoring it");
                Self::empty()
            }
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(map) => f.debug_tuple("Static").field(map).finish(),
            Self::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}
