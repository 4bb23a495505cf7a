//! Error responder: turns 404/405/500 into an HTML page or a JSON payload.
//!
//! The shape follows the client's `Accept` header (see
//! [`prefers_html`](crate::negotiate::prefers_html)). HTML needs an installed
//! error template; without one, every client gets JSON.

use serde::Serialize;
use tracing::warn;

use crate::method::MethodSet;
use crate::response::{ContentType, Response};
use crate::template::Template;

/// Request-terminating failures the dispatcher answers itself.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// No asset file and no matching route.
    NotFound,
    /// A route matched the path but has no handler for the verb.
    MethodNotAllowed { allowed: MethodSet },
    /// I/O failure or handler failure.
    InternalError,
}

impl ErrorKind {
    pub fn status(&self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::MethodNotAllowed { .. } => 405,
            Self::InternalError => 500,
        }
    }

    pub fn status_text(&self) -> &'static str {
        match self {
            Self::NotFound => "Not Found",
            Self::MethodNotAllowed { .. } => "Method not allowed",
            Self::InternalError => "Internal Error",
        }
    }

    pub fn context(&self) -> ErrorContext {
        let allow = match self {
            Self::MethodNotAllowed { allowed } => Some(allowed.iter().map(|m| m.as_str()).collect()),
            _ => None,
        };
        ErrorContext { status: self.status(), status_text: self.status_text(), allow }
    }
}

/// What error templates render and what API clients receive.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorContext {
    pub status: u16,
    pub status_text: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow: Option<Vec<&'static str>>,
}

// ── Responder ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub(crate) struct ErrorResponder {
    page: Option<Template>,
}

impl ErrorResponder {
    pub(crate) fn set_page(&mut self, page: Template) {
        self.page = Some(page);
    }

    /// Renders `kind` for a client whose preference is `html`.
    pub(crate) fn respond(&self, kind: ErrorKind, html: bool) -> Response {
        let ctx = kind.context();

        let mut res = match (&self.page, html) {
            (Some(page), true) => match render_page(page, &ctx) {
                Some(body) => Response::builder().code(ctx.status).html(body),
                None => structured(&ctx),
            },
            _ => structured(&ctx),
        };

        if let ErrorKind::MethodNotAllowed { allowed } = kind {
            res.headers.push(("allow".to_owned(), allowed.to_string()));
        }
        res
    }
}

fn render_page(page: &Template, ctx: &ErrorContext) -> Option<String> {
    let value = match serde_json::to_value(ctx) {
        Ok(value) => value,
        Err(e) => {
            warn!("error context did not serialize: {e}");
            return None;
        }
    };
    page.render(&value)
        .inspect_err(|e| warn!(status = ctx.status, "error page failed to render, sending JSON: {e}"))
        .ok()
}

fn structured(ctx: &ErrorContext) -> Response {
    // An ErrorContext is plain data; serialization only fails on broken Serialize impls.
    let body = serde_json::to_vec(ctx).unwrap_or_default();
    Response::builder().code(ctx.status).bytes(ContentType::Json, body)
}
