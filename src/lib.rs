//! # waypost
//!
//! A small HTTP dispatcher: decides, for a parsed request, who handles it
//! and how. TLS, keep-alive tuning and body limits belong to whatever sits
//! in front of it.
//!
//! For each request the [`Router`]:
//!
//! 1. Classifies the path by extension. Known media types (`.css`, `.png`,
//!    `.html`…) are **assets**: read from the static root and sent with the
//!    matching content type, never looked up in the route table.
//! 2. Otherwise scans the route table in registration order. The first
//!    pattern that matches wins.
//! 3. Checks the route has a handler for the verb, else `405` with `allow`.
//! 4. Calls the handler with the request and its path parameters.
//!
//! Every 404/405/500 goes through one error responder: an HTML page (when one
//! is installed and the client's `Accept` prefers HTML) or a JSON
//! `{"status", "statusText"}` payload.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use waypost::{Params, Request, Response, Router, Server, Template};
//!
//! #[tokio::main]
//! async fn main() -> waypost::Result<()> {
//!     let home = Template::new(|ctx| Ok(format!("<h1>{}</h1>", ctx["title"])));
//!     let errors = Template::new(|ctx| Ok(format!("<p>{} {}</p>", ctx["status"], ctx["statusText"])));
//!
//!     let app = Router::new()
//!         .static_root("./pub")
//!         .set_error_page(errors)?
//!         .templ("/", home, serde_json::json!({ "title": "hello" }))?
//!         .get("/users/:id", get_user)?
//!         .post("/users", create_user)?;
//!
//!     Server::bind("0.0.0.0:3000")?.serve(app).await
//! }
//!
//! async fn get_user(_req: Request, params: Params) -> Response {
//!     let id = params.get("id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}"}}"#))
//! }
//!
//! async fn create_user(req: Request, _params: Params) -> Response {
//!     let fields: serde_json::Map<String, serde_json::Value> = req.form().into_iter()
//!         .map(|(k, v)| (k, v.into()))
//!         .collect();
//!     Response::json(serde_json::to_vec(&fields).unwrap_or_default())
//! }
//! ```

mod assets;
mod config;
mod error;
mod error_page;
mod handler;
mod method;
mod pattern;
mod request;
mod response;
mod route;
mod router;
mod server;
mod status;
mod template;

pub mod negotiate;

pub use config::Config;
pub use error::{Error, Result};
pub use error_page::{ErrorContext, ErrorKind};
pub use handler::Handler;
pub use method::{Method, MethodSet};
pub use pattern::Pattern;
pub use request::{Params, Request};
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use route::MethodMap;
pub use router::{Lookup, Router};
pub use server::Server;
pub use status::Status;
pub use template::{Context, Template, TemplateEngine, View};
