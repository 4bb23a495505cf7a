//! Minimal waypost app: a templated home page, a form endpoint, path
//! parameters and static files.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl http://localhost:8080/
//!   curl -X POST http://localhost:8080/form -d 'a=1&b=2'
//!   curl http://localhost:8080/form                       # 405, HTML page
//!   curl -H 'accept: application/json' http://localhost:8080/nope   # 404, JSON
//!   curl http://localhost:8080/users/42

use serde_json::{Map, Value, json};
use waypost::{Config, Context, Params, Request, Response, Router, Server, Template};

#[tokio::main]
async fn main() -> waypost::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    let home = Template::new(|ctx| {
        Ok(format!(
            "<h1>{}</h1><p>served {} at {}</p>",
            ctx["title"].as_str().unwrap_or_default(),
            ctx["request"]["path"].as_str().unwrap_or_default(),
            ctx["now"],
        ))
    });
    let error_page = Template::new(|ctx| {
        Ok(format!(
            "<!doctype html><p id=\"error-msg\">Error: {} {}</p>",
            ctx["status"],
            ctx["statusText"].as_str().unwrap_or_default(),
        ))
    });

    let clock = Context::producer(|| {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let mut map = Map::new();
        map.insert("title".to_owned(), json!("waypost"));
        map.insert("now".to_owned(), json!(now));
        map
    });

    let app = Router::new()
        .static_root(&config.static_root)
        .set_error_page(error_page)?
        .templ("/", home, clock)?
        .post("/form", echo_form)?
        .get("/users/:id", get_user)?
        .any("/echo/", echo_query)?;

    Server::from_config(&config).serve(app).await
}

// POST /form → the form fields as a JSON object
async fn echo_form(req: Request, _params: Params) -> Response {
    let fields: Map<String, Value> = req.form().into_iter().map(|(k, v)| (k, v.into())).collect();
    Response::json(serde_json::to_vec(&fields).unwrap_or_default())
}

// GET /users/:id
async fn get_user(_req: Request, params: Params) -> Response {
    let id = params.get("id").unwrap_or("unknown");
    Response::json(format!(r#"{{"id":"{id}","name":"alice"}}"#))
}

// ANY /echo/ → query pairs as a JSON array
async fn echo_query(req: Request, _params: Params) -> Response {
    Response::json(serde_json::to_vec(&req.query_pairs()).unwrap_or_default())
}
