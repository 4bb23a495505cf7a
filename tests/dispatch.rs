//! End-to-end dispatch tests: requests go through `Router::serve` exactly as
//! the server would hand them over, minus the socket.

use bytes::Bytes;
use serde_json::{Map, Value, json};
use waypost::{
    Context, Error, ErrorKind, Method, MethodMap, MethodSet, Params, Request, Response, Router,
    Status, Template, TemplateEngine, View,
};

const FIXTURES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/pub");

fn request(method: &str, path: &str) -> Request {
    build(method, path, None, Bytes::new())
}

fn build(method: &str, path: &str, accept: Option<&str>, body: Bytes) -> Request {
    let mut req = http::Request::builder().method(method).uri(path);
    if let Some(accept) = accept {
        req = req.header("accept", accept);
    }
    req.body(body).unwrap().into()
}

fn json_body(res: &Response) -> Value {
    serde_json::from_slice(res.body()).unwrap()
}

fn text(res: &Response) -> &str {
    std::str::from_utf8(res.body()).unwrap()
}

fn error_page() -> Template {
    Template::new(|ctx| {
        Ok(format!(
            "<html><body>Error: {} {}</body></html>",
            ctx["status"],
            ctx["statusText"].as_str().unwrap_or_default(),
        ))
    })
}

async fn echo_form(req: Request, _: Params) -> Response {
    let fields: Map<String, Value> = req.form().into_iter().map(|(k, v)| (k, v.into())).collect();
    Response::json(serde_json::to_vec(&fields).unwrap())
}

async fn show_id(_: Request, params: Params) -> Response {
    Response::text(params.get("id").unwrap_or("none").to_owned())
}

// ── Scenarios ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn templated_root_renders_context() {
    let home = Template::new(|ctx| Ok(format!("<p>{}</p>", ctx["test"])));
    let router = Router::new().templ("/", home, json!({ "test": 42 })).unwrap();

    let res = router.serve(request("GET", "/")).await;
    assert_eq!(res.status_code(), 200);
    assert!(res.header("content-type").unwrap().starts_with("text/html"));
    assert_eq!(text(&res), "<p>42</p>");
}

#[tokio::test]
async fn form_route_gates_method_and_echoes_body() {
    let router = Router::new().post("/form", echo_form).unwrap();

    let res = router.serve(request("GET", "/form")).await;
    assert_eq!(res.status_code(), 405);
    assert_eq!(res.header("allow"), Some("POST"));

    let req = build("POST", "/form", Some("application/json"), Bytes::from_static(b"a=1"));
    let res = router.serve(req).await;
    assert_eq!(res.status_code(), 200);
    assert_eq!(res.header("content-type"), Some("application/json"));
    assert_eq!(json_body(&res), json!({ "a": "1" }));
}

#[tokio::test]
async fn missing_asset_is_not_found() {
    let router = Router::new().static_root(FIXTURES);
    let res = router.serve(request("GET", "/style.css")).await;
    assert_eq!(res.status_code(), 404);
}

#[tokio::test]
async fn error_page_follows_accept_header() {
    let router = Router::new().set_error_page(error_page()).unwrap();

    let html = router.serve(build("GET", "/nowhere", Some("text/html"), Bytes::new())).await;
    assert_eq!(html.status_code(), 404);
    assert!(html.header("content-type").unwrap().starts_with("text/html"));
    assert!(text(&html).contains("404"));

    let api = router.serve(build("GET", "/nowhere", Some("application/json"), Bytes::new())).await;
    assert_eq!(api.status_code(), 404);
    assert_eq!(api.header("content-type"), Some("application/json"));
    assert_eq!(json_body(&api), json!({ "status": 404, "statusText": "Not Found" }));
}

// ── Assets ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn existing_asset_is_served_with_its_media_type() {
    let router = Router::new().static_root(FIXTURES);
    let res = router.serve(request("GET", "/css/app.css")).await;
    assert_eq!(res.status_code(), 200);
    assert_eq!(res.header("content-type"), Some("text/css"));
    assert_eq!(text(&res), "body { margin: 0; }\n");
}

#[tokio::test]
async fn asset_paths_never_reach_the_route_table() {
    let router = Router::new()
        .static_root(FIXTURES)
        .get("/feed.xml", |_: Request, _: Params| async { "dynamic" })
        .unwrap()
        .get("/index.html", |_: Request, _: Params| async { "dynamic" })
        .unwrap();

    let res = router.serve(request("GET", "/feed.xml")).await;
    assert_eq!(res.status_code(), 404);

    let res = router.serve(request("GET", "/index.html")).await;
    assert_eq!(res.status_code(), 200);
    assert!(text(&res).contains("static"));
}

#[tokio::test]
async fn assets_are_served_for_every_method() {
    let router = Router::new().static_root(FIXTURES);
    for method in ["POST", "DELETE", "OPTIONS"] {
        let res = router.serve(request(method, "/css/app.css")).await;
        assert_eq!(res.status_code(), 200, "{method}");
        assert_eq!(text(&res), "body { margin: 0; }\n");
    }
}

#[tokio::test]
async fn traversal_outside_static_root_is_not_found() {
    let router = Router::new().static_root(format!("{FIXTURES}/css"));
    let res = router.serve(request("GET", "/../index.html")).await;
    assert_eq!(res.status_code(), 404);
}

#[tokio::test]
async fn unreadable_asset_is_internal_error() {
    // `broken.css` is a directory: it exists, but cannot be read as a file.
    let router = Router::new().static_root(FIXTURES);
    let res = router.serve(build("GET", "/broken.css", Some("application/json"), Bytes::new())).await;
    assert_eq!(res.status_code(), 500);
    assert_eq!(json_body(&res), json!({ "status": 500, "statusText": "Internal Error" }));
}

// ── Routing ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn unregistered_path_is_not_found() {
    let router = Router::new().get("/users/:id", show_id).unwrap();
    let res = router.serve(request("GET", "/posts/1")).await;
    assert_eq!(res.status_code(), 404);
    assert_eq!(json_body(&res)["statusText"], "Not Found");
}

#[tokio::test]
async fn path_parameters_reach_the_handler() {
    let router = Router::new().get("/users/:id", show_id).unwrap();
    let res = router.serve(request("GET", "/users/42")).await;
    assert_eq!(res.status_code(), 200);
    assert_eq!(text(&res), "42");
}

#[tokio::test]
async fn trailing_slash_selects_a_different_route() {
    let router = Router::new()
        .get("/test", |_: Request, _: Params| async { "bare" })
        .unwrap()
        .any("/test/", |_: Request, _: Params| async { "slashed" })
        .unwrap();

    assert_eq!(text(&router.serve(request("GET", "/test")).await), "bare");
    assert_eq!(text(&router.serve(request("DELETE", "/test/")).await), "slashed");
    assert_eq!(router.serve(request("POST", "/test")).await.status_code(), 405);
}

#[tokio::test]
async fn methods_merge_onto_one_route() {
    let router = Router::new()
        .get("/items", |_: Request, _: Params| async { "list" })
        .unwrap()
        .post("/items", |_: Request, _: Params| async { "create" })
        .unwrap();

    assert_eq!(router.routes().count(), 1);
    assert_eq!(text(&router.serve(request("GET", "/items")).await), "list");
    assert_eq!(text(&router.serve(request("POST", "/items")).await), "create");

    let res = router.serve(request("PUT", "/items")).await;
    assert_eq!(res.status_code(), 405);
    assert_eq!(res.header("allow"), Some("GET, POST"));
    assert_eq!(json_body(&res)["allow"], json!(["GET", "POST"]));
}

#[tokio::test]
async fn last_registration_wins_for_same_method() {
    let router = Router::new()
        .get("/v", |_: Request, _: Params| async { "first" })
        .unwrap()
        .get("/v", |_: Request, _: Params| async { "second" })
        .unwrap();

    assert_eq!(router.routes().count(), 1);
    assert_eq!(text(&router.serve(request("GET", "/v")).await), "second");
}

#[tokio::test]
async fn renamed_placeholder_cannot_shadow_an_existing_route() {
    let res = Router::new()
        .get("/users/:id", show_id)
        .unwrap()
        .post("/users/:uid", |_: Request, _: Params| async { "created" });
    assert!(matches!(res, Err(Error::InvalidConfiguration(_))));

    let router = Router::new()
        .get("/users/:id", show_id)
        .unwrap()
        .post("/users/:id", |_: Request, _: Params| async { "created" })
        .unwrap();
    assert_eq!(router.routes().count(), 1);
    assert_eq!(text(&router.serve(request("POST", "/users/1")).await), "created");
    assert_eq!(text(&router.serve(request("GET", "/users/1")).await), "1");
}

#[tokio::test]
async fn unknown_verbs_are_not_allowed() {
    let router = Router::new().any("/ping", |_: Request, _: Params| async { "pong" }).unwrap();
    let res = router.serve(request("OPTIONS", "/ping")).await;
    assert_eq!(res.status_code(), 405);
    assert_eq!(res.header("allow"), Some("GET, POST, PUT, PATCH, DELETE"));
}

#[tokio::test]
async fn object_and_pattern_registrations() {
    let router = Router::new()
        .object(
            "/users",
            MethodMap::new()
                .on(Method::Get, |_: Request, _: Params| async { "list" })
                .on(Method::Post, |_: Request, _: Params| async { "create" }),
        )
        .unwrap()
        .pattern(
            [Method::Put, Method::Patch],
            "/users/:id",
            |req: Request, params: Params| async move {
                format!("{} {}", req.method(), params.get("id").unwrap_or_default())
            },
        )
        .unwrap();

    assert_eq!(text(&router.serve(request("POST", "/users")).await), "create");
    assert_eq!(text(&router.serve(request("PATCH", "/users/9")).await), "PATCH 9");
    assert_eq!(router.serve(request("GET", "/users/9")).await.status_code(), 405);
}

// ── Handler failures ──────────────────────────────────────────────────────────

#[tokio::test]
async fn panicking_handler_becomes_internal_error() {
    let router = Router::new()
        .set_error_page(error_page())
        .unwrap()
        .get("/boom", |_: Request, _: Params| async {
            if true {
                panic!("handler bug");
            }
            "unreachable"
        })
        .unwrap();

    let res = router.serve(build("GET", "/boom", Some("text/html"), Bytes::new())).await;
    assert_eq!(res.status_code(), 500);
    assert!(text(&res).contains("500 Internal Error"));
}

#[tokio::test]
async fn handlers_can_delegate_to_the_error_responder() {
    let router = Router::new()
        .get("/users/:id", |_: Request, params: Params| async move {
            match params.get("id") {
                Some("1") => Ok("alice"),
                _ => Err(ErrorKind::NotFound),
            }
        })
        .unwrap();

    assert_eq!(text(&router.serve(request("GET", "/users/1")).await), "alice");
    let res = router.serve(build("GET", "/users/2", Some("application/json"), Bytes::new())).await;
    assert_eq!(res.status_code(), 404);
    assert_eq!(json_body(&res), json!({ "status": 404, "statusText": "Not Found" }));
}

#[tokio::test]
async fn handler_responses_pass_through_untouched() {
    let router = Router::new()
        .delete("/users/:id", |_: Request, _: Params| async {
            Response::builder().code(418).header("x-custom", "yes").text("teapot")
        })
        .unwrap();

    let res = router.serve(request("DELETE", "/users/3")).await;
    assert_eq!(res.status_code(), 418);
    assert_eq!(res.header("x-custom"), Some("yes"));
    assert_eq!(text(&res), "teapot");
}

#[tokio::test]
async fn status_values_answer_without_a_body() {
    let router = Router::new()
        .delete("/users/:id", |_: Request, _: Params| async { Status::NoContent })
        .unwrap()
        .post("/users", |_: Request, _: Params| async {
            Response::builder().status(Status::Created).json(r#"{"id":1}"#)
        })
        .unwrap();

    let res = router.serve(request("DELETE", "/users/1")).await;
    assert_eq!(res.status_code(), 204);
    assert!(res.body().is_empty());

    let res = router.serve(request("POST", "/users")).await;
    assert_eq!(res.status_code(), 201);
    assert_eq!(json_body(&res), json!({ "id": 1 }));
}

// ── Templates ─────────────────────────────────────────────────────────────────

/// Replaces `{{key}}` with top-level string/number context values.
struct Mustacheish;

impl TemplateEngine for Mustacheish {
    fn compile(&self, source: &str) -> waypost::Result<Template> {
        if source.matches("{{").count() != source.matches("}}").count() {
            return Err(Error::Template("unbalanced braces".into()));
        }
        let source = source.to_owned();
        Ok(Template::new(move |ctx| {
            let mut out = source.clone();
            if let Value::Object(map) = ctx {
                for (key, value) in map {
                    let rendered = match value {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    out = out.replace(&format!("{{{{{key}}}}}"), &rendered);
                }
            }
            Ok(out)
        }))
    }
}

#[tokio::test]
async fn source_templates_compile_through_the_engine() {
    let router = Router::new()
        .with_engine(Mustacheish)
        .templ("/hello/:name", "<p>hi {{who}}</p>", json!({ "who": "there" }))
        .unwrap();

    let res = router.serve(request("GET", "/hello/bob")).await;
    assert_eq!(text(&res), "<p>hi there</p>");
}

#[tokio::test]
async fn engine_compile_errors_abort_registration() {
    let res = Router::new().with_engine(Mustacheish).templ("/", View::from("{{oops"), Context::empty());
    assert!(matches!(res, Err(Error::Template(_))));
}

#[tokio::test]
async fn template_sees_request_and_path_params() {
    let page = Template::new(|ctx| {
        Ok(format!(
            "{} {} {}",
            ctx["request"]["method"].as_str().unwrap_or_default(),
            ctx["request"]["path"].as_str().unwrap_or_default(),
            ctx["pathParams"]["slug"].as_str().unwrap_or_default(),
        ))
    });
    let router = Router::new()
        .templ_with(MethodSet::ALL, "/posts/:slug", page, Context::empty())
        .unwrap();

    let res = router.serve(request("POST", "/posts/intro")).await;
    assert_eq!(text(&res), "POST /posts/intro intro");
}

#[tokio::test]
async fn context_producer_runs_per_request() {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    let hits = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&hits);
    let context = Context::producer(move || {
        let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
        let mut map = Map::new();
        map.insert("n".to_owned(), n.into());
        map
    });
    let router = Router::new()
        .templ("/count", Template::new(|ctx| Ok(ctx["n"].to_string())), context)
        .unwrap();

    assert_eq!(text(&router.serve(request("GET", "/count")).await), "1");
    assert_eq!(text(&router.serve(request("GET", "/count")).await), "2");
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn failing_render_is_internal_error() {
    let router = Router::new()
        .templ("/", Template::new(|_| Err(Error::Template("missing partial".into()))), Context::empty())
        .unwrap();
    let res = router.serve(request("GET", "/")).await;
    assert_eq!(res.status_code(), 500);
    assert_eq!(json_body(&res)["statusText"], "Internal Error");
}

#[tokio::test]
async fn static_page_route() {
    let router = Router::new().page("/about", "<h1>About</h1>").unwrap();
    let res = router.serve(request("GET", "/about")).await;
    assert_eq!(res.status_code(), 200);
    assert_eq!(text(&res), "<h1>About</h1>");
    assert_eq!(router.serve(request("POST", "/about")).await.status_code(), 405);
}
