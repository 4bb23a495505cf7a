//! Content negotiation: static-asset classification and `Accept` parsing.
//!
//! A request path whose extension appears in [`media_type`]'s table is an
//! asset request and never reaches the route table. This shadows any dynamic
//! route whose pattern ends in such an extension (`/feed.xml`, `/index.html`):
//! register those under an extension-less path instead.

/// Media type for a file extension (case-insensitive), if it is one the
/// asset server knows.
pub fn media_type(extension: &str) -> Option<&'static str> {
    let ty = match extension.to_ascii_lowercase().as_str() {
        "htm" | "html"  => "text/html; charset=utf-8",
        "css"           => "text/css",
        "js" | "mjs"    => "text/javascript",
        "json" | "map"  => "application/json",
        "xml"           => "application/xml",
        "txt"           => "text/plain; charset=utf-8",
        "csv"           => "text/csv",
        "svg"           => "image/svg+xml",
        "png"           => "image/png",
        "jpg" | "jpeg"  => "image/jpeg",
        "gif"           => "image/gif",
        "bmp"           => "image/bmp",
        "webp"          => "image/webp",
        "ico"           => "image/x-icon",
        "mp4"           => "video/mp4",
        "mpeg"          => "video/mpeg",
        "webm"          => "video/webm",
        "ogg"           => "audio/ogg",
        "avi"           => "video/x-msvideo",
        "mp3"           => "audio/mpeg",
        "wav"           => "audio/wav",
        "aac"           => "audio/aac",
        "mid" | "midi"  => "audio/midi",
        "pdf"           => "application/pdf",
        "zip"           => "application/zip",
        "gz"            => "application/gzip",
        "wasm"          => "application/wasm",
        "woff"          => "font/woff",
        "woff2"         => "font/woff2",
        "ttf"           => "font/ttf",
        "otf"           => "font/otf",
        _               => return None,
    };
    Some(ty)
}

/// How the dispatcher treats a request path.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Target {
    /// Served from the static root with this content type.
    Asset(&'static str),
    /// Looked up in the route table.
    Dynamic,
}

/// Classifies `path` by the extension of its last segment.
///
/// Only the last segment counts: `/v1.2/users` is dynamic, and so is a
/// dot-file like `/.env` or any path ending in `/`.
pub fn classify(path: &str) -> Target {
    let last = path.rsplit('/').next().unwrap_or_default();
    match last.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => {
            media_type(ext).map_or(Target::Dynamic, Target::Asset)
        }
        _ => Target::Dynamic,
    }
}

// ── Accept ────────────────────────────────────────────────────────────────────

/// Whether the client should get an HTML error page rather than JSON.
///
/// Compares the best quality the header grants an HTML type (`text/html`,
/// `application/xhtml+xml`, `text/*`, `*/*`) against the best it grants a
/// structured one (`application/json`, `application/*`, `*/*`). HTML wins
/// ties, and a missing or empty header prefers HTML. A `q` that does not
/// parse counts as `0`; others are clamped to `0..=1`.
pub fn prefers_html(accept: Option<&str>) -> bool {
    let Some(accept) = accept.map(str::trim).filter(|a| !a.is_empty()) else {
        return true;
    };

    let mut html = 0.0_f32;
    let mut structured = 0.0_f32;

    for range in accept.split(',') {
        let mut parts = range.split(';');
        let media = parts.next().unwrap_or_default().trim().to_ascii_lowercase();
        let q = match parts.find_map(|p| p.trim().strip_prefix("q=")) {
            Some(q) => q
                .trim()
                .parse::<f32>()
                .ok()
                .filter(|q| q.is_finite())
                .map_or(0.0, |q| q.clamp(0.0, 1.0)),
            None => 1.0,
        };

        match media.as_str() {
            "text/html" | "application/xhtml+xml" | "text/*" => html = html.max(q),
            "application/json" | "application/*" => structured = structured.max(q),
            "*/*" => {
                html = html.max(q);
                structured = structured.max(q);
            }
            _ => {}
        }
    }

    html > 0.0 && html >= structured
}
