//! Path patterns: `/users/:id` style templates compiled once at registration.
//!
//! Each `:name` segment binds exactly one non-empty path segment. Static
//! segments match byte-for-byte, and a trailing slash is part of the pattern:
//! `/test` and `/test/` are different routes.
//!
//! Compilation translates the pattern into [`matchit`] syntax and stores a
//! single-route tree on the pattern. The route table still scans entries in
//! insertion order, so overlapping patterns resolve first-registered-wins
//! rather than by matchit's static-over-dynamic priority.

use std::collections::HashSet;

use matchit::Router as MatchitRouter;

use crate::error::{Error, Result};
use crate::request::Params;

/// A compiled path pattern.
pub struct Pattern {
    source: String,
    shape: String,
    names: Vec<String>,
    tree: MatchitRouter<()>,
}

impl Pattern {
    /// Validates and compiles `source`.
    ///
    /// Fails with [`Error::InvalidConfiguration`] when the pattern does not
    /// start with `/`, a placeholder is empty or not `[A-Za-z0-9_]+`, a
    /// placeholder name repeats, or a static segment uses a reserved
    /// character (`{`, `}`, `*`).
    pub fn compile(source: &str) -> Result<Self> {
        if !source.starts_with('/') {
            return Err(Error::config(format!("pattern `{source}` must start with `/`")));
        }

        let mut names = Vec::new();
        let mut seen = HashSet::new();
        let mut translated = String::with_capacity(source.len() + 8);
        let mut shape = String::with_capacity(source.len());

        for (i, segment) in source.split('/').enumerate() {
            if i > 0 {
                translated.push('/');
                shape.push('/');
            }
            match segment.strip_prefix(':') {
                Some(name) => {
                    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                        return Err(Error::config(format!(
                            "pattern `{source}`: invalid placeholder `:{name}`"
                        )));
                    }
                    if !seen.insert(name) {
                        return Err(Error::config(format!(
                            "pattern `{source}`: placeholder `:{name}` appears twice"
                        )));
                    }
                    names.push(name.to_owned());
                    shape.push(':');
                    translated.push('{');
                    translated.push_str(name);
                    translated.push('}');
                }
                None if segment.contains(['{', '}', '*']) => {
                    return Err(Error::config(format!(
                        "pattern `{source}`: `{{`, `}}` and `*` are reserved"
                    )));
                }
                None => {
                    translated.push_str(segment);
                    shape.push_str(segment);
                }
            }
        }

        let mut tree = MatchitRouter::new();
        tree.insert(translated, ())
            .map_err(|e| Error::config(format!("pattern `{source}`: {e}")))?;

        Ok(Self { source: source.to_owned(), shape, names, tree })
    }

    /// The pattern as registered.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The pattern with every placeholder name erased: `/users/:id` and
    /// `/users/:user_id` share the shape `/users/:`.
    pub fn shape(&self) -> &str {
        &self.shape
    }

    /// Placeholder names, in order of appearance.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Tests `path` against the pattern, extracting placeholders on success.
    pub fn matches(&self, path: &str) -> Option<Params> {
        let matched = self.tree.at(path).ok()?;
        let mut params = Params::default();
        for (name, value) in matched.params.iter() {
            if value.is_empty() || value.contains('/') {
                return None;
            }
            params.insert(name, value);
        }
        Some(params)
    }
}

impl std::fmt::Debug for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}
