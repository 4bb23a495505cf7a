//! Static-file lookup under the configured asset root.

use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;

/// The directory asset requests resolve against (`{root}{path}`).
#[derive(Clone, Debug)]
pub(crate) struct StaticDir {
    root: PathBuf,
}

impl StaticDir {
    pub(crate) fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub(crate) fn root(&self) -> &Path {
        &self.root
    }

    /// Reads the file behind a request path.
    ///
    /// Paths that would escape the root (`..` segments, backslashes) are
    /// reported as `NotFound` without touching the filesystem. The read runs
    /// on tokio's blocking pool; dropping the future abandons it and the file
    /// handle is closed when the read finishes.
    pub(crate) async fn open(&self, request_path: &str) -> io::Result<Bytes> {
        let full = self.resolve(request_path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "path escapes static root"))?;
        tokio::fs::read(full).await.map(Bytes::from)
    }

    fn resolve(&self, request_path: &str) -> Option<PathBuf> {
        let relative = request_path.trim_start_matches('/');
        let escapes = relative.contains('\\')
            || relative.split('/').any(|seg| seg == ".." || seg == ".");
        if escapes {
            return None;
        }
        Some(self.root.join(relative))
    }
}
