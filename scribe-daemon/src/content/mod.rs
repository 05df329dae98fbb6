//! Content stores - where the watched note files live.

pub mod local;
pub mod webdav;

pub use local::LocalStore;
pub use webdav::WebDavStore;

use async_trait::async_trait;

/// A source of note files. The dispatcher only needs a listing and
/// per-file reads; any transport providing both is substitutable.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// List the file paths under `dir`. The returned strings are opaque to
    /// the dispatcher apart from their extension; each must be readable
    /// back through `read_file`.
    async fn list_files(&self, dir: &str) -> Result<Vec<String>, String>;

    /// Fetch the UTF-8 content of one file.
    async fn read_file(&self, path: &str) -> Result<String, String>;
}
