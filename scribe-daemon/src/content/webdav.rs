//! WebDAV content store.
//!
//! Minimal client over reqwest: `PROPFIND Depth: 1` for listings and plain
//! `GET` for reads, with basic auth. Hrefs are pulled out of the
//! multistatus body with a regex rather than a full XML parse; servers
//! differ only in namespace prefix there.

use super::ContentStore;
use crate::config::WebDavCredentials;
use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, Method};
use std::sync::LazyLock;
use url::Url;

static HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<(?:[a-z0-9]+:)?href[^>]*>([^<]+)</(?:[a-z0-9]+:)?href>").unwrap());

pub struct WebDavStore {
    client: Client,
    base: Url,
    login: String,
    password: String,
}

impl WebDavStore {
    pub fn new(credentials: &WebDavCredentials) -> Result<Self, String> {
        let base = Url::parse(&credentials.hostname)
            .map_err(|e| format!("invalid WebDAV hostname '{}': {}", credentials.hostname, e))?;
        let client = Client::builder()
            .build()
            .map_err(|e| format!("failed to build HTTP client: {}", e))?;

        Ok(Self {
            client,
            base,
            login: credentials.login.clone(),
            password: credentials.password.clone(),
        })
    }

    fn url_for(&self, path: &str) -> Result<Url, String> {
        self.base
            .join(path)
            .map_err(|e| format!("invalid path '{}': {}", path, e))
    }
}

#[async_trait]
impl ContentStore for WebDavStore {
    async fn list_files(&self, dir: &str) -> Result<Vec<String>, String> {
        let url = self.url_for(dir)?;
        let request_path = url.path().to_string();

        let response = self
            .client
            .request(Method::from_bytes(b"PROPFIND").unwrap(), url)
            .basic_auth(&self.login, Some(&self.password))
            .header("Depth", "1")
            .send()
            .await
            .map_err(|e| format!("PROPFIND '{}' failed: {}", dir, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("PROPFIND '{}' returned {}", dir, status));
        }

        let body = response
            .text()
            .await
            .map_err(|e| format!("failed to read PROPFIND response for '{}': {}", dir, e))?;

        Ok(parse_propfind_hrefs(&body, &request_path))
    }

    async fn read_file(&self, path: &str) -> Result<String, String> {
        let url = self.url_for(path)?;

        let response = self
            .client
            .get(url)
            .basic_auth(&self.login, Some(&self.password))
            .send()
            .await
            .map_err(|e| format!("GET '{}' failed: {}", path, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("GET '{}' returned {}", path, status));
        }

        response
            .text()
            .await
            .map_err(|e| format!("failed to read '{}': {}", path, e))
    }
}

/// Extract file hrefs from a PROPFIND multistatus body: percent-decoded,
/// with collection entries and the listed directory itself dropped.
fn parse_propfind_hrefs(body: &str, request_path: &str) -> Vec<String> {
    let self_path = request_path.trim_end_matches('/');

    HREF_RE
        .captures_iter(body)
        .filter_map(|cap| {
            let raw = cap[1].trim();
            match urlencoding::decode(raw) {
                Ok(decoded) => Some(decoded.to_string()),
                Err(_) => {
                    log::debug!("[WEBDAV] Skipping undecodable href: {}", raw);
                    None
                }
            }
        })
        .filter(|href| !href.ends_with('/'))
        .filter(|href| href.trim_end_matches('/') != self_path)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MULTISTATUS: &str = r#"<?xml version="1.0"?>
<d:multistatus xmlns:d="DAV:">
  <d:response>
    <d:href>/remote/notes/</d:href>
    <d:propstat><d:status>HTTP/1.1 200 OK</d:status></d:propstat>
  </d:response>
  <d:response>
    <d:href>/remote/notes/todo.md</d:href>
  </d:response>
  <d:response>
    <d:href>/remote/notes/weekly%20plan.md</d:href>
  </d:response>
  <d:response>
    <d:href>/remote/notes/archive/</d:href>
  </d:response>
</d:multistatus>"#;

    #[test]
    fn test_parse_propfind_hrefs() {
        let files = parse_propfind_hrefs(MULTISTATUS, "/remote/notes/");
        assert_eq!(
            files,
            vec![
                "/remote/notes/todo.md".to_string(),
                "/remote/notes/weekly plan.md".to_string()
            ]
        );
    }

    #[test]
    fn test_parse_propfind_uppercase_namespace() {
        let body = "<D:href>/notes/a.md</D:href><D:href>/notes/</D:href>";
        let files = parse_propfind_hrefs(body, "/notes");
        assert_eq!(files, vec!["/notes/a.md".to_string()]);
    }

    #[test]
    fn test_parse_propfind_empty_body() {
        assert!(parse_propfind_hrefs("", "/notes/").is_empty());
        assert!(parse_propfind_hrefs("not xml at all", "/notes/").is_empty());
    }
}
