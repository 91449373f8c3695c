//! `ServeFiles`: a static-file collaborator for a `/*filepath` route.
//!
//! Registration requires a `/*filepath` catch-all pattern (a configuration
//! error otherwise); at request time the captured `filepath` param is
//! resolved against a filesystem root and handed back as a
//! [`StaticFileResponse`] descriptor. This module never opens a socket or
//! writes bytes to a client — that belongs to whatever embeds the router.

use std::path::{Component, Path, PathBuf};

use crate::error::RouterError;
use crate::params::Params;

/// A resolved static file, ready for the host's response-emission layer
/// to turn into bytes on the wire.
pub struct StaticFileResponse {
    pub path: PathBuf,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

/// Validate that `pattern` is a legal `ServeFiles` mount point: it must
/// end in `/*filepath`. Call this at registration time, before
/// [`Router::handle`](crate::registry::Router::handle).
pub fn validate_pattern(pattern: &str) -> Result<(), RouterError> {
    if pattern.ends_with("/*filepath") {
        Ok(())
    } else {
        Err(RouterError::BadServeFilesPattern(pattern.to_string()))
    }
}

/// Resolve the `filepath` parameter captured by a `/*filepath` route
/// against `root`, rejecting any path that would escape it via `..`.
pub fn serve_files(root: &Path, params: &Params) -> std::io::Result<StaticFileResponse> {
    let requested = params.get("filepath").unwrap_or("/");
    let relative = requested.trim_start_matches('/');

    let mut resolved = root.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("path escapes serve root: '{requested}'"),
                ));
            }
        }
    }

    let body = std::fs::read(&resolved)?;
    let content_type = guess_content_type(&resolved);
    Ok(StaticFileResponse {
        path: resolved,
        content_type,
        body,
    })
}

fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "text/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("svg") => "image/svg+xml",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_pattern() {
        assert!(validate_pattern("/static/*filepath").is_ok());
    }

    #[test]
    fn rejects_pattern_without_catch_all() {
        assert!(validate_pattern("/static/:name").is_err());
    }

    #[test]
    fn rejects_escaping_paths() {
        let dir = std::env::temp_dir().join("wayrouter_static_test");
        std::fs::create_dir_all(&dir).unwrap();

        let mut params = Params::new();
        params.push("filepath", "/../../etc/passwd");

        let result = serve_files(&dir, &params);
        assert!(result.is_err());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn serves_an_existing_file() {
        let dir = std::env::temp_dir().join("wayrouter_static_test_ok");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("hello.txt"), b"hi").unwrap();

        let mut params = Params::new();
        params.push("filepath", "/hello.txt");

        let response = serve_files(&dir, &params).unwrap();
        assert_eq!(response.body, b"hi");
        assert_eq!(response.content_type, "text/plain; charset=utf-8");

        std::fs::remove_dir_all(&dir).ok();
    }
}
