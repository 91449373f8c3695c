//! `RouterConfig`: the dispatch-policy flags a deployment may want to
//! override without a recompile — a TOML or JSON file, sniffed by
//! extension, with environment variables layered on top and defaults
//! used when no file is present.

use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RouterConfig {
    /// TCP address the demo server binds to.
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Issue a 301/307 redirect when a route exists only with the
    /// trailing slash toggled.
    #[serde(default = "default_true")]
    pub redirect_trailing_slash: bool,

    /// Issue a redirect to a case-corrected path when one is found.
    #[serde(default = "default_true")]
    pub redirect_fixed_path: bool,

    /// Answer `OPTIONS` automatically with an `Allow` header.
    #[serde(default = "default_true")]
    pub handle_options: bool,

    /// Answer a path match under the wrong method with 405 instead of 404.
    #[serde(default = "default_true")]
    pub handle_method_not_allowed: bool,
}

fn default_listen() -> String {
    "127.0.0.1:8080".to_string()
}

impl Default for RouterConfig {
    fn default() -> Self {
        RouterConfig {
            listen: default_listen(),
            redirect_trailing_slash: true,
            redirect_fixed_path: true,
            handle_options: true,
            handle_method_not_allowed: true,
        }
    }
}

impl RouterConfig {
    /// Load configuration from `path` if it exists, falling back to
    /// defaults, then apply `WAYROUTER_*` environment overrides and
    /// validate the result.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config: RouterConfig = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            match path.extension().and_then(|e| e.to_str()) {
                Some("toml") => toml::from_str(&content)?,
                Some("json") => serde_json::from_str(&content)?,
                Some(ext) => anyhow::bail!("unsupported config format: .{ext}, use .toml or .json"),
                None => anyhow::bail!("config file has no extension, use .toml or .json"),
            }
        } else {
            tracing::info!(
                "config file not found at {}, using defaults",
                path.display()
            );
            RouterConfig::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        tracing::info!(listen = %config.listen, "loaded router configuration");
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("WAYROUTER_LISTEN") {
            self.listen = v;
        }
        if let Ok(v) = std::env::var("WAYROUTER_REDIRECT_TRAILING_SLASH") {
            self.redirect_trailing_slash = is_truthy(&v);
        }
        if let Ok(v) = std::env::var("WAYROUTER_REDIRECT_FIXED_PATH") {
            self.redirect_fixed_path = is_truthy(&v);
        }
        if let Ok(v) = std::env::var("WAYROUTER_HANDLE_OPTIONS") {
            self.handle_options = is_truthy(&v);
        }
        if let Ok(v) = std::env::var("WAYROUTER_HANDLE_METHOD_NOT_ALLOWED") {
            self.handle_method_not_allowed = is_truthy(&v);
        }
    }

    fn validate(&self) -> Result<()> {
        if self.listen.parse::<std::net::SocketAddr>().is_err() {
            anyhow::bail!("invalid listen address: '{}'", self.listen);
        }
        Ok(())
    }
}

fn is_truthy(v: &str) -> bool {
    v == "true" || v == "1"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_when_file_absent() {
        let config = RouterConfig::load(Path::new("/nonexistent/wayrouter.toml")).unwrap();
        assert_eq!(config, RouterConfig::default());
    }

    #[test]
    fn loads_toml_file() {
        let dir = std::env::temp_dir();
        let path = dir.join("wayrouter_test_config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "listen = \"0.0.0.0:9000\"\nredirect_trailing_slash = false").unwrap();

        let config = RouterConfig::load(&path).unwrap();
        assert_eq!(config.listen, "0.0.0.0:9000");
        assert!(!config.redirect_trailing_slash);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn rejects_invalid_listen_address() {
        let dir = std::env::temp_dir();
        let path = dir.join("wayrouter_test_bad_config.json");
        std::fs::write(&path, r#"{"listen": "not-an-address"}"#).unwrap();

        let result = RouterConfig::load(&path);
        assert!(result.is_err());

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn rejects_unknown_extension() {
        let dir = std::env::temp_dir();
        let path = dir.join("wayrouter_test_config.yaml");
        std::fs::write(&path, "listen: 127.0.0.1:1").unwrap();

        let result = RouterConfig::load(&path);
        assert!(result.is_err());

        std::fs::remove_file(&path).ok();
    }
}
