//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context as _, Result};
use fetch_route_sdk::prelude::{FetchRoute, FetchRouteConfig, LogLevel, RouteRecord};

use crate::config::{self, CliConfig};
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let config = if let Some(path) = config_path {
            CliConfig::load(path)?
        } else {
            Self::find_config(&cwd).unwrap_or_default()
        };

        Ok(Self { config, output, cwd })
    }

    /// Find config file in directory tree.
    fn find_config(start: &Path) -> Option<CliConfig> {
        let config_names = ["fetch-route.toml", ".fetch-route.toml", "fetch-route.json"];

        let mut current = start.to_path_buf();
        loop {
            for name in &config_names {
                let config_path = current.join(name);
                if config_path.exists() {
                    if let Ok(config) = CliConfig::load(config_path.to_str()?) {
                        return Some(config);
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        if PathBuf::from(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.cwd.join(path)
        }
    }

    /// Installation config from the config file, with `--verbose` forcing
    /// debug logs.
    pub fn fetch_route_config(&self, base_url: Option<&str>) -> FetchRouteConfig {
        let mut overrides = self.config.fetch_route.clone();
        if self.output.is_verbose() {
            overrides.log_level = Some(LogLevel::Debug);
        }
        if let Some(url) = base_url {
            overrides.base_url = Some(url.to_string());
        }
        FetchRouteConfig::resolve(&overrides)
    }

    /// A fresh installation.
    pub fn fetch_route(&self, base_url: Option<&str>) -> FetchRoute {
        FetchRoute::new(self.fetch_route_config(base_url))
    }

    /// Load route records from `path`, or the configured route file.
    pub fn load_routes(&self, path: Option<&str>) -> Result<Vec<RouteRecord>> {
        let path = path.or(self.config.routes.as_deref()).ok_or_else(|| {
            anyhow!("No route file given; pass --file or set `routes` in fetch-route.toml")
        })?;
        let resolved = self.resolve_path(path);
        let resolved = resolved
            .to_str()
            .ok_or_else(|| anyhow!("Route file path is not valid UTF-8: {}", resolved.display()))?;

        self.output.debug(&format!("Loading routes from {}", resolved));
        config::load_routes(resolved)
    }
}
