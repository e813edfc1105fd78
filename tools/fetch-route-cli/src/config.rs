//! CLI configuration.

use anyhow::{Context, Result};
use fetch_route_sdk::prelude::{FetchRouteOverrides, RouteRecord};
use serde::{Deserialize, Serialize};

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Default route file for `routes` and `fetch`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routes: Option<String>,

    /// Installation overrides.
    #[serde(default)]
    pub fetch_route: FetchRouteOverrides,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        Self::parse(path, &content)
    }

    fn parse(path: &str, content: &str) -> Result<Self> {
        if path.ends_with(".json") {
            serde_json::from_str(content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }
}

/// TOML route files wrap the list in `[[routes]]` tables.
#[derive(Debug, Deserialize)]
struct RouteFile {
    routes: Vec<RouteRecord>,
}

/// Load route records from a JSON array or a TOML `[[routes]]` file.
pub fn load_routes(path: &str) -> Result<Vec<RouteRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read route file: {}", path))?;

    parse_routes(path, &content)
}

fn parse_routes(path: &str, content: &str) -> Result<Vec<RouteRecord>> {
    if path.ends_with(".toml") {
        let file: RouteFile = toml::from_str(content)
            .with_context(|| format!("Failed to parse TOML route file: {}", path))?;
        Ok(file.routes)
    } else {
        serde_json::from_str(content)
            .with_context(|| format!("Failed to parse JSON route file: {}", path))
    }
}
