//! CLI command implementations.

pub mod fetch;
pub mod keys;
pub mod routes;

use clap::Args;
use fetch_route_sdk::prelude::{Params, Query, QueryValue};

/// Arguments for the keys command.
#[derive(Args)]
pub struct KeysArgs {
    /// URL template (e.g., "/api/products/:id").
    pub template: String,

    /// Route param as key=value.
    #[arg(short, long = "param", value_parser = parse_pair)]
    pub params: Vec<(String, String)>,

    /// Query entry as key=value; repeat a key for a list.
    #[arg(short, long = "query", value_parser = parse_pair)]
    pub query: Vec<(String, String)>,

    /// Query params left out of the storage key (default: from config).
    #[arg(long)]
    pub ignore: Vec<String>,

    /// Partials to treat as already cached.
    #[arg(long)]
    pub cached_partial: Vec<String>,
}

/// Arguments for the routes command.
#[derive(Args)]
pub struct RoutesArgs {
    /// Route file (JSON array or TOML `[[routes]]`).
    #[arg(short, long)]
    pub file: Option<String>,
}

/// Arguments for the fetch command.
#[derive(Args)]
pub struct FetchArgs {
    /// Route name.
    pub name: String,

    /// Route file (JSON array or TOML `[[routes]]`).
    #[arg(short, long)]
    pub file: Option<String>,

    /// Route param as key=value.
    #[arg(short, long = "param", value_parser = parse_pair)]
    pub params: Vec<(String, String)>,

    /// Query entry as key=value; repeat a key for a list.
    #[arg(short, long = "query", value_parser = parse_pair)]
    pub query: Vec<(String, String)>,

    /// Prefix for relative fetch URLs.
    #[arg(long)]
    pub base_url: Option<String>,

    /// Fetch this many times through the same cache.
    #[arg(long, default_value = "1")]
    pub repeat: usize,
}

/// Parse a `key=value` argument.
pub fn parse_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{}'", raw)),
    }
}

pub fn to_params(pairs: &[(String, String)]) -> Params {
    pairs.iter().cloned().collect()
}

/// Group pairs into a query; a repeated key becomes a list.
pub fn to_query(pairs: &[(String, String)]) -> Query {
    let mut query = Query::new();
    for (key, value) in pairs {
        let merged = match query.remove(key) {
            None => QueryValue::One(value.clone()),
            Some(existing) => {
                let mut values = existing.into_values();
                values.push(value.clone());
                QueryValue::Many(values)
            }
        };
        query.insert(key.clone(), merged);
    }
    query
}
