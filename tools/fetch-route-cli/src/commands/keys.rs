//! Cache key derivation.

use anyhow::Result;
use fetch_route_sdk::prelude::{derive_keys, unresolved_placeholders};
use serde_json::json;

use super::{to_params, to_query, KeysArgs};
use crate::context::Context;

/// Run the keys command.
pub async fn run(args: KeysArgs, ctx: &Context) -> Result<()> {
    let ignored = if args.ignore.is_empty() {
        ctx.fetch_route_config(None).ignored_query_params
    } else {
        args.ignore
    };

    let params = to_params(&args.params);
    let query = to_query(&args.query);
    let keys = derive_keys(&args.template, &params, &query, ignored.as_slice(), |name| {
        args.cached_partial.iter().any(|cached| cached == name)
    });
    let unresolved = unresolved_placeholders(keys.fetch_key.as_str());

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "fetchKey": keys.fetch_key.as_str(),
            "storageKey": keys.storage_key.as_str(),
            "unresolved": unresolved,
        }));
        return Ok(());
    }

    ctx.output.header(&args.template);
    ctx.output.kv("fetch key", keys.fetch_key.as_str());
    ctx.output.kv("storage key", keys.storage_key.as_str());
    if !unresolved.is_empty() {
        ctx.output
            .warn(&format!("Unresolved placeholders: {}", unresolved.join(", ")));
    }

    Ok(())
}
