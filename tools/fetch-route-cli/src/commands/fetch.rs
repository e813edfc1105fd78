//! Fetch a named route's data.

use anyhow::{anyhow, Result};
use fetch_route_sdk::prelude::find_route;

use super::{to_params, to_query, FetchArgs};
use crate::context::Context;

/// Run the fetch command.
pub async fn run(args: FetchArgs, ctx: &Context) -> Result<()> {
    let records = ctx.load_routes(args.file.as_deref())?;
    let fetch_route = ctx.fetch_route(args.base_url.as_deref());
    let routes = fetch_route.decorate_records(&records);

    let route = find_route(&routes, &args.name)
        .ok_or_else(|| anyhow!("No route named '{}'", args.name))?;
    let location = route.location(to_params(&args.params), to_query(&args.query));

    let mut data = serde_json::Value::Null;
    for attempt in 1..=args.repeat.max(1) {
        ctx.output
            .debug(&format!("Fetch {} of {}", attempt, args.repeat.max(1)));
        data = fetch_route.invoke_fetch(&location).await?;
    }

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "data": data,
            "state": fetch_route.module().state(),
        }));
        return Ok(());
    }

    ctx.output.header(&format!("Route '{}'", args.name));
    ctx.output.json(&data);
    for (key, status) in &fetch_route.module().state().routes {
        ctx.output.kv(key.as_str(), &status.to_string());
    }
    Ok(())
}
