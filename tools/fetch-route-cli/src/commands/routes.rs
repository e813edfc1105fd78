//! Route tree inspection.

use anyhow::Result;
use fetch_route_sdk::prelude::{DecoratedRoute, RouteNode};

use super::RoutesArgs;
use crate::context::Context;
use crate::output::kind_badge;

const WIDTHS: [usize; 4] = [24, 16, 10, 32];

/// Run the routes command.
pub async fn run(args: RoutesArgs, ctx: &Context) -> Result<()> {
    let records = ctx.load_routes(args.file.as_deref())?;
    let fetch_route = ctx.fetch_route(None);
    let routes = fetch_route.decorate_records(&records);

    if ctx.output.is_json() {
        ctx.output.json(&routes);
        return Ok(());
    }

    ctx.output.header("Routes");
    ctx.output.table_row(&["PATH", "NAME", "KIND", "TARGET"], &WIDTHS);
    print_tree(&routes, 0, ctx);

    let fetchable = count_fetchable(&routes);
    ctx.output
        .success(&format!("{} fetchable route(s) decorated", fetchable));
    Ok(())
}

fn print_tree(routes: &[DecoratedRoute], depth: usize, ctx: &Context) {
    for route in routes {
        let (kind, target) = match &route.node {
            RouteNode::Leaf => ("leaf", String::new()),
            RouteNode::Fetchable(meta) => ("fetch", meta.api.url().to_string()),
            RouteNode::Redirect(target) => ("redirect", target.clone()),
            RouteNode::Alias(target) => ("alias", target.clone()),
        };
        let path = format!("{}{}", "  ".repeat(depth), route.path);
        let kind = kind_badge(kind);

        ctx.output.table_row(
            &[
                path.as_str(),
                route.name.as_deref().unwrap_or("-"),
                kind.as_str(),
                target.as_str(),
            ],
            &WIDTHS,
        );

        if let Some(children) = &route.children {
            print_tree(children, depth + 1, ctx);
        }
    }
}

fn count_fetchable(routes: &[DecoratedRoute]) -> usize {
    routes
        .iter()
        .map(|route| {
            usize::from(route.is_fetchable())
                + route.children.as_deref().map(count_fetchable).unwrap_or(0)
        })
        .sum()
}
