use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, bail};
use baton_core::routing::{Endpoint, Params, Routes};
use baton_core::{RouterBuilder, logging};
use clap::{Parser, Subcommand};
use serde::Deserialize;

#[derive(Parser)]
#[command(name = "baton")]
#[command(about = "Inspect Baton route manifests")]
#[command(version)]
struct Cli {
    /// Route manifest (TOML)
    #[arg(long, global = true, default_value = "routes.toml")]
    routes: PathBuf,

    /// Log match decisions to stderr
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every route in registration order
    List,
    /// Show which route a request would hit
    Match {
        /// HTTP method (e.g. GET)
        method: String,
        /// Request path, query string allowed
        path: String,
    },
    /// Build the URL of a named route
    Url {
        /// Route name
        name: String,
        /// Parameters in format key=value (e.g. id=42)
        params: Vec<String>,
    },
}

/// On-disk route manifest.
#[derive(Debug, Default, Deserialize)]
struct Manifest {
    #[serde(default)]
    base_path: String,
    #[serde(default)]
    match_types: BTreeMap<String, String>,
    #[serde(default, rename = "route")]
    routes: Vec<RouteEntry>,
    #[serde(default, rename = "resource")]
    resources: Vec<ResourceEntry>,
}

#[derive(Debug, Deserialize)]
struct RouteEntry {
    method: String,
    pattern: String,
    target: String,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResourceEntry {
    path: String,
    controller: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.verbose {
        logging::init_logging_with_level("debug");
    }

    let builder = load(&cli.routes)?;
    let table = builder.table();

    match cli.command {
        Commands::List => {
            for (index, route) in table.routes().iter().enumerate() {
                println!(
                    "{:>3}  {:<32} {:<28} {:<28} {}",
                    index,
                    route.methods().as_str(),
                    route.pattern(),
                    route.target(),
                    route.name().unwrap_or("-")
                );
            }
        }
        Commands::Match { method, path } => match table.match_route(&path, &method) {
            Some(matched) => println!("{}", serde_json::to_string_pretty(&matched.to_json())?),
            None => {
                println!("no match");
                std::process::exit(1);
            }
        },
        Commands::Url { name, params } => {
            let params = parse_params(&params)?;
            println!("{}", table.url_for(&name, &params)?);
        }
    }
    Ok(())
}

/// Read a manifest into a builder. Controllers are not registered, so the
/// builder is only inspected, never built.
fn load(path: &Path) -> Result<RouterBuilder> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let manifest: Manifest = toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;

    let mut builder = RouterBuilder::new();
    builder
        .set_base_path(manifest.base_path)
        .add_match_types(manifest.match_types);

    for route in manifest.routes {
        builder.map(
            route.method.as_str(),
            &route.pattern,
            Endpoint::new(route.target),
            route.name.as_deref(),
        )?;
    }
    for resource in manifest.resources {
        builder.resource(&resource.path, &resource.controller)?;
    }
    Ok(builder)
}

fn parse_params(raw: &[String]) -> Result<Params> {
    raw.iter()
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) if !k.is_empty() => Ok((k.to_string(), v.to_string())),
            _ => bail!("expected key=value, got '{pair}'"),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_parses() {
        let manifest: Manifest = toml::from_str(
            r#"
            base_path = "/api"

            [match_types]
            slug = "[a-z0-9-]+"

            [[route]]
            method = "GET"
            pattern = "/v1/widgets/[i:id]"
            target = "Widgets@show"
            name = "widget"

            [[resource]]
            path = "posts"
            controller = "PostsController"
            "#,
        )
        .unwrap();
        assert_eq!(manifest.base_path, "/api");
        assert_eq!(manifest.routes.len(), 1);
        assert_eq!(manifest.resources[0].controller, "PostsController");
    }

    #[test]
    fn test_parse_params() {
        let params = parse_params(&["id=42".to_string()]).unwrap();
        assert_eq!(params.get("id"), Some("42"));
        assert!(parse_params(&["nope".to_string()]).is_err());
    }
}
