//! gqlb: build and run GraphQL queries in the terminal.
//!
//! The interactive mode fetches an endpoint's schema, opens the query
//! builder, and on Enter executes the built operation. Everything the user
//! set up is stored per endpoint, so the next session picks up where the
//! last one ended.

mod builder;
mod database;
mod endpoint;
mod output;
mod screen;
mod sdl;

use anyhow::{bail, Context, Result};
use clap::Parser;
use gqlb_tree::Tree;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use crate::builder::QueryBuilder;
use crate::database::Database;

#[derive(Debug, Parser)]
#[command(name = "gqlb", version, about = "GraphQL client in the terminal.")]
struct Args {
    /// GraphQL endpoint.
    #[arg(
        short,
        long,
        env = "GQLB_ENDPOINT",
        default_value = "https://mys-lang.org/graphql"
    )]
    endpoint: String,

    /// Name of the query to work on, instead of the endpoint's default.
    #[arg(short = 'n', long)]
    query_name: Option<String>,

    /// Repeat the most recently built query without opening the builder.
    #[arg(short, long)]
    repeat: bool,

    /// Print the response as YAML instead of JSON.
    #[arg(short, long)]
    yaml: bool,

    /// Print the query instead of executing it.
    #[arg(short, long)]
    query: bool,

    /// Print an equivalent cURL command instead of executing the query.
    #[arg(short, long)]
    curl: bool,

    /// Print the endpoint's schema and exit.
    #[arg(short, long)]
    print_schema: bool,

    /// Remove all stored queries and exit.
    #[arg(short = 'C', long)]
    clear: bool,

    /// List stored queries and exit.
    #[arg(short, long)]
    list_queries: bool,

    /// Extra request header as 'Key: Value'. May be repeated.
    #[arg(short = 'H', long = "header", value_name = "KEY: VALUE")]
    header: Vec<String>,

    /// Execution variable as 'name=value'. May be repeated.
    #[arg(short = 'v', long = "variable", value_name = "NAME=VALUE")]
    variable: Vec<String>,

    /// Skip TLS certificate verification.
    #[arg(long)]
    no_verify: bool,
}

fn main() {
    if let Err(error) = run() {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let headers = parse_headers(&args.header)?;
    let verify = !args.no_verify;
    let database = Database::open()?;

    if args.clear {
        return database.clear();
    }

    if args.list_queries {
        for (endpoint, name) in database.list()? {
            println!("{endpoint} {name}");
        }

        return Ok(());
    }

    if args.print_schema {
        let schema = endpoint::fetch_schema(&args.endpoint, &headers, verify)?;
        print!("{}", sdl::print_schema(&schema));

        return Ok(());
    }

    let query = if args.repeat {
        let saved = database.read(&args.endpoint, args.query_name.as_deref())?;
        let mut tree = Tree::from_json(&saved)?;

        tree.query()?
    } else {
        let mut builder = QueryBuilder::new(
            args.endpoint.clone(),
            args.query_name.clone(),
            headers.clone(),
            verify,
            args.variable.clone(),
            database,
        );

        match builder.run()? {
            Some(query) => query,
            None => return Ok(()),
        }
    };

    if args.query {
        println!("{query}");

        return Ok(());
    }

    let variables = parse_variables(&args.variable)?;
    let body = endpoint::request_body(&query, &variables);

    if args.curl {
        println!("{}", output::curl_command(&args.endpoint, &body));

        return Ok(());
    }

    let response = endpoint::post(&args.endpoint, &body, &headers, verify)?;

    if let Some(errors) = response.get("errors") {
        bail!("{errors}");
    }

    let data = response.get("data").cloned().unwrap_or(Value::Null);
    println!("{}", output::format_data(&data, args.yaml)?);

    Ok(())
}

fn parse_headers(headers: &[String]) -> Result<Vec<(String, String)>> {
    headers
        .iter()
        .map(|header| {
            let (key, value) = header
                .split_once(':')
                .with_context(|| format!("invalid header '{header}', expected 'Key: Value'"))?;

            Ok((key.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

/// `name=value` pairs for execution. Values that parse as JSON are passed
/// typed; anything else is sent as a string.
fn parse_variables(variables: &[String]) -> Result<serde_json::Map<String, Value>> {
    variables
        .iter()
        .map(|variable| {
            let (name, value) = variable
                .split_once('=')
                .with_context(|| format!("invalid variable '{variable}', expected 'name=value'"))?;
            let value = serde_json::from_str(value)
                .unwrap_or_else(|_| Value::String(value.to_string()));

            Ok((name.to_string(), value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn it_parses_headers() {
        assert_eq!(
            parse_headers(&["Authorization: Bearer x".to_string()]).unwrap(),
            vec![("Authorization".to_string(), "Bearer x".to_string())]
        );
        assert!(parse_headers(&["nonsense".to_string()]).is_err());
    }

    #[test]
    fn it_parses_variables() {
        let variables = parse_variables(&[
            "count=5".to_string(),
            "name=mys".to_string(),
            "flags=[1, 2]".to_string(),
        ])
        .unwrap();

        assert_eq!(variables["count"], json!(5));
        assert_eq!(variables["name"], json!("mys"));
        assert_eq!(variables["flags"], json!([1, 2]));
        assert!(parse_variables(&["nonsense".to_string()]).is_err());
    }
}
