//! RESTCONF request translator
//!
//! Translates one RESTCONF request into the selector or edit document the
//! datastore would receive, and prints it.
//!
//! Usage:
//!   cargo run --example translate -- --schema jukebox.json --method GET \
//!       --uri /restconf/data/example-jukebox:jukebox/library/artist=Foo%20Fighters
//!
//! Set RUST_LOG=restconf_path=trace to follow the translation segment by segment.

use clap::Parser;
use restconf_path::handler::Translation;
use restconf_path::restconf_types::{Method, Request};
use restconf_path::{GatewayConfig, MediaType, RequestHandler, SchemaFile};
use std::fs;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "restconf-translate")]
#[command(about = "Translate a RESTCONF request into an XPath selector or edit document")]
struct Args {
    /// Path to the schema file (list keys and namespaces, JSON)
    #[arg(short, long)]
    schema: String,

    /// Gateway configuration file (JSON)
    #[arg(short, long)]
    config: Option<String>,

    /// Request method
    #[arg(short, long, default_value = "GET")]
    method: String,

    /// Request URI, e.g. /restconf/data/module:container/list=key
    #[arg(short, long)]
    uri: String,

    /// Raw query string, without the leading '?'
    #[arg(short, long, default_value = "")]
    query: String,

    /// File holding the request body
    #[arg(short, long)]
    body: Option<String>,

    /// The body is XML rather than JSON
    #[arg(long)]
    xml: bool,

    /// Accept header
    #[arg(long)]
    accept: Option<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let schema = SchemaFile::from_file(&args.schema)?;
    let config = match &args.config {
        Some(path) => GatewayConfig::from_file(path)?,
        None => GatewayConfig::default(),
    };
    let method = Method::parse(&args.method.to_uppercase())
        .ok_or_else(|| format!("unknown method: {}", args.method))?;

    let mut request = Request::new(method, args.uri.as_str()).with_query(args.query.as_str());
    if let Some(path) = &args.body {
        let format = if args.xml { MediaType::Xml } else { MediaType::Json };
        request = request.with_body(fs::read_to_string(path)?, format);
    }
    if let Some(accept) = &args.accept {
        request = request.with_accept(accept.as_str());
    }

    let handler = RequestHandler::new(config, &schema);
    let translation = match handler.handle(&request) {
        Ok(translation) => translation,
        Err(e) => {
            let reply = handler.error_reply(&request, &e);
            println!("{}", reply.status);
            println!("Content-Type: {}", reply.media_type);
            println!();
            println!("{}", reply.body);
            return Err(e.into());
        }
    };

    match translation {
        Translation::ApiRoot { encoding } => println!("api root ({})", encoding),
        Translation::YangLibraryVersion { encoding } => {
            println!("yang-library-version ({})", encoding)
        }
        Translation::Options { allow } => {
            let names: Vec<&str> = allow.iter().map(|m| m.as_str()).collect();
            println!("Allow: {}", names.join(", "));
        }
        Translation::Select {
            method,
            xpath,
            query,
            encoding,
        } => {
            println!("{} {}", method, xpath);
            println!("reply encoding: {}", encoding);
            println!("query: {:?}", query);
        }
        Translation::Edit {
            operation,
            document,
            format,
            query,
            ..
        } => {
            println!("edit-config operation={:?} ({})", operation, format);
            println!("query: {:?}", query);
            println!("{}", document);
        }
        Translation::ListOperations { encoding } => println!("list operations ({})", encoding),
        Translation::Rpc { rpc, input, format, .. } => {
            println!("rpc {} ({})", rpc, format);
            println!("{}", input);
        }
    }
    Ok(())
}
