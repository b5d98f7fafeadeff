use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use schema_customization::Configuration;
use schema_customization::IntrospectionSchema;
use schema_customization::SchemaCustomizer;
use schema_customization::json_ext::Value;
use tracing_subscriber::EnvFilter;

/// CLI arguments. See <https://docs.rs/clap/latest/clap/_derive/index.html>
#[derive(Parser)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Prints the output type definitions derived from an introspection result
    Customize {
        /// The path to the introspection result, or `-` for stdin
        introspection: PathBuf,
        /// The path to a YAML configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// A remote object type sourced as nodes, in addition to the configured ones
        #[arg(long = "node-type")]
        node_types: Vec<String>,
    },
    /// Prints the JSON schema of the configuration file
    ConfigSchema,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    match args.command {
        Command::Customize {
            introspection,
            config,
            node_types,
        } => {
            let output = customize(&introspection, config.as_deref(), node_types)?;
            println!("{output}");
        }
        Command::ConfigSchema => {
            println!(
                "{}",
                serde_json::to_string_pretty(&Configuration::json_schema())?
            );
        }
    }
    Ok(())
}

fn read_input(input_path: &Path) -> anyhow::Result<String> {
    if input_path == Path::new("-") {
        io::read_to_string(io::stdin()).context("could not read stdin")
    } else {
        fs::read_to_string(input_path)
            .with_context(|| format!("could not read {}", input_path.display()))
    }
}

fn customize(
    introspection_path: &Path,
    config_path: Option<&Path>,
    node_types: Vec<String>,
) -> anyhow::Result<String> {
    let mut configuration = match config_path {
        Some(path) => Configuration::from_yaml(&fs::read_to_string(path)?)
            .with_context(|| format!("invalid configuration {}", path.display()))?,
        None => Configuration::default(),
    };
    configuration.node_types.extend(node_types);

    let schema = IntrospectionSchema::from_json(&read_input(introspection_path)?)?;
    // resolvers are never run here, there is no node to look up
    let no_nodes = |_: &str, _: &str| -> Option<Value> { None };
    let customizer = SchemaCustomizer::from_configuration(&configuration, Arc::new(no_nodes));
    let customizations = customizer.customize_schema(&schema)?;
    tracing::debug!(types = customizations.len(), "rendering customizations");

    Ok(customizations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n\n"))
}
