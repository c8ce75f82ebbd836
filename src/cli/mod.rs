//! TL-014: CLI subcommands — init, validate, render, graph.

use crate::core::{emitter, injector::Injector, parser, resolver, stack, types};
use clap::Subcommand;
use std::path::{Path, PathBuf};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new telar stack
    Init {
        /// Directory to initialize (default: current)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Validate telar.yaml without rendering
    Validate {
        /// Path to telar.yaml
        #[arg(short, long, default_value = "telar.yaml")]
        file: PathBuf,
    },

    /// Render a resource's manifests as a document stream
    Render {
        /// Path to telar.yaml
        #[arg(short, long, default_value = "telar.yaml")]
        file: PathBuf,

        /// Resource to render
        #[arg(short, long)]
        resource: String,

        /// Output format: yaml or json
        #[arg(long, default_value = "yaml")]
        format: String,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Print the stream's BLAKE3 digest to stderr
        #[arg(long)]
        fingerprint: bool,
    },

    /// Show declared resources and their dependencies
    Graph {
        /// Path to telar.yaml
        #[arg(short, long, default_value = "telar.yaml")]
        file: PathBuf,

        /// Resolve one resource and show its document stats
        #[arg(short, long)]
        resource: Option<String>,
    },
}

/// Dispatch a CLI command.
pub fn dispatch(cmd: Commands) -> Result<(), String> {
    match cmd {
        Commands::Init { path } => cmd_init(&path),
        Commands::Validate { file } => cmd_validate(&file),
        Commands::Render {
            file,
            resource,
            format,
            out,
            fingerprint,
        } => cmd_render(&file, &resource, &format, out.as_deref(), fingerprint),
        Commands::Graph { file, resource } => cmd_graph(&file, resource.as_deref()),
    }
}

fn cmd_init(path: &Path) -> Result<(), String> {
    let config_path = path.join("telar.yaml");
    if config_path.exists() {
        return Err(format!("{} already exists", config_path.display()));
    }

    let template = r#"version: "1.0"
name: my-stack
description: "Rendered by telar"

values:
  replicas: 2

resources:
  web:
    type: workload
    image: nginx:1.27
    replicas: "{{values.replicas}}"
    port: 8080

  web-svc:
    type: exposure
    backend: web
    port: 80
    depends_on: [web]
"#;
    std::fs::write(&config_path, template)
        .map_err(|e| format!("cannot write {}: {}", config_path.display(), e))?;

    println!("Initialized telar stack at {}", path.display());
    println!("  Created: {}", config_path.display());
    Ok(())
}

fn cmd_validate(file: &Path) -> Result<(), String> {
    let config = parser::parse_config_file(file)?;
    let errors = parser::validate_config(&config);

    if errors.is_empty() {
        println!("OK: {} ({} resources)", config.name, config.resources.len());
        Ok(())
    } else {
        for e in &errors {
            eprintln!("  ERROR: {}", e);
        }
        Err(format!("{} validation error(s)", errors.len()))
    }
}

/// Parse and validate a stack file, returning errors if invalid.
fn parse_and_validate(file: &Path) -> Result<types::StackConfig, String> {
    let config = parser::parse_config_file(file)?;
    let errors = parser::validate_config(&config);
    if errors.is_empty() {
        return Ok(config);
    }
    for e in &errors {
        eprintln!("  ERROR: {}", e);
    }
    Err("validation failed".to_string())
}

/// Build the injector for a stack file: its values become the configuration,
/// its resources become rules.
fn build_injector(config: types::StackConfig) -> Result<Injector, String> {
    let values = config.values.clone();
    stack::module(config)(Injector::new(values))
}

fn cmd_render(
    file: &Path,
    resource: &str,
    format: &str,
    out: Option<&Path>,
    fingerprint: bool,
) -> Result<(), String> {
    let config = parse_and_validate(file)?;
    let injector = build_injector(config)?;
    let resolved = resolver::get_resource(&injector, resource).map_err(|e| e.to_string())?;

    let stream = match format {
        "yaml" => emitter::to_yaml_stream(&resolved.manifests)?,
        "json" => emitter::to_json_stream(&resolved.manifests)?,
        other => return Err(format!("unknown format '{}' (expected yaml or json)", other)),
    };

    match out {
        Some(path) => {
            std::fs::write(path, &stream)
                .map_err(|e| format!("cannot write {}: {}", path.display(), e))?;
            println!(
                "Rendered {} document(s) to {}",
                resolved.manifests.len(),
                path.display()
            );
        }
        None => print!("{}", stream),
    }

    if fingerprint {
        eprintln!("{}", emitter::stream_digest(&stream));
    }

    Ok(())
}

fn cmd_graph(file: &Path, resource: Option<&str>) -> Result<(), String> {
    let config = parse_and_validate(file)?;

    match resource {
        None => {
            println!("Stack: {} ({} resources)", config.name, config.resources.len());
            println!();
            for (id, decl) in &config.resources {
                if decl.depends_on.is_empty() {
                    println!("  {} ({})", id, decl.resource_type);
                } else {
                    println!(
                        "  {} ({}) <- {}",
                        id,
                        decl.resource_type,
                        decl.depends_on.join(", ")
                    );
                }
            }
            Ok(())
        }
        Some(key) => {
            let deps = config
                .resources
                .get(key)
                .map(|decl| decl.depends_on.clone())
                .unwrap_or_default();
            let injector = build_injector(config)?;
            let resolved = resolver::get_resource(&injector, key).map_err(|e| e.to_string())?;
            let stream = emitter::to_yaml_stream(&resolved.manifests)?;

            println!("Resource: {}", key);
            if !deps.is_empty() {
                println!("  Depends on: {}", deps.join(", "));
            }
            println!("  Documents: {}", resolved.manifests.len());
            println!("  Digest: {}", emitter::stream_digest(&stream));
            Ok(())
        }
    }
}
