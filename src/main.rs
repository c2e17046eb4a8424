//! Parchment - CLI

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use parchment::{logger, Catalog, Engine, EngineConfig, Map, Value, NAME, VERSION};
use std::path::{Path, PathBuf};

/// Tag-based template compiler
#[derive(Parser, Debug)]
#[command(name = "parchment")]
#[command(author = "Parchment Team")]
#[command(version = VERSION)]
#[command(about = NAME, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding compiled artifacts (overrides parchment.toml)
    #[arg(long, global = true, value_name = "DIR")]
    cache_dir: Option<PathBuf>,

    /// Fail on undefined names instead of rendering them as empty
    #[arg(long, global = true)]
    strict: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a template to stdout
    Render {
        /// Template source
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// JSON object whose entries become template data
        #[arg(short, long, value_name = "JSON")]
        data: Option<PathBuf>,

        /// JSON translation catalog for LANG lookups
        #[arg(short, long, value_name = "JSON")]
        locale: Option<PathBuf>,

        /// Extra binding; the value is parsed as JSON when possible
        #[arg(short, long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,

        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Compile templates into the cache, ignoring freshness
    Compile {
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },

    /// Compile every stale template under a directory
    Warm {
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },

    /// Remove every compiled artifact
    Clean,

    /// Print version information
    Version,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.verbose {
        logger::init_debug();
    } else {
        logger::init();
    }

    let mut config = EngineConfig::load();
    if let Some(dir) = &args.cache_dir {
        config = config.with_cache_dir(dir);
    }
    if args.strict {
        config = config.with_strict(true);
    }

    match args.command {
        Commands::Render {
            file,
            data,
            locale,
            set,
            output,
        } => {
            let mut builder = Engine::builder().config(config);
            if let Some(locale) = &locale {
                let catalog = Catalog::from_file(locale)
                    .with_context(|| format!("Failed to load locale: {}", locale.display()))?;
                builder = builder.translator(catalog);
            }
            let engine = builder.build();

            let mut template = engine.template(&file);
            if let Some(data) = &data {
                for (name, value) in read_data(data)? {
                    template.set(&name, value);
                }
            }
            for binding in &set {
                let (name, value) = parse_binding(binding)?;
                template.set(&name, value);
            }

            let html = template
                .output()
                .with_context(|| format!("Failed to render: {}", file.display()))?;
            match output {
                Some(path) => std::fs::write(&path, html)
                    .with_context(|| format!("Failed to write: {}", path.display()))?,
                None => print!("{}", html),
            }
        }
        Commands::Compile { files } => {
            let engine = Engine::new(config);
            for file in &files {
                let artifact = engine
                    .compile(file)
                    .with_context(|| format!("Failed to compile: {}", file.display()))?;
                eprintln!(
                    "{} {} -> {}",
                    "compiled".green().bold(),
                    file.display(),
                    artifact.display()
                );
            }
        }
        Commands::Warm { dir } => {
            let engine = Engine::new(config);
            let count = engine
                .warm(&dir)
                .with_context(|| format!("Failed to warm: {}", dir.display()))?;
            eprintln!(
                "{} {} template(s) into {}",
                "warmed".green().bold(),
                count,
                engine.cache().dir().display()
            );
        }
        Commands::Clean => {
            let engine = Engine::new(config);
            let removed = engine.cache().clear().context("Failed to clean cache")?;
            eprintln!(
                "{} {} artifact(s) from {}",
                "removed".yellow().bold(),
                removed,
                engine.cache().dir().display()
            );
        }
        Commands::Version => {
            println!("{} {}", NAME, VERSION);
        }
    }

    Ok(())
}

fn read_data(path: &Path) -> Result<Map> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read data: {}", path.display()))?;
    let json: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("Invalid JSON in {}", path.display()))?;
    match Value::from(json) {
        Value::Map(map) => Ok(map),
        other => bail!(
            "{} must hold a JSON object, found {}",
            path.display(),
            other.type_name()
        ),
    }
}

fn parse_binding(binding: &str) -> Result<(String, Value)> {
    let Some((name, raw)) = binding.split_once('=') else {
        bail!("expected KEY=VALUE, got `{}`", binding);
    };
    let value = serde_json::from_str::<serde_json::Value>(raw)
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(raw));
    Ok((name.trim().to_string(), value))
}
