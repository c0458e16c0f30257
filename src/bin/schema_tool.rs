//! Schema Tool CLI
//!
//! Parses, renders, fingerprints and projects schema files.

use std::path::PathBuf;

use clap::{Parser as ClapParser, Subcommand};
use familiar_avro::graph::{format_field_path, load_file, schema_files, LoadConfig};
use familiar_avro::render::render;
use familiar_avro::{apply_aliases, Fingerprint, OutputFormat, Parser, SchemaConfig, TypeGraph};
use similar::{ChangeTag, TextDiff};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "schema-tool")]
#[command(about = "Parse, render and project Avro schemas")]
struct Cli {
    /// Config file (defaults to schemas.toml lookup)
    #[arg(short, long)]
    config: Option<String>,

    /// Write compact single-line output
    #[arg(long)]
    compact: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse schema files; directories are searched for .avsc files.
    /// Later files may use types defined by earlier ones.
    Check {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Render a schema file
    Render {
        file: PathBuf,
        /// Parsing Canonical Form
        #[arg(long)]
        canonical: bool,
    },

    /// Print SHA-256 and CRC-64-AVRO fingerprints
    Fingerprint { file: PathBuf },

    /// Rename the actual schema's types and fields to the expected schema's names
    Project {
        /// Schema the data was written with
        #[arg(short, long)]
        actual: PathBuf,
        /// Schema the reader expects
        #[arg(short, long)]
        expected: PathBuf,
    },

    /// List named types that reference themselves, directly or not.
    /// A directory is loaded as one set of schemas.
    Recursive { path: PathBuf },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = SchemaConfig::load_from(cli.config.as_deref())?;
    let format = if cli.compact {
        OutputFormat::Compact
    } else {
        config.render.output_format
    };
    let mut parser = Parser::with_config(&config.parser);

    match cli.command {
        Commands::Check { paths } => {
            let files = schema_files(&paths, &LoadConfig::default());
            if files.is_empty() {
                return Err("No schema files found".into());
            }

            let mut failures = 0;
            for file in &files {
                match load_file(&mut parser, file) {
                    Ok(schema) => println!("✅ {} ({})", file.display(), schema.fullname()),
                    Err(e) => {
                        failures += 1;
                        println!("❌ {:#}", e);
                    }
                }
            }

            println!();
            println!(
                "{} files, {} named types, {} failed",
                files.len(),
                parser.registry().len(),
                failures
            );
            if failures > 0 {
                std::process::exit(1);
            }
            Ok(())
        }

        Commands::Render { file, canonical } => {
            let schema = load_file(&mut parser, &file)?;
            if canonical {
                println!("{}", schema.canonical_form());
            } else {
                println!("{}", render(&schema, format));
            }
            Ok(())
        }

        Commands::Fingerprint { file } => {
            let schema = load_file(&mut parser, &file)?;
            let fingerprint = Fingerprint::of(&schema);
            println!("sha256:  {}", fingerprint.sha256);
            println!("rabin64: {:016x}", fingerprint.rabin64);
            Ok(())
        }

        Commands::Project { actual, expected } => {
            // separate sessions: both files usually define the same names
            let actual = load_file(&mut parser, &actual)?;
            let expected = load_file(&mut Parser::with_config(&config.parser), &expected)?;

            let projected = apply_aliases(&actual, &expected);
            println!("{}", render(&projected, format));

            let before = render(&actual, OutputFormat::Pretty);
            let after = render(&projected, OutputFormat::Pretty);
            let diff = TextDiff::from_lines(&before, &after);
            let mut renamed = false;
            for change in diff.iter_all_changes() {
                let sign = match change.tag() {
                    ChangeTag::Delete => "-",
                    ChangeTag::Insert => "+",
                    ChangeTag::Equal => continue,
                };
                if !renamed {
                    eprintln!();
                    eprintln!("Renamed:");
                    renamed = true;
                }
                eprint!("{}{}", sign, change);
            }
            if !renamed {
                eprintln!("No aliases applied");
            }
            Ok(())
        }

        Commands::Recursive { path } => {
            let graph = if path.is_dir() {
                TypeGraph::from_directory(&mut parser, &path)?
            } else {
                TypeGraph::from_schema(&load_file(&mut parser, &path)?)
            };
            info!(types = graph.type_count(), "analyzing recursion");
            let recursion = graph.recursion();
            if recursion.groups.is_empty() {
                println!("No recursive types");
            }
            for group in &recursion.groups {
                println!("{}", group.members.join(", "));
                for edge in &group.edges {
                    println!(
                        "   └─ {}{} -> {}",
                        edge.from_type,
                        format_field_path(&edge.field_path),
                        edge.to_type
                    );
                }
            }
            Ok(())
        }
    }
}
