//! cmdf CLI - Expand chart command files
//!
//! ```bash
//! cmdf lines field.cmdf --cases 3        # Loaded lines after $NUM_CASES substitution
//! cmdf expand field.cmdf --cases 3       # Fully expanded directive stream
//! cmdf defines field.cmdf --cases 3      # Derived-definition table
//! cmdf charts field.cmdf --xrange 0:3650 # Renderer document (JSON)
//! ```
//!
//! `CMDF_NUM_CASES`, `CMDF_ON_ERROR` and `CMDF_XRANGE` (also read from a
//! `.env` file) supply defaults for the flags.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use cmdf::{logs, CommandFile, EngineOptions, ErrorPolicy, ENV_XRANGE};

#[derive(Parser)]
#[command(name = "cmdf")]
#[command(about = "Expand chart command files into charts and derived quantities", long_about = None)]
struct Cli {
    /// Don't echo diagnostics to stderr
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct EngineArgs {
    /// Command file
    input: PathBuf,

    /// Number of loaded datasets (default: $CMDF_NUM_CASES or 1)
    #[arg(short = 'n', long)]
    cases: Option<usize>,

    /// Report failing statements and continue instead of stopping
    #[arg(long)]
    skip_errors: bool,
}

impl EngineArgs {
    fn options(&self) -> EngineOptions {
        let mut options = EngineOptions::from_env();
        if let Some(cases) = self.cases {
            options.num_datasets = cases;
        }
        if self.skip_errors {
            options.on_error = ErrorPolicy::Skip;
        }
        options
    }

    fn load(&self) -> Result<CommandFile, Box<dyn std::error::Error>> {
        Ok(CommandFile::from_path(&self.input, &self.options())?)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show the loaded lines after $NUM_CASES substitution
    Lines {
        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Show the fully expanded directive stream
    Expand {
        #[command(flatten)]
        engine: EngineArgs,

        /// Print statements as JSON instead of command lines
        #[arg(long)]
        json: bool,
    },

    /// Show the derived-definition table
    Defines {
        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Build charts and write the renderer document
    Charts {
        #[command(flatten)]
        engine: EngineArgs,

        /// X-range shared by every chart (default: $CMDF_XRANGE)
        #[arg(short, long)]
        xrange: Option<String>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    if cli.quiet {
        logs::set_echo(false);
    }

    let result = match cli.command {
        Commands::Lines { engine } => cmd_lines(&engine),
        Commands::Expand { engine, json } => cmd_expand(&engine, json),
        Commands::Defines { engine } => cmd_defines(&engine),
        Commands::Charts {
            engine,
            xrange,
            output,
        } => cmd_charts(&engine, xrange, output.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_lines(engine: &EngineArgs) -> Result<(), Box<dyn std::error::Error>> {
    let file = engine.load()?;
    for line in file.lines() {
        println!("{:>5}  {}", line.number, line.text);
    }
    Ok(())
}

fn cmd_expand(engine: &EngineArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let file = engine.load()?;

    if json {
        println!("{}", serde_json::to_string_pretty(file.statements())?);
    } else {
        for line in file.processed_lines() {
            println!("{}", line);
        }
    }

    if !file.skipped().is_empty() {
        eprintln!("⚠️  {} statement(s) skipped", file.skipped().len());
    }
    Ok(())
}

fn cmd_defines(engine: &EngineArgs) -> Result<(), Box<dyn std::error::Error>> {
    let file = engine.load()?;
    for (i, def) in file.derived().iter().enumerate() {
        println!("{:>4}  {}  {}  {}", i, def.name, def.expression, def.unit);
    }
    Ok(())
}

fn cmd_charts(
    engine: &EngineArgs,
    xrange: Option<String>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = engine.load()?;
    let x_range = xrange
        .or_else(|| std::env::var(ENV_XRANGE).ok())
        .unwrap_or_default();

    let doc = file.render_document(&x_range)?;
    let json = serde_json::to_string_pretty(&doc)?;
    write_output(&json, output)?;

    if !doc.skipped.is_empty() {
        eprintln!("⚠️  {} chart statement(s) skipped", doc.skipped.len());
    }
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
