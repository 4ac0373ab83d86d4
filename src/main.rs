//! Launch Graph CLI
//!
//! Usage:
//!   launch-graph [OPTIONS] <LAUNCH_FILE> <OUTPUT_FILE> [NAME:=VALUE]...
//!
//! Options:
//!   --png                      Convert the dot file to a PNG with Graphviz
//!   -s, --stylesheet <FILE>    Color overrides (TOML format)
//!   -p, --package <NAME=PATH>  Resolve $(find NAME) to PATH without rospack
//!   --max-substitutions <N>    Substitution pass limit per attribute
//!   -h, --help                 Print help

use std::fs;
use std::path::{Path, PathBuf};
use std::process::exit;

use clap::Parser;

use launch_graph::rasterize::Rasterizer;
use launch_graph::substitution::DEFAULT_MAX_SUBSTITUTIONS;
use launch_graph::{
    render_file_with_config, write_dot, ChainLocator, DocumentError, ProcessEnvironment,
    Provenance, RenderConfig, RenderError, ResolveConfig, RospackLocator, StaticLocator,
    Stylesheet,
};

const EXIT_MISSING_INPUT: i32 = 1;
const EXIT_NOT_LAUNCH_FILE: i32 = 2;
const EXIT_PARSE_FAILED: i32 = 3;
const EXIT_EMIT_FAILED: i32 = 4;

#[derive(Parser)]
#[command(name = "launch-graph")]
#[command(about = "Create a Graphviz graph of a ROS launch file tree")]
struct Cli {
    /// Root launch file
    launch_file: PathBuf,

    /// Dot file to write
    output_file: PathBuf,

    /// Launch arguments as name:=value
    #[arg(value_parser = parse_argument)]
    args: Vec<(String, String)>,

    /// Convert the dot file into a PNG next to it
    #[arg(long)]
    png: bool,

    /// Stylesheet file for colors (TOML format)
    #[arg(short, long)]
    stylesheet: Option<PathBuf>,

    /// Package location used instead of rospack, as NAME=PATH
    #[arg(short, long = "package", value_parser = parse_package)]
    packages: Vec<(String, PathBuf)>,

    /// Maximum number of substitutions applied to one attribute
    #[arg(long, default_value_t = DEFAULT_MAX_SUBSTITUTIONS)]
    max_substitutions: usize,
}

fn parse_argument(text: &str) -> Result<(String, String), String> {
    ResolveConfig::parse_assignment(text)
        .ok_or_else(|| format!("expected NAME:=VALUE, got '{}'", text))
}

fn parse_package(text: &str) -> Result<(String, PathBuf), String> {
    match text.split_once('=') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => {
            Ok((name.to_string(), PathBuf::from(path)))
        }
        _ => Err(format!("expected NAME=PATH, got '{}'", text)),
    }
}

fn is_launch_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("launch"))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if !cli.launch_file.is_file() {
        eprintln!(
            "Error: launch file '{}' does not exist",
            cli.launch_file.display()
        );
        exit(EXIT_MISSING_INPUT);
    }

    if !is_launch_file(&cli.launch_file) {
        eprintln!(
            "Error: '{}' must be a .launch file",
            cli.launch_file.display()
        );
        exit(EXIT_NOT_LAUNCH_FILE);
    }

    // Load stylesheet
    let stylesheet = match &cli.stylesheet {
        Some(path) => match Stylesheet::from_file(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error loading stylesheet '{}': {}", path.display(), e);
                exit(EXIT_MISSING_INPUT);
            }
        },
        None => Stylesheet::default(),
    };

    let resolve = cli.args.iter().fold(
        ResolveConfig::new().with_max_substitutions(cli.max_substitutions),
        |config, (name, value)| config.with_argument(name, value),
    );
    let config = RenderConfig::new()
        .with_resolve(resolve)
        .with_stylesheet(stylesheet);

    let overrides = cli
        .packages
        .iter()
        .fold(StaticLocator::new(), |locator, (name, path)| {
            locator.with_package(name, path)
        });
    let locator = ChainLocator::new()
        .with(overrides)
        .with(RospackLocator::new());

    let (dot, diagnostics) = match render_file_with_config(
        &cli.launch_file,
        &locator,
        &ProcessEnvironment,
        &Provenance::now(),
        &config,
    ) {
        Ok(rendered) => rendered,
        Err(RenderError::Parse(e)) => {
            report_parse_error(&e);
            exit(EXIT_PARSE_FAILED);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(EXIT_EMIT_FAILED);
        }
    };

    if !diagnostics.is_empty() {
        eprintln!("{} element(s) were skipped:", diagnostics.len());
        for diagnostic in &diagnostics {
            eprintln!("  {}", diagnostic);
        }
    }

    if let Err(e) = write_dot(&cli.output_file, &dot) {
        eprintln!("Error: {}", e);
        exit(EXIT_EMIT_FAILED);
    }
    println!("Created dot file: {}", cli.output_file.display());

    if cli.png {
        let rasterizer = Rasterizer::new();
        match rasterizer.rasterize(&cli.output_file) {
            Ok(image) => println!("Created PNG file: {}", image.display()),
            Err(e) => eprintln!("Error: could not create PNG: {}", e),
        }
    }
}

/// Print a parse error, with source context for malformed markup
fn report_parse_error(error: &DocumentError) {
    match fs::read_to_string(error.path()) {
        Ok(source) => eprintln!("{}", error.format(&source).trim_end()),
        Err(_) => eprintln!("Error: {}", error),
    }
}

