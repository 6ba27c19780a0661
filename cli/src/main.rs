//! errforge CLI — render error types declared in a JSON catalog.
//!
//! # Commands
//! ```text
//! errforge render --catalog <FILE> --type <NAME> [--cause <MSG>]... [ARGS]...
//! errforge tree   --catalog <FILE>
//! ```
//!
//! Message arguments come last; everything after the first one is passed
//! through untouched, including values that look like flags.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use errforge_core::{Catalog, ErrorType, FormatArg, Message};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "errforge",
    about = "Render hierarchical error types from a JSON catalog",
    long_about = "
errforge CLI: instantiate error types declared in a JSON catalog and print
them, or print the type hierarchy.

ENVIRONMENT VARIABLES:
  RUST_LOG         Log filter (e.g. errforge_core=debug)
  RUST_BACKTRACE   Set to 1 to include a backtrace in --inspect output
",
    version
)]
struct Cli {
    /// Log factory activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Instantiate a type and print it
    Render {
        /// JSON catalog of error types
        #[arg(long)]
        catalog: PathBuf,
        /// Type to instantiate
        #[arg(long = "type")]
        type_name: String,
        /// Attach a cause; repeatable, applied in order
        #[arg(long = "cause")]
        causes: Vec<String>,
        /// Print the debug rendering instead
        #[arg(long)]
        inspect: bool,
        /// Message arguments; integers are passed as numbers
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Print the type hierarchy
    Tree {
        /// JSON catalog of error types
        #[arg(long)]
        catalog: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Render {
            catalog,
            type_name,
            causes,
            inspect,
            args,
        } => cmd_render(&catalog, &type_name, &causes, inspect, &args),
        Commands::Tree { catalog } => cmd_tree(&catalog),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_catalog(path: &Path) -> Result<Catalog> {
    let catalog = Catalog::from_file(path)
        .with_context(|| format!("loading catalog {}", path.display()))?;
    tracing::debug!(path = %path.display(), types = catalog.len(), "catalog loaded");
    Ok(catalog)
}

fn cmd_render(
    catalog_path: &Path,
    type_name: &str,
    causes: &[String],
    inspect: bool,
    args: &[String],
) -> Result<()> {
    let catalog = load_catalog(catalog_path)?;
    let ty = catalog
        .get(type_name)
        .with_context(|| format!("no error type named \"{type_name}\" in catalog"))?;

    let mut err = ty.construct(args.iter().map(|a| parse_arg(a)))?;
    for cause in causes {
        err.attach_cause(Message::new(cause.as_str()));
    }

    if inspect {
        println!("{}", err.inspect());
    } else {
        println!("{err}");
        let lineage: Vec<_> = ty.ancestors().map(ErrorType::name).collect();
        println!("  Lineage: {}", lineage.join(" -> "));
    }
    Ok(())
}

fn cmd_tree(catalog_path: &Path) -> Result<()> {
    let catalog = load_catalog(catalog_path)?;
    print_subtree(&catalog, catalog.root(), 0);
    Ok(())
}

fn print_subtree(catalog: &Catalog, ty: &ErrorType, indent: usize) {
    if ty.default_message().is_empty() {
        println!("{:indent$}{}", "", ty.name());
    } else {
        println!("{:indent$}{} ({:?})", "", ty.name(), ty.default_message());
    }
    for child in catalog.children_of(ty) {
        print_subtree(catalog, child, indent + 2);
    }
}

fn parse_arg(raw: &str) -> FormatArg {
    raw.parse::<i64>()
        .map(FormatArg::Int)
        .unwrap_or_else(|_| FormatArg::Str(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn render_args(cli: Cli) -> (bool, Vec<String>, Vec<String>) {
        match cli.command {
            Commands::Render { args, causes, .. } => (cli.verbose, causes, args),
            other => panic!("expected render, got {other:?}"),
        }
    }

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flag_like_message_arguments_are_kept() {
        let cli = Cli::try_parse_from([
            "errforge", "render", "--catalog", "errors.json", "--type", "ConfigError",
            "flag %s missing", "-v",
        ])
        .unwrap();
        let (verbose, _, args) = render_args(cli);
        assert!(!verbose);
        assert_eq!(args, ["flag %s missing", "-v"]);

        let cli = Cli::try_parse_from([
            "errforge", "render", "--catalog", "errors.json", "--type", "ConfigError",
            "unknown option %s", "--force",
        ])
        .unwrap();
        let (_, _, args) = render_args(cli);
        assert_eq!(args, ["unknown option %s", "--force"]);
    }

    #[test]
    fn double_dash_separates_message_arguments() {
        let cli = Cli::try_parse_from([
            "errforge", "render", "--catalog", "errors.json", "--type", "E", "--", "--cause",
        ])
        .unwrap();
        let (_, causes, args) = render_args(cli);
        assert!(causes.is_empty());
        assert_eq!(args, ["--cause"]);
    }

    #[test]
    fn verbose_is_global_and_causes_repeat() {
        let cli = Cli::try_parse_from([
            "errforge", "-v", "render", "--catalog", "errors.json", "--type", "E",
            "--cause", "first", "--cause", "second", "top",
        ])
        .unwrap();
        let (verbose, causes, args) = render_args(cli);
        assert!(verbose);
        assert_eq!(causes, ["first", "second"]);
        assert_eq!(args, ["top"]);
    }

    #[test]
    fn integers_become_numbers() {
        assert_eq!(parse_arg("42"), FormatArg::Int(42));
        assert_eq!(parse_arg("-v"), FormatArg::Str("-v".into()));
    }
}
