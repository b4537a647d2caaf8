use clap::{Parser, Subcommand};
use folio_prep::annotate::{self, AnnotateError, AnnotateOptions};
use folio_prep::config::{self, PrepConfig};
use folio_prep::{bundle, output};
use std::path::PathBuf;

/// Flags for the dimension job.
#[derive(clap::Args, Clone)]
struct DimensionArgs {
    /// Content root to rewrite [config: annotate.root]
    #[arg(long)]
    root: Option<PathBuf>,

    /// Directory image sources resolve against [config: annotate.image_base]
    #[arg(long)]
    image_base: Option<PathBuf>,

    /// Report what would change without writing files
    #[arg(long)]
    dry_run: bool,
}

/// Flags for the bundle job.
#[derive(clap::Args, Clone)]
struct BundleArgs {
    /// Content directory to embed [config: bundle.source]
    #[arg(long)]
    source: Option<PathBuf>,

    /// Generated script path [config: bundle.output]
    #[arg(long)]
    output: Option<PathBuf>,

    /// Global the table is assigned to [config: bundle.global_name]
    #[arg(long = "global")]
    global_name: Option<String>,
}

#[derive(Parser)]
#[command(name = "folio-prep")]
#[command(about = "Build helpers for a Markdown portfolio site")]
#[command(long_about = "\
Build helpers for a Markdown portfolio site

  dimensions  Add width/height to every local image referenced from
              Markdown, converting ![alt](src) to <img> tags. Files are
              only rewritten when something changed; running it twice is
              a no-op.
  bundle      Embed all Markdown in one script that installs
              window.projectsContent when the site is opened from disk.

Image sources resolve against the working directory: src=\"/pics/a.png\"
is read from ./pics/a.png.

Settings come from prep.toml in the working directory if present.
Run 'folio-prep gen-config' to print a documented one.")]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(long, default_value = config::CONFIG_FILENAME, global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add explicit pixel dimensions to image references
    Dimensions(DimensionArgs),
    /// Generate the offline content bundle
    Bundle(BundleArgs),
    /// Run dimensions, then bundle the updated content
    Build {
        #[command(flatten)]
        dimensions: DimensionArgs,
        #[command(flatten)]
        bundle: BundleArgs,
    },
    /// Print a stock prep.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Dimensions(args) => {
            let config = config::load_config(&cli.config)?;
            run_dimensions(&config, args);
        }
        Command::Bundle(args) => {
            let config = config::load_config(&cli.config)?;
            run_bundle(&config, args)?;
        }
        Command::Build { dimensions, bundle } => {
            let config = config::load_config(&cli.config)?;
            run_dimensions(&config, dimensions);
            run_bundle(&config, bundle)?;
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// A missing root ends the job early but is not a process failure.
fn run_dimensions(config: &PrepConfig, args: DimensionArgs) {
    let options = AnnotateOptions {
        root: args.root.unwrap_or_else(|| config.annotate.root.clone()),
        image_base: args
            .image_base
            .unwrap_or_else(|| config.annotate.image_base.clone()),
        extensions: config.content.extensions.clone(),
        dry_run: args.dry_run,
    };

    println!("{}", output::format_annotate_header(&options.root, options.dry_run));
    match annotate::annotate(&options) {
        Ok(summary) => output::print_annotate_output(&summary),
        Err(e @ AnnotateError::RootNotFound(_)) => println!("{e}"),
    }
}

fn run_bundle(config: &PrepConfig, args: BundleArgs) -> Result<(), Box<dyn std::error::Error>> {
    let source = args.source.unwrap_or_else(|| config.bundle.source.clone());
    let output_path = args.output.unwrap_or_else(|| config.bundle.output.clone());
    let global_name = args
        .global_name
        .unwrap_or_else(|| config.bundle.global_name.clone());
    if !config::is_js_identifier(&global_name) {
        return Err(format!("--global must be a JavaScript identifier: {global_name:?}").into());
    }

    println!("==> Bundling {}", source.display());
    let report = bundle::bundle(
        &source,
        &output_path,
        &config.content.extensions,
        &global_name,
    )?;
    output::print_bundle_output(&report);
    Ok(())
}
