use std::{path::PathBuf, time::Duration};

use clap::{builder::ArgAction, Parser, Subcommand};
use console::{style, Emoji};
use errors::PaperlinkCliError;
use paperlink::{
  doi::Doi, format, LookupResult, MirrorResolver, ProtocolRelative, ResolverConfig,
};
use tracing::{debug, trace};
use tracing_subscriber::EnvFilter;

pub mod errors;

static LOOKING_GLASS: Emoji<'_, '_> = Emoji("🔍 ", "");
static GLOBE: Emoji<'_, '_> = Emoji("🌐 ", "");
static PAPER: Emoji<'_, '_> = Emoji("📄 ", "");
static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");
static WARNING: Emoji<'_, '_> = Emoji("⚠️  ", "");
static SUCCESS: Emoji<'_, '_> = Emoji("✨ ", "");

#[derive(Parser)]
#[command(author, version, about = "Find PDF links for DOIs through a list of mirror sites")]
struct Cli {
  /// Verbose mode (-v, -vv, -vvv)
  #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true,
        help = "Increase logging verbosity"
    )]
  verbose: u8,

  /// Mirror base URL to use instead of the built-in list (repeat to give several, in order)
  #[arg(long = "mirror", value_name = "URL", global = true)]
  mirrors: Vec<String>,

  /// Per-mirror request timeout in seconds
  #[arg(
        long,
        value_name = "SECS",
        global = true,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
  timeout: Option<u64>,

  /// Return `//host/path` PDF links unchanged instead of upgrading them to https
  #[arg(long, global = true)]
  keep_protocol_relative: bool,

  /// Answer every prompt with its default
  #[arg(long, global = true)]
  accept_defaults: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Find the PDF link for a DOI
  Resolve {
    /// DOI, `doi:` string, or doi.org URL
    identifier: String,
    /// Print the result as JSON
    #[arg(long)]
    json:       bool,
  },
  /// Find the PDF for a DOI and save it
  Download {
    /// DOI, `doi:` string, or doi.org URL
    identifier: String,
    /// Directory to save into (defaults to the user's download directory)
    #[arg(long, short)]
    dir:        Option<PathBuf>,
  },
  /// List the mirrors that will be asked, in order
  Mirrors,
}

/// Setup logging with the specified verbosity level
fn setup_logging(verbosity: u8) {
  let filter = match verbosity {
    0 => "warn",
    1 => "info",
    2 => "debug",
    _ => "trace",
  };

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_file(true)
    .with_line_number(true)
    .with_target(true)
    .init();
}

/// Builds the resolver settings from the global flags.
fn resolver_config(cli: &Cli) -> ResolverConfig {
  let mut config = ResolverConfig::default();
  if !cli.mirrors.is_empty() {
    config = config.with_mirrors(cli.mirrors.iter().cloned());
  }
  if let Some(secs) = cli.timeout {
    config = config.with_timeout(Duration::from_secs(secs));
  }
  if cli.keep_protocol_relative {
    config = config.with_protocol_relative(ProtocolRelative::Keep);
  }
  config
}

/// Prints a found PDF link and its metadata.
fn print_found(found: &LookupResult) {
  println!("\n{} Found PDF:", style(SUCCESS).green());
  println!("   {} {}", style("PDF URL:").green().bold(), style(&found.pdf_url).blue().underlined());
  match &found.title {
    Some(title) => println!("   {} {}", style("Title:").green().bold(), style(title).white()),
    None => println!("   {} {}", style("Title:").green().bold(), style("unknown").red().italic()),
  }
  println!("   {} {}", style("Mirror:").green().bold(), style(&found.mirror).cyan());
}

/// Prints the "nothing found" notice.
fn print_not_found(doi: &Doi) {
  println!(
    "{} PDF not found on any mirror for: {}",
    style(WARNING).yellow(),
    style(doi).yellow()
  );
}

#[tokio::main]
async fn main() -> Result<(), PaperlinkCliError> {
  let cli = Cli::parse();
  setup_logging(cli.verbose);

  let config = resolver_config(&cli);
  trace!("Resolver config: {:?}", config);

  match cli.command {
    Commands::Resolve { ref identifier, json } => {
      let doi = Doi::parse(identifier)?;
      let resolver = MirrorResolver::with_config(config)?;

      if !json {
        println!("{} Looking up: {}", style(LOOKING_GLASS).cyan(), style(&doi).yellow());
      }

      let found = resolver.resolve(doi.as_str()).await;
      debug!("Lookup result: {:?}", found);

      if json {
        println!("{}", serde_json::to_string_pretty(&found)?);
        return Ok(());
      }

      match found {
        Some(found) => print_found(&found),
        None => print_not_found(&doi),
      }
      Ok(())
    },

    Commands::Download { ref identifier, ref dir } => {
      let doi = Doi::parse(identifier)?;
      let resolver = MirrorResolver::with_config(config)?;

      println!("{} Looking up: {}", style(LOOKING_GLASS).cyan(), style(&doi).yellow());

      let Some(found) = resolver.resolve(doi.as_str()).await else {
        print_not_found(&doi);
        return Ok(());
      };
      print_found(&found);

      let dir = dir
        .clone()
        .unwrap_or_else(|| dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")));
      let path = dir.join(format::pdf_filename(found.title.as_deref(), doi.as_str()));

      if path.exists() {
        println!(
          "\n{} File already exists: {}",
          style(WARNING).yellow(),
          style(path.display()).yellow()
        );

        let overwrite = !cli.accept_defaults
          && dialoguer::Confirm::new()
            .with_prompt("Do you want to overwrite it?")
            .default(false)
            .interact()?;

        if !overwrite {
          println!("{} Keeping existing file", style("ℹ").blue());
          return Ok(());
        }
      }

      println!("\n{} Downloading to: {}", style(PAPER).cyan(), style(path.display()).yellow());
      let written = resolver.download(&found, &path).await?;
      println!(
        "{} Saved {} bytes to {}",
        style(SAVE).green(),
        style(written).yellow(),
        style(path.display()).yellow()
      );
      Ok(())
    },

    Commands::Mirrors => {
      println!("{} Mirrors, in lookup order:", style(GLOBE).cyan());
      for (i, mirror) in config.mirrors.iter().enumerate() {
        println!("   {}. {}", style(i + 1).yellow(), style(mirror).white());
      }
      Ok(())
    },
  }
}
