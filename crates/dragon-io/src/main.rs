use clap::Parser;
use dragon_io::cli::{run_command, Cli, Commands};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn,dragon_core=info,dragon_graphs=info,dragon_sampler=info,dragon_io=info";
const VERBOSE_FILTER: &str = "warn,dragon_core=debug,dragon_graphs=debug,dragon_sampler=debug,dragon_io=debug";

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let verbose = match &cli.command {
        Commands::Run(args) => args.verbose,
    };

    // RUST_LOG takes precedence over --verbose
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER })),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run(args) => run_command(args)?,
    }

    Ok(())
}
