use anyhow::{Context, Result};
use clap::Parser;
use hyperreal::cli::{self, Args};
use hyperreal::config::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    let mut config = Config::load();
    if let Some(max_denominator) = args.max_denominator {
        config.max_denominator = max_denominator;
    }
    let canon = config.canonicalizer()?;

    let value = cli::evaluate(&args, &canon)?;
    if args.st {
        println!("{}", cli::standard_part(&value));
    } else {
        println!("{value}");
    }

    if args.export {
        let file = args.file.unwrap_or(config.export_file);
        value
            .export_markdown(&file)
            .with_context(|| format!("could not export to {file}"))?;
        println!("This expression has been exported to {file}");
    }
    Ok(())
}
