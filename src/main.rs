use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use creature_brain::manager::Manager;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    #[arg(long)]
    work_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Init {
        #[arg(long, default_value_t = 1)]
        count: usize,

        #[arg(long)]
        seed: Option<u64>,
    },

    Mutate {
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        output: PathBuf,

        #[arg(long)]
        seed: Option<u64>,
    },

    Think,

    Clean,
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::info!("{args:#?}");

    let mgr = Manager::new(args.work_dir).context("failed to construct mgr")?;

    match args.command {
        Command::Init { count, seed } => mgr.init_weights(count, seed)?,
        Command::Mutate {
            input,
            output,
            seed,
        } => mgr.mutate_weights(input, output, seed)?,
        Command::Think => mgr.answer_ticks()?,
        Command::Clean => mgr.clean()?,
    }

    Ok(())
}
