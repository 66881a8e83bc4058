use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{Generator, generate};
use colored::Colorize;
use fsstate::cli::{Cli, Commands};
use fsstate::output::{self, Verbosity};
use fsstate::{FsStateContext, commands, logging};
use std::io;
use std::process;

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e:#}", "Error:".red().bold());
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);
    output::set_verbosity(verbosity);

    if let Commands::Completion { shell } = cli.command {
        print_completions(shell, &mut Cli::command());
        return Ok(());
    }

    let mut ctx = FsStateContext::new(cli.config, cli.state)?;
    if let Err(e) = logging::init_logging(verbosity, &ctx.config.logging.level) {
        output::warning(&format!("Logging disabled: {e}"));
    }

    match cli.command {
        Commands::Dump { type_id, short } => {
            commands::dump::execute(&ctx, type_id.as_deref(), short)?;
        }
        Commands::Stats => commands::stats::execute(&ctx)?,
        Commands::Reset { force } => commands::reset::execute(&ctx, force)?,
        Commands::Config { key, value, list } => {
            commands::config::execute(&mut ctx, key.as_deref(), value, list)?;
        }
        Commands::Completion { .. } => {}
    }

    Ok(())
}

fn print_completions<G: Generator>(generator: G, cmd: &mut clap::Command) {
    generate(
        generator,
        cmd,
        cmd.get_name().to_string(),
        &mut io::stdout(),
    );
}
