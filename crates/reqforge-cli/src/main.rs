//! `reqforge` command-line front end

mod config;

use anyhow::{bail, Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use config::ServiceConfig;
use reqforge_core::Extractor;
use reqforge_jobs::{JobService, JobStatus, PollError};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

/// Exit code when polling gives up before the job finishes
const EXIT_POLL_TIMEOUT: u8 = 2;

fn cli() -> Command {
    let text_arg = || {
        Arg::new("text")
            .required(true)
            .help("Application description, or `-` to read standard input")
    };

    Command::new("reqforge")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Turn application descriptions into validated app specifications")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand(
            Command::new("extract")
                .about("Extract a specification once and print it")
                .arg(text_arg())
                .arg(
                    Arg::new("with-source")
                        .long("with-source")
                        .action(ArgAction::SetTrue)
                        .help("Also report whether the live generator was used"),
                ),
        )
        .subcommand(
            Command::new("submit")
                .about("Run extraction as a job, poll until it finishes, and print the job")
                .arg(text_arg()),
        )
        .subcommand(Command::new("status").about("Show live generator status"))
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"));

    match run(&matches).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(matches: &ArgMatches) -> Result<ExitCode> {
    let config = ServiceConfig::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))
        .context("loading configuration")?;
    let extractor = Extractor::from_config(&config.generator);

    match matches.subcommand() {
        Some(("extract", args)) => {
            let text = read_text(args).await?;
            if args.get_flag("with-source") {
                print_json(&extractor.extract_with_source(&text).await)?;
            } else {
                print_json(&extractor.extract(&text).await)?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Some(("submit", args)) => {
            let text = read_text(args).await?;
            let service = JobService::in_memory(extractor, config.jobs);
            let submission = service.submit(&text).await?;
            tracing::info!(job_id = %submission.id, "waiting for job");

            match service.poller().wait(submission.id).await {
                Ok(job) => {
                    print_json(&job)?;
                    Ok(if job.status == JobStatus::Completed {
                        ExitCode::SUCCESS
                    } else {
                        ExitCode::FAILURE
                    })
                }
                Err(e @ PollError::TimedOut { .. }) => {
                    tracing::error!(error = %e, "job did not finish in time");
                    Ok(ExitCode::from(EXIT_POLL_TIMEOUT))
                }
                Err(e) => Err(e.into()),
            }
        }
        Some(("status", _)) => {
            print_json(&extractor.status())?;
            Ok(ExitCode::SUCCESS)
        }
        _ => bail!("unknown command"),
    }
}

async fn read_text(args: &ArgMatches) -> Result<String> {
    let arg = args
        .get_one::<String>("text")
        .context("missing application description")?;
    if arg != "-" {
        return Ok(arg.clone());
    }

    let mut text = String::new();
    tokio::io::stdin()
        .read_to_string(&mut text)
        .await
        .context("reading standard input")?;
    Ok(text)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn global_flags_follow_subcommands() {
        let matches = cli()
            .try_get_matches_from([
                "reqforge",
                "submit",
                "a crm",
                "--log-json",
                "--config",
                "r.toml",
            ])
            .unwrap();
        assert!(matches.get_flag("log-json"));
        assert_eq!(
            matches.get_one::<PathBuf>("config"),
            Some(&PathBuf::from("r.toml"))
        );
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "submit");
        assert_eq!(args.get_one::<String>("text").map(String::as_str), Some("a crm"));
    }

    #[test]
    fn text_is_required() {
        assert!(cli().try_get_matches_from(["reqforge", "extract"]).is_err());
    }
}
