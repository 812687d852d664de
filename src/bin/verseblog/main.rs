use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use spdlog::{error, warn};

use verseblog::config::parse_path;
use verseblog::logger::configure_logger;

use crate::commands::{extract_cmd, list_cmd, related_cmd, sample_config_cmd, search_cmd};
use crate::config::open_config;

mod commands;
mod config;

const CFG_FILE_NAME: &str = "verseblog.toml";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config path. If empty, verseblog.toml is searched next to the executable,
    /// in the current dir and in the user config dir
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Overrides paths.dist_dir from the configuration
    #[arg(short, long, global = true)]
    dist_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Turns the posts archive into the JSON feed and the sitemaps
    Extract,
    /// Lists the posts of the feed, newest first
    List(ListArgs),
    /// Searches titles and contents of the feed
    Search(SearchArgs),
    /// Picks random posts to show next to a post
    Related(RelatedArgs),
    /// Prints a sample configuration file
    SampleConfig,
}

#[derive(Parser, Debug)]
struct ListArgs {
    /// Page to show, starting at 1
    #[arg(short, long, default_value_t = 1)]
    page: u32,
}

#[derive(Parser, Debug)]
struct SearchArgs {
    /// Term to search. Case is ignored
    term: String,
}

#[derive(Parser, Debug)]
struct RelatedArgs {
    /// Slug of the current post
    slug: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Command::SampleConfig = cli.command {
        sample_config_cmd();
        return ExitCode::SUCCESS;
    }

    let mut config = match open_config(cli.config_path.map(PathBuf::from)) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            eprintln!("Please run verseblog --help");
            return ExitCode::FAILURE;
        }
    };
    if let Some(dist_dir) = cli.dist_dir {
        config.paths.dist_dir = match parse_path(PathBuf::from(dist_dir)) {
            Ok(path) => path,
            Err(err) => {
                eprintln!("Invalid dist dir: {}", err);
                return ExitCode::FAILURE;
            }
        };
    }

    if let Err(err) = configure_logger(&config) {
        warn!("Error creating logger sinks. Using console instead. Desc={}", err);
    }

    let res = match cli.command {
        Command::Extract => return extract_cmd(&config),
        Command::List(args) => list_cmd(&config, args.page),
        Command::Search(args) => search_cmd(&config, &args.term),
        Command::Related(args) => related_cmd(&config, &args.slug),
        Command::SampleConfig => Ok(()),
    };

    match res {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
