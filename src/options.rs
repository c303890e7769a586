//! Parsing Options.
//! `pn-sim <NET> [-c config.toml] [-n steps] [-s seed] [--chooser random|first]`

use clap::{Arg, ArgAction, Command, value_parser};
use std::error::Error;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChooserKind {
    #[default]
    Random,
    First,
}

fn make_options_parser() -> clap::Command {
    Command::new("pn-sim")
        .no_binary_name(true)
        .version("v0.1.0")
        .about("Simulate a production Petri net and report metrics and structural analysis")
        .arg(
            Arg::new("net")
                .value_name("NET")
                .help("Net definition (.json or .ron)")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("TOML configuration file")
                .default_value("pn-sim.toml")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("steps")
                .short('n')
                .long("steps")
                .help("Maximum number of auto-fired steps [default: from config]")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("seed")
                .short('s')
                .long("seed")
                .help("Seed for the random chooser")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("chooser")
                .long("chooser")
                .default_value("random")
                .value_parser(["random", "first"]),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Path to file where the JSON report will be stored")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("dot")
                .long("dot")
                .value_name("FILE")
                .help("Write the final net as Graphviz DOT")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Do not print the report to stdout")
                .action(ArgAction::SetTrue),
        )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub net_path: PathBuf,
    pub config_path: PathBuf,
    pub steps: Option<u64>,
    pub seed: Option<u64>,
    pub chooser: ChooserKind,
    pub output: Option<PathBuf>,
    pub dot: Option<PathBuf>,
    pub quiet: bool,
}

impl Options {
    pub fn parse_from_str(s: &str) -> Result<Self, Box<dyn Error>> {
        let flags = shellwords::split(s)?;
        Self::parse_from_args(&flags)
    }

    /// 命令行参数在前，`PN_FLAGS` 中的附加参数（按 shell 规则切分）追加在后。
    pub fn parse_with_env(args: &[String], env_flags: Option<&str>) -> Result<Self, Box<dyn Error>> {
        let mut flags = args.to_vec();
        if let Some(extra) = env_flags {
            flags.extend(shellwords::split(extra)?);
        }
        Self::parse_from_args(&flags)
    }

    pub fn parse_from_args(flags: &[String]) -> Result<Self, Box<dyn Error>> {
        let app = make_options_parser();
        let matches = app.try_get_matches_from(flags.iter())?;

        let chooser = match matches.get_one::<String>("chooser").map(String::as_str) {
            Some("first") => ChooserKind::First,
            Some("random") | None => ChooserKind::Random,
            Some(other) => return Err(format!("unsupported chooser {other}").into()),
        };

        let net_path = matches
            .get_one::<PathBuf>("net")
            .cloned()
            .ok_or("missing net definition")?;
        let config_path = matches
            .get_one::<PathBuf>("config")
            .cloned()
            .unwrap_or_else(|| PathBuf::from("pn-sim.toml"));

        Ok(Options {
            net_path,
            config_path,
            steps: matches.get_one::<u64>("steps").copied(),
            seed: matches.get_one::<u64>("seed").copied(),
            chooser,
            output: matches.get_one::<PathBuf>("output").cloned(),
            dot: matches.get_one::<PathBuf>("dot").cloned(),
            quiet: matches.get_flag("quiet"),
        })
    }
}
