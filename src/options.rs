//! Command-line options.
//! `pn2ccs <FILE> [--seed N] [--style plain|rich] [--dot FILE] [--no-sync]`

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::{Arg, ArgAction, Command};

use crate::ccs::RenderStyle;
use crate::config::Pn2CcsConfig;

fn make_options_parser() -> clap::Command {
    Command::new("pn2ccs")
        .no_binary_name(true)
        .version("v0.1.0")
        .about("Classify a Petri net and encode it as a CCS process")
        .arg(
            Arg::new("input")
                .value_name("FILE")
                .help("Net document (.json or .ron)")
                .required(true),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .default_value("pn2ccs.toml"),
        )
        .arg(
            Arg::new("seed")
                .short('s')
                .long("seed")
                .help("Seed for the synchronisation pairing order")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("style")
                .long("style")
                .help("Rendering of the CCS output")
                .value_parser(["plain", "rich"]),
        )
        .arg(
            Arg::new("dot")
                .long("dot")
                .value_name("FILE")
                .help("Write the input net as a Graphviz file"),
        )
        .arg(
            Arg::new("no-sync")
                .long("no-sync")
                .help("Refuse nets that need synchronisation instead of rewriting them")
                .action(ArgAction::SetTrue),
        )
}

#[derive(Debug, Default)]
pub struct Options {
    pub input: PathBuf,
    pub config: PathBuf,
    pub seed: Option<u64>,
    pub style: Option<RenderStyle>,
    pub dot: Option<PathBuf>,
    pub no_sync: bool,
}

impl Options {
    pub fn parse_from_str(s: &str) -> Result<Self> {
        let flags = shellwords::split(s)?;
        Self::parse_from_args(&flags)
    }

    pub fn parse_from_args(flags: &[String]) -> Result<Self> {
        let app = make_options_parser();
        let matches = app.try_get_matches_from(flags.iter())?;

        let style = match matches.get_one::<String>("style").map(String::as_str) {
            None => None,
            Some("plain") => Some(RenderStyle::Plain),
            Some("rich") => Some(RenderStyle::Rich),
            Some(other) => return Err(anyhow!("unsupported render style {other:?}")),
        };
        let input = matches
            .get_one::<String>("input")
            .map(PathBuf::from)
            .ok_or_else(|| anyhow!("missing input file"))?;
        let config = matches
            .get_one::<String>("config")
            .map(PathBuf::from)
            .unwrap_or_default();

        Ok(Options {
            input,
            config,
            seed: matches.get_one::<u64>("seed").copied(),
            style,
            dot: matches.get_one::<String>("dot").map(PathBuf::from),
            no_sync: matches.get_flag("no-sync"),
        })
    }

    /// Command-line values take precedence over the configuration file.
    pub fn merge_into(&self, config: &mut Pn2CcsConfig) {
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(style) = self.style {
            config.render = style;
        }
        if self.dot.is_some() {
            config.dot_output = self.dot.clone();
        }
        if self.no_sync {
            config.synchronize = false;
        }
    }
}
