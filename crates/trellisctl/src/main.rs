//! Command line front end for the trellis layout solver.

use std::{io, path::PathBuf};

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing::Level;
use trellis::{Config, absolute::Position};

mod render;
mod scene;

use scene::{Scene, load_config};

/// Output format for solved scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// One row per child.
    Table,
    /// Machine-readable geometry.
    Json,
    /// Indented container tree.
    Tree,
}

/// Solve layout scenes and inspect the result.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Increase log verbosity. Repeat for more detail.
    #[clap(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Solve a scene file and print the layout.
    Solve {
        /// Scene file (JSON).
        #[arg(value_name = "SCENE")]
        scene: PathBuf,

        /// Engine configuration (TOML).
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Output format.
        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,

        /// Colorize tree output.
        #[arg(long)]
        color: bool,
    },
    /// Normalize a position string for absolute containers.
    Position {
        /// Position string, for example "top:10px;left:50%;z-index:2".
        #[arg(value_name = "CSS")]
        css: String,
    },
}

/// Log level for a `-v` count.
fn level(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Parse arguments, install logging and run the chosen subcommand.
pub fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(level(args.verbose))
        .with_writer(io::stderr)
        .init();

    match args.command {
        Command::Solve {
            scene,
            config,
            format,
            color,
        } => {
            let config = match config {
                Some(path) => load_config(&path)?,
                None => Config::default(),
            };
            let coord = Scene::load(&scene)?.solve(config)?;
            let out = match format {
                Format::Table => render::table(&coord),
                Format::Json => render::json(&coord)?,
                Format::Tree => render::tree(&coord, color)?,
            };
            println!("{out}");
        }
        Command::Position { css } => {
            println!("{}", Position::parse(&css).to_css());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_solve() {
        let args = Args::parse_from(["trellisctl", "-vv", "solve", "s.json", "--format", "json"]);
        assert_eq!(args.verbose, 2);
        assert_eq!(level(args.verbose), Level::DEBUG);
        match args.command {
            Command::Solve { scene, format, config, .. } => {
                assert_eq!(scene, PathBuf::from("s.json"));
                assert_eq!(format, Format::Json);
                assert!(config.is_none());
            }
            Command::Position { .. } => panic!("wrong subcommand"),
        }
    }
}
