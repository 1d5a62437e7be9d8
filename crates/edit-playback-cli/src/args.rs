use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use edit_playback_engine::Position;

pub const USAGE: &str = "<file> <start-line:col> <end-line:col> <replacement | ->";

/// A parsed command line.
#[derive(Debug, PartialEq, Eq)]
pub struct Invocation {
    pub path: PathBuf,
    pub start: Position,
    pub end: Position,
    pub replacement: Replacement,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Replacement {
    Literal(String),
    Stdin,
}

impl Replacement {
    pub fn read(self) -> Result<String> {
        match self {
            Replacement::Literal(text) => Ok(text),
            Replacement::Stdin => {
                let mut text = String::new();
                io::stdin()
                    .read_to_string(&mut text)
                    .context("Failed to read replacement from stdin")?;
                Ok(text)
            }
        }
    }
}

impl Invocation {
    pub fn parse(args: &[String]) -> Result<Self> {
        let [_, path, start, end, replacement] = args else {
            bail!("expected 4 arguments, got {}", args.len().saturating_sub(1));
        };

        let start = start
            .parse::<Position>()
            .with_context(|| format!("Invalid start position '{start}'"))?;
        let end = end
            .parse::<Position>()
            .with_context(|| format!("Invalid end position '{end}'"))?;
        let replacement = if replacement == "-" {
            Replacement::Stdin
        } else {
            Replacement::Literal(replacement.clone())
        };

        Ok(Self {
            path: PathBuf::from(path),
            start,
            end,
            replacement,
        })
    }
}
