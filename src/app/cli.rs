use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Convert indentation between tabs and spaces across files, folders, projects and solutions"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replace tabs with spaces
    Untabify(ConvertArgs),
    /// Replace runs of spaces with tabs
    Tabify(ConvertArgs),
}

impl Command {
    pub fn args(&self) -> &ConvertArgs {
        match self {
            Command::Untabify(args) | Command::Tabify(args) => args,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeArg {
    /// A line range of one document, or the whole document
    Selection,
    /// Each path is a single document
    File,
    /// Each path is a directory, converted recursively
    Folder,
    /// The project enclosing each path
    Project,
    /// Every project directly below the path
    Solution,
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Files or directories to convert ('-' reads stdin in selection scope)
    #[arg(default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// What the paths stand for
    #[arg(long, value_enum, default_value_t = ScopeArg::File)]
    pub scope: ScopeArg,

    /// Use a predefined set of options from presets.toml
    #[arg(long)]
    pub preset: Option<String>,

    /// Spaces per tab for leading indentation (0 disables)
    #[arg(long)]
    pub indent_size: Option<usize>,

    /// Spaces per tab for in-line runs (0 disables)
    #[arg(long)]
    pub tab_size: Option<usize>,

    /// Only convert leading indentation
    #[arg(long, conflicts_with = "all_runs")]
    pub indent_only: bool,

    /// Also convert runs in the middle of lines
    #[arg(long)]
    pub all_runs: bool,

    /// Eligible file extensions, replacing the defaults (e.g. '.rs' '.toml')
    #[arg(long = "ext", num_args = 1..)]
    pub extensions: Option<Vec<String>>,

    /// Patterns for files or directories to exclude
    #[arg(long, num_args = 1..)]
    pub exclude: Option<Vec<String>>,

    /// Line range START:END (1-based, inclusive) for selection scope
    #[arg(long, value_parser = parse_line_range)]
    pub lines: Option<(usize, usize)>,

    /// Report what would change without saving anything
    #[arg(long)]
    pub dry_run: bool,

    /// Log every changed document
    #[arg(long, short)]
    pub verbose: bool,
}

fn parse_line_range(value: &str) -> Result<(usize, usize), String> {
    let (start, end) = value
        .split_once(':')
        .ok_or_else(|| format!("expected START:END, got '{}'", value))?;
    let start: usize = start
        .trim()
        .parse()
        .map_err(|_| format!("invalid start line '{}'", start))?;
    let end: usize = end
        .trim()
        .parse()
        .map_err(|_| format!("invalid end line '{}'", end))?;
    if start == 0 || end < start {
        return Err(format!("line range {}:{} is empty or starts at 0", start, end));
    }
    Ok((start, end))
}
