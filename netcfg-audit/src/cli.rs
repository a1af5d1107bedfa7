use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, ValueEnum};
use netcfg_core::Policy;

#[derive(Parser, Debug)]
#[command(name = "netcfg-audit")]
#[command(about = "Cross-reference and annotate network device configurations")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Show line numbers.
    #[arg(short = 'n', long, global = true)]
    pub line_numbers: bool,
    /// Disable colored output.
    #[arg(short = 'z', long, global = true)]
    pub colorless: bool,
    /// Print level records as JSON instead of text.
    #[arg(short = 'j', long, global = true)]
    pub json: bool,
    /// Report elapsed processing time on stderr.
    #[arg(short = 't', long, global = true)]
    pub timing: bool,
    /// Also write the uncolored report to this file.
    #[arg(short = 'o', long, global = true)]
    pub output: Option<PathBuf>,
    /// Overwrite existing files without asking.
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,
    /// Input rows carry four subsystem flags ahead of the command.
    #[arg(long, global = true)]
    pub flagged_csv: bool,
    /// Settings TOML file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Log verbosity (-v info, -vv debug).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Highlight address, network and netmask literals on every line.
    Extract(ExtractArgs),
    /// Group lines into anchor and body levels.
    Classify(ClassifyArgs),
    /// Label matching lines with the network their address describes.
    Networks(NetworksArgs),
    /// Compare two sections by address, network or pattern value.
    Compare(CompareArgs),
    /// Render a cross-referenced tree such as access-group to access-list.
    Tree(TreeArgs),
    /// Write one config file per subsystem from flagged CSV input.
    Split(SplitArgs),
}

#[derive(Parser, Debug)]
pub struct ExtractArgs {
    /// Config file; stdin when absent or `-`.
    pub file: Option<PathBuf>,
    /// Use the relaxed octet matcher and report out-of-range values.
    #[arg(long)]
    pub simple: bool,
    /// Reject addresses with host bits set.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum PolicyArg {
    UntilMismatch,
    ToNextAnchor,
    Windowed,
}

impl From<PolicyArg> for Policy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::UntilMismatch => Policy::UntilMismatch,
            PolicyArg::ToNextAnchor => Policy::ToNextAnchor,
            PolicyArg::Windowed => Policy::Windowed,
        }
    }
}

#[derive(Parser, Debug)]
pub struct ClassifyArgs {
    pub file: Option<PathBuf>,
    /// Pattern of the lines opening a block.
    #[arg(long)]
    pub anchor: String,
    /// Pattern of the member lines.
    #[arg(long)]
    pub body: Option<String>,
    /// Second member pattern, classified as level 2.2.
    #[arg(long, requires = "body")]
    pub secondary: Option<String>,
    #[arg(long, value_enum)]
    pub policy: Option<PolicyArg>,
    /// Lines covered by the last block with the windowed policy.
    #[arg(long)]
    pub window: Option<usize>,
    /// Only print lines at the active level.
    #[arg(long)]
    pub active: bool,
    /// Insert a blank line between blocks.
    #[arg(long)]
    pub separators: bool,
}

#[derive(Parser, Debug)]
pub struct NetworksArgs {
    pub file: Option<PathBuf>,
    #[arg(long)]
    pub pattern: String,
    #[arg(long)]
    pub strict: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum CompareBy {
    Address,
    Network,
    Pattern,
}

#[derive(Parser, Debug)]
pub struct CompareArgs {
    pub file: Option<PathBuf>,
    /// Pattern of the left section's lines (its anchors with `--left-body`).
    #[arg(long)]
    pub left: String,
    #[arg(long)]
    pub right: String,
    /// Read the right section from another config.
    #[arg(long)]
    pub right_file: Option<PathBuf>,
    #[arg(long, value_enum)]
    pub by: CompareBy,
    /// Pattern whose captures are compared with `--by pattern`.
    #[arg(long)]
    pub key: Option<String>,
    #[arg(long)]
    pub left_body: Option<String>,
    #[arg(long)]
    pub right_body: Option<String>,
    /// Accept addresses with host bits set when comparing networks.
    #[arg(long)]
    pub loose: bool,
}

#[derive(Parser, Debug)]
pub struct TreeArgs {
    pub file: Option<PathBuf>,
    /// Pattern of the lines at the top of the tree.
    #[arg(long)]
    pub root: String,
    /// Pattern capturing the name a root line refers to.
    #[arg(long)]
    pub root_key: String,
    /// Anchor pattern of the referenced blocks.
    #[arg(long)]
    pub block: String,
    #[arg(long)]
    pub block_body: String,
    /// Pattern capturing a block anchor's name; defaults to `--root-key`.
    #[arg(long)]
    pub block_key: Option<String>,
    /// Pattern of the lines hung under block members.
    #[arg(long, requires = "child_key")]
    pub leaf: Option<String>,
    #[arg(long, requires = "leaf")]
    pub child_key: Option<String>,
}

#[derive(Parser, Debug)]
pub struct SplitArgs {
    /// Flagged CSV config.
    pub file: PathBuf,
    #[arg(long)]
    pub out_dir: PathBuf,
}
