use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "class-deps")]
#[command(about = "Decode Java class files and archives into a dependency graph with coupling metrics")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Report classes and groups with their afferent and efferent couplings.
    Analyze {
        #[command(flatten)]
        input: InputArgs,

        #[arg(short = 'g', long, value_enum, default_value_t = GroupBy::Package)]
        group_by: GroupBy,

        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        #[arg(short = 'o', long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// List package dependency cycles.
    Cycles {
        #[command(flatten)]
        input: InputArgs,

        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        #[arg(short = 'o', long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Args)]
pub struct InputArgs {
    /// Directories, archives (.jar, .zip, .war) or class files.
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Keep only classes whose name starts with PREFIX.
    #[arg(short = 'i', long = "include", value_name = "PREFIX")]
    pub includes: Vec<String>,

    /// Drop classes whose name starts with PREFIX. Wins over --include.
    #[arg(short = 'x', long = "exclude", value_name = "PREFIX")]
    pub excludes: Vec<String>,

    #[arg(long)]
    pub no_inner_classes: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum GroupBy {
    Package,
    Class,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}
