use clap::{Parser, Subcommand, ValueEnum};
use fgate_runtime::Combinator;
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum CombinatorArg {
    /// Any one permission suffices
    Or,
    /// Every permission is required
    And,
}

impl From<CombinatorArg> for Combinator {
    fn from(arg: CombinatorArg) -> Self {
        match arg {
            CombinatorArg::Or => Combinator::Or,
            CombinatorArg::And => Combinator::And,
        }
    }
}

#[derive(Parser)]
#[command(name = "sentinel")]
#[command(about = "fgate - relationship-based authorization gate", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new config file
    Init {
        /// Path for new config file
        #[arg(default_value = "fgate.toml")]
        path: PathBuf,
    },
    /// Ask the oracle whether a user holds permissions on a resource
    Check {
        #[arg(long)]
        user: String,
        #[arg(long)]
        resource: String,
        /// Permission to check (repeatable)
        #[arg(long = "permission", required = true)]
        permissions: Vec<String>,
        #[arg(long, default_value = "or", value_enum)]
        combinator: CombinatorArg,
    },
    /// Call the guarded demo document service as a user
    Demo {
        /// Session user; anonymous when omitted
        #[arg(long)]
        user: Option<String>,
    },
}
