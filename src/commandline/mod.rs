use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[clap(about = "Lowers checked Decaf programs to three-address code")]
pub struct Options {
    #[clap(subcommand)]
    pub operation: Operation,
    #[clap(short, long, default_value_t = 1)]
    pub verbose: usize,
}

#[derive(Debug, Subcommand)]
pub enum Operation {
    /// Check that a program can be lowered
    Check { file: String },
    /// Lower a program and print the generated code
    Translate {
        file: String,
        /// Write the generated code to this file instead of stdout
        #[clap(short, long)]
        output: Option<String>,
    },
}

impl Operation {
    pub fn file(&self) -> &str {
        match self {
            Operation::Check { file } | Operation::Translate { file, .. } => file,
        }
    }
}
