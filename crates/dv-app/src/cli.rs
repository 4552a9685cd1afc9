use std::path::PathBuf;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about = "Decode query responses and validate answer views", long_about = None)]
pub struct CliOpts {
    #[arg(
        short,
        long,
        global = true,
        env = "DATAVIS_CONFIG",
        help = "JSON file with decoder and validator settings"
    )]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode a stored query response and print its records as JSON
    Decode {
        #[arg(short, long, help = "Query response JSON file")]
        response: PathBuf,
    },

    /// Validate a stored answer and print it in normalized form
    Validate {
        #[arg(short, long, help = "Answer JSON file")]
        answer: PathBuf,

        #[arg(
            short,
            long,
            help = "Query response JSON file whose decoded rows and schema replace the answer's data"
        )]
        response: Option<PathBuf>,
    },
}
