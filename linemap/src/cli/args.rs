//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "linemap",
    about = "Map source lines to the machine addresses generated for them",
    after_help = "\
EXAMPLES:
    linemap -b ./app -f src/main.c                Annotated listing of one file
    linemap -b ./app -f src/main.c -l 42          Addresses generated for one line
    linemap -b ./app -d ~/src/app                 Listings for every file under a source root
    linemap -b ./app -a 0x555555554000 --address 0x555555555149
                                                  Source line of a runtime address
    linemap -b ./app -j > index.json              Dump the whole index as JSON"
)]
pub struct Args {
    /// Binary to resolve addresses for
    #[arg(short, long)]
    pub binary: PathBuf,

    /// Dump the whole address index as JSON
    #[arg(short, long)]
    pub json_db: bool,

    /// Print addresses for target FILE
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Print addresses for target LINE only (needs FILE)
    #[arg(short, long, requires = "file")]
    pub line: Option<u64>,

    /// Print listings for all referenced files under source root DIRECTORY
    #[arg(short, long)]
    pub directory: Option<PathBuf>,

    /// Add BASE_ADDRESS (hexadecimal) to all addresses
    #[arg(short = 'a', long, default_value = "0x0")]
    pub base_address: String,

    /// Show the line program opcode of each address
    #[arg(long)]
    pub dwarf: bool,

    /// Print the source location of ADDRESS (hexadecimal, base address included)
    #[arg(long = "address", value_name = "ADDRESS")]
    pub addresses: Vec<String>,

    /// Threads used to build the index
    #[arg(long, default_value = "1")]
    pub jobs: usize,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// True if at least one query or dump was requested
    #[must_use]
    pub fn has_query(&self) -> bool {
        self.json_db || self.file.is_some() || self.directory.is_some() || !self.addresses.is_empty()
    }
}
