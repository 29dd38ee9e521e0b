//! Command-line flags. Flat rather than subcommand-based: the wire
//! protocol this binary exposes has no subcommand concept of its own.

use clap::Parser;

#[derive(Parser)]
#[command(name = "te-search")]
#[command(about = "Embeddable multi-collection full-text search, served over HTTP", long_about = None)]
pub struct Cli {
    /// Address to listen on.
    #[arg(short = 'a', long = "addr", default_value = "0.0.0.0:10600")]
    pub addr: String,

    /// Comma-separated list of collections to ensure exist on startup.
    #[arg(short = 'c', long = "collections", default_value = "")]
    pub collections: String,

    /// Auth token required on non-GET actions. Empty disables the check.
    #[arg(short = 't', long = "authtoken", default_value = "")]
    pub authtoken: String,

    /// Root directory for persisted collections.
    #[arg(short = 'd', long = "data-dir", default_value = "./search_data")]
    pub data_dir: String,
}

impl Cli {
    /// The startup collection list, split and with blanks discarded.
    pub fn collection_names(&self) -> Vec<&str> {
        self.collections
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}
