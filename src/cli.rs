use clap::{Parser, Subcommand};

use crate::query::SortOrder;

#[derive(Parser)]
#[command(name = "pagewise")]
#[command(about = "Browse cursor-paginated data one page at a time")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Page through a generated company directory interactively
    #[command(visible_alias = "b")]
    Browse {
        /// Number of companies to generate
        #[arg(short, long, default_value_t = 100)]
        count: usize,

        /// Seed for the data generator (random if omitted)
        #[arg(long)]
        seed: Option<u64>,

        /// Companies per page (default: config page_size)
        #[arg(short = 'n', long)]
        page_size: Option<usize>,

        /// Initial search text
        #[arg(short, long)]
        search: Option<String>,

        /// Initial industry filter ("all" for none)
        #[arg(short, long)]
        industry: Option<String>,

        /// Sort order by company name: asc or desc
        #[arg(short, long, default_value = "asc", value_parser = parse_order)]
        order: SortOrder,

        /// Simulated data source latency in milliseconds
        #[arg(long, default_value_t = 150)]
        latency_ms: u64,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the config file location
    Path,
}

impl Commands {
    /// Execute the command, dispatching to the appropriate handler.
    pub async fn run(self) -> crate::error::Result<()> {
        use crate::commands::{BrowseOptions, cmd_browse, cmd_config_path, cmd_config_show};

        match self {
            Commands::Browse {
                count,
                seed,
                page_size,
                search,
                industry,
                order,
                latency_ms,
            } => {
                cmd_browse(BrowseOptions {
                    count,
                    seed,
                    page_size,
                    search,
                    industry,
                    order,
                    latency_ms,
                })
                .await
            }

            Commands::Config { action } => match action {
                ConfigAction::Show { json } => cmd_config_show(json),
                ConfigAction::Path => cmd_config_path(),
            },
        }
    }
}

fn parse_order(s: &str) -> Result<SortOrder, String> {
    s.parse().map_err(|e: crate::error::PagewiseError| e.to_string())
}
