use clap::Parser;
use tracing::level_filters::LevelFilter;

#[derive(Debug, Clone, Parser)]
#[command(author, about, version)]
pub struct Args {
    #[arg(
        short,
        long,
        value_name = "PATH",
        default_value = "mudgated.toml",
        help = "Path to the daemon's TOML configuration file."
    )]
    pub config: String,

    #[arg(
        short,
        long,
        value_name = "LEVEL",
        default_value = "INFO",
        help = "Log level filter, overridable via RUST_LOG."
    )]
    pub log_level: LevelFilter,
}
