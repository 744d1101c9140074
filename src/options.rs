use clap::Parser;

/// Venue and artist listings server
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the TOML config file (default: `gigbook.toml`)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Address to listen on, overrides `system.bind_addr`
    #[arg(short, long)]
    pub address: Option<String>,
}
