use clap::Parser;
use tracing::debug;
use gigbook::{
    api::{serve, AppState},
    config::Config,
    db::Store,
    options,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = options::Args::parse();
    debug!("{args:?}");

    let config = Config::new(args.config)?;
    debug!("{config:?}");

    let store = Store::open(&config.system.data_path, config.system.dev).await?;
    let state = AppState {
        store,
        recent_limit: config.listing.recent_limit,
    };

    let addr = args.address.unwrap_or(config.system.bind_addr.clone());
    serve(state, addr, config.system.request_timeout()).await?;
    Ok(())
}
