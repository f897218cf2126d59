use std::net::SocketAddr;

use routeguide::{data, RouteGuideService};
use tonic::transport::Server;

#[derive(Debug)]
struct Opts {
    addr: SocketAddr,
    db: String,
}

impl Opts {
    fn parse() -> Result<Self, pico_args::Error> {
        let mut pargs = pico_args::Arguments::from_env();
        Ok(Self {
            addr: pargs
                .opt_value_from_str("--addr")?
                .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 10000))),
            db: pargs
                .opt_value_from_str("--db")?
                .unwrap_or_else(|| data::DEFAULT_DB.to_string()),
        })
    }
}

#[tokio::main]
async fn main() -> routeguide::Result<()> {
    routeguide::trace_init();

    let opts = Opts::parse()?;
    let service = RouteGuideService::from_db(&opts.db)?;

    tracing::info!(addr = %opts.addr, db = %opts.db, "RouteGuide server listening");

    Server::builder()
        .add_service(service.into_server())
        .serve_with_shutdown(opts.addr, async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await?;

    Ok(())
}
