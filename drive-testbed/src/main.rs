use anyhow::Result;
use clap::Parser;
use drive_testbed::{
    api,
    config::{discovery_source, Cli, Commands},
};
use drive_testbed_core::{router::Target, Router, TestbedHttp};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve { addr, testbed } => {
            let config = testbed.load_config()?;
            let http = TestbedHttp::new(config)?;
            // Fail at startup rather than on the first request.
            let routes = http.router()?.routes().len();
            let app = api::router(http);

            let listener = TcpListener::bind(addr).await?;
            info!(%addr, routes, "drive testbed listening");
            axum::serve(listener, app.into_make_service()).await?;
        }
        Commands::Routes { discovery } => {
            let router = Router::load(&discovery_source(discovery))?;
            for route in router.routes().iter() {
                let target = match route.target {
                    Target::Operation(_) => "",
                    Target::Unimplemented => "  (not emulated)",
                };
                let template = route.template.to_string();
                println!(
                    "{:<7} {:<45} {}.{}{}",
                    route.http_method, template, route.resource, route.action, target
                );
            }
        }
    }
    Ok(())
}
