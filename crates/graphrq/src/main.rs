#![cfg_attr(test, allow(unused_crate_dependencies))]

use clap::crate_version;
use tokio::runtime;

use graphrq_server::ServerConfig;

mod args;
mod telemetry;

const THREAD_NAME: &str = "graphrq";

fn main() -> anyhow::Result<()> {
    let args = self::args::parse();
    let config = args.config()?;
    let graph = args.graph()?;

    if args.print_schema {
        let schema = graph.build(&config.directives)?;
        print!("{}", schema.sdl());

        return Ok(());
    }

    let runtime = runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name(THREAD_NAME)
        .build()?;

    runtime.block_on(async move {
        telemetry::init(&args)?;

        let crate_version = crate_version!();
        tracing::info!("GraphRQ {crate_version}");

        let config = ServerConfig {
            listen_addr: args.listen_address,
            config,
            graph,
        };

        graphrq_server::serve(config).await?;

        Ok::<(), anyhow::Error>(())
    })?;

    Ok(())
}
