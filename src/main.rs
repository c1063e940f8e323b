//! midgaard - a multi-user text adventure server
//!
//! Bootstrap: parse flags, load the world from sqlite, bind the listener,
//! and run the acceptor alongside the dispatcher. Any startup failure
//! aborts with a non-zero status.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::info;

use midgaard::config::Config;
use midgaard::db;
use midgaard::event::INPUT_QUEUE_DEPTH;
use midgaard::server::Server;
use midgaard::session;
use midgaard::world::START_ROOM;

#[derive(Parser, Debug)]
#[command(name = "midgaard", version, about = "Multi-user text adventure server")]
struct Args {
    /// Address to listen on
    #[arg(short, long)]
    listen: Option<std::net::SocketAddr>,

    /// Path to the world database
    #[arg(short, long)]
    db: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("midgaard=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let mut config = Config::default();
    if let Some(listen) = args.listen {
        config.listen_addr = listen;
    }
    if let Some(db_path) = args.db {
        config.db_path = db_path;
    }

    info!("loading world from {}", config.db_path);
    let mut conn = db::open(&config.db_path).context("failed to open world database")?;
    let world = db::load(&mut conn).context("failed to load world")?;
    anyhow::ensure!(
        world.room(START_ROOM).is_some(),
        "world has no starting room {:?}",
        START_ROOM
    );
    let world = Arc::new(world);

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!("listening on {}", config.listen_addr);

    let (input_tx, input_rx) = mpsc::channel(INPUT_QUEUE_DEPTH);
    let dispatcher = tokio::spawn(Server::new(world.clone()).run(input_rx));

    let result = session::serve(listener, input_tx, world, config.map_depth).await;
    dispatcher.abort();
    result
}
