use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Goal lookup service for the goalboard stage")]
struct Args {
    /// Address to listen on
    #[arg(long, env = "GOALBOARD_ADDR", default_value = "127.0.0.1:39333")]
    addr: SocketAddr,
    /// SQLite database file (defaults to ~/.goalboard/goalboard.db)
    #[arg(long, env = "GOALBOARD_DB")]
    db: Option<PathBuf>,
    /// Insert demo goals when the goals table is empty
    #[arg(long)]
    seed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let db_path = args.db.unwrap_or_else(|| {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".goalboard")
            .join("goalboard.db")
    });

    if args.seed {
        let engine = goalboard_engine::Engine::new(&db_path);
        let inserted = engine.seed_demo()?;
        tracing::info!(db = %engine.db_path().display(), inserted, "seed finished");
    }

    goalboard_server::serve(args.addr, db_path).await
}
