//! polybot-tools - the stateful tool server behind the assistant.

use anyhow::Result;
use clap::Parser;
use polybot::config::Config;
use polybot::curriculum::CurriculumService;
use polybot::server::{self, AppState};
use polybot::store::progress::ProgressStore;
use polybot::store::weights::WeightStore;
use polybot::store::Db;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "polybot-tools", about = "JSON-RPC tool server for polybot")]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8600")]
    listen: SocketAddr,

    /// SQLite database path (default: ~/.polybot/polybot.db)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Directory holding <lang>_curriculum.json files
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut cfg = Config::load();
    if let Some(db) = args.db {
        cfg.db_path = db;
    }
    if let Some(dir) = args.data_dir {
        cfg.data_dir = dir;
    }

    let db = Db::open(&cfg.db_path)?;
    eprintln!("[tool-server] database at {}", cfg.db_path.display());

    let state = Arc::new(AppState {
        weights: WeightStore::new(db.clone()),
        curriculum: CurriculumService::new(cfg.data_dir.clone(), ProgressStore::new(db)),
    });

    server::serve(state, args.listen).await
}
