//! # TokenizeLocal Chat Bot
//!
//! Stdin driver for the chat command router: each line you type is one
//! inbound chat message from a single local user, each printed block is
//! the bot's reply. The router itself is transport-agnostic: wiring a
//! real chat platform means feeding its updates into
//! [`router::ChatRouter::handle`] instead of stdin lines.
//!
//! ## Usage
//! ```bash
//! cargo run -p tokenize-chatbot
//! > /start
//! > 1
//! > /companies
//! ```

mod router;

use std::env;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use tokenize_db::{Database, DbConfig};
use tokenize_registry::HttpRegistryClient;

use crate::router::ChatRouter;

/// The local chat user's id (single-user stdin transport).
const LOCAL_USER_ID: i64 = 1;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let database_path =
        env::var("LEDGER_DB_PATH").unwrap_or_else(|_| "ledger.db".to_string());
    let registry_url = env::var("REGISTRY_URL")
        .unwrap_or_else(|_| "https://api.checko.ru/v2/finances".to_string());
    let registry_api_key =
        env::var("REGISTRY_API_KEY").unwrap_or_else(|_| "demo-key".to_string());

    let db = Database::new(DbConfig::new(&database_path)).await?;
    let registry = HttpRegistryClient::new(registry_url, registry_api_key)?;
    let mut router = ChatRouter::new(db, Arc::new(registry));

    info!("✅ Bot started");
    println!("TokenizeLocal chat (stdin transport). Type /start to begin, Ctrl-D to quit.");

    let stdin = io::stdin();
    loop {
        print!("> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let reply = router.handle(LOCAL_USER_ID, line).await;
        println!("{reply}");
    }

    Ok(())
}
