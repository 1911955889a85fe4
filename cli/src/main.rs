use anyhow::Result;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

use todo_cli::{App, Config, UreqTransport};
use todo_core::{FileSessionStore, TodoClient};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load()?;
    info!(
        api_url = %config.api_url,
        session_file = %config.session_file.display(),
        "starting"
    );

    let mut app = App::new(
        TodoClient::new(&config.api_url),
        UreqTransport::new(),
        FileSessionStore::new(&config.session_file),
        std::io::stdout(),
    );
    app.run(BufReader::new(tokio::io::stdin())).await
}
