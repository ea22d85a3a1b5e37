//! Preview server command.

use std::path::PathBuf;

use anyhow::Result;
use gcare_server::{PreviewServer, ServerConfig};

/// Run the serve command.
pub async fn run(port: u16, dir: PathBuf) -> Result<()> {
    let config = ServerConfig {
        output_dir: dir,
        port,
        ..Default::default()
    };

    PreviewServer::new(config).start().await?;

    Ok(())
}
