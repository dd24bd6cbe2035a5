//! Serve command implementation for nbpipe CLI.

use std::path::Path;

use nbpipe_core::{EnvConfig, MarshalStore};
use nbpipe_server::{AppState, ServerConfig};

use crate::backend;

/// Start the RPC server.
pub async fn execute(
    host: String,
    port: u16,
    converter: Option<&Path>,
    packager: &str,
) -> anyhow::Result<()> {
    let compiler = match converter {
        Some(converter) => Some(backend::orchestrator(converter, packager)?),
        None => {
            tracing::warn!("No --converter given, nb.compile_notebook is disabled");
            None
        }
    };

    let env = EnvConfig::from_env();
    if let Some(step) = &env.pipeline_step {
        tracing::info!("Running inside pipeline step `{}`", step);
    }

    let state = AppState {
        env,
        store: MarshalStore::new(),
        compiler,
    };
    let config = ServerConfig { host, port };

    println!("nbpipe server listening on http://{}:{}/rpc", config.host, config.port);
    println!("Press Ctrl+C to stop");

    nbpipe_server::serve(state, config).await?;

    Ok(())
}
