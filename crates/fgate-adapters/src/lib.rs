pub mod http_oracle;
pub mod memory_oracle;

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use fgate_runtime::{OracleClient, OracleConfig, OracleKind, TupleKey};

pub use http_oracle::HttpOracleClient;
pub use memory_oracle::MemoryOracle;

/// Build the oracle client selected by config.
/// Seed tuples only apply to the in-memory oracle.
pub fn build_oracle(config: &OracleConfig, seed: Vec<TupleKey>) -> Result<Arc<dyn OracleClient>> {
    let oracle: Arc<dyn OracleClient> = match config.kind {
        OracleKind::Http => {
            if !seed.is_empty() {
                tracing::warn!(count = seed.len(), "Ignoring seed tuples for HTTP oracle");
            }
            Arc::new(HttpOracleClient::new(config)?)
        }
        OracleKind::Memory => Arc::new(MemoryOracle::with_tuples(seed)),
    };
    info!(oracle = oracle.name(), "Permission oracle ready");
    Ok(oracle)
}
