use anyhow::Result;
use std::path::Path;

pub(crate) const DEFAULT_CONFIG: &str = r#"# fgate configuration

[oracle]
# "http" talks to an OpenFGA-compatible API, "memory" answers from [[tuples]]
kind = "memory"
api_url = "http://localhost:8080"
store_id = ""
timeout_secs = 10
connect_timeout_secs = 5

[authorization]
user_type = "user"
object_type = "document"

[[tuples]]
user = "user:alice"
relation = "reader"
object = "document:doc1"

[[tuples]]
user = "user:alice"
relation = "writer"
object = "document:doc1"

[[tuples]]
user = "user:alice"
relation = "owner"
object = "document:doc1"

[[tuples]]
user = "user:bob"
relation = "reader"
object = "document:doc1"
"#;

/// Initialize a new config file
pub fn run_init(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!("Config already exists at {:?}", path);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, DEFAULT_CONFIG)?;
    println!("Created config at {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config;
    use fgate_runtime::OracleKind;

    #[test]
    fn test_default_config_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("fgate.toml");

        run_init(&path).unwrap();
        let config = load_config(Some(&path)).unwrap();

        assert_eq!(config.oracle.kind, OracleKind::Memory);
        assert_eq!(config.tuples.len(), 4);
    }

    #[test]
    fn test_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fgate.toml");
        std::fs::write(&path, "keep me").unwrap();

        assert!(run_init(&path).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep me");
    }
}
