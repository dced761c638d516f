//! Configuration for the permission oracle and tuple construction.

use serde::{Deserialize, Serialize};

/// Which oracle client to wire up
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OracleKind {
    /// Remote OpenFGA-compatible HTTP API
    #[default]
    Http,
    /// In-process tuple store
    Memory,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OracleConfig {
    #[serde(default)]
    pub kind: OracleKind,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default)]
    pub store_id: String,

    /// Pin checks to one authorization model; latest model when unset
    #[serde(default)]
    pub authorization_model_id: Option<String>,

    /// Bearer token sent with every request
    #[serde(default)]
    pub api_token: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// How identifiers become oracle tuple members
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthorizationConfig {
    #[serde(default = "default_user_type")]
    pub user_type: String,

    #[serde(default = "default_object_type")]
    pub object_type: String,
}

fn default_api_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_user_type() -> String {
    "user".to_string()
}

fn default_object_type() -> String {
    "document".to_string()
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            kind: OracleKind::default(),
            api_url: default_api_url(),
            store_id: String::new(),
            authorization_model_id: None,
            api_token: None,
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl Default for AuthorizationConfig {
    fn default() -> Self {
        Self {
            user_type: default_user_type(),
            object_type: default_object_type(),
        }
    }
}
