use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::{Arc, RwLock};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use fgate_adapters::build_oracle;
use fgate_runtime::{
    AuthorizationInterceptorFactory, Chain, DecisionService, InterceptorFactory, InvocationError,
    MethodRef, PermissionDeclarations, PermissionRequirement, ProxyRegistry, ProxyTarget,
    ServiceSurface, SessionInfo, TaskSession,
};
use serde_json::json;
use tracing::info;

use crate::config::Config;

#[async_trait]
pub trait DocumentService: Send + Sync {
    async fn list(&self) -> Result<Vec<String>, InvocationError>;
    async fn read(&self, id: &str) -> Result<String, InvocationError>;
    async fn publish(&self, id: &str, body: &str) -> Result<(), InvocationError>;
    fn title(&self, id: &str) -> Result<String, InvocationError>;
}

impl ServiceSurface for dyn DocumentService {
    const NAME: &'static str = "DocumentService";
    const METHODS: &'static [&'static str] = &["list", "read", "publish", "title"];

    fn declare_permissions(permissions: &mut PermissionDeclarations) {
        permissions
            .require("read", PermissionRequirement::any_of("doc1", ["reader", "owner"]))
            .require("title", PermissionRequirement::any_of("doc1", ["reader", "owner"]));
    }
}

pub struct InMemoryDocuments {
    documents: RwLock<BTreeMap<String, String>>,
}

impl InMemoryDocuments {
    pub fn seeded() -> Self {
        let documents = BTreeMap::from([
            ("doc1".to_string(), "Quarterly report\n\nRevenue is up.".to_string()),
            ("doc2".to_string(), "Roadmap\n\nShip the gate.".to_string()),
        ]);
        Self {
            documents: RwLock::new(documents),
        }
    }

    fn get(&self, id: &str) -> Result<String, InvocationError> {
        self.documents
            .read()
            .map_err(|_| poisoned())?
            .get(id)
            .cloned()
            .ok_or_else(|| anyhow!("document '{}' not found", id).into())
    }
}

fn poisoned() -> InvocationError {
    anyhow!("document store lock poisoned").into()
}

impl ServiceSurface for InMemoryDocuments {
    const NAME: &'static str = "InMemoryDocuments";
    const METHODS: &'static [&'static str] = &["list", "read", "publish", "title"];

    fn declare_permissions(permissions: &mut PermissionDeclarations) {
        permissions.require("publish", PermissionRequirement::all_of("doc1", ["writer", "owner"]));
    }
}

#[async_trait]
impl DocumentService for InMemoryDocuments {
    async fn list(&self) -> Result<Vec<String>, InvocationError> {
        let documents = self.documents.read().map_err(|_| poisoned())?;
        Ok(documents.keys().cloned().collect())
    }

    async fn read(&self, id: &str) -> Result<String, InvocationError> {
        self.get(id)
    }

    async fn publish(&self, id: &str, body: &str) -> Result<(), InvocationError> {
        let mut documents = self.documents.write().map_err(|_| poisoned())?;
        documents.insert(id.to_string(), body.to_string());
        Ok(())
    }

    fn title(&self, id: &str) -> Result<String, InvocationError> {
        let body = self.get(id)?;
        Ok(body.lines().next().unwrap_or_default().to_string())
    }
}

/// Routes every call through the interceptor chain before reaching the store
struct DocumentProxy {
    target: Arc<InMemoryDocuments>,
    chain: Chain,
}

fn method(name: &'static str) -> MethodRef {
    MethodRef::of::<dyn DocumentService, InMemoryDocuments>(name)
}

#[async_trait]
impl DocumentService for DocumentProxy {
    async fn list(&self) -> Result<Vec<String>, InvocationError> {
        self.chain
            .invoke_async(method("list"), vec![], || self.target.list())
            .await
    }

    async fn read(&self, id: &str) -> Result<String, InvocationError> {
        self.chain
            .invoke_async(method("read"), vec![json!(id)], || self.target.read(id))
            .await
    }

    async fn publish(&self, id: &str, body: &str) -> Result<(), InvocationError> {
        self.chain
            .invoke_async(method("publish"), vec![json!(id), json!(body)], || {
                self.target.publish(id, body)
            })
            .await
    }

    fn title(&self, id: &str) -> Result<String, InvocationError> {
        self.chain
            .invoke(method("title"), vec![json!(id)], || self.target.title(id))
    }
}

impl ProxyTarget<dyn DocumentService> for InMemoryDocuments {
    fn into_proxy(target: Arc<Self>, chain: Chain) -> Arc<dyn DocumentService> {
        Arc::new(DocumentProxy { target, chain })
    }
}

/// Registry with the document service guarded by the configured oracle
pub fn build_registry(config: &Config) -> Result<ProxyRegistry> {
    let oracle = build_oracle(&config.oracle, config.tuples.clone())?;
    let decisions = Arc::new(DecisionService::from_config(oracle, &config.authorization));
    let authorization: Arc<dyn InterceptorFactory> = Arc::new(
        AuthorizationInterceptorFactory::new(decisions, Arc::new(TaskSession)),
    );

    Ok(ProxyRegistry::builder()
        .register::<dyn DocumentService, InMemoryDocuments>(vec![authorization])?
        .build())
}

pub async fn execute(user: Option<String>, config: &Config) -> Result<()> {
    let registry = build_registry(config)?.install()?;
    let docs = registry.create::<dyn DocumentService, _>(Arc::new(InMemoryDocuments::seeded()))?;

    let session = SessionInfo::new(user);
    info!(
        session_id = %session.session_id(),
        user = session.user_name().unwrap_or("<anonymous>"),
        "Demo session started"
    );

    for line in session.scope(run(docs)).await {
        println!("{}", line);
    }
    Ok(())
}

async fn run(docs: Arc<dyn DocumentService>) -> Vec<String> {
    vec![
        report("list", docs.list().await),
        report("title", docs.title("doc1")),
        report("read", docs.read("doc1").await),
        report("publish", docs.publish("doc1", "Quarterly report\n\nRevised.").await),
    ]
}

fn report<T: Debug>(method: &str, outcome: Result<T, InvocationError>) -> String {
    match outcome {
        Ok(value) => format!("{method}: ok {value:?}"),
        Err(err) => format!("{method}: {} {}", err.status_code(), err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fgate_runtime::{OracleKind, TupleKey};

    fn memory_config(tuples: &[(&str, &str)]) -> Config {
        let mut config = Config::default();
        config.oracle.kind = OracleKind::Memory;
        config.tuples = tuples
            .iter()
            .map(|(user, relation)| {
                TupleKey::new(format!("user:{user}"), *relation, "document:doc1")
            })
            .collect();
        config
    }

    fn docs(config: &Config) -> Arc<dyn DocumentService> {
        build_registry(config)
            .unwrap()
            .create::<dyn DocumentService, _>(Arc::new(InMemoryDocuments::seeded()))
            .unwrap()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_reader_can_read_but_not_publish() {
        let docs = docs(&memory_config(&[("bob", "reader")]));

        let lines = SessionInfo::authenticated("bob").scope(run(docs)).await;

        assert_eq!(lines[0], r#"list: ok ["doc1", "doc2"]"#);
        assert_eq!(lines[1], r#"title: ok "Quarterly report""#);
        assert!(lines[2].starts_with("read: ok"));
        assert!(lines[3].starts_with("publish: 403"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_owner_and_writer_can_publish() {
        let docs = docs(&memory_config(&[("alice", "writer"), ("alice", "owner")]));

        SessionInfo::authenticated("alice")
            .scope(docs.publish("doc1", "Draft\n\nNew text."))
            .await
            .unwrap();
        let title = SessionInfo::authenticated("alice").sync_scope(|| docs.title("doc1"));
        assert_eq!(title.unwrap(), "Draft");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_anonymous_session_is_unauthenticated() {
        let docs = docs(&memory_config(&[("alice", "owner")]));

        let lines = SessionInfo::anonymous().scope(run(docs)).await;

        assert!(lines[0].starts_with("list: ok"));
        assert!(lines[1].starts_with("title: 401"));
        assert!(lines[2].starts_with("read: 401"));
        assert!(lines[3].starts_with("publish: 401"));
    }

    #[test]
    fn test_missing_document_is_a_service_error() {
        let err = InMemoryDocuments::seeded().title("nope").unwrap_err();
        assert_eq!(err.status_code(), 500);
    }
}
