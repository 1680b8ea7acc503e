//! Session setup taken from the command line: the console context attached
//! to prompts and the agent profile read from its configuration secret.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use console_chat::{ActiveCluster, AgentProfile, Context, ContextRegistry};
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("failed to read agent secret: {0}")]
    Io(#[from] std::io::Error),
    #[error("agent secret is not valid YAML: {0}")]
    Secret(#[from] serde_yaml::Error),
    #[error("context `{0}` is not of the form tag=value")]
    Context(String),
}

/// Kubernetes secret manifest; only `data` is read.
#[derive(Debug, Default, Deserialize)]
struct SecretManifest {
    #[serde(default)]
    data: BTreeMap<String, String>,
}

/// Build the registry from `--cluster`, `--namespace` and `--context` values.
///
/// Each namespace also becomes an `ns://` filter, so selected namespaces are
/// attached to prompts.
pub fn context_registry(
    cluster: Option<&str>,
    namespaces: &[String],
    contexts: &[String],
) -> Result<ContextRegistry, SetupError> {
    let mut registry = ContextRegistry::new();

    registry.set_cluster(cluster.map(|name| ActiveCluster {
        name: name.to_string(),
        display_name: None,
    }));
    registry.set_namespaces(
        namespaces.to_vec(),
        namespaces
            .iter()
            .map(|namespace| format!("ns://{namespace}"))
            .collect(),
    );

    let extra = contexts
        .iter()
        .map(|raw| match raw.split_once('=') {
            Some((tag, value)) if !tag.trim().is_empty() => {
                Ok(Context::new(tag.trim(), value.trim()))
            }
            _ => Err(SetupError::Context(raw.clone())),
        })
        .collect::<Result<Vec<_>, _>>()?;
    registry.add(extra);

    Ok(registry)
}

pub fn load_agent_profile(path: &Path) -> Result<Option<AgentProfile>, SetupError> {
    let source = fs::read_to_string(path)?;
    parse_agent_profile(&source)
}

pub fn parse_agent_profile(source: &str) -> Result<Option<AgentProfile>, SetupError> {
    let manifest: Option<SecretManifest> = serde_yaml::from_str(source)?;
    Ok(AgentProfile::from_secret_data(
        &manifest.unwrap_or_default().data,
    ))
}
