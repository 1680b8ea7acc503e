use url::Url;

use crate::error::ProtocolError;

/// Namespace the agent is deployed into by default.
pub const DEFAULT_AGENT_NAMESPACE: &str = "cattle-ai-agent-system";
/// Service name of the agent deployment.
pub const DEFAULT_AGENT_NAME: &str = "rancher-ai-agent";
/// Path of the duplex endpoint behind the service proxy.
pub const DEFAULT_AGENT_API_PATH: &str = "agent/ws";

/// Build the secure websocket endpoint for the agent service proxy:
/// `wss://{host}/api/v1/namespaces/{namespace}/services/http:{name}:80/proxy/{api_path}`.
pub fn agent_socket_url(
    host: &str,
    namespace: &str,
    name: &str,
    api_path: &str,
) -> Result<Url, ProtocolError> {
    let host = host.trim().trim_end_matches('/');
    if host.is_empty() || host.contains("://") || host.contains('/') {
        return Err(ProtocolError::InvalidHost(host.to_string()));
    }

    let raw = format!(
        "wss://{host}/api/v1/namespaces/{namespace}/services/http:{name}:80/proxy/{api_path}",
        namespace = namespace.trim(),
        name = name.trim(),
        api_path = api_path.trim().trim_start_matches('/'),
    );

    Url::parse(&raw).map_err(|source| ProtocolError::InvalidUrl { url: raw, source })
}
