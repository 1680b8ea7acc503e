//! Ambient context collected from console state and attached to prompts.

use chat_protocol::{dedupe_contexts, Context};

pub const CLUSTER_TAG: &str = "cluster";
pub const NAMESPACE_TAG: &str = "namespace";

/// Namespace filter prefix selecting specific namespaces (`ns://{name}`).
const NAMESPACE_FILTER_PREFIX: &str = "ns://";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveCluster {
    pub name: String,
    pub display_name: Option<String>,
}

impl ActiveCluster {
    fn context(&self) -> Context {
        Context::new(CLUSTER_TAG, self.name.clone())
            .with_value_label(
                self.display_name
                    .clone()
                    .unwrap_or_else(|| self.name.clone()),
            )
            .with_description("Cluster")
            .with_icon("icon-cluster")
    }
}

/// Sources of context, merged by [`ContextRegistry::all`].
#[derive(Debug, Clone, Default)]
pub struct ContextRegistry {
    cluster: Option<ActiveCluster>,
    namespaces: Vec<String>,
    namespace_filters: Vec<String>,
    ui: Vec<Context>,
    transient: Vec<Context>,
}

impl ContextRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_cluster(&mut self, cluster: Option<ActiveCluster>) {
        self.cluster = cluster;
    }

    /// Namespaces currently selected in the console, with the raw filter list
    /// (`ns://…`, `all://user`, `namespaced://true`, …).
    pub fn set_namespaces(&mut self, namespaces: Vec<String>, filters: Vec<String>) {
        self.namespaces = namespaces;
        self.namespace_filters = filters;
    }

    /// Replace the contexts published by UI components.
    pub fn set_ui_contexts(&mut self, contexts: Vec<Context>) {
        self.ui = contexts;
    }

    /// UI contexts not bound to a hook.
    pub fn default_contexts(&self) -> Vec<Context> {
        self.ui
            .iter()
            .filter(|context| context.hook_id.is_none())
            .cloned()
            .collect()
    }

    pub fn transient(&self) -> &[Context] {
        &self.transient
    }

    /// Add transient contexts, skipping `(tag, value)` pairs already present.
    pub fn add(&mut self, contexts: impl IntoIterator<Item = Context>) {
        for context in contexts {
            if !self
                .transient
                .iter()
                .any(|seen| seen.same_identity(&context))
            {
                self.transient.push(context);
            }
        }
    }

    pub fn reset(&mut self) {
        self.transient.clear();
    }

    /// Cluster, namespaces, default UI contexts and transient contexts, in
    /// that order, without duplicates.
    pub fn all(&self) -> Vec<Context> {
        let cluster = self.cluster.iter().map(ActiveCluster::context);
        let namespaces = self
            .namespace_filter_active()
            .then(|| {
                self.namespaces.iter().map(|namespace| {
                    Context::new(NAMESPACE_TAG, namespace.clone())
                        .with_description("Namespace")
                        .with_icon("icon-namespace")
                })
            })
            .into_iter()
            .flatten();

        dedupe_contexts(
            cluster
                .chain(namespaces)
                .chain(self.default_contexts())
                .chain(self.transient.iter().cloned()),
        )
    }

    fn namespace_filter_active(&self) -> bool {
        self.namespace_filters
            .iter()
            .any(|filter| filter.starts_with(NAMESPACE_FILTER_PREFIX))
    }
}

#[cfg(test)]
mod tests {
    use chat_protocol::Context;
    use serde_json::json;

    use super::{ActiveCluster, ContextRegistry};

    fn registry() -> ContextRegistry {
        let mut registry = ContextRegistry::new();
        registry.set_cluster(Some(ActiveCluster {
            name: "c-m-123".to_string(),
            display_name: Some("production".to_string()),
        }));
        registry
    }

    #[test]
    fn namespaces_only_apply_with_specific_filter() {
        let mut registry = registry();
        registry.set_namespaces(vec!["default".to_string()], vec!["all://user".to_string()]);
        assert_eq!(registry.all().len(), 1);

        registry.set_namespaces(
            vec!["default".to_string(), "apps".to_string()],
            vec!["ns://default".to_string(), "ns://apps".to_string()],
        );
        let tags: Vec<String> = registry.all().into_iter().map(|c| c.tag).collect();
        assert_eq!(tags, vec!["cluster", "namespace", "namespace"]);
    }

    #[test]
    fn all_merges_sources_in_order_without_duplicates() {
        let mut registry = registry();
        registry.set_ui_contexts(vec![
            Context::new("cluster", "c-m-123"),
            Context::new("pod", "web-0").with_hook_id("row-1"),
            Context::new("workload", "web"),
        ]);
        registry.add(vec![
            Context::new("workload", "web"),
            Context::new("node", "n1"),
            Context::new("node", "n1"),
        ]);

        let all = registry.all();
        let values: Vec<_> = all.iter().map(|c| c.value.clone()).collect();

        assert_eq!(values, vec![json!("c-m-123"), json!("web"), json!("n1")]);
        assert_eq!(all[0].value_label.as_deref(), Some("production"));
        assert_eq!(registry.transient().len(), 2);
    }

    #[test]
    fn reset_clears_only_transient_contexts() {
        let mut registry = registry();
        registry.add(vec![Context::new("node", "n1")]);

        registry.reset();

        assert!(registry.transient().is_empty());
        assert_eq!(registry.all().len(), 1);
    }
}
