//! Clusters and nodes
//!
//! Machines backing the single-runtime deployment target, plus the helpers
//! that produce the node agent install/uninstall commands.

use super::client::{first_match, DaoClient};
use super::http::{encode_segment, null_default};
use crate::error::{Error, Result};
use reqwest::Method;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Node {
    #[serde(rename = "node_id", deserialize_with = "null_default")]
    pub id: String,
    #[serde(rename = "node_addrs", deserialize_with = "null_default")]
    pub addrs: Vec<String>,
    #[serde(deserialize_with = "null_default")]
    pub hostname: String,
    /// Docker daemon status as reported by the node agent
    #[serde(rename = "status", deserialize_with = "null_default")]
    pub docker_status: String,
    #[serde(rename = "node_name", deserialize_with = "null_default")]
    pub name: String,
    #[serde(deserialize_with = "null_default")]
    pub is_connected: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cluster {
    #[serde(rename = "node_cluster_id", deserialize_with = "null_default")]
    pub id: String,
    #[serde(deserialize_with = "null_default")]
    pub is_default: bool,
    #[serde(rename = "node_cluster_name", deserialize_with = "null_default")]
    pub name: String,
    /// Token a new node presents when joining this cluster
    #[serde(rename = "suggest_token", deserialize_with = "null_default")]
    pub token: String,
    #[serde(deserialize_with = "null_default")]
    pub nodes: Vec<Node>,
}

/// Endpoints the node agent installer talks to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SingleRuntimeEnv {
    #[serde(deserialize_with = "null_default")]
    pub dao_get_url: String,
    #[serde(deserialize_with = "null_default")]
    pub dao_keeper_url: String,
}

#[derive(Debug, Deserialize)]
struct ClusterList {
    #[serde(default)]
    clusters: Option<Vec<Cluster>>,
}

/// Command removing the node agent package on `os`
pub fn uninstall_cmd(os: &str) -> Result<&'static str> {
    match os.to_lowercase().as_str() {
        "ubuntu" | "debian" => Ok("dpkg -r daomonit"),
        "centos" | "fedora" => Ok("rpm -e daomonit"),
        _ => Err(Error::UnsupportedOs(os.to_string())),
    }
}

/// Command installing the node agent into `cluster`
pub fn import_cmd(env: &SingleRuntimeEnv, cluster: &Cluster) -> String {
    format!(
        "curl -sSL {}/daomonit/install.sh | sh -s {} {}",
        env.dao_get_url.trim_end_matches('/'),
        cluster.token,
        env.dao_keeper_url
    )
}

impl DaoClient {
    pub async fn list_clusters(&self) -> Result<Vec<Cluster>> {
        let list: ClusterList = self.get_json("/v1/clusters").await?;
        Ok(list.clusters.unwrap_or_default())
    }

    /// First cluster flagged as default
    pub async fn get_default_cluster(&self) -> Result<Option<Cluster>> {
        let clusters = self.list_clusters().await?;
        Ok(first_match(clusters, |c| c.is_default))
    }

    pub async fn delete_node(&self, node_id: &str) -> Result<()> {
        self.send_action(
            Method::DELETE,
            &format!("/v1/single_runtime/nodes/{}", encode_segment(node_id)),
        )
        .await
    }

    pub async fn get_sr_env(&self) -> Result<SingleRuntimeEnv> {
        self.get_json("/v1/single_runtime/env").await
    }

    /// Install command joining a new node to the default cluster
    pub async fn get_import_cmd(&self) -> Result<String> {
        let env = self.get_sr_env().await?;
        let cluster = self
            .get_default_cluster()
            .await?
            .ok_or(Error::NoDefaultCluster)?;

        Ok(import_cmd(&env, &cluster))
    }
}
