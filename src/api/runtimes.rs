//! Runtimes
//!
//! Deployment backends an app can be launched on.

use super::client::DaoClient;
use super::http::null_default;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Runtime of the hosted (Cloud Foundry style) platform
pub const CF_RUNTIME_ID: &str = "a849cdf2-c79e-4c29-83ca-50751cc388a5";

/// Runtime of self-hosted single-runtime nodes
pub const SINGLE_RUNTIME_ID: &str = "srsrsrsrsrsrsrsrsrsrsrsrsrsrsrsrsrsrsrsrsrsr";

/// Runtime information
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Runtime {
    #[serde(rename = "runtime_id", deserialize_with = "null_default")]
    pub id: String,
    #[serde(rename = "app_runtime_type", deserialize_with = "null_default")]
    pub runtime_type: String,
    #[serde(rename = "app_runtime_name", deserialize_with = "null_default")]
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct RuntimeList {
    #[serde(default)]
    runtimes: Option<Vec<Runtime>>,
}

impl DaoClient {
    /// List the runtimes available to the account
    pub async fn list_runtimes(&self) -> Result<Vec<Runtime>> {
        let list: RuntimeList = self.get_json("/v1/runtimes").await?;
        Ok(list.runtimes.unwrap_or_default())
    }
}
