//! Buildflows
//!
//! CI and image build history of source packages. Paths and listing shapes
//! come from the client's [`ApiSchema`](super::schema::ApiSchema).

use super::client::{first_match, DaoClient, Endpoint};
use super::http::{encode, null_default};
use crate::error::Result;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

/// Image build of a buildflow
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Build {
    #[serde(deserialize_with = "null_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_default")]
    pub status: String,
    #[serde(deserialize_with = "null_default")]
    pub sha: String,
    #[serde(deserialize_with = "null_default")]
    pub branch: String,
    #[serde(deserialize_with = "null_default")]
    pub tag: String,
    #[serde(deserialize_with = "null_default")]
    pub trigger_method: String,
    /// Unix seconds
    #[serde(deserialize_with = "null_default")]
    pub created_at: i64,
}

impl Build {
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created_at, 0)
    }
}

/// CI run of a buildflow
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CiBuild {
    #[serde(deserialize_with = "null_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_default")]
    pub status: String,
    #[serde(deserialize_with = "null_default")]
    pub sha: String,
    #[serde(deserialize_with = "null_default")]
    pub branch: String,
    /// Unix seconds
    #[serde(deserialize_with = "null_default")]
    pub created_at: i64,
    #[serde(deserialize_with = "null_default")]
    pub message: String,
}

impl CiBuild {
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created_at, 0)
    }
}

/// Pipeline grouping a source package with its latest build
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Buildflow {
    #[serde(rename = "buildflow_id", deserialize_with = "null_default")]
    pub id: String,
    #[serde(deserialize_with = "null_default")]
    pub name: String,
    #[serde(deserialize_with = "null_default")]
    pub package_id: String,
    #[serde(rename = "last_build")]
    pub latest_build: Option<Build>,
}

/// Body of a manual image build trigger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualBuildRequest {
    pub branch: String,
}

#[derive(Debug, Deserialize)]
struct ManualBuildResponse {
    id: i64,
}

impl DaoClient {
    pub async fn list_buildflows(&self) -> Result<Vec<Buildflow>> {
        let path = self.schema().buildflows_path();
        let response = self.execute(Method::GET, &path, None, Endpoint::Public).await?;
        self.schema().decode_buildflows(&response.body)
    }

    pub async fn get_buildflow(&self, id: &str) -> Result<Buildflow> {
        let path = self.schema().buildflow_path(id);
        let response = self.execute(Method::GET, &path, None, Endpoint::Public).await?;
        self.schema().decode_buildflow(&response.body)
    }

    /// Find a buildflow by exact name in the full listing
    pub async fn get_buildflow_by_name(&self, name: &str) -> Result<Option<Buildflow>> {
        let flows = self.list_buildflows().await?;
        Ok(first_match(flows, |f| f.name == name))
    }

    pub async fn list_ci_builds(&self, buildflow_id: &str) -> Result<Vec<CiBuild>> {
        let path = self.schema().ci_builds_path(buildflow_id);
        let response = self.execute(Method::GET, &path, None, Endpoint::Public).await?;
        self.schema().decode_ci_builds(&response.body)
    }

    /// Find a CI build by its commit message
    pub async fn get_ci_build_by_message(
        &self,
        buildflow_id: &str,
        message: &str,
    ) -> Result<Option<CiBuild>> {
        let builds = self.list_ci_builds(buildflow_id).await?;
        Ok(first_match(builds, |b| b.message == message))
    }

    pub async fn list_builds(&self, buildflow_id: &str) -> Result<Vec<Build>> {
        let path = self.schema().builds_path(buildflow_id);
        let response = self.execute(Method::GET, &path, None, Endpoint::Public).await?;
        self.schema().decode_builds(&response.body)
    }

    /// Find an image build by id in the buildflow's listing
    pub async fn get_build(&self, buildflow_id: &str, id: i64) -> Result<Option<Build>> {
        let builds = self.list_builds(buildflow_id).await?;
        Ok(first_match(builds, |b| b.id == id))
    }

    /// Find an image build by tag
    pub async fn get_build_by_tag(&self, buildflow_id: &str, tag: &str) -> Result<Option<Build>> {
        let builds = self.list_builds(buildflow_id).await?;
        Ok(first_match(builds, |b| b.tag == tag))
    }

    /// Trigger an image build of `branch`, returning the new build id
    pub async fn post_manual_build(&self, buildflow_id: &str, branch: &str) -> Result<i64> {
        let path = self.schema().manual_build_path(buildflow_id);
        let body = encode(&ManualBuildRequest {
            branch: branch.to_string(),
        })?;

        let response: ManualBuildResponse = self
            .execute(Method::POST, &path, Some(body), Endpoint::Public)
            .await?
            .json()?;
        tracing::info!("Triggered build {} of {} on {}", response.id, buildflow_id, branch);
        Ok(response.id)
    }
}
