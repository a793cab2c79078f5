//! Wire schema generations
//!
//! The platform exposes the buildflow family under two incompatible
//! generations: the `ship` endpoints (`/v1/ship/project...`, `size`/`offset`
//! pagination, buildflows nested under a `project` key) and the `classic`
//! endpoints (`/v1/buildflows...`, `limit` pagination, flat records).
//! [`ApiSchema`] hides the difference; the client picks an implementation from
//! [`SchemaVersion`] once, at construction.

use super::buildflows::{Build, Buildflow, CiBuild};
use super::http::{decode, encode_segment, null_default};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Platform schema generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVersion {
    /// `/v1/ship/...` endpoints
    #[default]
    Ship,
    /// `/v1/buildflows/...` endpoints
    Classic,
}

impl SchemaVersion {
    /// Build the strategy object for this generation
    pub fn schema(self) -> Arc<dyn ApiSchema> {
        match self {
            SchemaVersion::Ship => Arc::new(ShipSchema),
            SchemaVersion::Classic => Arc::new(ClassicSchema),
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaVersion::Ship => f.write_str("ship"),
            SchemaVersion::Classic => f.write_str("classic"),
        }
    }
}

impl FromStr for SchemaVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ship" => Ok(SchemaVersion::Ship),
            "classic" => Ok(SchemaVersion::Classic),
            other => Err(Error::InvalidRequest(format!(
                "unknown schema version: {}",
                other
            ))),
        }
    }
}

/// Paths and listing decoders that differ between schema generations
pub trait ApiSchema: fmt::Debug + Send + Sync {
    fn version(&self) -> SchemaVersion;

    /// Query string requesting an unpaginated listing
    fn list_all_query(&self) -> &'static str;

    fn buildflows_path(&self) -> String;
    fn buildflow_path(&self, id: &str) -> String;
    fn ci_builds_path(&self, buildflow_id: &str) -> String;
    fn builds_path(&self, buildflow_id: &str) -> String;
    /// Target of a manual image build trigger
    fn manual_build_path(&self, buildflow_id: &str) -> String;

    fn decode_buildflows(&self, body: &[u8]) -> Result<Vec<Buildflow>>;
    fn decode_buildflow(&self, body: &[u8]) -> Result<Buildflow>;
    fn decode_ci_builds(&self, body: &[u8]) -> Result<Vec<CiBuild>>;
    fn decode_builds(&self, body: &[u8]) -> Result<Vec<Build>>;
}

// =========================================================================
// ship generation
// =========================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct ShipSchema;

#[derive(Debug, Deserialize)]
struct ShipProjectList {
    #[serde(default)]
    projects: Option<Vec<ShipBuildflow>>,
}

#[derive(Debug, Deserialize)]
struct ShipBuildflow {
    #[serde(default, deserialize_with = "null_default")]
    project: ShipProject,
    #[serde(default)]
    last_build: Option<Build>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ShipProject {
    #[serde(deserialize_with = "null_default")]
    buildflow_id: String,
    #[serde(deserialize_with = "null_default")]
    name: String,
    #[serde(deserialize_with = "null_default")]
    package_id: String,
}

impl From<ShipBuildflow> for Buildflow {
    fn from(value: ShipBuildflow) -> Self {
        Self {
            id: value.project.buildflow_id,
            name: value.project.name,
            package_id: value.project.package_id,
            latest_build: value.last_build,
        }
    }
}

#[derive(Debug, Deserialize)]
struct BuildList {
    #[serde(default)]
    builds: Option<Vec<Build>>,
}

#[derive(Debug, Deserialize)]
struct ShipCiBuildList {
    #[serde(default)]
    builds: Option<Vec<CiBuild>>,
}

impl ApiSchema for ShipSchema {
    fn version(&self) -> SchemaVersion {
        SchemaVersion::Ship
    }

    fn list_all_query(&self) -> &'static str {
        "size=-1&offset=0"
    }

    fn buildflows_path(&self) -> String {
        format!("/v1/ship/projects?{}", self.list_all_query())
    }

    fn buildflow_path(&self, id: &str) -> String {
        format!("/v1/ship/project/{}", encode_segment(id))
    }

    fn ci_builds_path(&self, buildflow_id: &str) -> String {
        format!(
            "{}/ci_build?{}",
            self.buildflow_path(buildflow_id),
            self.list_all_query()
        )
    }

    fn builds_path(&self, buildflow_id: &str) -> String {
        format!(
            "{}?{}",
            self.manual_build_path(buildflow_id),
            self.list_all_query()
        )
    }

    fn manual_build_path(&self, buildflow_id: &str) -> String {
        format!("{}/image_build", self.buildflow_path(buildflow_id))
    }

    fn decode_buildflows(&self, body: &[u8]) -> Result<Vec<Buildflow>> {
        let list: ShipProjectList = decode(body)?;
        Ok(list
            .projects
            .unwrap_or_default()
            .into_iter()
            .map(Buildflow::from)
            .collect())
    }

    fn decode_buildflow(&self, body: &[u8]) -> Result<Buildflow> {
        let flow: ShipBuildflow = decode(body)?;
        Ok(flow.into())
    }

    fn decode_ci_builds(&self, body: &[u8]) -> Result<Vec<CiBuild>> {
        let list: ShipCiBuildList = decode(body)?;
        Ok(list.builds.unwrap_or_default())
    }

    fn decode_builds(&self, body: &[u8]) -> Result<Vec<Build>> {
        let list: BuildList = decode(body)?;
        Ok(list.builds.unwrap_or_default())
    }
}

// =========================================================================
// classic generation
// =========================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct ClassicSchema;

#[derive(Debug, Deserialize)]
struct ClassicBuildflowList {
    #[serde(default)]
    buildflows: Option<Vec<Buildflow>>,
}

#[derive(Debug, Deserialize)]
struct ClassicCiBuildList {
    #[serde(default)]
    cibuilds: Option<Vec<CiBuild>>,
}

impl ApiSchema for ClassicSchema {
    fn version(&self) -> SchemaVersion {
        SchemaVersion::Classic
    }

    fn list_all_query(&self) -> &'static str {
        "limit=-1"
    }

    fn buildflows_path(&self) -> String {
        format!("/v1/buildflows?{}", self.list_all_query())
    }

    fn buildflow_path(&self, id: &str) -> String {
        format!("/v1/buildflows/{}", encode_segment(id))
    }

    fn ci_builds_path(&self, buildflow_id: &str) -> String {
        format!(
            "{}/cibuilds?{}",
            self.buildflow_path(buildflow_id),
            self.list_all_query()
        )
    }

    fn builds_path(&self, buildflow_id: &str) -> String {
        format!(
            "{}?{}",
            self.manual_build_path(buildflow_id),
            self.list_all_query()
        )
    }

    fn manual_build_path(&self, buildflow_id: &str) -> String {
        format!("{}/builds", self.buildflow_path(buildflow_id))
    }

    fn decode_buildflows(&self, body: &[u8]) -> Result<Vec<Buildflow>> {
        let list: ClassicBuildflowList = decode(body)?;
        Ok(list.buildflows.unwrap_or_default())
    }

    fn decode_buildflow(&self, body: &[u8]) -> Result<Buildflow> {
        decode(body)
    }

    fn decode_ci_builds(&self, body: &[u8]) -> Result<Vec<CiBuild>> {
        let list: ClassicCiBuildList = decode(body)?;
        Ok(list.cibuilds.unwrap_or_default())
    }

    fn decode_builds(&self, body: &[u8]) -> Result<Vec<Build>> {
        let list: BuildList = decode(body)?;
        Ok(list.builds.unwrap_or_default())
    }
}
