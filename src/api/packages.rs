//! Packages
//!
//! Buildable, deployable artifact sources and their releases.

use super::client::DaoClient;
use super::http::{encode_segment, null_default};
use crate::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Release {
    #[serde(rename = "release_name", deserialize_with = "null_default")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Package {
    #[serde(rename = "package_id", deserialize_with = "null_default")]
    pub id: String,
    #[serde(rename = "package_name", deserialize_with = "null_default")]
    pub name: String,
    #[serde(rename = "docker_repo_namespace", deserialize_with = "null_default")]
    pub namespace: String,
    #[serde(rename = "package_source_full_name", deserialize_with = "null_default")]
    pub full_name: String,
    #[serde(deserialize_with = "null_default")]
    pub is_public: bool,
    #[serde(deserialize_with = "null_default")]
    pub user_id: String,
    #[serde(deserialize_with = "null_default")]
    pub tenant_id: String,
    #[serde(rename = "releases_count", deserialize_with = "null_default")]
    pub release_count: u32,
    pub latest_release: Option<Release>,
}

/// Port a package release exposes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortInfo {
    #[serde(deserialize_with = "null_default")]
    pub protocol: String,
    #[serde(deserialize_with = "null_default")]
    pub port: u16,
}

/// Which package catalogue to list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PackageSource {
    /// Packages owned by the account
    #[default]
    Own,
    /// The platform's public catalogue
    Public,
}

impl PackageSource {
    fn list_path(self) -> &'static str {
        match self {
            PackageSource::Own => "/v1/packages?limit=-1",
            PackageSource::Public => "/v1/packages?limit=-1&is_public=true",
        }
    }
}

#[derive(Debug, Deserialize)]
struct PackageList {
    #[serde(default)]
    packages: Option<Vec<Package>>,
}

#[derive(Debug, Deserialize)]
struct ReleaseList {
    #[serde(default)]
    releases: Option<Vec<Release>>,
}

#[derive(Debug, Deserialize)]
struct PortInfoList {
    #[serde(default)]
    expose_ports: Option<Vec<PortInfo>>,
}

impl DaoClient {
    pub async fn list_packages(&self, source: PackageSource) -> Result<Vec<Package>> {
        let list: PackageList = self.get_json(source.list_path()).await?;
        Ok(list.packages.unwrap_or_default())
    }

    pub async fn list_package_releases(&self, package_id: &str) -> Result<Vec<Release>> {
        let list: ReleaseList = self
            .get_json(&format!("/v1/packages/{}/releases", encode_segment(package_id)))
            .await?;
        Ok(list.releases.unwrap_or_default())
    }

    /// Ports exposed by one release of a package
    pub async fn get_port_info(&self, package_id: &str, release: &str) -> Result<Vec<PortInfo>> {
        let list: PortInfoList = self
            .get_json(&format!(
                "/v1/packages/{}/tags/{}/ports_info",
                encode_segment(package_id),
                encode_segment(release)
            ))
            .await?;
        Ok(list.expose_ports.unwrap_or_default())
    }
}
