//! Apps
//!
//! Deploying apps onto either runtime, and driving their lifecycle.

use super::client::{first_match, DaoClient};
use super::http::{encode_segment, null_default};
use super::runtimes::{Runtime, CF_RUNTIME_ID, SINGLE_RUNTIME_ID};
use super::services::ServiceBinding;
use crate::error::Result;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// App information
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct App {
    #[serde(rename = "app_id", deserialize_with = "null_default")]
    pub id: String,
    #[serde(deserialize_with = "null_default")]
    pub name: String,
    pub runtime: Option<Runtime>,
}

/// `{"name": <node>}` placement tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeTag {
    pub name: String,
}

impl NodeTag {
    pub fn new(node_name: &str) -> Self {
        Self {
            name: node_name.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageOptions {
    pub start_after_stage: bool,
}

// =========================================================================
// Hosted runtime
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposePort {
    pub container_port: u16,
    pub protocol: String,
    pub publish_type: String,
    pub external: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CfAppMetadata {
    pub command: String,
    pub volumes: Vec<String>,
    pub instance_type: String,
    pub expose_ports: Vec<ExposePort>,
    pub service_instances: Vec<ServiceBinding>,
}

/// Body of `POST /v1/apps` for the hosted runtime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCfAppRequest {
    pub name: String,
    pub runtime_id: String,
    pub package_id: String,
    pub release_name: String,
    pub instances: u32,
    pub env_vars: BTreeMap<String, String>,
    pub metadata: CfAppMetadata,
    pub extra_options: StageOptions,
}

impl CreateCfAppRequest {
    /// Single instance exposing `port` over external http, started after staging
    pub fn new(name: &str, package_id: &str, release: &str, instance_type: &str, port: u16) -> Self {
        Self {
            name: name.to_string(),
            runtime_id: CF_RUNTIME_ID.to_string(),
            package_id: package_id.to_string(),
            release_name: release.to_string(),
            instances: 1,
            env_vars: BTreeMap::new(),
            metadata: CfAppMetadata {
                command: String::new(),
                volumes: Vec::new(),
                instance_type: instance_type.to_string(),
                expose_ports: vec![ExposePort {
                    container_port: port,
                    protocol: "tcp".to_string(),
                    publish_type: "http".to_string(),
                    external: "external".to_string(),
                }],
                service_instances: Vec::new(),
            },
            extra_options: StageOptions {
                start_after_stage: true,
            },
        }
    }

    pub fn with_env_var(mut self, name: &str, value: &str) -> Self {
        self.env_vars.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_service_instance(mut self, instance_id: &str, alias: &str) -> Self {
        self.metadata
            .service_instances
            .push(ServiceBinding::new(instance_id, alias));
        self
    }
}

// =========================================================================
// Single runtime
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerPort {
    pub container_port: u16,
    pub host_port: u16,
    pub protocol: String,
    pub published: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SrAppMetadata {
    pub command: String,
    pub container_volumes: Vec<String>,
    pub tags: Vec<NodeTag>,
    pub container_ports: Vec<ContainerPort>,
    pub container_restart: String,
    pub container_privileged: bool,
}

/// Body of `POST /v1/apps` for a single-runtime node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSrAppRequest {
    pub name: String,
    pub runtime_id: String,
    pub package_id: String,
    pub release_name: String,
    pub instances: u32,
    pub env_vars: BTreeMap<String, String>,
    pub metadata: SrAppMetadata,
}

impl CreateSrAppRequest {
    /// Pinned to `node_name`, publishing each container port on its mapped host port
    pub fn new(
        name: &str,
        package_id: &str,
        release: &str,
        node_name: &str,
        ports: &BTreeMap<u16, u16>,
    ) -> Self {
        let container_ports = ports
            .iter()
            .map(|(&container_port, &host_port)| ContainerPort {
                container_port,
                host_port,
                protocol: "tcp".to_string(),
                published: true,
            })
            .collect();

        Self {
            name: name.to_string(),
            runtime_id: SINGLE_RUNTIME_ID.to_string(),
            package_id: package_id.to_string(),
            release_name: release.to_string(),
            instances: 1,
            env_vars: BTreeMap::new(),
            metadata: SrAppMetadata {
                command: String::new(),
                container_volumes: Vec::new(),
                tags: vec![NodeTag::new(node_name)],
                container_ports,
                container_restart: "always".to_string(),
                container_privileged: false,
            },
        }
    }

    pub fn with_env_var(mut self, name: &str, value: &str) -> Self {
        self.env_vars.insert(name.to_string(), value.to_string());
        self
    }
}

/// Either flavour of app creation body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CreateAppRequest {
    Cf(CreateCfAppRequest),
    Sr(CreateSrAppRequest),
}

// =========================================================================
// Update bodies
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestageRequest {
    pub package_id: String,
    pub release_name: String,
    pub extra_options: StageOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposeYmlOptions {
    pub compose_yml: String,
    pub operation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateAppYmlRequest {
    pub extra_options: ComposeYmlOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInstancesMetadata {
    pub service_instances: Vec<ServiceBinding>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationOptions {
    pub operation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindServiceInstanceRequest {
    pub metadata: ServiceInstancesMetadata,
    pub extra_options: OperationOptions,
}

#[derive(Debug, Deserialize)]
struct AppIdResponse {
    app_id: String,
}

#[derive(Debug, Deserialize)]
struct AppList {
    #[serde(default)]
    apps: Option<Vec<App>>,
}

#[derive(Debug, Deserialize)]
struct AppDetails {
    url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StateResponse {
    pub(crate) state: String,
}

fn app_path(id: &str) -> String {
    format!("/v1/apps/{}", encode_segment(id))
}

impl DaoClient {
    /// Create an app from a prepared request, returning its id
    pub async fn create_app(&self, request: &CreateAppRequest) -> Result<String> {
        let response: AppIdResponse = self.send_json(Method::POST, "/v1/apps", request).await?;
        tracing::info!("Created app {}", response.app_id);
        Ok(response.app_id)
    }

    /// Deploy a package release on the hosted runtime
    pub async fn create_cf_app(
        &self,
        name: &str,
        package_id: &str,
        release: &str,
        instance_type: &str,
        port: u16,
    ) -> Result<String> {
        let request = CreateCfAppRequest::new(name, package_id, release, instance_type, port);
        self.create_app(&CreateAppRequest::Cf(request)).await
    }

    /// Deploy a package release onto a single-runtime node
    ///
    /// `ports` maps container port to host port.
    pub async fn create_sr_app(
        &self,
        name: &str,
        package_id: &str,
        release: &str,
        node_name: &str,
        ports: &BTreeMap<u16, u16>,
    ) -> Result<String> {
        let request = CreateSrAppRequest::new(name, package_id, release, node_name, ports);
        self.create_app(&CreateAppRequest::Sr(request)).await
    }

    pub async fn list_apps(&self) -> Result<Vec<App>> {
        let list: AppList = self.get_json("/v1/apps").await?;
        Ok(list.apps.unwrap_or_default())
    }

    /// Find an app by id in the full listing
    pub async fn get_app(&self, id: &str) -> Result<Option<App>> {
        let apps = self.list_apps().await?;
        Ok(first_match(apps, |app| app.id == id))
    }

    /// Public URL of an app
    pub async fn get_app_url(&self, id: &str) -> Result<String> {
        let details: AppDetails = self
            .get_json(&format!("{}/details", app_path(id)))
            .await?;
        Ok(details.url)
    }

    /// Current state string as reported by the platform
    pub async fn get_app_state(&self, id: &str) -> Result<String> {
        let state: StateResponse = self.get_json(&format!("{}/state", app_path(id))).await?;
        Ok(state.state)
    }

    pub async fn start_app(&self, id: &str) -> Result<()> {
        self.send_action(Method::POST, &format!("{}/actions/start", app_path(id)))
            .await
    }

    pub async fn stop_app(&self, id: &str) -> Result<()> {
        self.send_action(Method::POST, &format!("{}/actions/stop", app_path(id)))
            .await
    }

    pub async fn delete_app(&self, id: &str) -> Result<()> {
        self.send_action(Method::DELETE, &app_path(id)).await
    }

    /// Rebuild an app from another package release, returning the app id
    pub async fn restage_app(
        &self,
        id: &str,
        package_id: &str,
        release: &str,
        start_after_stage: bool,
    ) -> Result<String> {
        let request = RestageRequest {
            package_id: package_id.to_string(),
            release_name: release.to_string(),
            extra_options: StageOptions { start_after_stage },
        };

        let response: AppIdResponse = self
            .send_json(
                Method::POST,
                &format!("{}/actions/restage", app_path(id)),
                &request,
            )
            .await?;
        Ok(response.app_id)
    }

    /// Replace the compose descriptor of an app
    pub async fn update_app_yml(&self, id: &str, yml: &str) -> Result<()> {
        let request = UpdateAppYmlRequest {
            extra_options: ComposeYmlOptions {
                compose_yml: yml.to_string(),
                operation: "update_compose_yml".to_string(),
            },
        };

        self.send_action_with(Method::PATCH, &app_path(id), &request)
            .await
    }

    /// Bind a service instance into an app's environment under `alias`
    pub async fn bind_service_instance(
        &self,
        id: &str,
        service_instance_id: &str,
        alias: &str,
    ) -> Result<()> {
        let request = BindServiceInstanceRequest {
            metadata: ServiceInstancesMetadata {
                service_instances: vec![ServiceBinding::new(service_instance_id, alias)],
            },
            extra_options: OperationOptions {
                operation: "service_instances".to_string(),
            },
        };

        self.send_action_with(Method::PATCH, &app_path(id), &request)
            .await
    }
}
