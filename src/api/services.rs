//! Services and service instances

use super::client::{first_match, DaoClient};
use super::http::{encode_segment, null_default};
use crate::error::Result;
use reqwest::Method;
use serde::{Deserialize, Serialize};

/// A provisionable service from the catalogue (e.g. a database)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Service {
    #[serde(rename = "service_id", deserialize_with = "null_default")]
    pub id: String,
    #[serde(rename = "service_name", deserialize_with = "null_default")]
    pub name: String,
    #[serde(rename = "category_name", deserialize_with = "null_default")]
    pub category: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvVar {
    #[serde(rename = "env_var_name", deserialize_with = "null_default")]
    pub name: String,
    #[serde(rename = "env_var_value", deserialize_with = "null_default")]
    pub value: String,
}

/// A provisioned service, exposing its connection settings as env vars
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceInstance {
    #[serde(rename = "service_instance_id", deserialize_with = "null_default")]
    pub id: String,
    #[serde(rename = "service_instance_name", deserialize_with = "null_default")]
    pub name: String,
    #[serde(deserialize_with = "null_default")]
    pub service_id: String,
    #[serde(deserialize_with = "null_default")]
    pub env_vars: Vec<EnvVar>,
    #[serde(deserialize_with = "null_default")]
    pub instance_type: String,
}

/// Reference to a service instance inside an app, under an alias
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceBinding {
    #[serde(rename = "service_instance_id")]
    pub id: String,
    #[serde(rename = "service_alias")]
    pub alias: String,
}

impl ServiceBinding {
    pub fn new(service_instance_id: &str, alias: &str) -> Self {
        Self {
            id: service_instance_id.to_string(),
            alias: alias.to_string(),
        }
    }
}

/// Body of `POST /v1/service-instances`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateServiceInstanceRequest {
    pub service_id: String,
    #[serde(rename = "service_instance_name")]
    pub name: String,
    #[serde(rename = "service_instance_type")]
    pub instance_type: String,
}

#[derive(Debug, Deserialize)]
struct ServiceList {
    #[serde(default)]
    services: Option<Vec<Service>>,
}

#[derive(Debug, Deserialize)]
struct ServiceInstanceList {
    // older platform builds answer under the misspelled key
    #[serde(default, alias = "service_services")]
    service_instances: Option<Vec<ServiceInstance>>,
}

#[derive(Debug, Deserialize)]
struct ServiceInstanceIdResponse {
    service_instance_id: String,
}

impl DaoClient {
    pub async fn list_services(&self) -> Result<Vec<Service>> {
        let list: ServiceList = self.get_json("/v1/services").await?;
        Ok(list.services.unwrap_or_default())
    }

    /// Find a service by name, ignoring case
    pub async fn get_service(&self, name: &str) -> Result<Option<Service>> {
        let services = self.list_services().await?;
        let name = name.to_lowercase();
        Ok(first_match(services, |s| s.name.to_lowercase() == name))
    }

    pub async fn list_service_instances(&self) -> Result<Vec<ServiceInstance>> {
        let list: ServiceInstanceList = self.get_json("/v1/service-instances").await?;
        Ok(list.service_instances.unwrap_or_default())
    }

    /// Provision a service instance, returning its id
    pub async fn create_service_instance(
        &self,
        service_id: &str,
        name: &str,
        instance_type: &str,
    ) -> Result<String> {
        let request = CreateServiceInstanceRequest {
            service_id: service_id.to_string(),
            name: name.to_string(),
            instance_type: instance_type.to_string(),
        };

        let response: ServiceInstanceIdResponse = self
            .send_json(Method::POST, "/v1/service-instances", &request)
            .await?;
        tracing::info!("Created service instance {}", response.service_instance_id);
        Ok(response.service_instance_id)
    }

    /// Find a service instance by id in the full listing
    pub async fn get_service_instance(&self, id: &str) -> Result<Option<ServiceInstance>> {
        let instances = self.list_service_instances().await?;
        Ok(first_match(instances, |i| i.id == id))
    }

    pub async fn delete_service_instance(&self, id: &str) -> Result<()> {
        self.send_action(
            Method::DELETE,
            &format!("/v1/service-instances/{}", encode_segment(id)),
        )
        .await
    }
}
