//! Stacks
//!
//! Named bundles of apps deployed together from a compose descriptor onto a
//! single-runtime node.

use super::apps::{App, NodeTag, StateResponse};
use super::client::{first_match, DaoClient};
use super::http::{encode_segment, null_default};
use super::runtimes::SINGLE_RUNTIME_ID;
use crate::error::Result;
use reqwest::Method;
use serde::{Deserialize, Serialize};

/// Stack information
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stack {
    #[serde(rename = "stack_id", deserialize_with = "null_default")]
    pub id: String,
    #[serde(deserialize_with = "null_default")]
    pub name: String,
    #[serde(deserialize_with = "null_default")]
    pub apps: Vec<App>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackOptions {
    pub compose_yml: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackMetadata {
    pub tags: Vec<NodeTag>,
}

/// Body of `POST /v1/stacks`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateStackRequest {
    pub name: String,
    pub runtime_id: String,
    pub extra_options: StackOptions,
    pub metadata: StackMetadata,
}

impl CreateStackRequest {
    pub fn new(name: &str, node_name: &str, yml: &str) -> Self {
        Self {
            name: name.to_string(),
            runtime_id: SINGLE_RUNTIME_ID.to_string(),
            extra_options: StackOptions {
                compose_yml: yml.to_string(),
            },
            metadata: StackMetadata {
                tags: vec![NodeTag::new(node_name)],
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct StackIdResponse {
    stack_id: String,
}

#[derive(Debug, Deserialize)]
struct StackList {
    #[serde(default)]
    stacks: Option<Vec<Stack>>,
}

fn stack_path(id: &str) -> String {
    format!("/v1/stacks/{}", encode_segment(id))
}

impl DaoClient {
    /// Create a stack on `node_name` from a compose descriptor, returning its id
    pub async fn create_stack(&self, name: &str, node_name: &str, yml: &str) -> Result<String> {
        let request = CreateStackRequest::new(name, node_name, yml);
        let response: StackIdResponse = self
            .send_json(Method::POST, "/v1/stacks", &request)
            .await?;
        tracing::info!("Created stack {} ({})", name, response.stack_id);
        Ok(response.stack_id)
    }

    pub async fn list_stacks(&self) -> Result<Vec<Stack>> {
        let list: StackList = self.get_json("/v1/stacks").await?;
        Ok(list.stacks.unwrap_or_default())
    }

    /// Find a stack by id in the full listing
    pub async fn get_stack(&self, id: &str) -> Result<Option<Stack>> {
        let stacks = self.list_stacks().await?;
        Ok(first_match(stacks, |s| s.id == id))
    }

    pub async fn get_stack_state(&self, id: &str) -> Result<String> {
        let state: StateResponse = self
            .get_json(&format!("{}/state", stack_path(id)))
            .await?;
        Ok(state.state)
    }

    pub async fn start_stack(&self, id: &str) -> Result<()> {
        self.send_action(Method::POST, &format!("{}/actions/start", stack_path(id)))
            .await
    }

    pub async fn stop_stack(&self, id: &str) -> Result<()> {
        self.send_action(Method::POST, &format!("{}/actions/stop", stack_path(id)))
            .await
    }

    pub async fn delete_stack(&self, id: &str) -> Result<()> {
        self.send_action(Method::DELETE, &stack_path(id)).await
    }
}
