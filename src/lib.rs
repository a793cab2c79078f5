//! Client library for the DaoCloud platform API.
//!
//! Every operation is one HTTP request: build the body, send it, classify the
//! status (200..=299 is success), decode the answer. Nothing is cached,
//! retried or polled.

pub mod api;
pub mod config;
pub mod error;
pub mod logging;

/// Version injected at compile time via DAO_CLIENT_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("DAO_CLIENT_VERSION") {
    Some(v) => v,
    None => "dev",
};

pub use api::apps::{App, CreateAppRequest, CreateCfAppRequest, CreateSrAppRequest};
pub use api::buildflows::{Build, Buildflow, CiBuild};
pub use api::client::{first_match, DaoClient, Endpoint};
pub use api::clusters::{uninstall_cmd, Cluster, Node, SingleRuntimeEnv};
pub use api::http::RawResponse;
pub use api::packages::{Package, PackageSource, PortInfo, Release};
pub use api::runtimes::Runtime;
pub use api::schema::SchemaVersion;
pub use api::services::{EnvVar, Service, ServiceInstance};
pub use api::stacks::Stack;
pub use config::Config;
pub use error::{Error, Result};
