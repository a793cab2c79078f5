//! Platform API interaction module
//!
//! Everything needed to talk to the platform's HTTP/JSON API: the request
//! dispatcher, the schema-generation strategy, and one module per resource.
//!
//! # Module Structure
//!
//! - [`client`] - Main client; owns endpoints, auth token and request dispatch
//! - [`http`] - HTTP transport and response classification
//! - [`schema`] - Wire schema generations (`ship` / `classic`)
//! - [`auth`] - Login/logout against the internal host
//! - [`apps`], [`stacks`], [`buildflows`], [`packages`], [`services`],
//!   [`clusters`], [`runtimes`] - Resource operations
//!
//! # Example
//!
//! ```ignore
//! use dao_client::{Config, DaoClient};
//!
//! async fn example() -> dao_client::Result<()> {
//!     let client = DaoClient::new(&Config::new("api.daocloud.io"))?;
//!     let stack_id = client.create_stack("web", "node1", "web:\n  image: nginx\n").await?;
//!     println!("{}", client.get_stack_state(&stack_id).await?);
//!     Ok(())
//! }
//! ```

pub mod apps;
pub mod auth;
pub mod buildflows;
pub mod client;
pub mod clusters;
pub mod http;
pub mod packages;
pub mod runtimes;
pub mod schema;
pub mod services;
pub mod stacks;
