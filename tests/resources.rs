//! Integration tests for resource operations using wiremock
//!
//! Each test mounts the endpoint an operation should hit and checks the
//! request body it sends and the typed result it decodes.

use dao_client::{Config, DaoClient, Error, PackageSource};
use serde_json::json;
use std::collections::BTreeMap;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> DaoClient {
    let mut config = Config::new(&server.uri());
    config.auth_token = Some("token-abc".to_string());
    DaoClient::new(&config).expect("client should build")
}

mod app_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_cf_app() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/apps"))
            .and(body_json(json!({
                "name": "web",
                "runtime_id": "a849cdf2-c79e-4c29-83ca-50751cc388a5",
                "package_id": "pkg1",
                "release_name": "v1",
                "instances": 1,
                "env_vars": {},
                "metadata": {
                    "command": "",
                    "volumes": [],
                    "instance_type": "1x",
                    "expose_ports": [{
                        "container_port": 8080,
                        "protocol": "tcp",
                        "publish_type": "http",
                        "external": "external"
                    }],
                    "service_instances": []
                },
                "extra_options": {"start_after_stage": true}
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"app_id": "app-1"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let id = client
            .create_cf_app("web", "pkg1", "v1", "1x", 8080)
            .await
            .unwrap();
        assert_eq!(id, "app-1");
    }

    #[tokio::test]
    async fn test_create_sr_app() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/apps"))
            .and(body_json(json!({
                "name": "web",
                "runtime_id": "srsrsrsrsrsrsrsrsrsrsrsrsrsrsrsrsrsrsrsrsrsr",
                "package_id": "pkg1",
                "release_name": "v2",
                "instances": 1,
                "env_vars": {},
                "metadata": {
                    "command": "",
                    "container_volumes": [],
                    "tags": [{"name": "node1"}],
                    "container_ports": [
                        {"container_port": 80, "host_port": 8080, "protocol": "tcp", "published": true}
                    ],
                    "container_restart": "always",
                    "container_privileged": false
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"app_id": "app-2"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let ports = BTreeMap::from([(80, 8080)]);
        let id = client
            .create_sr_app("web", "pkg1", "v2", "node1", &ports)
            .await
            .unwrap();
        assert_eq!(id, "app-2");
    }

    #[tokio::test]
    async fn test_get_app_first_match_and_absent() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/apps"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "apps": [
                    {"app_id": "a1", "name": "first"},
                    {"app_id": "a2", "name": "other"},
                    {"app_id": "a1", "name": "second"}
                ]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);

        let app = client.get_app("a1").await.unwrap().expect("app should exist");
        assert_eq!(app.name, "first");

        assert!(client.get_app("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_app_url_and_state() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/apps/a1/details"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"url": "http://web.example.io"})),
            )
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/apps/a1/state"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"state": "running"})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(client.get_app_url("a1").await.unwrap(), "http://web.example.io");
        assert_eq!(client.get_app_state("a1").await.unwrap(), "running");
    }

    #[tokio::test]
    async fn test_lifecycle_actions() {
        let server = MockServer::start().await;

        for action in ["start", "stop"] {
            Mock::given(method("POST"))
                .and(path(format!("/v1/apps/a1/actions/{}", action)))
                .respond_with(ResponseTemplate::new(202))
                .expect(1)
                .mount(&server)
                .await;
        }

        Mock::given(method("DELETE"))
            .and(path("/v1/apps/a1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.start_app("a1").await.unwrap();
        client.stop_app("a1").await.unwrap();
        client.delete_app("a1").await.unwrap();
    }

    #[tokio::test]
    async fn test_restage_honours_start_flag() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/apps/a1/actions/restage"))
            .and(body_json(json!({
                "package_id": "pkg1",
                "release_name": "v3",
                "extra_options": {"start_after_stage": false}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"app_id": "a1"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let id = client.restage_app("a1", "pkg1", "v3", false).await.unwrap();
        assert_eq!(id, "a1");
    }

    #[tokio::test]
    async fn test_patch_operations() {
        let server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/v1/apps/a1"))
            .and(body_json(json!({
                "extra_options": {"compose_yml": "web:\n  image: nginx\n", "operation": "update_compose_yml"}
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("PATCH"))
            .and(path("/v1/apps/a1"))
            .and(body_json(json!({
                "metadata": {"service_instances": [{"service_instance_id": "si1", "service_alias": "db"}]},
                "extra_options": {"operation": "service_instances"}
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        client
            .update_app_yml("a1", "web:\n  image: nginx\n")
            .await
            .unwrap();
        client.bind_service_instance("a1", "si1", "db").await.unwrap();
    }
}

mod stack_tests {
    use super::*;

    /// Test CreateStack("web", "node1", "<yml>") against a 201
    #[tokio::test]
    async fn test_create_stack() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/stacks"))
            .and(body_json(json!({
                "name": "web",
                "runtime_id": "srsrsrsrsrsrsrsrsrsrsrsrsrsrsrsrsrsrsrsrsrsr",
                "extra_options": {"compose_yml": "<yml>"},
                "metadata": {"tags": [{"name": "node1"}]}
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"stack_id": "abc123"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let id = client.create_stack("web", "node1", "<yml>").await.unwrap();
        assert_eq!(id, "abc123");
    }

    #[tokio::test]
    async fn test_stack_lookup_state_and_actions() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/stacks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "stacks": [{"stack_id": "s1", "name": "web", "apps": [{"app_id": "a1", "name": "nginx"}]}]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/stacks/s1/state"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"state": "stopped"})))
            .mount(&server)
            .await;

        for action in ["start", "stop"] {
            Mock::given(method("POST"))
                .and(path(format!("/v1/stacks/s1/actions/{}", action)))
                .respond_with(ResponseTemplate::new(200))
                .expect(1)
                .mount(&server)
                .await;
        }

        Mock::given(method("DELETE"))
            .and(path("/v1/stacks/s1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);

        let stack = client.get_stack("s1").await.unwrap().unwrap();
        assert_eq!(stack.apps[0].id, "a1");
        assert!(client.get_stack("s2").await.unwrap().is_none());

        assert_eq!(client.get_stack_state("s1").await.unwrap(), "stopped");
        client.start_stack("s1").await.unwrap();
        client.stop_stack("s1").await.unwrap();
        client.delete_stack("s1").await.unwrap();
    }
}

mod service_tests {
    use super::*;

    /// Test ListService against an empty listing
    #[tokio::test]
    async fn test_list_services_empty() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/services"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"services": []})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let services = client.list_services().await.unwrap();
        assert!(services.is_empty());
    }

    #[tokio::test]
    async fn test_get_service_ignores_case() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/services"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "services": [
                    {"service_id": "s1", "service_name": "MySQL", "category_name": "database"},
                    {"service_id": "s2", "service_name": "mysql", "category_name": "database"}
                ]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let service = client.get_service("mysql").await.unwrap().unwrap();
        assert_eq!(service.id, "s1");
        assert!(client.get_service("redis").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_service_instances() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/service-instances"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "service_services": [{
                    "service_instance_id": "si1",
                    "service_instance_name": "orders-db",
                    "service_id": "s1",
                    "instance_type": "small",
                    "env_vars": [{"env_var_name": "MYSQL_HOST", "env_var_value": "10.0.0.3"}]
                }]
            })))
            .mount(&server)
            .await;

        Mock::given(method("DELETE"))
            .and(path("/v1/service-instances/si1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let instance = client.get_service_instance("si1").await.unwrap().unwrap();
        assert_eq!(instance.env_vars[0].name, "MYSQL_HOST");
        assert!(client.get_service_instance("si2").await.unwrap().is_none());

        client.delete_service_instance("si1").await.unwrap();
    }
}

mod package_tests {
    use super::*;

    #[tokio::test]
    async fn test_list_packages_by_source() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/packages"))
            .and(query_param("limit", "-1"))
            .and(query_param("is_public", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "packages": [{"package_id": "p-pub", "package_name": "nginx", "is_public": true}]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/packages"))
            .and(query_param("limit", "-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "packages": [{"package_id": "p-own", "package_name": "web"}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);

        let public = client.list_packages(PackageSource::Public).await.unwrap();
        assert_eq!(public[0].id, "p-pub");
        assert!(public[0].is_public);

        let own = client.list_packages(PackageSource::Own).await.unwrap();
        assert_eq!(own[0].id, "p-own");
    }

    #[tokio::test]
    async fn test_releases_and_ports() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/packages/p1/releases"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "releases": [{"release_name": "v1"}, {"release_name": "v2"}]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/packages/p1/tags/v2/ports_info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "expose_ports": [{"protocol": "tcp", "port": 80}, {"protocol": "udp", "port": 53}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);

        let releases = client.list_package_releases("p1").await.unwrap();
        assert_eq!(releases.len(), 2);
        assert_eq!(releases[1].name, "v2");

        let ports = client.get_port_info("p1", "v2").await.unwrap();
        assert_eq!(ports[1].protocol, "udp");
        assert_eq!(ports[1].port, 53);
    }
}

mod cluster_tests {
    use super::*;

    #[tokio::test]
    async fn test_import_cmd_uses_default_cluster() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/single_runtime/env"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "dao_get_url": "https://get.example.com",
                "dao_keeper_url": "wss://keeper.example.com"
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/clusters"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "clusters": [
                    {"node_cluster_id": "c1", "is_default": false, "suggest_token": "t1"},
                    {"node_cluster_id": "c2", "is_default": true, "suggest_token": "t2", "nodes": []}
                ]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let cmd = client.get_import_cmd().await.unwrap();
        assert_eq!(
            cmd,
            "curl -sSL https://get.example.com/daomonit/install.sh | sh -s t2 wss://keeper.example.com"
        );
    }

    #[tokio::test]
    async fn test_import_cmd_without_default_cluster() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/single_runtime/env"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "dao_get_url": "https://get.example.com",
                "dao_keeper_url": "wss://keeper.example.com"
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/clusters"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"clusters": []})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.get_import_cmd().await.unwrap_err();
        assert!(matches!(err, Error::NoDefaultCluster));
    }

    #[tokio::test]
    async fn test_delete_node() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/v1/single_runtime/nodes/n1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.delete_node("n1").await.unwrap();
    }

    #[tokio::test]
    async fn test_list_runtimes() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/runtimes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "runtimes": [{"runtime_id": "r1", "app_runtime_type": "sr", "app_runtime_name": "Single"}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let runtimes = client.list_runtimes().await.unwrap();
        assert_eq!(runtimes[0].runtime_type, "sr");
    }
}

/// Go servers emit `null` for nil slices and empty strings
mod null_field_tests {
    use super::*;

    #[tokio::test]
    async fn test_null_entity_fields_decode_as_empty() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/stacks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "stacks": [{"stack_id": "s1", "name": "web", "apps": null}]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/clusters"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "clusters": [{
                    "node_cluster_id": "c1",
                    "node_cluster_name": null,
                    "is_default": true,
                    "suggest_token": "t1",
                    "nodes": null
                }]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/service-instances"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "service_instances": [
                    {"service_instance_id": "si1", "env_vars": null, "instance_type": null}
                ]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/apps"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "apps": [{"app_id": "a1", "name": null, "runtime": null}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);

        let stacks = client.list_stacks().await.unwrap();
        assert_eq!(stacks[0].id, "s1");
        assert!(stacks[0].apps.is_empty());

        let cluster = client.get_default_cluster().await.unwrap().unwrap();
        assert_eq!(cluster.token, "t1");
        assert_eq!(cluster.name, "");
        assert!(cluster.nodes.is_empty());

        let instance = client.get_service_instance("si1").await.unwrap().unwrap();
        assert!(instance.env_vars.is_empty());
        assert_eq!(instance.instance_type, "");

        let app = client.get_app("a1").await.unwrap().unwrap();
        assert_eq!(app.name, "");
        assert!(app.runtime.is_none());
    }
}
