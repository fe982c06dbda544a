//! Cluster admin provisioning tests.

use ocm_control::testing::Operation;
use ocm_control::{ErrorKind, ProvisionFailure, ProvisionState};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{API_URL, CLUSTER_ID, MockOcm, in_memory_client};

const USERS: &str = "/groups/cluster-admins/users";

async fn mount_create_user(ocm: &MockOcm, status: u16) {
    let response = if status == 201 {
        ResponseTemplate::new(201).set_body_json(json!({ "id": "cluster-admin" }))
    } else {
        ResponseTemplate::new(status)
            .insert_header("X-Operation-ID", "op-123")
            .set_body_json(json!({ "kind": "Error", "reason": "user already exists" }))
    };
    Mock::given(method("POST"))
        .and(path(ocm.cluster_path(USERS)))
        .respond_with(response)
        .mount(&ocm.server)
        .await;
}

async fn mount_create_provider(ocm: &MockOcm, status: u16) {
    let response = if status == 201 {
        ResponseTemplate::new(201).set_body_json(json!({
            "id": "idp-1",
            "name": "htpasswd",
            "type": "HTPasswdIdentityProvider"
        }))
    } else {
        ResponseTemplate::new(status).set_body_json(json!({ "reason": "idp service down" }))
    };
    Mock::given(method("POST"))
        .and(path(ocm.cluster_path("/identity_providers")))
        .respond_with(response)
        .mount(&ocm.server)
        .await;
}

async fn mount_delete_user(ocm: &MockOcm, status: u16) {
    Mock::given(method("DELETE"))
        .and(path(ocm.cluster_path(&format!("{}/cluster-admin", USERS))))
        .respond_with(ResponseTemplate::new(status))
        .mount(&ocm.server)
        .await;
}

async fn mutations(ocm: &MockOcm) -> usize {
    ocm.server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.as_str() != "GET")
        .count()
}

#[tokio::test]
async fn test_fresh_cluster_with_supplied_password() -> anyhow::Result<()> {
    let ocm = MockOcm::start().await;
    ocm.mount_cluster("ready").await;
    ocm.mount_identity_providers(json!([])).await;
    mount_create_user(&ocm, 201).await;
    mount_create_provider(&ocm, 201).await;

    let client = ocm.client().await?;
    let credential = client
        .cluster("mycluster")
        .create_admin()
        .password("MasterKey123")
        .await?;

    assert_eq!(credential.api_url(), API_URL);
    assert_eq!(credential.password(), "MasterKey123");
    assert_eq!(
        credential.login_command(),
        format!(
            "oc login {} --username cluster-admin --password MasterKey123",
            API_URL
        )
    );
    assert!(credential.to_output().get("password").is_none());

    let created = ocm
        .requests_to("POST", &ocm.cluster_path("/identity_providers"))
        .await;
    assert_eq!(created.len(), 1);
    let body: Value = serde_json::from_slice(&created[0].body)?;
    assert_eq!(body["name"], "htpasswd");
    assert_eq!(body["type"], "HTPasswdIdentityProvider");
    assert_eq!(body["htpasswd"]["users"]["items"][0]["username"], "cluster-admin");
    assert_eq!(body["htpasswd"]["users"]["items"][0]["password"], "MasterKey123");

    let users = ocm.requests_to("POST", &ocm.cluster_path(USERS)).await;
    let body: Value = serde_json::from_slice(&users[0].body)?;
    assert_eq!(body["id"], "cluster-admin");
    Ok(())
}

#[tokio::test]
async fn test_generated_password_appended_to_existing_provider() -> anyhow::Result<()> {
    let ocm = MockOcm::start().await;
    ocm.mount_cluster("ready").await;
    ocm.mount_identity_providers(json!([
        { "id": "gh-1", "name": "github", "type": "GithubIdentityProvider" },
        { "id": "idp-7", "name": "corp-htpasswd", "type": "HTPasswdIdentityProvider" }
    ]))
    .await;
    let htpasswd_users = ocm.cluster_path("/identity_providers/idp-7/htpasswd_users");
    Mock::given(method("GET"))
        .and(path(htpasswd_users.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "id": "u-1", "username": "other-user" }]
        })))
        .mount(&ocm.server)
        .await;
    Mock::given(method("POST"))
        .and(path(htpasswd_users.as_str()))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
        .expect(1)
        .mount(&ocm.server)
        .await;
    mount_create_user(&ocm, 201).await;

    let client = ocm.client().await?;
    let credential = client.cluster("mycluster").create_admin().await?;

    assert!(!credential.password_supplied());
    assert_eq!(credential.password().len(), 23);
    assert_eq!(
        credential.to_output()["password"].as_str(),
        Some(credential.password())
    );

    let added = ocm.requests_to("POST", &htpasswd_users).await;
    let body: Value = serde_json::from_slice(&added[0].body)?;
    assert_eq!(body["username"], "cluster-admin");
    assert_eq!(body["password"].as_str(), Some(credential.password()));
    assert!(
        ocm.requests_to("POST", &ocm.cluster_path("/identity_providers"))
            .await
            .is_empty()
    );
    Ok(())
}

#[tokio::test]
async fn test_not_ready_cluster_sends_no_mutation() -> anyhow::Result<()> {
    let ocm = MockOcm::start().await;
    ocm.mount_cluster("installing").await;

    let client = ocm.client().await?;
    let err = client.cluster("mycluster").create_admin().await.unwrap_err();

    assert!(matches!(
        err.failure(),
        ProvisionFailure::ClusterNotReady { .. }
    ));
    assert_eq!(err.kind(), ErrorKind::PreconditionFailed);
    assert!(err.to_string().contains("current state: installing"));
    assert_eq!(mutations(&ocm).await, 0);
    Ok(())
}

#[tokio::test]
async fn test_existing_admin_sends_no_mutation() -> anyhow::Result<()> {
    let ocm = MockOcm::start().await;
    ocm.mount_cluster("ready").await;
    ocm.mount_identity_providers(json!([
        { "id": "idp-1", "name": "htpasswd", "type": "HTPasswdIdentityProvider" }
    ]))
    .await;
    Mock::given(method("GET"))
        .and(path(ocm.cluster_path("/identity_providers/idp-1/htpasswd_users")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "id": "u-1", "username": "cluster-admin" }]
        })))
        .mount(&ocm.server)
        .await;

    let client = ocm.client().await?;
    let err = client.cluster("mycluster").create_admin().await.unwrap_err();

    assert!(matches!(
        err.failure(),
        ProvisionFailure::AdminAlreadyExists { .. }
    ));
    assert_eq!(mutations(&ocm).await, 0);
    Ok(())
}

#[tokio::test]
async fn test_provider_failure_deletes_created_user() -> anyhow::Result<()> {
    let ocm = MockOcm::start().await;
    ocm.mount_cluster("ready").await;
    ocm.mount_identity_providers(json!([])).await;
    mount_create_user(&ocm, 201).await;
    mount_create_provider(&ocm, 500).await;
    mount_delete_user(&ocm, 204).await;

    let client = ocm.client().await?;
    let err = client.cluster("mycluster").create_admin().await.unwrap_err();

    assert!(matches!(
        err.failure(),
        ProvisionFailure::ProviderCreationFailed { .. }
    ));
    assert_eq!(err.state(), ProvisionState::RolledBack);
    assert!(!err.requires_manual_cleanup());
    assert!(err.to_string().contains("idp service down"));

    let deleted = ocm
        .requests_to("DELETE", &ocm.cluster_path(&format!("{}/cluster-admin", USERS)))
        .await;
    assert_eq!(deleted.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_failed_rollback_names_leftover_user() -> anyhow::Result<()> {
    let ocm = MockOcm::start().await;
    ocm.mount_cluster("ready").await;
    ocm.mount_identity_providers(json!([])).await;
    mount_create_user(&ocm, 201).await;
    mount_create_provider(&ocm, 403).await;
    mount_delete_user(&ocm, 503).await;

    let client = ocm.client().await?;
    let err = client.cluster("mycluster").create_admin().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Forbidden);
    assert_eq!(err.state(), ProvisionState::RollbackFailed);
    assert!(err.requires_manual_cleanup());
    assert_eq!(err.compensation_failures().len(), 1);
    assert_eq!(
        err.compensation_failures()[0].error().kind(),
        ErrorKind::Unavailable
    );

    let message = err.to_string();
    assert!(message.contains("manual cleanup required"));
    assert!(message.contains(&format!(
        "delete user 'cluster-admin' from group 'cluster-admins' of cluster '{}'",
        CLUSTER_ID
    )));
    Ok(())
}

#[tokio::test]
async fn test_conflict_on_user_creation() -> anyhow::Result<()> {
    let ocm = MockOcm::start().await;
    ocm.mount_cluster("ready").await;
    ocm.mount_identity_providers(json!([])).await;
    mount_create_user(&ocm, 409).await;

    let client = ocm.client().await?;
    let err = client.cluster("mycluster").create_admin().await.unwrap_err();

    assert!(matches!(
        err.failure(),
        ProvisionFailure::AdminAlreadyExists { .. }
    ));
    let cause = err.cause().expect("remote cause");
    assert_eq!(cause.kind(), ErrorKind::Conflict);
    assert_eq!(cause.request_id(), Some("op-123"));
    assert!(ocm.requests_to("DELETE", &ocm.cluster_path(&format!("{}/cluster-admin", USERS))).await.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_invalid_cluster_key_sends_nothing() -> anyhow::Result<()> {
    let ocm = MockOcm::start().await;

    let client = ocm.client().await?;
    let err = client
        .cluster("x' or name = 'y")
        .create_admin()
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(ocm.server.received_requests().await.unwrap_or_default().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_in_memory_guidance() {
    let (fake, client) = in_memory_client();

    let credential = client.cluster(CLUSTER_ID).create_admin().await.unwrap();
    let guidance = credential.guidance();

    assert!(guidance.starts_with(&format!("Admin account has been added to cluster '{}'.", CLUSTER_ID)));
    assert!(guidance.contains(&credential.login_command()));
    assert!(guidance.contains("several minutes"));
    assert_eq!(fake.call_count(Operation::CreateIdentityProvider), 1);
    assert_eq!(fake.call_count(Operation::DeleteUser), 0);
}

#[tokio::test]
async fn test_in_memory_second_run_is_rejected() {
    let (fake, client) = in_memory_client();

    client.cluster(CLUSTER_ID).create_admin().await.unwrap();
    let before = fake.mutation_count();

    let err = client.cluster(CLUSTER_ID).create_admin().await.unwrap_err();
    assert!(matches!(
        err.failure(),
        ProvisionFailure::AdminAlreadyExists { .. }
    ));
    assert_eq!(fake.mutation_count(), before);
}
