//! Role-link registry tests.

use ocm_control::registry::{OCM_ROLE_LABEL, USER_ROLE_LABEL};
use ocm_control::testing::Operation;
use ocm_control::{ErrorKind, LabelScope, LinkOutcome, RoleCheck};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{MockOcm, in_memory_client};

const ORG: &str = "org1";
const ARN_A: &str = "arn:aws:iam::111111111111:role/ManagedOpenShift-OCM-Role";
const ARN_A2: &str = "arn:aws:iam::111111111111:role/Other-OCM-Role";
const ARN_B: &str = "arn:aws:iam::222222222222:role/ManagedOpenShift-OCM-Role";

fn labels_path() -> String {
    format!("/api/accounts_mgmt/v1/organizations/{}/labels", ORG)
}

fn label_path() -> String {
    format!("{}/{}", labels_path(), OCM_ROLE_LABEL)
}

async fn mount_label(ocm: &MockOcm, value: Option<&str>) {
    let response = match value {
        Some(value) => ResponseTemplate::new(200).set_body_json(json!({
            "key": OCM_ROLE_LABEL,
            "value": value,
            "internal": false
        })),
        None => ResponseTemplate::new(404).set_body_json(json!({ "reason": "label not found" })),
    };
    Mock::given(method("GET"))
        .and(path(label_path()))
        .respond_with(response)
        .mount(&ocm.server)
        .await;
}

fn echo_label() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "key": OCM_ROLE_LABEL, "value": "" }))
}

#[tokio::test]
async fn test_link_creates_label() -> anyhow::Result<()> {
    let ocm = MockOcm::start().await;
    mount_label(&ocm, None).await;
    Mock::given(method("POST"))
        .and(path(labels_path()))
        .respond_with(echo_label())
        .expect(1)
        .mount(&ocm.server)
        .await;

    let client = ocm.client().await?;
    let outcome = client.organization(ORG).role_links().link(ARN_A).await?;
    assert_eq!(outcome, LinkOutcome::Linked);

    let created = ocm.requests_to("POST", &labels_path()).await;
    let body: Value = serde_json::from_slice(&created[0].body)?;
    assert_eq!(body["key"], OCM_ROLE_LABEL);
    assert_eq!(body["value"], ARN_A);
    Ok(())
}

#[tokio::test]
async fn test_link_other_account_updates_label() -> anyhow::Result<()> {
    let ocm = MockOcm::start().await;
    mount_label(&ocm, Some(ARN_A)).await;
    Mock::given(method("PATCH"))
        .and(path(label_path()))
        .respond_with(echo_label())
        .expect(1)
        .mount(&ocm.server)
        .await;

    let client = ocm.client().await?;
    client.organization(ORG).role_links().link(ARN_B).await?;

    let updated = ocm.requests_to("PATCH", &label_path()).await;
    let body: Value = serde_json::from_slice(&updated[0].body)?;
    assert_eq!(body["value"], format!("{},{}", ARN_A, ARN_B));
    Ok(())
}

#[tokio::test]
async fn test_link_same_account_conflicts_without_write() -> anyhow::Result<()> {
    let ocm = MockOcm::start().await;
    mount_label(&ocm, Some(ARN_A)).await;

    let client = ocm.client().await?;
    let err = client
        .organization(ORG)
        .role_links()
        .link(ARN_A2)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(err.message().contains(ARN_A));
    assert!(err.message().contains("organization 'org1'"));
    assert!(ocm.requests_to("PATCH", &label_path()).await.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_link_existing_is_idempotent() -> anyhow::Result<()> {
    let ocm = MockOcm::start().await;
    mount_label(&ocm, Some(ARN_A)).await;

    let client = ocm.client().await?;
    let outcome = client.organization(ORG).role_links().link(ARN_A).await?;

    assert_eq!(outcome, LinkOutcome::AlreadyLinked);
    assert_eq!(ocm.server.received_requests().await.unwrap_or_default().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_unlink_last_deletes_label() -> anyhow::Result<()> {
    let ocm = MockOcm::start().await;
    mount_label(&ocm, Some(ARN_A)).await;
    Mock::given(method("DELETE"))
        .and(path(label_path()))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&ocm.server)
        .await;

    let client = ocm.client().await?;
    client.organization(ORG).role_links().unlink(ARN_A).await?;
    Ok(())
}

#[tokio::test]
async fn test_unlink_missing_is_precondition_failure() -> anyhow::Result<()> {
    let ocm = MockOcm::start().await;
    mount_label(&ocm, None).await;

    let client = ocm.client().await?;
    let err = client
        .organization(ORG)
        .role_links()
        .unlink(ARN_A)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::PreconditionFailed);
    assert!(err.message().contains("is not linked"));
    Ok(())
}

#[tokio::test]
async fn test_forbidden_read_is_surfaced() -> anyhow::Result<()> {
    let ocm = MockOcm::start().await;
    Mock::given(method("GET"))
        .and(path(label_path()))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({ "reason": "not an org admin" })),
        )
        .mount(&ocm.server)
        .await;

    let client = ocm.client().await?;
    let err = client.organization(ORG).role_links().list().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Forbidden);
    assert!(err.to_string().contains("not an org admin"));
    Ok(())
}

#[tokio::test]
async fn test_malformed_stored_arn() -> anyhow::Result<()> {
    let ocm = MockOcm::start().await;
    mount_label(&ocm, Some("not-an-arn")).await;

    let client = ocm.client().await?;
    let err = client.organization(ORG).role_links().list().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidResponse);
    assert!(err.message().contains("organization 'org1'"));
    Ok(())
}

#[tokio::test]
async fn test_in_memory_account_roles() {
    let (fake, client) = in_memory_client();
    let links = client.account("acc1").role_links();
    let scope = LabelScope::account("acc1");

    assert!(links.list().await.unwrap().is_empty());
    links.link(ARN_A).await.unwrap();
    links.link(ARN_B).await.unwrap();

    let label = fake.label(&scope, USER_ROLE_LABEL).unwrap();
    assert_eq!(label.value, format!("{},{}", ARN_A, ARN_B));

    let check = links.check_account_exists("111111111111").await.unwrap();
    assert!(check.exists);
    assert_eq!(check.matching_arn.unwrap().to_string(), ARN_A);

    assert_eq!(
        links
            .check_role_exists("ManagedOpenShift-OCM-Role", "111111111111")
            .await
            .unwrap(),
        RoleCheck::Proceed
    );
    assert!(matches!(
        links
            .check_role_exists("Other-OCM-Role", "111111111111")
            .await
            .unwrap(),
        RoleCheck::Taken { .. }
    ));

    links.unlink(ARN_A).await.unwrap();
    links.unlink(ARN_B).await.unwrap();
    assert!(fake.label(&scope, USER_ROLE_LABEL).is_none());
    assert_eq!(fake.call_count(Operation::DeleteLabel), 1);
}

#[tokio::test]
async fn test_in_memory_scopes_are_independent() {
    let (_fake, client) = in_memory_client();

    client.organization("org1").role_links().link(ARN_A).await.unwrap();
    let account = client.account("org1").role_links();

    assert!(account.list().await.unwrap().is_empty());
    assert_eq!(account.link(ARN_A2).await.unwrap(), LinkOutcome::Linked);
}
