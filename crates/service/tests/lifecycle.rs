mod common;

use serde_json::json;

use hookwork_audit::{AuditOperation, AuditQuery, AuditStore};
use hookwork_core::{
    ActionDraft, ActionMgtError, ActionStatus, ActionType, ActionUpdate, Authentication,
    AuthenticationType, TenantId,
};
use hookwork_service::ServiceConfig;
use hookwork_store::ActionStore;

use common::{bearer_draft, harness, harness_with, tenant};

#[tokio::test]
async fn add_then_list_end_to_end() {
    let h = harness();
    let added = h
        .service
        .add("preissueaccesstoken", &bearer_draft("My Action"), &tenant())
        .await
        .unwrap();

    assert!(!added.id.as_str().is_empty());
    assert_eq!(added.action_type, ActionType::PreIssueAccessToken);
    assert_eq!(added.status, ActionStatus::Active);
    assert_eq!(added.name, "My Action");
    assert_eq!(added.endpoint.uri, "https://example.com/hook");
    assert_eq!(added.endpoint.authentication, Authentication::bearer("tok"));

    let listed = h
        .service
        .get_by_type("preissueaccesstoken", &tenant())
        .await
        .unwrap();
    assert_eq!(listed, vec![added]);
}

#[tokio::test]
async fn add_then_get_returns_equal_action() {
    let h = harness();
    let draft = bearer_draft("Hook").with_description("audits tokens");
    let added = h
        .service
        .add("preregistration", &draft, &tenant())
        .await
        .unwrap();
    let fetched = h
        .service
        .get_by_id("preregistration", added.id.as_str(), &tenant())
        .await
        .unwrap();
    assert_eq!(fetched, added);
    assert_eq!(fetched.description.as_deref(), Some("audits tokens"));
}

#[tokio::test]
async fn returned_action_reflects_persisted_state() {
    let h = harness();
    // Properties are dropped by the default mapping, so the caller's extra
    // wire properties must not echo back.
    let draft = bearer_draft("Hook").with_property("ignored", json!(true));
    let added = h
        .service
        .add("preupdateprofile", &draft, &tenant())
        .await
        .unwrap();
    assert!(added.properties.is_empty());
}

#[tokio::test]
async fn get_with_wrong_type_is_not_found() {
    let h = harness();
    let added = h
        .service
        .add("preregistration", &bearer_draft("Hook"), &tenant())
        .await
        .unwrap();

    let err = h
        .service
        .get_by_id("authentication", added.id.as_str(), &tenant())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ActionMgtError::NotFound {
            action_type: ActionType::Authentication,
            ..
        }
    ));
    assert!(err.is_client_error());
}

#[tokio::test]
async fn actions_are_tenant_scoped() {
    let h = harness();
    let added = h
        .service
        .add("preregistration", &bearer_draft("Hook"), &tenant())
        .await
        .unwrap();

    let other = TenantId::new("tenant2");
    assert!(
        h.service
            .get_by_type("preregistration", &other)
            .await
            .unwrap()
            .is_empty()
    );
    assert!(
        h.service
            .get_by_id("preregistration", added.id.as_str(), &other)
            .await
            .is_err()
    );
    // The quota is per tenant too.
    h.service
        .add("preregistration", &bearer_draft("Hook"), &other)
        .await
        .unwrap();
}

#[tokio::test]
async fn name_only_update_keeps_endpoint_status_and_properties() {
    let h = harness();
    let draft = bearer_draft("Password Hook")
        .with_property("passwordSharing", json!({"format": "PLAIN_TEXT", "certificate": "PEM"}));
    let added = h
        .service
        .add("preupdatepassword", &draft, &tenant())
        .await
        .unwrap();
    h.service
        .deactivate("preupdatepassword", added.id.as_str(), &tenant())
        .await
        .unwrap();

    let updated = h
        .service
        .update(
            "preupdatepassword",
            added.id.as_str(),
            &ActionUpdate::default().with_name("Renamed"),
            &tenant(),
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.endpoint, added.endpoint);
    assert_eq!(updated.status, ActionStatus::Inactive);
    assert_eq!(updated.properties, added.properties);
}

#[tokio::test]
async fn authentication_only_update_keeps_name_and_status() {
    let h = harness();
    let added = h
        .service
        .add("preissueaccesstoken", &bearer_draft("Hook"), &tenant())
        .await
        .unwrap();

    let updated = h
        .service
        .update_endpoint_authentication(
            "preissueaccesstoken",
            added.id.as_str(),
            Authentication::api_key("X-Api-Key", "secret"),
            &tenant(),
        )
        .await
        .unwrap();

    assert_eq!(updated.name, added.name);
    assert_eq!(updated.status, added.status);
    assert_eq!(updated.endpoint.uri, added.endpoint.uri);
    assert_eq!(
        updated.endpoint.authentication.auth_type,
        AuthenticationType::ApiKey
    );

    let fetched = h
        .service
        .get_by_id("preissueaccesstoken", added.id.as_str(), &tenant())
        .await
        .unwrap();
    assert_eq!(fetched, updated);
}

#[tokio::test]
async fn empty_strings_in_update_are_ignored() {
    let h = harness();
    let added = h
        .service
        .add("preregistration", &bearer_draft("Hook"), &tenant())
        .await
        .unwrap();
    let updated = h
        .service
        .update(
            "preregistration",
            added.id.as_str(),
            &ActionUpdate::default().with_name("").with_uri(""),
            &tenant(),
        )
        .await
        .unwrap();
    assert_eq!(updated, added);
}

#[tokio::test]
async fn update_of_missing_action_is_not_found() {
    let h = harness();
    let err = h
        .service
        .update(
            "preregistration",
            "nope",
            &ActionUpdate::default().with_name("x"),
            &tenant(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ActionMgtError::NotFound { .. }));
}

#[tokio::test]
async fn delete_removes_action_and_properties() {
    let h = harness();
    let draft = bearer_draft("Password Hook")
        .with_property("passwordSharing", json!({"format": "SHA256_HASHED", "certificate": "PEM"}));
    let added = h
        .service
        .add("preupdatepassword", &draft, &tenant())
        .await
        .unwrap();
    assert!(
        h.store
            .get_properties(&tenant(), &added.id)
            .await
            .unwrap()
            .is_some()
    );

    h.service
        .delete("preupdatepassword", added.id.as_str(), &tenant())
        .await
        .unwrap();

    let err = h
        .service
        .get_by_id("preupdatepassword", added.id.as_str(), &tenant())
        .await
        .unwrap_err();
    assert!(matches!(err, ActionMgtError::NotFound { .. }));
    assert!(
        h.store
            .get_properties(&tenant(), &added.id)
            .await
            .unwrap()
            .is_none()
    );

    let again = h
        .service
        .delete("preupdatepassword", added.id.as_str(), &tenant())
        .await
        .unwrap_err();
    assert!(matches!(again, ActionMgtError::NotFound { .. }));
}

#[tokio::test]
async fn delete_frees_quota() {
    let h = harness();
    let added = h
        .service
        .add("authentication", &bearer_draft("Hook"), &tenant())
        .await
        .unwrap();
    h.service
        .delete("authentication", added.id.as_str(), &tenant())
        .await
        .unwrap();
    h.service
        .add("authentication", &bearer_draft("Hook again"), &tenant())
        .await
        .unwrap();
}

#[tokio::test]
async fn activate_is_idempotent() {
    let h = harness();
    let added = h
        .service
        .add("preregistration", &bearer_draft("Hook"), &tenant())
        .await
        .unwrap();

    let first = h
        .service
        .activate("preregistration", added.id.as_str(), &tenant())
        .await
        .unwrap();
    let second = h
        .service
        .activate("preregistration", added.id.as_str(), &tenant())
        .await
        .unwrap();
    assert_eq!(first.status, ActionStatus::Active);
    assert_eq!(second, first);
}

#[tokio::test]
async fn deactivate_and_reactivate() {
    let h = harness();
    let added = h
        .service
        .add("preregistration", &bearer_draft("Hook"), &tenant())
        .await
        .unwrap();

    let off = h
        .service
        .deactivate("preregistration", added.id.as_str(), &tenant())
        .await
        .unwrap();
    assert_eq!(off.status, ActionStatus::Inactive);
    let on = h
        .service
        .activate("preregistration", added.id.as_str(), &tenant())
        .await
        .unwrap();
    assert_eq!(on.status, ActionStatus::Active);

    let err = h
        .service
        .deactivate("preregistration", "missing", &tenant())
        .await
        .unwrap_err();
    assert!(matches!(err, ActionMgtError::NotFound { .. }));
}

#[tokio::test]
async fn counts_cover_every_type() {
    let config = ServiceConfig::default().with_limit(ActionType::PreRegistration, 3);
    let h = harness_with(config, hookwork_service::ActionServiceBuilder::new());
    for name in ["a", "b"] {
        h.service
            .add("preregistration", &bearer_draft(name), &tenant())
            .await
            .unwrap();
    }
    let counts = h.service.counts_by_type(&tenant()).await.unwrap();
    assert_eq!(counts.len(), ActionType::all().len());
    assert_eq!(counts[&ActionType::PreRegistration], 2);
    assert_eq!(counts[&ActionType::Authentication], 0);
}

#[tokio::test]
async fn password_sharing_round_trips() {
    let h = harness();
    let draft = ActionDraft::new("Password Hook", "https://example.com/pw", Authentication::none())
        .with_property("passwordSharing", json!({"format": "SHA256_HASHED"}));
    let added = h
        .service
        .add("preupdatepassword", &draft, &tenant())
        .await
        .unwrap();
    assert_eq!(
        added.properties["passwordSharing"],
        json!({"format": "SHA256_HASHED"})
    );

    let updated = h
        .service
        .update(
            "preupdatepassword",
            added.id.as_str(),
            &ActionUpdate::default().with_property(
                "passwordSharing",
                json!({"format": "PLAIN_TEXT", "certificate": "PEM"}),
            ),
            &tenant(),
        )
        .await
        .unwrap();
    assert_eq!(
        updated.properties["passwordSharing"],
        json!({"format": "PLAIN_TEXT", "certificate": "PEM"})
    );
}

#[tokio::test]
async fn audit_records_every_mutation_with_secrets_redacted() {
    let h = harness();
    let added = h
        .service
        .add(
            "preregistration",
            &ActionDraft::new(
                "Hook",
                "https://example.com/hook",
                Authentication::basic("alice", "hunter2"),
            ),
            &tenant(),
        )
        .await
        .unwrap();
    let id = added.id.as_str();
    h.service
        .update(
            "preregistration",
            id,
            &ActionUpdate::default().with_name("Renamed"),
            &tenant(),
        )
        .await
        .unwrap();
    h.service
        .deactivate("preregistration", id, &tenant())
        .await
        .unwrap();
    h.service
        .activate("preregistration", id, &tenant())
        .await
        .unwrap();
    h.service
        .delete("preregistration", id, &tenant())
        .await
        .unwrap();
    h.service.flush_audit().await;

    let page = h
        .audit
        .query(&AuditQuery {
            action_id: Some(added.id.clone()),
            ..Default::default()
        })
        .await
        .unwrap();
    let ops: Vec<AuditOperation> = page.records.iter().rev().map(|r| r.operation).collect();
    assert_eq!(
        ops,
        [
            AuditOperation::Add,
            AuditOperation::Update,
            AuditOperation::Deactivate,
            AuditOperation::Activate,
            AuditOperation::Delete,
        ]
    );

    for record in &page.records {
        assert_eq!(record.tenant, tenant());
        assert_eq!(record.action_type, ActionType::PreRegistration);
        for snapshot in [&record.after, &record.before].into_iter().flatten() {
            let props = &snapshot["endpoint"]["authentication"]["properties"];
            assert_eq!(props["username"], "alice");
            assert_eq!(props["password"], "[REDACTED]");
        }
    }

    let update = &page.records[3];
    assert_eq!(update.operation, AuditOperation::Update);
    assert_eq!(update.before.as_ref().unwrap()["name"], "Hook");
    assert_eq!(update.after.as_ref().unwrap()["name"], "Renamed");

    let delete = &page.records[0];
    assert!(delete.after.is_none());
    assert_eq!(delete.before.as_ref().unwrap()["name"], "Renamed");
}

#[tokio::test]
async fn failed_operations_are_not_audited() {
    let h = harness();
    let err = h
        .service
        .add(
            "preregistration",
            &ActionDraft::new("", "https://example.com", Authentication::none()),
            &tenant(),
        )
        .await
        .unwrap_err();
    assert!(err.is_client_error());
    h.service.flush_audit().await;
    assert!(h.audit.is_empty());
}
