// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::{TimeZone, Utc};
use tpd_adapters::{
    AccessCall, AccessError, AccessMethod, FakeAccessClient, FakeIncidentAdapter, IncidentMethod,
};
use tpd_core::{incident_body, IncidentId, RequestState};
use yare::parameterized;

struct Harness {
    access: FakeAccessClient,
    incidents: FakeIncidentAdapter,
    bridge: Bridge,
}

fn harness() -> Harness {
    let access = FakeAccessClient::new();
    let incidents = FakeIncidentAdapter::new();
    let bridge = Bridge::new(Arc::new(access.clone()), Arc::new(incidents.clone()));
    Harness { access, incidents, bridge }
}

fn pending(id: &str) -> Request {
    Request::builder()
        .id(id)
        .user("alice")
        .roles(vec!["admin".to_string()])
        .created(Utc.with_ymd_and_hms(2021, 3, 1, 10, 30, 0).unwrap())
        .build()
}

fn action(name: &str, key: &str, incident_id: &str) -> WebhookAction {
    WebhookAction {
        http_request_id: "HTTP1".to_string(),
        message_id: "MSG1".to_string(),
        event: "incident.custom".to_string(),
        incident_id: IncidentId::new(incident_id),
        incident_key: key.to_string(),
        name: name.to_string(),
    }
}

/// Put R1 through the pending path so it has an incident and plugin data.
async fn with_incident(h: &Harness, id: &str) -> IncidentId {
    let req = pending(id);
    h.access.insert_request(req.clone());
    h.bridge.on_watcher_event(WatchEvent::Put(req)).await.unwrap();
    let stored = h.access.plugin_data(id).unwrap();
    h.access.clear_calls();
    h.incidents.clear_calls();
    IncidentId::new(stored["incident_id"].clone())
}

#[tokio::test]
async fn pending_request_opens_incident_and_stores_reference() {
    let h = harness();
    let req = pending("R1");

    h.bridge.on_watcher_event(WatchEvent::Put(req.clone())).await.unwrap();

    let created = h.incidents.created();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].0, RequestId::new("R1"));
    assert_eq!(created[0].1, RequestData::from(&req));
    assert!(incident_body(&created[0].1)
        .starts_with("alice requested permissions for roles admin on Teleport at 01 Mar 21 10:30"));

    let record = PluginData::decode(&h.access.plugin_data("R1").unwrap());
    assert_eq!(record.incident.id, IncidentId::new("INC1"));
    assert_eq!(record.request, RequestData::from(&req));
    assert_eq!(record.resolution, None);
}

#[tokio::test]
async fn each_pending_request_gets_its_own_incident() {
    let h = harness();

    for id in ["R1", "R2"] {
        h.bridge.on_watcher_event(WatchEvent::Put(pending(id))).await.unwrap();
    }

    assert_eq!(h.incidents.created().len(), 2);
    assert_eq!(h.access.plugin_data("R1").unwrap()["incident_id"], "INC1");
    assert_eq!(h.access.plugin_data("R2").unwrap()["incident_id"], "INC2");
}

#[parameterized(
    approved = { RequestState::Approved },
    denied = { RequestState::Denied },
)]
fn non_pending_put_is_ignored(state: RequestState) {
    let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
    rt.block_on(async {
        let h = harness();
        let req = Request::builder().id("R1").state(state).build();

        h.bridge.on_watcher_event(WatchEvent::Put(req)).await.unwrap();

        assert!(h.incidents.calls().is_empty());
        assert!(h.access.calls().is_empty());
    });
}

#[tokio::test]
async fn failed_incident_creation_stores_nothing() {
    let h = harness();
    h.incidents.fail(IncidentMethod::CreateIncident, "pagerduty down");

    let err = h.bridge.on_watcher_event(WatchEvent::Put(pending("R1"))).await.unwrap_err();

    assert!(matches!(err, BridgeError::Incident(_)));
    assert!(h.access.plugin_data("R1").is_none());
}

#[tokio::test]
async fn plugin_data_write_failure_leaves_incident_orphaned() {
    let h = harness();
    h.access.fail(AccessMethod::UpdatePluginData, AccessError::Connection("reset".into()));

    let err = h.bridge.on_watcher_event(WatchEvent::Put(pending("R1"))).await.unwrap_err();

    assert!(matches!(err, BridgeError::Access { .. }));
    assert_eq!(h.incidents.created().len(), 1);
    assert!(h.incidents.resolved().is_empty());
}

#[tokio::test]
async fn deleted_request_without_plugin_data_is_noop() {
    let h = harness();

    h.bridge.on_watcher_event(WatchEvent::Delete(RequestId::new("R2"))).await.unwrap();

    assert!(h.incidents.calls().is_empty());
}

#[tokio::test]
async fn deleted_request_expires_incident() {
    let h = harness();
    let incident_id = with_incident(&h, "R1").await;

    h.bridge.on_watcher_event(WatchEvent::Delete(RequestId::new("R1"))).await.unwrap();

    assert_eq!(h.incidents.resolved(), vec![(incident_id, Resolution::Expired)]);
    assert_eq!(h.access.plugin_data("R1").unwrap()["resolution"], "expired");
}

#[tokio::test]
async fn deleted_request_already_resolved_is_skipped() {
    let h = harness();
    let incident_id = with_incident(&h, "R1").await;
    h.bridge
        .on_pagerduty_action(action("approve", "teleport-access-request/R1", incident_id.as_str()))
        .await
        .unwrap();
    h.incidents.clear_calls();

    h.bridge.on_watcher_event(WatchEvent::Delete(RequestId::new("R1"))).await.unwrap();

    assert!(h.incidents.calls().is_empty());
}

#[tokio::test]
async fn deleted_request_lookup_error_is_returned() {
    let h = harness();
    h.access.fail(AccessMethod::GetPluginData, AccessError::Connection("reset".into()));

    let err = h.bridge.on_deleted_request(&RequestId::new("R1")).await.unwrap_err();

    assert!(matches!(err, BridgeError::Access { .. }));
}

#[tokio::test]
async fn approve_action_approves_and_resolves() {
    let h = harness();
    let incident_id = with_incident(&h, "R1").await;

    let outcome = h
        .bridge
        .on_pagerduty_action(action("approve", "teleport-access-request/R1", incident_id.as_str()))
        .await
        .unwrap();

    assert_eq!(outcome, ActionOutcome::Resolved);
    assert_eq!(h.access.request("R1").unwrap().state, RequestState::Approved);
    assert_eq!(h.incidents.resolved(), vec![(incident_id, Resolution::Approved)]);
    assert_eq!(h.access.plugin_data("R1").unwrap()["resolution"], "approved");
}

#[tokio::test]
async fn deny_action_denies_and_resolves() {
    let h = harness();
    let incident_id = with_incident(&h, "R1").await;

    h.bridge
        .on_pagerduty_action(action("deny", "teleport-access-request/R1", incident_id.as_str()))
        .await
        .unwrap();

    assert_eq!(h.access.request("R1").unwrap().state, RequestState::Denied);
    assert_eq!(h.incidents.resolved(), vec![(incident_id, Resolution::Denied)]);
}

#[tokio::test]
async fn action_on_non_pending_request_fails_without_side_effects() {
    let h = harness();
    let incident_id = with_incident(&h, "R1").await;
    h.access.insert_request(Request::builder().id("R1").state(RequestState::Approved).build());

    let err = h
        .bridge
        .on_pagerduty_action(action("approve", "teleport-access-request/R1", incident_id.as_str()))
        .await
        .unwrap_err();

    assert!(matches!(err, BridgeError::NotPending { state: RequestState::Approved, .. }));
    assert!(h.incidents.calls().is_empty());
    assert_eq!(h.access.calls(), vec![AccessCall::GetRequest(RequestId::new("R1"))]);
}

#[tokio::test]
async fn duplicate_delivery_resolves_once() {
    let h = harness();
    let incident_id = with_incident(&h, "R1").await;
    let approve = action("approve", "teleport-access-request/R1", incident_id.as_str());

    h.bridge.on_pagerduty_action(approve.clone()).await.unwrap();
    let second = h.bridge.on_pagerduty_action(approve).await;

    assert!(matches!(second, Err(BridgeError::NotPending { .. })));
    assert_eq!(h.incidents.resolved().len(), 1);
}

#[tokio::test]
async fn action_for_expired_request_is_noop() {
    let h = harness();

    let outcome = h
        .bridge
        .on_pagerduty_action(action("approve", "teleport-access-request/R9", "INC1"))
        .await
        .unwrap();

    assert_eq!(outcome, ActionOutcome::Expired);
    assert!(h.incidents.calls().is_empty());
}

#[tokio::test]
async fn mismatched_incident_is_rejected() {
    let h = harness();
    with_incident(&h, "R1").await;

    let err = h
        .bridge
        .on_pagerduty_action(action("approve", "teleport-access-request/R1", "INC999"))
        .await
        .unwrap_err();

    assert!(matches!(err, BridgeError::IncidentMismatch { .. }));
    assert_eq!(h.access.request("R1").unwrap().state, RequestState::Pending);
    assert!(h.incidents.calls().is_empty());
}

#[tokio::test]
async fn missing_plugin_data_is_a_mismatch() {
    let h = harness();
    h.access.insert_request(pending("R1"));

    let err = h
        .bridge
        .on_pagerduty_action(action("approve", "teleport-access-request/R1", "INC1"))
        .await
        .unwrap_err();

    assert!(matches!(err, BridgeError::IncidentMismatch { .. }));
}

#[tokio::test]
async fn unknown_action_is_bad_parameter() {
    let h = harness();
    let incident_id = with_incident(&h, "R1").await;

    let err = h
        .bridge
        .on_pagerduty_action(action("escalate", "teleport-access-request/R1", incident_id.as_str()))
        .await
        .unwrap_err();

    assert!(matches!(err, BridgeError::UnknownAction(ref name) if name == "escalate"));
    assert_eq!(h.access.request("R1").unwrap().state, RequestState::Pending);
}

#[parameterized(
    no_prefix = { "R1" },
    wrong_prefix = { "other-plugin/R1" },
    too_many_parts = { "teleport-access-request/R1/extra" },
    empty_id = { "teleport-access-request/" },
    empty = { "" },
)]
fn unsupported_incident_key_is_ignored(key: &str) {
    let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
    rt.block_on(async {
        let h = harness();

        let outcome = h.bridge.on_pagerduty_action(action("approve", key, "INC1")).await.unwrap();

        assert_eq!(outcome, ActionOutcome::Ignored);
        assert!(h.access.calls().is_empty());
        assert!(h.incidents.calls().is_empty());
    });
}

#[tokio::test]
async fn other_events_are_ignored() {
    let h = harness();
    let mut ack = action("approve", "teleport-access-request/R1", "INC1");
    ack.event = "incident.acknowledge".to_string();

    let outcome = h.bridge.on_pagerduty_action(ack).await.unwrap();

    assert_eq!(outcome, ActionOutcome::Ignored);
    assert!(h.access.calls().is_empty());
}

#[tokio::test]
async fn resolve_failure_is_returned_after_state_change() {
    let h = harness();
    let incident_id = with_incident(&h, "R1").await;
    h.incidents.fail(IncidentMethod::ResolveIncident, "pagerduty down");

    let err = h
        .bridge
        .on_pagerduty_action(action("approve", "teleport-access-request/R1", incident_id.as_str()))
        .await
        .unwrap_err();

    assert!(matches!(err, BridgeError::Incident(_)));
    assert_eq!(h.access.request("R1").unwrap().state, RequestState::Approved);
    assert!(!h.access.plugin_data("R1").unwrap().contains_key("resolution"));
}

#[tokio::test]
async fn resolution_tag_failure_does_not_fail_action() {
    let h = harness();
    let incident_id = with_incident(&h, "R1").await;
    h.access.fail(AccessMethod::UpdatePluginData, AccessError::CompareFailed("raced".into()));

    let outcome = h
        .bridge
        .on_pagerduty_action(action("approve", "teleport-access-request/R1", incident_id.as_str()))
        .await
        .unwrap();

    assert_eq!(outcome, ActionOutcome::Resolved);
    assert_eq!(h.incidents.resolved().len(), 1);
}

#[tokio::test]
async fn init_event_is_noop() {
    let h = harness();

    h.bridge.on_watcher_event(WatchEvent::Init).await.unwrap();

    assert!(h.access.calls().is_empty());
    assert!(h.incidents.calls().is_empty());
}
