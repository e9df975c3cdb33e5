// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn map(pairs: &[(&str, &str)]) -> PluginDataMap {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[tokio::test]
async fn missing_plugin_data_is_not_found() {
    let client = FakeAccessClient::new();
    let err = client.get_plugin_data(&RequestId::new("R1")).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn update_merges_and_empty_value_deletes() {
    let client = FakeAccessClient::new();
    let id = RequestId::new("R1");
    client.set_plugin_data("R1", map(&[("a", "1"), ("b", "2")]));

    client.update_plugin_data(&id, map(&[("b", ""), ("c", "3")]), None).await.unwrap();

    assert_eq!(client.plugin_data("R1").unwrap(), map(&[("a", "1"), ("c", "3")]));
}

#[tokio::test]
async fn compare_and_swap_checks_expected_values() {
    let client = FakeAccessClient::new();
    let id = RequestId::new("R1");
    client.set_plugin_data("R1", map(&[("incident_id", "INC1")]));

    let stale = map(&[("incident_id", "INC2")]);
    let err = client
        .update_plugin_data(&id, map(&[("resolution", "approved")]), Some(stale))
        .await
        .unwrap_err();
    assert!(matches!(err, AccessError::CompareFailed(_)));

    let current = map(&[("incident_id", "INC1"), ("resolution", "")]);
    client
        .update_plugin_data(&id, map(&[("resolution", "approved")]), Some(current))
        .await
        .unwrap();
    assert_eq!(client.plugin_data("R1").unwrap()["resolution"], "approved");
}

#[tokio::test]
async fn set_request_state_updates_stored_request() {
    let client = FakeAccessClient::new();
    client.insert_request(Request::builder().id("R1").build());

    client.set_request_state(&RequestId::new("R1"), RequestState::Denied).await.unwrap();

    assert_eq!(client.request("R1").unwrap().state, RequestState::Denied);
    assert_eq!(
        client.calls(),
        vec![AccessCall::SetRequestState(RequestId::new("R1"), RequestState::Denied)]
    );
}

#[tokio::test]
async fn watch_starts_with_init_then_backlog() {
    let client = FakeAccessClient::new();
    client.push_event(WatchEvent::Delete(RequestId::new("R9")));

    let mut watch = client.watch(WatchFilter::pending()).await.unwrap();
    client.push_event(WatchEvent::Delete(RequestId::new("R10")));

    assert_eq!(watch.next().await.unwrap().unwrap(), WatchEvent::Init);
    assert_eq!(watch.next().await.unwrap().unwrap(), WatchEvent::Delete(RequestId::new("R9")));
    assert_eq!(watch.next().await.unwrap().unwrap(), WatchEvent::Delete(RequestId::new("R10")));

    client.close_watch();
    assert!(watch.next().await.is_none());
}

#[tokio::test]
async fn watch_drops_puts_outside_the_filter() {
    let client = FakeAccessClient::new();
    let approved = Request::builder().id("R1").state(RequestState::Approved).build();
    client.push_event(WatchEvent::Put(approved));

    let mut watch = client.watch(WatchFilter::pending()).await.unwrap();
    let denied = Request::builder().id("R2").state(RequestState::Denied).build();
    client.push_event(WatchEvent::Put(denied));
    client.push_event(WatchEvent::Put(Request::builder().id("R3").build()));
    client.push_event(WatchEvent::Delete(RequestId::new("R1")));

    assert_eq!(watch.next().await.unwrap().unwrap(), WatchEvent::Init);
    let next = watch.next().await.unwrap().unwrap();
    assert!(matches!(next, WatchEvent::Put(ref req) if req.id == "R3"), "{:?}", next);
    assert_eq!(watch.next().await.unwrap().unwrap(), WatchEvent::Delete(RequestId::new("R1")));
}

#[tokio::test]
async fn injected_failure_is_returned_and_recorded() {
    let client = FakeAccessClient::new();
    client.fail(AccessMethod::Ping, AccessError::NotImplemented("ping".into()));

    let err = client.ping().await.unwrap_err();

    assert!(err.is_not_implemented());
    assert_eq!(client.calls(), vec![AccessCall::Ping]);

    client.clear_failure(AccessMethod::Ping);
    assert!(client.ping().await.is_ok());
}
