// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[test]
fn aggregate_of_nothing_is_none() {
    assert!(AppError::aggregate(Vec::new()).is_none());
}

#[test]
fn aggregate_of_one_is_not_wrapped() {
    let err = Arc::new(AppError::WatchClosed);
    let agg = AppError::aggregate(vec![err.clone()]).unwrap();
    assert!(Arc::ptr_eq(&agg, &err));
}

#[test]
fn aggregate_joins_messages() {
    let agg = AppError::aggregate(vec![
        Arc::new(AppError::WatchClosed),
        Arc::new(AppError::Timeout("server version check")),
    ])
    .unwrap();

    assert!(matches!(*agg, AppError::Aggregate(ref v) if v.len() == 2));
    assert_eq!(
        agg.to_string(),
        "request watch stream closed, server version check timed out"
    );
}

#[test]
fn server_too_old_names_minimum() {
    assert_eq!(AppError::ServerTooOld.to_string(), "server version must be at least 4.3.0");
}

#[parameterized(
    unknown_action = { BridgeError::UnknownAction("escalate".into()), ErrorKind::BadParameter },
    mismatch = {
        BridgeError::IncidentMismatch {
            request_id: RequestId::new("R1"),
            stored: IncidentId::new("INC1"),
            received: IncidentId::new("INC2"),
        },
        ErrorKind::Unauthorized
    },
    not_pending = {
        BridgeError::NotPending { request_id: RequestId::new("R1"), state: RequestState::Approved },
        ErrorKind::Conflict
    },
    access_bad_parameter = {
        BridgeError::Access { context: "x", source: AccessError::BadParameter("bad".into()) },
        ErrorKind::BadParameter
    },
    access_connection = {
        BridgeError::Access { context: "x", source: AccessError::Connection("reset".into()) },
        ErrorKind::Internal
    },
    incident = { BridgeError::Incident(IncidentError::Other("boom".into())), ErrorKind::Internal },
)]
fn bridge_error_kind(err: BridgeError, kind: ErrorKind) {
    assert_eq!(err.kind(), kind);
}

#[test]
fn unknown_action_message_quotes_name() {
    assert_eq!(BridgeError::UnknownAction("nope".into()).to_string(), r#"unknown action: "nope""#);
}
