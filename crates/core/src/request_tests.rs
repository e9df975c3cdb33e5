// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    none     = { RequestState::None,     "NONE",     false },
    pending  = { RequestState::Pending,  "PENDING",  true },
    approved = { RequestState::Approved, "APPROVED", false },
    denied   = { RequestState::Denied,   "DENIED",   false },
)]
fn state_display_and_pending(state: RequestState, display: &str, pending: bool) {
    assert_eq!(state.to_string(), display);
    assert_eq!(state.is_pending(), pending);
}

#[test]
fn pending_filter_matches_only_pending_requests() {
    let filter = WatchFilter::pending();
    assert!(filter.matches(&Request::builder().build()));
    assert!(!filter.matches(&Request::builder().state(RequestState::Approved).build()));
}

#[test]
fn empty_filter_matches_everything() {
    let filter = WatchFilter::default();
    assert!(filter.matches(&Request::builder().state(RequestState::Denied).build()));
}
