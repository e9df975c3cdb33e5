// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use parking_lot::Mutex;
use std::sync::Arc;

/// Serves `total` numbered items in pages of `limit`, recording each request.
fn numbers(
    total: u32,
    requests: Arc<Mutex<Vec<PageRequest>>>,
) -> impl FnMut(PageRequest) -> std::future::Ready<Result<Page<u32>, String>> {
    move |req| {
        requests.lock().push(req);
        let end = (req.offset + req.limit).min(total);
        let items = (req.offset..end).collect();
        std::future::ready(Ok(Page { items, more: end < total }))
    }
}

#[tokio::test]
async fn walks_every_page_in_order() {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let mut pager = Pager::new(numbers(130, requests.clone()));

    let mut seen = Vec::new();
    while let Some(items) = pager.next_page().await.unwrap() {
        seen.extend(items);
    }

    assert_eq!(seen, (0..130).collect::<Vec<_>>());
    let offsets: Vec<u32> = requests.lock().iter().map(|r| r.offset).collect();
    assert_eq!(offsets, vec![0, 60, 120]);
    assert!(requests.lock().iter().all(|r| r.limit == LIST_LIMIT));
}

#[tokio::test]
async fn exhausted_pager_does_not_fetch_again() {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let mut pager = Pager::new(numbers(10, requests.clone()));

    assert_eq!(pager.next_page().await.unwrap().map(|p| p.len()), Some(10));
    assert_eq!(pager.next_page().await.unwrap(), None);
    assert_eq!(requests.lock().len(), 1);
}

#[tokio::test]
async fn scan_stops_fetching_after_match() {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let mut pager = Pager::new(numbers(500, requests.clone()));

    let found = pager
        .scan(|n| if n == 70 { ControlFlow::Break(n * 2) } else { ControlFlow::Continue(()) })
        .await
        .unwrap();

    assert_eq!(found, Some(140));
    assert_eq!(requests.lock().len(), 2);
}

#[tokio::test]
async fn scan_without_match_returns_none() {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let mut pager = Pager::new(numbers(61, requests.clone()));

    let found: Option<()> = pager.scan(|_| ControlFlow::Continue(())).await.unwrap();

    assert_eq!(found, None);
    assert_eq!(requests.lock().len(), 2);
}

#[tokio::test]
async fn restart_begins_at_first_page() {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let mut pager = Pager::new(numbers(100, requests.clone()));

    pager.next_page().await.unwrap();
    pager.next_page().await.unwrap();
    pager.restart();
    let first = pager.next_page().await.unwrap().unwrap();

    assert_eq!(first.first(), Some(&0));
    let offsets: Vec<u32> = requests.lock().iter().map(|r| r.offset).collect();
    assert_eq!(offsets, vec![0, 60, 0]);
}

#[tokio::test]
async fn fetch_error_is_returned() {
    let mut pager = Pager::new(|_req: PageRequest| {
        std::future::ready(Err::<Page<u32>, _>("boom".to_string()))
    });

    assert_eq!(pager.next_page().await.unwrap_err(), "boom");
}
