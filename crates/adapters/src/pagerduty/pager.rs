// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Offset-paginated listing.
//!
//! [`Pager`] fetches pages lazily through a caller-supplied fetch function,
//! so search loops only state what they are looking for.

use std::future::Future;
use std::marker::PhantomData;
use std::ops::ControlFlow;

/// Page size for every list call.
pub const LIST_LIMIT: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn first() -> Self {
        Self { offset: 0, limit: LIST_LIMIT }
    }

    fn next(self) -> Self {
        Self { offset: self.offset + self.limit, limit: self.limit }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Whether the server has items past this page.
    pub more: bool,
}

/// Lazy, restartable walk over an offset-paginated listing.
pub struct Pager<T, F> {
    fetch: F,
    cursor: PageRequest,
    more: bool,
    _item: PhantomData<fn() -> T>,
}

impl<T, E, F, Fut> Pager<T, F>
where
    F: FnMut(PageRequest) -> Fut,
    Fut: Future<Output = Result<Page<T>, E>>,
{
    pub fn new(fetch: F) -> Self {
        Self { fetch, cursor: PageRequest::first(), more: true, _item: PhantomData }
    }

    /// Fetch the next page, or `None` once the listing is exhausted.
    pub async fn next_page(&mut self) -> Result<Option<Vec<T>>, E> {
        if !self.more {
            return Ok(None);
        }
        let page = (self.fetch)(self.cursor).await?;
        self.cursor = self.cursor.next();
        self.more = page.more;
        Ok(Some(page.items))
    }

    /// Start over from the first page on the next fetch.
    pub fn restart(&mut self) {
        self.cursor = PageRequest::first();
        self.more = true;
    }

    /// Visit items in order until `visit` breaks or the listing ends.
    ///
    /// Pages after the one where `visit` breaks are never fetched.
    pub async fn scan<B>(
        &mut self,
        mut visit: impl FnMut(T) -> ControlFlow<B>,
    ) -> Result<Option<B>, E> {
        while let Some(items) = self.next_page().await? {
            for item in items {
                if let ControlFlow::Break(found) = visit(item) {
                    return Ok(Some(found));
                }
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
#[path = "pager_tests.rs"]
mod tests;
