//! Lazy page traversals.
//!
//! Both traversals are finite streams: callers drain them to exhaustion or stop at the first error,
//! and a new call starts again from the first page.

use crate::api::{CursorPage, Error, LinkPage, Result, FIRST_PAGE_NUMBER};
use futures::{stream, Future, Stream};
use log::debug;

/// How a numbered traversal recognizes its last page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Stop after the page whose `Link` header has no `rel="next"`.
    NextLink,
    /// Stop at the first page with no items. That page is not yielded.
    EmptyBatch,
}

enum PageCursor<P> {
    Next(P),
    Done,
}

/// Pages of a cursor-paginated traversal, starting with no `after` cursor.
pub fn cursor_pages<T, F, Fut>(fetch: F) -> impl Stream<Item = Result<Vec<T>>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<CursorPage<T>>>,
{
    stream::try_unfold((fetch, PageCursor::Next(None)), |(mut fetch, cursor)| async move {
        let after = match cursor {
            PageCursor::Next(after) => after,
            PageCursor::Done => return Ok(None),
        };
        let page = fetch(after).await?;
        debug!(
            "Fetched {} items, has next page: {}",
            page.items.len(),
            page.has_next_page
        );
        let next = match (page.has_next_page, page.end_cursor) {
            (true, Some(end_cursor)) => PageCursor::Next(Some(end_cursor)),
            _ => PageCursor::Done,
        };
        Ok::<_, Error>(Some((page.items, (fetch, next))))
    })
}

/// Pages of a numbered traversal, starting at [`FIRST_PAGE_NUMBER`] and incrementing by one.
pub fn link_pages<T, M, F, Fut>(termination: Termination, fetch: F) -> impl Stream<Item = Result<LinkPage<T, M>>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<LinkPage<T, M>>>,
{
    stream::try_unfold(
        (fetch, PageCursor::Next(FIRST_PAGE_NUMBER)),
        move |(mut fetch, cursor)| async move {
            let page_no = match cursor {
                PageCursor::Next(page_no) => page_no,
                PageCursor::Done => return Ok(None),
            };
            let page = fetch(page_no).await?;
            debug!("Fetched page {} with {} items", page_no, page.items.len());
            let next = match termination {
                Termination::EmptyBatch if page.items.is_empty() => return Ok(None),
                Termination::EmptyBatch => PageCursor::Next(page_no + 1),
                Termination::NextLink if page.has_next_link => PageCursor::Next(page_no + 1),
                Termination::NextLink => PageCursor::Done,
            };
            Ok::<_, Error>(Some((page, (fetch, next))))
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FetchFailure;
    use futures::{StreamExt, TryStreamExt};
    use std::cell::RefCell;

    fn numbers(page_no: u32, count: u32) -> Vec<u32> {
        (0..count).map(|i| page_no * 100 + i).collect()
    }

    #[tokio::test]
    async fn empty_batch_stops_after_empty_page() {
        let requested = RefCell::new(Vec::new());
        let pages: Vec<LinkPage<u32>> = link_pages(Termination::EmptyBatch, |page_no| {
            requested.borrow_mut().push(page_no);
            let count = if page_no <= 3 { 2 } else { 0 };
            // `has_next_link` is ignored by this termination rule
            futures::future::ready(Ok(LinkPage::new(numbers(page_no, count), (), true)))
        })
        .try_collect()
        .await
        .unwrap();

        assert_eq!(pages.len(), 3);
        assert_eq!(*requested.borrow(), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn next_link_stops_without_next_relation() {
        let requested = RefCell::new(Vec::new());
        let pages: Vec<LinkPage<u32, &str>> = link_pages(Termination::NextLink, |page_no| {
            requested.borrow_mut().push(page_no);
            let has_next = page_no < 2;
            futures::future::ready(Ok(LinkPage::new(numbers(page_no, 1), "meta", has_next)))
        })
        .try_collect()
        .await
        .unwrap();

        assert_eq!(pages.len(), 2);
        assert_eq!(*requested.borrow(), vec![1, 2]);
    }

    #[tokio::test]
    async fn next_link_yields_empty_last_page() {
        let pages: Vec<LinkPage<u32, u32>> = link_pages(Termination::NextLink, |_| {
            futures::future::ready(Ok(LinkPage::new(Vec::new(), 7, false)))
        })
        .try_collect()
        .await
        .unwrap();

        assert_eq!(pages, vec![LinkPage::new(Vec::new(), 7, false)]);
    }

    #[tokio::test]
    async fn cursor_stops_when_no_next_page() {
        let requested = RefCell::new(Vec::new());
        let items: Vec<Vec<u32>> = cursor_pages(|after: Option<String>| {
            requested.borrow_mut().push(after.clone());
            let page = match after.as_deref() {
                None => CursorPage::new(vec![1, 2], true, Some("c1".to_string())),
                Some("c1") => CursorPage::new(vec![3], true, Some("c2".to_string())),
                _ => CursorPage::new(vec![4], false, Some("c3".to_string())),
            };
            futures::future::ready(Ok(page))
        })
        .try_collect()
        .await
        .unwrap();

        assert_eq!(items, vec![vec![1, 2], vec![3], vec![4]]);
        assert_eq!(
            *requested.borrow(),
            vec![None, Some("c1".to_string()), Some("c2".to_string())]
        );
    }

    #[tokio::test]
    async fn error_aborts_traversal() {
        let requested = RefCell::new(0);
        let results: Vec<Result<Vec<u32>>> = cursor_pages(|_after: Option<String>| {
            *requested.borrow_mut() += 1;
            let page = if *requested.borrow() == 1 {
                Ok(CursorPage::new(vec![1], true, Some("c1".to_string())))
            } else {
                Err(Error::Fetch(FetchFailure::GraphQl("boom".to_string())))
            };
            futures::future::ready(page)
        })
        .collect()
        .await;

        assert_eq!(results.len(), 2);
        assert!(matches!(results[1], Err(Error::Fetch(FetchFailure::GraphQl(_)))));
        assert_eq!(*requested.borrow(), 2);
    }
}
