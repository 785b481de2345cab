//! Server-side paging as a lazy stream

use crate::domain::{Page, PageCursor};
use crate::error::{DirectoryError, Result};
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use std::future::Future;

enum Cursor {
    Start,
    Next(PageCursor),
    Done,
}

/// Follow continuation cursors until the server reports no more pages.
///
/// Nothing is fetched until the stream is polled; items come out in server
/// order. Each call starts again from the first page. The first error ends
/// the stream.
pub fn paginate<'a, T, F, Fut>(fetch: F) -> BoxStream<'a, Result<T>>
where
    T: Send + 'a,
    F: FnMut(Option<PageCursor>) -> Fut + Send + 'a,
    Fut: Future<Output = Result<Page<T>>> + Send + 'a,
{
    stream::try_unfold((Cursor::Start, fetch), next_page::<T, F, Fut>)
        .map_ok(|items: Vec<T>| stream::iter(items.into_iter().map(Ok::<T, DirectoryError>)))
        .try_flatten()
        .boxed()
}

async fn next_page<T, F, Fut>(
    (cursor, mut fetch): (Cursor, F),
) -> Result<Option<(Vec<T>, (Cursor, F))>>
where
    F: FnMut(Option<PageCursor>) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let cursor = match cursor {
        Cursor::Start => None,
        Cursor::Next(cursor) => Some(cursor),
        Cursor::Done => return Ok(None),
    };

    let page = fetch(cursor).await?;
    let next = match page.next {
        Some(cursor) => Cursor::Next(cursor),
        None => Cursor::Done,
    };

    Ok(Some((page.items, (next, fetch))))
}
