//! Cursor pagination for listing endpoints
//!
//! Repeatedly requests pages with the last returned cursor until the API
//! yields no cursor (absent or empty string) or an empty batch. Items
//! accumulate in arrival order. A page-count ceiling guards against an
//! upstream that never terminates its listing.

use crate::client::ClientError;
use std::future::Future;
use tracing::debug;

/// Drains a paginated listing through the given page-fetching closure.
///
/// The closure receives the cursor to request (`None` for the first page)
/// and returns the page's items plus the next cursor. Returns
/// [`ClientError::PaginationExhausted`] if `max_pages` pages still leave a
/// live cursor.
pub async fn paginate<T, F, Fut>(max_pages: u32, mut fetch_page: F) -> Result<Vec<T>, ClientError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<(Vec<T>, Option<String>), ClientError>>,
{
    let mut items = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0u32;

    loop {
        let (batch, next) = fetch_page(cursor.take()).await?;
        let batch_empty = batch.is_empty();
        items.extend(batch);
        pages += 1;
        debug!("page {} fetched, {} items so far", pages, items.len());

        cursor = next.filter(|c| !c.is_empty());
        if cursor.is_none() || batch_empty {
            return Ok(items);
        }
        if pages >= max_pages {
            return Err(ClientError::PaginationExhausted { pages });
        }
    }
}
