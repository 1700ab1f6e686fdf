use std::future::Future;

use crate::{AppError, Res};

/// Hard cap on the number of pages a single collection walk may request.
pub const MAX_PAGES: u32 = 1000;

/// One page of an offset-paginated collection.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

/// Walks an offset-paginated collection and returns every item in order.
///
/// Stops on the first empty page or once the offset reaches the `total`
/// reported by the *first* page. Later changes of `total` are ignored, so a
/// collection that grows while being read cannot keep the walk alive. More
/// than `max_pages` requests is reported as [`AppError::Pagination`].
///
/// Any failed page aborts the walk; nothing collected so far is returned.
pub async fn collect_pages<T, F, Fut>(page_size: u32, max_pages: u32, mut fetch: F) -> Res<Vec<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Res<Page<T>>>,
{
    let mut collected = Vec::new();
    let mut offset: u32 = 0;
    let mut total: Option<u64> = None;

    for _ in 0..max_pages {
        let page = fetch(offset).await?;
        if page.items.is_empty() {
            return Ok(collected);
        }

        let total = *total.get_or_insert(page.total);
        collected.extend(page.items);
        offset = offset.saturating_add(page_size);
        if u64::from(offset) >= total {
            return Ok(collected);
        }
    }

    Err(AppError::Pagination(max_pages))
}
