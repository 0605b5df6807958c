// Example: a paged "web API" read through a `VirtualizingDataList`, the way a UI would.
use std::time::Duration;

use async_trait::async_trait;
use datalist::CollectionChange;
use datalist_async::{
    PageFetcher, PageResult, PagedDataListSource, Result, VirtualizingDataList,
};
use tokio::sync::mpsc::unbounded_channel;

const TOTAL: usize = 95;
const PER_PAGE: usize = 20;

struct Api;

#[async_trait]
impl PageFetcher for Api {
    type Item = String;

    async fn fetch_page(&self, page_number: usize) -> Result<PageResult<String>> {
        println!("GET /items?page={page_number}");
        tokio::time::sleep(Duration::from_millis(20)).await;
        let start = (page_number - 1) * PER_PAGE;
        let items = (start..(start + PER_PAGE).min(TOTAL))
            .map(|i| format!("item #{i}"))
            .collect();
        Ok(PageResult::full_page(TOTAL, PER_PAGE, page_number, items))
    }
}

#[tokio::main]
async fn main() {
    let list = VirtualizingDataList::new(PagedDataListSource::new(Api));

    let (tx, mut rx) = unbounded_channel();
    list.on_collection_changed(move |change| {
        let _ = tx.send(change.clone());
    });

    println!("count before load: {}", list.count());
    while let Some(change) = rx.recv().await {
        if change == CollectionChange::Reset {
            break;
        }
    }
    println!("count after load: {}", list.count());

    // Scroll to rows 40..45: placeholders first, values once page 3 arrives.
    let window = 40..45;
    for i in window.clone() {
        println!("row {i}: {:?}", list.get(i));
    }
    let mut pending = window.len();
    while pending > 0 {
        if let Some(CollectionChange::Replace { index, new, .. }) = rx.recv().await {
            println!("row {index} loaded: {new}");
            pending -= 1;
        }
    }
}
