use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use shelterlist::{AnimalRecord, FetchError, FilterCriteria, ListingOptions, ViewportSize};
use shelterlist_adapter::{PageRequest, RemoteListSource, Session};
use tracing_subscriber::EnvFilter;

/// In-memory registry with a fixed number of records and simulated latency.
struct StaticSource {
    total: u32,
    latency: Duration,
}

#[async_trait]
impl RemoteListSource for StaticSource {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Vec<AnimalRecord>, FetchError> {
        tokio::time::sleep(self.latency).await;
        let total = if request.filter.region.is_some() {
            self.total / 4
        } else {
            self.total
        };
        let start = (request.page_no - 1) * request.page_size;
        Ok((start..total.min(start + request.page_size))
            .map(|i| AnimalRecord::new(format!("4481{i:08}")))
            .collect())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // RUST_LOG=shelterlist=trace,shelterlist::session=debug
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let source = Arc::new(StaticSource {
        total: 75,
        latency: Duration::from_millis(120),
    });
    let options = ListingOptions::new().with_initial_viewport(Some(ViewportSize {
        width: 1280,
        height: 900,
    }));
    let mut handle = Session::spawn(options, source);

    let Ok(view) = handle.wait_for(|v| !v.is_empty()).await else {
        return;
    };
    println!("first page: loaded={} has_more={}", view.len(), view.has_more);

    loop {
        let view = handle.view();
        if !view.has_more {
            break;
        }
        let scroll_top = view.geometry.total_height();
        if handle.on_scroll(scroll_top).is_err() {
            return;
        }
        let loaded = view.len();
        let Ok(view) = handle
            .wait_for(|v| !v.is_loading_more() && (v.len() > loaded || !v.has_more))
            .await
        else {
            return;
        };
        println!(
            "scroll_top={scroll_top} page={} loaded={} rows={:?}",
            view.page_no,
            view.len(),
            view.rendered_rows
        );
    }

    // Keystrokes arrive faster than the debounce window; only the last one is fetched.
    for query in ["j", "ji", "jin", "jindo"] {
        let _ = handle.set_filter(FilterCriteria::default().with_query(query));
        tokio::time::sleep(Duration::from_millis(80)).await;
    }
    let _ = handle.set_filter(FilterCriteria::default().with_region(Some("6110000")));
    if let Ok(view) = handle
        .wait_for(|v| v.generation > 1 && !v.is_loading_initial())
        .await
    {
        println!(
            "region edit: generation={} loaded={} has_more={}",
            view.generation,
            view.len(),
            view.has_more
        );
    }
}
