use shelterlist::{AnimalRecord, FilterCriteria, Listing, ListingOptions, ViewportSize};

fn page(page_no: u32, page_size: u32, total: u32) -> Vec<AnimalRecord> {
    let start = (page_no - 1) * page_size;
    (start..total.min(start + page_size))
        .map(|i| AnimalRecord::new(format!("4481{i:08}")))
        .collect()
}

fn main() {
    let mut listing = Listing::new(ListingOptions::new().with_initial_viewport(Some(
        ViewportSize {
            width: 1280,
            height: 900,
        },
    )));

    let req = listing.refresh();
    listing.settle(req.ticket, Ok(page(req.page_no(), req.page_size, 42)));
    println!("loaded={} has_more={}", listing.items().len(), listing.has_more());

    for scroll_top in (0..=6_000u64).step_by(300) {
        if let Some(req) = listing.on_scroll(scroll_top) {
            listing.settle(req.ticket, Ok(page(req.page_no(), req.page_size, 42)));
            println!("page {} -> loaded={}", req.page_no(), listing.items().len());
        }
    }

    let mut cells = Vec::new();
    listing.collect_cells(&mut cells);
    println!("rows={:?} cells={}", listing.rendered_rows(), cells.len());

    let req = listing.set_filter(FilterCriteria::default().with_region(Some("6110000")), 0);
    println!("region edit -> {:?}", req.map(|r| r.page_no()));
}
