use std::sync::Arc;

use async_trait::async_trait;
use shelterlist::{AnimalRecord, FetchError, FetchRequest, FilterCriteria};

/// One page request as seen by a remote source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page_no: u32,
    pub page_size: u32,
    pub filter: FilterCriteria,
}

impl From<&FetchRequest> for PageRequest {
    fn from(req: &FetchRequest) -> Self {
        Self {
            page_no: req.page_no(),
            page_size: req.page_size,
            filter: req.filter.clone(),
        }
    }
}

impl PageRequest {
    /// Query parameters understood by the public shelter registry endpoint.
    ///
    /// Unset filter fields are omitted.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let f = &self.filter;
        let mut pairs = vec![
            ("pageNo", self.page_no.to_string()),
            ("numOfRows", self.page_size.to_string()),
            ("_type", "json".to_owned()),
        ];
        if let Some(sex) = f.sex {
            pairs.push(("sex_cd", sex.code().to_owned()));
        }
        if let Some(status) = f.status {
            pairs.push(("state", status.code().to_owned()));
        }
        if let Some(species) = f.species.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("upkind", species.to_owned()));
        }
        if let Some(region) = f.region.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("upr_cd", region.to_owned()));
        }
        if let Some(start) = f.date_start {
            pairs.push(("bgnde", start.format("%Y%m%d").to_string()));
        }
        if let Some(end) = f.date_end {
            pairs.push(("endde", end.format("%Y%m%d").to_string()));
        }
        let query = f.query.trim();
        if !query.is_empty() {
            pairs.push(("q", query.to_owned()));
        }
        pairs
    }
}

/// A paginated remote dataset.
///
/// Implementations return the records of one page. The caller derives "more available" from
/// the page being full, so a source must not pad or truncate pages.
#[async_trait]
pub trait RemoteListSource: Send + Sync {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Vec<AnimalRecord>, FetchError>;
}

#[async_trait]
impl<S: RemoteListSource + ?Sized> RemoteListSource for Arc<S> {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Vec<AnimalRecord>, FetchError> {
        (**self).fetch_page(request).await
    }
}
