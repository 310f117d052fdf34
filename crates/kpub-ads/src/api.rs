//! ADS search API client

use kpub_core::{ApiError, SHARED_RUNTIME, http_client, retry_with_backoff};
use serde_json::Value;

use crate::article::Article;
use crate::config::{AdsConfig, MAX_ROWS_PER_PAGE, resolve_token};
use crate::query::{field_list, identifier_query};

/// One page of search results.
#[derive(Debug, Default)]
pub struct SearchPage {
    /// Total hits for the query (not just this page)
    pub num_found: usize,
    pub docs: Vec<Article>,
}

/// Parse a `/search/query` response body.
pub fn parse_search_response(body: &str) -> Result<SearchPage, ApiError> {
    let parsed: Value =
        serde_json::from_str(body).map_err(|e| ApiError::Decode(format!("not JSON: {e}")))?;
    if let Some(err) = parsed.get("error") {
        return Err(ApiError::Decode(format!("API error: {err}")));
    }
    let response = parsed
        .get("response")
        .ok_or_else(|| ApiError::Decode("no 'response' object".into()))?;
    let num_found = response
        .get("numFound")
        .and_then(Value::as_u64)
        .unwrap_or_default() as usize;
    let docs = response
        .get("docs")
        .and_then(Value::as_array)
        .ok_or_else(|| ApiError::Decode("no 'docs' array".into()))?;

    let mut articles = Vec::with_capacity(docs.len());
    for doc in docs {
        match Article::from_value(doc.clone()) {
            Some(a) => articles.push(a),
            None => log::warn!("Skipping search result without bibcode"),
        }
    }
    Ok(SearchPage {
        num_found,
        docs: articles,
    })
}

/// Read pages from `start = 0` until `num_found` records were seen, a page
/// comes back empty, or `max_results` is reached.
pub fn collect_pages(
    max_results: usize,
    mut fetch_page: impl FnMut(usize) -> Result<SearchPage, ApiError>,
) -> Result<Vec<Article>, ApiError> {
    let mut articles = Vec::new();
    let mut start = 0usize;
    loop {
        let page = fetch_page(start)?;
        let received = page.docs.len();
        articles.extend(page.docs);
        start += received;
        if received == 0 || start >= page.num_found || articles.len() >= max_results {
            break;
        }
    }
    articles.truncate(max_results);
    Ok(articles)
}

/// Authenticated ADS client.
pub struct AdsClient {
    config: AdsConfig,
    token: String,
}

impl AdsClient {
    /// Fails when no API token can be found.
    pub fn new(config: AdsConfig) -> Result<Self, ApiError> {
        let token = resolve_token(&config)?;
        Ok(Self { config, token })
    }

    fn rows(&self) -> u32 {
        self.config.rows_per_page.clamp(1, MAX_ROWS_PER_PAGE)
    }

    /// GET one page of results, retrying transient failures.
    pub fn fetch_page(&self, query: &str, start: usize) -> Result<SearchPage, ApiError> {
        let url = format!("{}/search/query", self.config.base_url.trim_end_matches('/'));
        let rows = self.rows().to_string();
        let start = start.to_string();
        let fields = field_list();

        let body = retry_with_backoff("ADS search", || {
            SHARED_RUNTIME.handle().block_on(async {
                let resp = http_client()
                    .get(&url)
                    .bearer_auth(&self.token)
                    .query(&[
                        ("q", query),
                        ("fl", fields.as_str()),
                        ("rows", rows.as_str()),
                        ("start", start.as_str()),
                        ("sort", "date desc"),
                    ])
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
                    .map_err(ApiError::from_reqwest)?;
                resp.text().await.map_err(ApiError::from_reqwest)
            })
        })?;
        parse_search_response(&body)
    }

    /// Run a query and return every result (bounded by `max_results`).
    pub fn search(&self, query: &str) -> Result<Vec<Article>, ApiError> {
        log::debug!("ADS query: {query}");
        let articles = collect_pages(self.config.max_results, |start| {
            self.fetch_page(query, start)
        })?;
        log::info!("ADS returned {} record(s)", articles.len());
        Ok(articles)
    }

    /// Resolve a bibcode. ADS may answer with the canonical bibcode when an
    /// alternate one is requested; that is logged, not rejected.
    pub fn get_by_bibcode(&self, bibcode: &str) -> Result<Vec<Article>, ApiError> {
        let articles = self.search(&identifier_query(bibcode))?;
        for article in &articles {
            if article.bibcode() != bibcode {
                log::warn!(
                    "Requested {bibcode} but ADS API returned {}",
                    article.bibcode()
                );
            }
        }
        if articles.is_empty() {
            log::warn!("{bibcode}: not found in ADS");
        }
        Ok(articles)
    }
}
