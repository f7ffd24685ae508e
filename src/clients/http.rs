//! # HTTP Fetch
//!
//! A thin JSON GET against a collection endpoint. The parameter snapshot is turned into
//! a query string by a [`QueryMapper`] and the body is decoded with `serde_json`.
//! Transport failures, non-2xx statuses and undecodable bodies all come back as
//! [`FetchError`] values.

use std::marker::PhantomData;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use super::query::QueryMapper;
use crate::framework::{Fetch, FetchError};
use crate::lifecycle::HttpSettings;
use crate::model::TableDataParams;

pub struct HttpFetch<T> {
    client: Client,
    url: Url,
    query: QueryMapper,
    _marker: PhantomData<fn() -> T>,
}

impl<T> HttpFetch<T> {
    pub fn new(url: &str, query: QueryMapper, settings: &HttpSettings) -> Result<Self, FetchError> {
        let url = Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;
        let client = Client::builder()
            .connect_timeout(settings.connect_timeout())
            .timeout(settings.request_timeout())
            .build()?;

        Ok(Self {
            client,
            url,
            query,
            _marker: PhantomData,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl<T> Fetch for HttpFetch<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    type Data = T;
    type Error = FetchError;

    #[instrument(skip_all, fields(page = params.page, page_size = params.page_size))]
    async fn fetch(&self, params: TableDataParams) -> Result<T, FetchError> {
        let pairs = self.query.pairs(&params);
        debug!(url = %self.url, ?pairs, "GET");

        let response = self.client.get(self.url.clone()).query(&pairs).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Unexpected status");
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body = response.bytes().await?;
        let data = serde_json::from_slice(&body)?;
        debug!(bytes = body.len(), "Decoded response");
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_urls() {
        let settings = HttpSettings::default();
        let result = HttpFetch::<Vec<u32>>::new("not a url", QueryMapper::default(), &settings);
        assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
    }
}
