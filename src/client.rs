//! Incremental "load more" client for the image API.
//!
//! [`GridLoader`] mirrors what the gallery grid does in the browser: page 1 is
//! already on screen, so the next page to fetch starts at 2. Each
//! [`load_more`](GridLoader::load_more) appends one page and advances the
//! counter; once the loaded count reaches the known total, fetching stops.
//!
//! Pages come from a [`PageSource`]. [`HttpPageSource`] talks to a running
//! server over `reqwest`; tests substitute an in-memory source.

use reqwest::Url;
use std::future::Future;
use thiserror::Error;

use crate::api::{ApiImage, ImagesResponse};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("invalid server URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error ({status}): {body}")]
    Status { status: u16, body: String },
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Something that can produce a page of images.
pub trait PageSource {
    fn fetch_page(
        &self,
        page: usize,
        limit: usize,
        collection: Option<&str>,
    ) -> impl Future<Output = Result<ImagesResponse, ClientError>> + Send;
}

/// [`PageSource`] backed by `GET /api/images` on a live server.
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpPageSource {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: Url::parse(base_url)?,
        })
    }

    fn images_url(
        &self,
        page: usize,
        limit: usize,
        collection: Option<&str>,
    ) -> Result<Url, ClientError> {
        let mut url = self.base_url.join("/api/images")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("page", &page.to_string());
            query.append_pair("limit", &limit.to_string());
            if let Some(collection) = collection {
                query.append_pair("collection", collection);
            }
        }
        Ok(url)
    }
}

impl PageSource for HttpPageSource {
    fn fetch_page(
        &self,
        page: usize,
        limit: usize,
        collection: Option<&str>,
    ) -> impl Future<Output = Result<ImagesResponse, ClientError>> + Send {
        let url = self.images_url(page, limit, collection);
        let http = self.http.clone();
        async move {
            let response = http.get(url?).send().await?;
            let status = response.status();
            let body = response.text().await?;
            if !status.is_success() {
                return Err(ClientError::Status {
                    status: status.as_u16(),
                    body,
                });
            }
            Ok(serde_json::from_str(&body)?)
        }
    }
}

/// Accumulates pages of images from a [`PageSource`].
#[derive(Debug)]
pub struct GridLoader<S> {
    source: S,
    images: Vec<ApiImage>,
    next_page: usize,
    total: usize,
    page_size: usize,
    collection: Option<String>,
}

impl<S: PageSource> GridLoader<S> {
    /// Start from images already rendered as page 1.
    pub fn new(
        source: S,
        initial_images: Vec<ApiImage>,
        total: usize,
        page_size: usize,
        collection: Option<String>,
    ) -> Self {
        Self {
            source,
            images: initial_images,
            next_page: 2,
            total,
            page_size,
            collection,
        }
    }

    /// Fetch page 1 and start from it.
    pub async fn from_first_page(
        source: S,
        page_size: usize,
        collection: Option<String>,
    ) -> Result<Self, ClientError> {
        let first = source
            .fetch_page(1, page_size, collection.as_deref())
            .await?;
        Ok(Self::new(
            source,
            first.images,
            first.total,
            page_size,
            collection,
        ))
    }

    pub fn images(&self) -> &[ApiImage] {
        &self.images
    }

    pub fn next_page(&self) -> usize {
        self.next_page
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn has_more(&self) -> bool {
        self.images.len() < self.total
    }

    /// Fetch the next page and append it. Returns how many images were added.
    ///
    /// Does nothing once everything is loaded. An empty page leaves the page
    /// counter where it is; an error leaves all state untouched.
    pub async fn load_more(&mut self) -> Result<usize, ClientError> {
        if !self.has_more() {
            return Ok(0);
        }
        let response = self
            .source
            .fetch_page(self.next_page, self.page_size, self.collection.as_deref())
            .await?;

        self.total = response.total;
        let added = response.images.len();
        if added > 0 {
            self.images.extend(response.images);
            self.next_page += 1;
        }
        Ok(added)
    }

    /// Last page that can hold images for the known total.
    pub fn last_page(&self) -> usize {
        self.total.div_ceil(self.page_size.max(1))
    }

    /// Keep loading until the total is reached or every page up to
    /// [`last_page`](Self::last_page) has been requested. A page that comes
    /// back empty (all its entries unresolved) is stepped over.
    pub async fn load_all(&mut self) -> Result<usize, ClientError> {
        let mut added = 0;
        while self.has_more() && self.next_page <= self.last_page() {
            let n = self.load_more().await?;
            if n == 0 {
                self.next_page += 1;
            }
            added += n;
        }
        Ok(added)
    }
}
