//! Paginated catalogue crawl.
//!
//! The crawl is driven one page at a time through an explicit [`CrawlState`]
//! so the caller can act between pages (the pipeline checks the output path
//! as soon as the title is known). [`CatalogueCrawler::crawl`] runs the whole
//! loop when no such hook is needed.

use std::collections::HashSet;

use tracing::{debug, info, instrument, warn};
use url::Url;

use super::chapters::{ChapterLink, ChapterSet, Offer};
use super::page::{PageTemplate, SpringerLinkTemplate};
use crate::download::PageFetcher;
use crate::error::BookError;
use crate::link::CatalogueIdentity;

/// Title and cover discovered while crawling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookMetadata {
    title: Option<String>,
    cover_url: Option<Url>,
}

impl BookMetadata {
    /// The captured title, once the first page has been processed.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Absolute URL of the large cover image, if the page advertised one.
    #[must_use]
    pub fn cover_url(&self) -> Option<&Url> {
        self.cover_url.as_ref()
    }
}

/// Mutable state threaded through every page of one crawl.
#[derive(Debug, Clone)]
pub struct CrawlState {
    metadata: BookMetadata,
    chapters: ChapterSet,
    next_page: Option<Url>,
    visited: HashSet<String>,
}

impl CrawlState {
    /// Metadata captured so far.
    #[must_use]
    pub fn metadata(&self) -> &BookMetadata {
        &self.metadata
    }

    /// The page the next [`CatalogueCrawler::crawl_next`] call will fetch.
    #[must_use]
    pub fn next_page(&self) -> Option<&Url> {
        self.next_page.as_ref()
    }

    /// True when no further page remains.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.next_page.is_none()
    }

    /// Pages processed so far.
    #[must_use]
    pub fn pages_crawled(&self) -> usize {
        self.visited.len()
    }

    /// Chapters collected so far, deferred back matter included.
    #[must_use]
    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }
}

/// Result of a finished crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    /// Book title (with subtitle).
    pub title: String,
    /// Cover image URL, if any.
    pub cover_url: Option<Url>,
    /// Chapters in reading order.
    pub chapters: Vec<ChapterLink>,
}

/// Walks the "next page" chain of a catalogue entry.
pub struct CatalogueCrawler<'a> {
    fetcher: &'a dyn PageFetcher,
    identity: &'a CatalogueIdentity,
    template: Box<dyn PageTemplate>,
}

impl std::fmt::Debug for CatalogueCrawler<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogueCrawler")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

impl<'a> CatalogueCrawler<'a> {
    /// Creates a crawler using the SpringerLink page template.
    #[must_use]
    pub fn new(fetcher: &'a dyn PageFetcher, identity: &'a CatalogueIdentity) -> Self {
        Self {
            fetcher,
            identity,
            template: Box::new(SpringerLinkTemplate),
        }
    }

    /// Replaces the page template.
    #[must_use]
    pub fn with_template(mut self, template: impl PageTemplate + 'static) -> Self {
        self.template = Box::new(template);
        self
    }

    /// Initial state pointing at the entry's contents page.
    #[must_use]
    pub fn start(&self) -> CrawlState {
        CrawlState {
            metadata: BookMetadata::default(),
            chapters: ChapterSet::new(),
            next_page: Some(self.identity.contents_url()),
            visited: HashSet::new(),
        }
    }

    /// Fetches and processes the next page. Returns `false` once the chain is exhausted.
    ///
    /// # Errors
    ///
    /// [`BookError::Fetch`] or [`BookError::AccessDenied`] for transport
    /// failures, plus everything [`process_page`](Self::process_page) returns.
    #[instrument(skip(self, state), fields(code = %self.identity.code()))]
    pub async fn crawl_next(&self, state: &mut CrawlState) -> Result<bool, BookError> {
        let Some(url) = state.next_page.take() else {
            return Ok(false);
        };

        info!(url = %url, "fetching book information...");
        let html = self
            .fetcher
            .fetch_page(&url)
            .await
            .map_err(|e| BookError::fetch(url.as_str(), e))?;

        self.process_page(state, &url, &html)?;
        Ok(true)
    }

    /// Applies one page's content to `state`.
    ///
    /// # Errors
    ///
    /// - [`BookError::AccessDenied`] if the page carries the denial marker
    /// - [`BookError::TitleExtraction`] if the title is still unknown and the
    ///   page has no usable heading
    pub fn process_page(
        &self,
        state: &mut CrawlState,
        page_url: &Url,
        html: &str,
    ) -> Result<(), BookError> {
        if self.template.is_access_denied(html) {
            return Err(BookError::AccessDenied {
                url: page_url.to_string(),
            });
        }
        state.visited.insert(page_url.to_string());

        if state.metadata.title.is_none() {
            let title = self
                .template
                .title(html)
                .ok_or_else(|| BookError::TitleExtraction {
                    url: page_url.to_string(),
                })?;
            debug!(%title, "captured book title");
            state.metadata.title = Some(title);

            state.metadata.cover_url = self.template.cover_id(html).and_then(|id| {
                self.identity
                    .site_root()
                    .join(&format!("/contents/{id}/cover-large.gif"))
                    .ok()
            });
        }

        for href in self.template.pdf_links(html) {
            if let Ok(absolute) = Url::parse(&href)
                && !self.identity.is_same_origin(&absolute)
            {
                debug!(%href, "skipping cross-origin link");
                continue;
            }
            let link = ChapterLink::classify(href);
            let role = link.role();
            match state.chapters.offer(link) {
                Offer::Added => {}
                Offer::Deferred => debug!(?role, "deferring until the last page"),
                Offer::Dropped => debug!(?role, "dropping repeated link"),
            }
        }

        state.next_page = match self.template.next_page(html) {
            // Relative to the page holding the link, as a browser would.
            Some(next) => match page_url.join(&next) {
                Ok(url) if state.visited.contains(url.as_str()) => {
                    warn!(url = %url, "next page already visited; stopping crawl");
                    None
                }
                Ok(url) => Some(url),
                Err(_) => {
                    warn!(%next, "unusable next page link; stopping crawl");
                    None
                }
            },
            None => None,
        };

        Ok(())
    }

    /// Closes the crawl.
    ///
    /// # Errors
    ///
    /// - [`BookError::TitleExtraction`] if no page was processed
    /// - [`BookError::NoChaptersFound`] if no chapter link was seen
    pub fn finish(&self, state: CrawlState) -> Result<Book, BookError> {
        let title = state
            .metadata
            .title
            .ok_or_else(|| BookError::TitleExtraction {
                url: self.identity.contents_url().to_string(),
            })?;
        if state.chapters.is_empty() {
            return Err(BookError::NoChaptersFound);
        }
        let chapters = state.chapters.finish();
        info!(chapters = chapters.len(), "found {} chapters", chapters.len());
        Ok(Book {
            title,
            cover_url: state.metadata.cover_url,
            chapters,
        })
    }

    /// Runs the whole crawl.
    ///
    /// # Errors
    ///
    /// Any error from [`crawl_next`](Self::crawl_next) or [`finish`](Self::finish).
    pub async fn crawl(&self) -> Result<Book, BookError> {
        let mut state = self.start();
        while self.crawl_next(&mut state).await? {}
        self.finish(state)
    }
}
