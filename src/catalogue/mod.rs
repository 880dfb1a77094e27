//! Catalogue discovery: page template, chapter ordering, and the paginated crawl.

mod chapters;
mod crawler;
mod page;

pub use chapters::{BACK_MATTER_FILE, ChapterLink, ChapterRole, ChapterSet, FRONT_MATTER_FILE, Offer};
pub use crawler::{Book, BookMetadata, CatalogueCrawler, CrawlState};
pub use page::{PageTemplate, SpringerLinkTemplate, decode_entities};
