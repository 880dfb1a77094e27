//! Ordered chapter sequence with front/back matter pinning.

/// File name that marks front matter.
pub const FRONT_MATTER_FILE: &str = "front-matter.pdf";
/// File name that marks back matter.
pub const BACK_MATTER_FILE: &str = "back-matter.pdf";

/// Reading-order role of a chapter artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChapterRole {
    /// Preliminary pages; at most one per book, always first.
    FrontMatter,
    /// Concluding pages; at most one per book, always last.
    BackMatter,
    /// Any other chapter, kept in discovery order.
    Regular,
}

/// A chapter href as found on a catalogue page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterLink {
    href: String,
    role: ChapterRole,
}

impl ChapterLink {
    /// Classifies `href` by exact match of its final path segment.
    #[must_use]
    pub fn classify(href: impl Into<String>) -> Self {
        let href = href.into();
        let role = match file_name(&href) {
            FRONT_MATTER_FILE => ChapterRole::FrontMatter,
            BACK_MATTER_FILE => ChapterRole::BackMatter,
            _ => ChapterRole::Regular,
        };
        Self { href, role }
    }

    /// The href as it appeared on the page.
    #[must_use]
    pub fn href(&self) -> &str {
        &self.href
    }

    /// Reading-order role.
    #[must_use]
    pub fn role(&self) -> ChapterRole {
        self.role
    }
}

fn file_name(href: &str) -> &str {
    let path = href.split(['?', '#']).next().unwrap_or(href);
    path.rsplit('/').next().unwrap_or(path)
}

/// Chapter sequence accumulated across catalogue pages.
///
/// Front matter enters once and is pinned to the head. Back matter is held
/// aside however often it appears and only joins the tail in [`finish`].
///
/// [`finish`]: ChapterSet::finish
#[derive(Debug, Default, Clone)]
pub struct ChapterSet {
    links: Vec<ChapterLink>,
    has_front_matter: bool,
    back_matter: Option<ChapterLink>,
}

/// What [`ChapterSet::offer`] did with a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    /// The link entered the sequence.
    Added,
    /// Back matter, held until the crawl ends.
    Deferred,
    /// A repeated front or back matter link.
    Dropped,
}

impl ChapterSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a link according to its role.
    pub fn offer(&mut self, link: ChapterLink) -> Offer {
        match link.role() {
            ChapterRole::FrontMatter if self.has_front_matter => Offer::Dropped,
            ChapterRole::FrontMatter => {
                self.has_front_matter = true;
                self.links.insert(0, link);
                Offer::Added
            }
            ChapterRole::BackMatter if self.back_matter.is_some() => Offer::Dropped,
            ChapterRole::BackMatter => {
                self.back_matter = Some(link);
                Offer::Deferred
            }
            ChapterRole::Regular => {
                self.links.push(link);
                Offer::Added
            }
        }
    }

    /// Number of links that will be downloaded, deferred back matter included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.links.len() + usize::from(self.back_matter.is_some())
    }

    /// True when nothing has been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Closes the crawl and returns links in reading order.
    #[must_use]
    pub fn finish(self) -> Vec<ChapterLink> {
        let mut links = self.links;
        links.extend(self.back_matter);
        links
    }
}
