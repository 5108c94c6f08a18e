//! Page identity types.
//!
//! The navigation core only ever holds page identity (`id` and `slug`); page
//! content belongs to the editor and the public view.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::slug::is_valid_segment;

/// Numeric page identifier, unique within a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(i64);

impl PageId {
    /// Wrap a raw identifier.
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw identifier value.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validation errors returned by [`PageSlug::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("page slug must be a non-empty path segment of letters, digits, '-' or '_'")]
pub struct PageSlugValidationError;

/// Human-readable, URL-safe page identifier, unique within its room.
///
/// # Examples
/// ```
/// use wiki_client::domain::PageSlug;
///
/// assert!(PageSlug::new("getting_started").is_ok());
/// assert!(PageSlug::new("a/b").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PageSlug(String);

impl PageSlug {
    /// Validate and construct a slug.
    pub fn new(raw: impl Into<String>) -> Result<Self, PageSlugValidationError> {
        let raw = raw.into();
        if is_valid_segment(&raw) {
            Ok(Self(raw))
        } else {
            Err(PageSlugValidationError)
        }
    }

    /// Borrow the slug.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for PageSlug {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for PageSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for PageSlug {
    type Error = PageSlugValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PageSlug> for String {
    fn from(value: PageSlug) -> Self {
        value.0
    }
}

/// Page identity resolved from either side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRef {
    /// Page identifier.
    pub id: PageId,
    /// Page slug.
    pub slug: PageSlug,
}

/// One node of a room's page tree, ordered by materialised path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageTreeNode {
    /// Page identifier.
    pub id: PageId,
    /// Display title.
    pub title: String,
    /// Page slug.
    pub slug: PageSlug,
    /// Dotted materialised path (`parent.child`).
    pub path: String,
    /// Child pages in listing order.
    pub children: Vec<PageTreeNode>,
}

impl PageTreeNode {
    /// Identity of this node.
    pub fn page_ref(&self) -> PageRef {
        PageRef {
            id: self.id,
            slug: self.slug.clone(),
        }
    }
}

/// First page of a listing in display order, if any.
pub fn first_listed_page(tree: &[PageTreeNode]) -> Option<PageRef> {
    tree.first().map(PageTreeNode::page_ref)
}

/// Count every node of a page tree.
pub fn count_pages(tree: &[PageTreeNode]) -> usize {
    tree.iter()
        .map(|node| 1 + count_pages(&node.children))
        .sum()
}

/// Read-only page served by the public view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicPage {
    /// Page identifier.
    pub id: PageId,
    /// Display title.
    pub title: String,
    /// Page slug.
    pub slug: PageSlug,
    /// Editor document, if the page has content.
    pub content: Option<String>,
}

/// One full-text search hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    /// Page identifier.
    pub id: PageId,
    /// Display title.
    pub title: String,
    /// Page slug.
    pub slug: PageSlug,
    /// Highlighted excerpt.
    pub headline: String,
    /// Relevance score; higher ranks first.
    pub rank: f64,
}
