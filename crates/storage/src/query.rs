use common::UserId;
use serde::Serialize;

/// Default number of products per page.
pub const DEFAULT_PER_PAGE: u32 = 12;

/// Upper bound on the page size a caller may request.
pub const MAX_PER_PAGE: u32 = 100;

/// Builder for catalog listing queries.
///
/// Results are ordered newest-first and paginated.
#[derive(Debug, Clone)]
pub struct ProductQuery {
    /// Case-insensitive substring matched against name and description.
    pub search: Option<String>,

    /// Restrict to the category with this slug.
    pub category_slug: Option<String>,

    /// Include products whose `is_active` flag is off.
    pub include_inactive: bool,

    /// 1-based page number.
    pub page: u32,

    pub per_page: u32,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            search: None,
            category_slug: None,
            include_inactive: false,
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl ProductQuery {
    /// Creates a query for the first page of active products.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by search term. Blank terms are ignored.
    pub fn search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        let trimmed = term.trim();
        self.search = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    /// Filters by category slug.
    pub fn category(mut self, slug: impl Into<String>) -> Self {
        self.category_slug = Some(slug.into());
        self
    }

    pub fn include_inactive(mut self, include: bool) -> Self {
        self.include_inactive = include;
        self
    }

    /// Selects a page; values below 1 are clamped to 1.
    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Sets the page size, clamped to `1..=MAX_PER_PAGE`.
    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.clamp(1, MAX_PER_PAGE);
        self
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page)
    }

    /// Returns true if the name or description contains the search term.
    pub fn matches_search(&self, name: &str, description: Option<&str>) -> bool {
        match &self.search {
            None => true,
            Some(term) => {
                let term = term.to_lowercase();
                name.to_lowercase().contains(&term)
                    || description.is_some_and(|d| d.to_lowercase().contains(&term))
            }
        }
    }
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub current_page: u32,
    pub last_page: u32,
    pub per_page: u32,
    pub total: u64,
}

impl<T> Page<T> {
    /// Builds a page, deriving `last_page` from the total (at least 1).
    pub fn new(data: Vec<T>, current_page: u32, per_page: u32, total: u64) -> Self {
        let per_page = per_page.max(1);
        let last_page = total.div_ceil(u64::from(per_page)).max(1);
        Self {
            data,
            current_page,
            last_page: u32::try_from(last_page).unwrap_or(u32::MAX),
            per_page,
            total,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            current_page: self.current_page,
            last_page: self.last_page,
            per_page: self.per_page,
            total: self.total,
        }
    }
}

/// Which orders a listing may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderScope {
    /// Every order in the store.
    All,
    /// Orders owned by one user.
    User(UserId),
}
