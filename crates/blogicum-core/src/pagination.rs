//! Page slicing for post listings.

use serde::Serialize;

/// Number of posts shown per listing page.
pub const PAGE_SIZE: u64 = 10;

/// A page number as requested by the client, before clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest(u64);

impl PageRequest {
    pub fn first() -> Self {
        Self(1)
    }

    pub fn last() -> Self {
        Self(u64::MAX)
    }

    pub fn number(number: u64) -> Self {
        Self(number)
    }

    /// Parse the `page` query parameter.
    ///
    /// Missing or non-numeric values select the first page, `last` selects
    /// the last one. Zero and negative numbers are clamped later, as are
    /// integers too large to represent.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("last") => Self::last(),
            Some(value) => match value.parse::<i64>() {
                Ok(n) if n > 0 => Self(n as u64),
                Ok(_) => Self(0),
                Err(_) => match value.strip_prefix('-') {
                    Some(digits) if is_digits(digits) => Self(0),
                    None if is_digits(value.strip_prefix('+').unwrap_or(value)) => Self::last(),
                    _ => Self::first(),
                },
            },
            None => Self::first(),
        }
    }
}

fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first()
    }
}

/// The concrete slice a request resolves to once the total is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u64,
    pub num_pages: u64,
    pub page_size: u64,
}

impl PageWindow {
    /// Clamp `request` into `1..=num_pages`. An empty listing has one page.
    pub fn resolve(request: PageRequest, total: u64, page_size: u64) -> Self {
        let page_size = page_size.max(1);
        let num_pages = total.div_ceil(page_size).max(1);
        Self {
            number: request.0.clamp(1, num_pages),
            num_pages,
            page_size,
        }
    }

    pub fn offset(&self) -> u64 {
        (self.number - 1) * self.page_size
    }

    pub fn limit(&self) -> u64 {
        self.page_size
    }
}

/// One page of a listing plus navigation metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
    pub page_size: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, window: PageWindow, total: u64) -> Self {
        Self {
            items,
            number: window.number,
            num_pages: window.num_pages,
            total,
            page_size: window.page_size,
        }
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn next_number(&self) -> Option<u64> {
        self.has_next().then(|| self.number + 1)
    }

    pub fn previous_number(&self) -> Option<u64> {
        self.has_previous().then(|| self.number - 1)
    }
}
