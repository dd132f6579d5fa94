//! Paginated list envelopes
//!
//! List endpoints answer in the same envelope shape the remote catalog
//! uses: a total count, relative next/previous links and the page of
//! results.

use serde::Serialize;

/// Records per list page.
pub const PAGE_SIZE: i64 = 20;

/// Validated 1-indexed page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageNumber(i64);

impl PageNumber {
    /// Validate an optional query value, defaulting to the first page.
    pub fn new(page: Option<i64>) -> Result<Self, &'static str> {
        let page = page.unwrap_or(1);
        if page < 1 {
            return Err("Page number must be >= 1");
        }
        Ok(Self(page))
    }

    pub fn get(self) -> i64 {
        self.0
    }

    /// Row offset of the first record on this page.
    pub fn offset(self) -> i64 {
        (self.0 - 1) * PAGE_SIZE
    }
}

/// One page of results with navigation links.
#[derive(Debug, Clone, Serialize)]
pub struct ListEnvelope<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> ListEnvelope<T> {
    /// Assemble an envelope, deriving the next and previous page links.
    ///
    /// Links are relative URLs on `base_path` carrying the page number and
    /// the active filter, when one is set. `next` exists while pages
    /// remain; `previous` exists on every page after the first, even when
    /// the requested page is past the end.
    pub fn new(
        base_path: &str,
        filter: Option<(&str, &str)>,
        page: PageNumber,
        count: i64,
        results: Vec<T>,
    ) -> Self {
        let total_pages = (count + PAGE_SIZE - 1) / PAGE_SIZE;

        let next = if page.get() < total_pages {
            Some(page_url(base_path, filter, page.get() + 1))
        } else {
            None
        };
        let previous = if page.get() > 1 {
            Some(page_url(base_path, filter, page.get() - 1))
        } else {
            None
        };

        Self {
            count,
            next,
            previous,
            results,
        }
    }
}

fn page_url(base_path: &str, filter: Option<(&str, &str)>, page: i64) -> String {
    match filter {
        Some((field, value)) => format!("{}?page={}&{}={}", base_path, page, field, value),
        None => format!("{}?page={}", base_path, page),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_number_defaults_to_first_page() {
        let page = PageNumber::new(None).unwrap();
        assert_eq!(page.get(), 1);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_page_number_rejects_zero_and_negative() {
        assert!(PageNumber::new(Some(0)).is_err());
        assert!(PageNumber::new(Some(-3)).is_err());
    }

    #[test]
    fn test_page_number_offset() {
        assert_eq!(PageNumber::new(Some(1)).unwrap().offset(), 0);
        assert_eq!(PageNumber::new(Some(2)).unwrap().offset(), 20);
        assert_eq!(PageNumber::new(Some(5)).unwrap().offset(), 80);
    }

    #[test]
    fn test_envelope_middle_page_has_both_links() {
        let page = PageNumber::new(Some(2)).unwrap();
        let envelope = ListEnvelope::new("/api/films/", None, page, 50, vec![1, 2, 3]);

        assert_eq!(envelope.count, 50);
        assert_eq!(envelope.next.as_deref(), Some("/api/films/?page=3"));
        assert_eq!(envelope.previous.as_deref(), Some("/api/films/?page=1"));
    }

    #[test]
    fn test_envelope_first_page_has_no_previous() {
        let page = PageNumber::new(Some(1)).unwrap();
        let envelope = ListEnvelope::new("/api/films/", None, page, 50, vec![1]);

        assert_eq!(envelope.next.as_deref(), Some("/api/films/?page=2"));
        assert!(envelope.previous.is_none());
    }

    #[test]
    fn test_envelope_last_page_has_no_next() {
        let page = PageNumber::new(Some(3)).unwrap();
        let envelope = ListEnvelope::new("/api/films/", None, page, 50, vec![1]);

        assert!(envelope.next.is_none());
        assert_eq!(envelope.previous.as_deref(), Some("/api/films/?page=2"));
    }

    #[test]
    fn test_envelope_single_page_has_no_links() {
        let page = PageNumber::new(Some(1)).unwrap();
        let envelope = ListEnvelope::new("/api/films/", None, page, 6, vec![1]);

        assert!(envelope.next.is_none());
        assert!(envelope.previous.is_none());
    }

    #[test]
    fn test_envelope_empty_result_set() {
        let page = PageNumber::new(Some(1)).unwrap();
        let envelope: ListEnvelope<i64> = ListEnvelope::new("/api/films/", None, page, 0, vec![]);

        assert_eq!(envelope.count, 0);
        assert!(envelope.next.is_none());
        assert!(envelope.previous.is_none());
        assert!(envelope.results.is_empty());
    }

    #[test]
    fn test_envelope_links_carry_filter() {
        let page = PageNumber::new(Some(2)).unwrap();
        let envelope = ListEnvelope::new(
            "/api/characters/",
            Some(("name", "skywalker")),
            page,
            45,
            vec![1],
        );

        assert_eq!(
            envelope.next.as_deref(),
            Some("/api/characters/?page=3&name=skywalker")
        );
        assert_eq!(
            envelope.previous.as_deref(),
            Some("/api/characters/?page=1&name=skywalker")
        );
    }
}
