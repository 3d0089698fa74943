use serde::Serialize;

pub const DEFAULT_PAGE: usize = 0;
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Zero-based page number and page size. Size is always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub size: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page: DEFAULT_PAGE,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.size)
    }
}

/// One slice of an ordered result set, plus the size of the whole set.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub request: PageRequest,
    pub total_elements: usize,
}

impl<T> Page<T> {
    /// Cut the page described by `request` out of the already ordered `rows`.
    pub fn slice(rows: Vec<T>, request: PageRequest) -> Page<T> {
        let total_elements = rows.len();
        let content = rows
            .into_iter()
            .skip(request.offset())
            .take(request.size)
            .collect();
        Page {
            content,
            request,
            total_elements,
        }
    }

    pub fn total_pages(&self) -> usize {
        self.total_elements.div_ceil(self.request.size.max(1))
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            request: self.request,
            total_elements: self.total_elements,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub content: Vec<T>,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub page_size: usize,
}

impl<T> From<Page<T>> for PageResponse<T> {
    fn from(page: Page<T>) -> Self {
        PageResponse {
            current_page: page.request.page,
            total_pages: page.total_pages(),
            total_items: page.total_elements,
            page_size: page.request.size,
            content: page.content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_middle_page() {
        let page = Page::slice((1..=12).collect(), PageRequest { page: 1, size: 5 });
        assert_eq!(page.content, vec![6, 7, 8, 9, 10]);
        assert_eq!(page.total_elements, 12);
        assert_eq!(page.total_pages(), 3);
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let page = Page::slice((1..=3).collect::<Vec<u32>>(), PageRequest { page: 4, size: 5 });
        assert!(page.content.is_empty());
        assert_eq!(page.total_pages(), 1);
    }

    #[test]
    fn empty_set_has_no_pages() {
        let page = Page::slice(Vec::<u32>::new(), PageRequest::default());
        assert_eq!(page.total_pages(), 0);
    }

    #[test]
    fn response_carries_paging_fields() {
        let page = Page::slice((1..=7).collect::<Vec<u32>>(), PageRequest { page: 1, size: 5 });
        let response = PageResponse::from(page.map(|n| n * 10));
        assert_eq!(response.content, vec![60, 70]);
        assert_eq!(response.current_page, 1);
        assert_eq!(response.total_pages, 2);
        assert_eq!(response.total_items, 7);
        assert_eq!(response.page_size, 5);
    }
}
