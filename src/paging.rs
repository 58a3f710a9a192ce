/// Groups (or records) per page in every list view.
pub const PAGE_SIZE: usize = 12;

pub const MAX_SEARCH_LIMIT: usize = 100;

pub fn total_pages(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// Lenient 1-based page parameter: missing, unparsable or < 1 means page 1.
pub fn parse_page(raw: Option<&str>) -> usize {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|p| *p >= 1)
        .map(|p| p as usize)
        .unwrap_or(1)
}

/// Lenient `limit` parameter for search, clamped to [1, MAX_SEARCH_LIMIT].
pub fn parse_limit(raw: Option<&str>) -> usize {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .map(|l| l.clamp(1, MAX_SEARCH_LIMIT as i64) as usize)
        .unwrap_or(PAGE_SIZE)
}

/// One page of an ordered list, with the requested page clamped into range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub current_page: usize,
    pub total_pages: usize,
    pub offset: usize,
    pub len: usize,
}

impl PageWindow {
    pub fn clamp(total: usize, requested_page: usize, page_size: usize) -> Self {
        let total_pages = total_pages(total, page_size);
        if total_pages == 0 {
            return PageWindow {
                current_page: 1,
                total_pages: 0,
                offset: 0,
                len: 0,
            };
        }
        let current_page = requested_page.clamp(1, total_pages);
        let offset = (current_page - 1) * page_size;
        PageWindow {
            current_page,
            total_pages,
            offset,
            len: page_size.min(total - offset),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn has_more(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.offset.min(items.len());
        let end = (self.offset + self.len).min(items.len());
        &items[start..end]
    }
}
