/// Page arithmetic for the public index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub total: usize,
    pub page_size: usize,
    pub num_pages: usize,
}

impl Pagination {
    pub fn new(total: usize, page_size: usize) -> Self {
        let num_pages = if page_size == 0 {
            0
        } else {
            total.div_ceil(page_size)
        };
        Self {
            total,
            page_size,
            num_pages,
        }
    }

    /// Page 1 always exists, even with no posts.
    pub fn is_valid(&self, page: usize) -> bool {
        page >= 1 && (page == 1 || page <= self.num_pages)
    }

    pub fn offset(&self, page: usize) -> usize {
        page.saturating_sub(1) * self.page_size
    }
}
