use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PageQuery {
    #[serde(default = "PageQuery::default_page")]
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: usize,
    #[serde(default = "PageQuery::default_limit")]
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub total_pages: usize,
    pub current_page: usize,
}

impl PageQuery {
    pub fn new(page: usize, limit: usize) -> Self {
        Self { page, limit }
    }

    pub fn default_page() -> usize {
        1
    }

    pub fn default_limit() -> usize {
        10
    }

    /// Cuts one page out of an already ordered listing.
    pub fn slice<T>(&self, items: Vec<T>) -> (Vec<T>, PageInfo) {
        let total_pages = items.len().div_ceil(self.limit);
        let page = items
            .into_iter()
            .skip(self.page.saturating_sub(1).saturating_mul(self.limit))
            .take(self.limit)
            .collect();

        (
            page,
            PageInfo {
                total_pages,
                current_page: self.page,
            },
        )
    }
}
