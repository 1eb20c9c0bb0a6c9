use serde::Serialize;

/// One page of a listing. `page` is 1-based; `total` counts every match.
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}
