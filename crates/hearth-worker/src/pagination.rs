use serde::Serialize;

use crate::error::{ServiceError, ServiceResult};

pub const PAGE_SIZE: u64 = 10;

/// Page-number pagination envelope.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<u64>,
    pub previous: Option<u64>,
    pub results: Vec<T>,
}

/// Offset for `page` (1-based) given `count` total rows.
///
/// Page 1 is always valid, even for an empty collection.
pub fn page_offset(page: u64, count: u64) -> ServiceResult<u64> {
    let last = count.div_ceil(PAGE_SIZE).max(1);
    if page == 0 || page > last {
        return Err(ServiceError::not_found("Invalid page."));
    }
    Ok((page - 1) * PAGE_SIZE)
}

impl<T> Page<T> {
    pub fn new(page: u64, count: u64, results: Vec<T>) -> Self {
        let last = count.div_ceil(PAGE_SIZE).max(1);
        Self {
            count,
            next: (page < last).then_some(page + 1),
            previous: (page > 1).then(|| page - 1),
            results,
        }
    }
}

/// Parse a `page` query value; absent means 1.
pub fn parse_page(raw: Option<&str>) -> ServiceResult<u64> {
    match raw {
        None => Ok(1),
        Some(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| ServiceError::not_found("Invalid page.")),
    }
}
