//! 分页计算
//!
//! 页码从 1 开始；页码窗口为当前页前后各两页。

use serde::Serialize;

/// 列表视图每页条数
pub const PER_PAGE: u64 = 5;

const WINDOW_RADIUS: u64 = 2;

/// 页码上限，保证偏移量能放进 SQLite 的 i64
pub const MAX_PAGE: u64 = 1 << 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl Pagination {
    /// `requested` 为空或小于 1 时按第 1 页处理。
    ///
    /// 超出末页的页码保持原样，查询结果为空；超过 [`MAX_PAGE`] 的按 [`MAX_PAGE`] 处理。
    pub fn new(requested: Option<i64>, per_page: u64, total: u64) -> Self {
        let per_page = per_page.max(1);
        let page = requested
            .filter(|&p| p >= 1)
            .map_or(1, |p| (p as u64).min(MAX_PAGE));

        Self {
            page,
            per_page,
            total,
            total_pages: total.div_ceil(per_page),
        }
    }

    pub fn offset(&self) -> u64 {
        self.page
            .saturating_sub(1)
            .saturating_mul(self.per_page)
            .min(i64::MAX as u64)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// 只有一页或没有数据时不显示分页导航
    pub fn is_paginated(&self) -> bool {
        self.total_pages > 1
    }

    pub fn window(&self) -> std::ops::RangeInclusive<u64> {
        let start = self.page.saturating_sub(WINDOW_RADIUS).max(1);
        let end = (self.page + WINDOW_RADIUS).min(self.total_pages);
        start..=end
    }
}

/// 解析查询字符串中的页码，非数字一律视为未提供
pub fn parse_page(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse().ok())
}
