//! Derived read model
//!
//! A [`QueryView`] is recomputed on every call in a fixed order:
//! filter (search term, date range) → stable sort → paginate. It is never
//! persisted and never mutates the records it reads.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::models::RecordId;

/// Rows per page when nothing else is configured
pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Which field to sort by, and in which direction
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortConfig {
    pub key: Option<String>,
    pub direction: SortDirection,
}

impl SortConfig {
    pub fn by(key: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            key: Some(key.into()),
            direction,
        }
    }

    /// Same key flips the direction; a new key starts ascending
    pub fn toggle(&mut self, key: &str) {
        if self.key.as_deref() == Some(key) {
            self.direction = self.direction.flipped();
        } else {
            self.key = Some(key.to_string());
            self.direction = SortDirection::Ascending;
        }
    }
}

/// Inclusive date bounds; either end may be open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }

    pub fn is_open(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}

/// Query parameters fed in by the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub search: String,
    pub sort: SortConfig,
    pub page_size: usize,
    /// 1-based; out of range values are clamped
    pub page: usize,
    pub date_range: DateRange,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            search: String::new(),
            sort: SortConfig::default(),
            page_size: DEFAULT_PAGE_SIZE,
            page: 1,
            date_range: DateRange::default(),
        }
    }
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    pub fn sort(mut self, sort: SortConfig) -> Self {
        self.sort = sort;
        self
    }

    pub fn page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn date_range(mut self, range: DateRange) -> Self {
        self.date_range = range;
        self
    }
}

/// One page of filtered, sorted records
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryView<T> {
    pub items: Vec<T>,
    /// The page actually shown, after clamping
    pub page: usize,
    pub page_size: usize,
    /// `ceil(total_matches / page_size)`; 0 when nothing matches
    pub total_pages: usize,
    pub total_matches: usize,
}

impl<T: Entity> QueryView<T> {
    /// Id of the record on row `row` of this page
    ///
    /// Resolve rows to ids when the user acts, then mutate by id; a row
    /// number goes stale as soon as the search or sort changes.
    pub fn id_at(&self, row: usize) -> Option<&RecordId> {
        self.items.get(row).map(Entity::id)
    }

    pub fn ids(&self) -> Vec<&RecordId> {
        self.items.iter().map(Entity::id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// True if `record` passes the search term and date range
pub fn matches<T: Entity>(record: &T, search: &str, range: &DateRange) -> bool {
    let needle = search.to_lowercase();
    let text_match = needle.is_empty()
        || record
            .search_values()
            .iter()
            .any(|value| value.to_lowercase().contains(&needle));

    text_match && range.contains(record.record_date())
}

/// Records passing the filter, in collection order
pub fn filter<'a, T: Entity>(records: &'a [T], search: &str, range: &DateRange) -> Vec<&'a T> {
    records
        .iter()
        .filter(|record| matches(*record, search, range))
        .collect()
}

/// Stable sort by `config`; unknown keys leave the order untouched
pub fn sort<T: Entity>(records: &mut [&T], config: &SortConfig) {
    let Some(key) = config.key.as_deref() else {
        return;
    };
    if !T::KIND.sort_keys().contains(&key) {
        tracing::debug!(kind = %T::KIND, key, "ignoring unknown sort key");
        return;
    }

    records.sort_by(|a, b| {
        let ordering = match (a.sort_value(key), b.sort_value(key)) {
            (Some(a), Some(b)) => a.compare(&b),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        match config.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

/// Run `query` over `records`: filter → sort → paginate
pub fn run<T: Entity>(records: &[T], query: &Query) -> QueryView<T> {
    let mut matched = filter(records, &query.search, &query.date_range);
    sort(&mut matched, &query.sort);

    let page_size = query.page_size.max(1);
    let total_matches = matched.len();
    let total_pages = total_matches.div_ceil(page_size);
    let page = query.page.clamp(1, total_pages.max(1));

    let items = matched
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .cloned()
        .collect();

    QueryView {
        items,
        page,
        page_size,
        total_pages,
        total_matches,
    }
}
