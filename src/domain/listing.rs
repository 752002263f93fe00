use std::collections::{BTreeMap, HashMap};

use super::resource::Resource;
use super::sorting::{sort_records, SortOrder, SortSpec};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Filter, sort and page parameters for one list view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// 1-based page index.
    pub page: u32,
    pub limit: u32,
    pub keyword: Option<String>,
    pub sort: Option<SortSpec>,
    /// Resource-specific filters (`role`, `active`, `order_status`, ...).
    pub filters: BTreeMap<String, String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl ListQuery {
    pub fn new(limit: u32) -> Self {
        Self {
            page: 1,
            limit: limit.clamp(1, MAX_PAGE_SIZE),
            keyword: None,
            sort: None,
            filters: BTreeMap::new(),
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        let keyword = keyword.into();
        let trimmed = keyword.trim();
        self.keyword = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Query-string pairs in a stable order: paging, sort, keyword, filters.
    ///
    /// The sort pair is only emitted when the resource names its sort
    /// parameters.
    pub fn to_pairs(&self, sort_params: Option<(&str, &str)>) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ];
        if let (Some((field_param, order_param)), Some(sort)) = (sort_params, &self.sort) {
            pairs.push((field_param.to_string(), sort.field.clone()));
            pairs.push((order_param.to_string(), sort.order.as_str().to_string()));
        }
        if let Some(keyword) = &self.keyword {
            pairs.push(("keyword".to_string(), keyword.clone()));
        }
        pairs.extend(self.filters.iter().map(|(k, v)| (k.clone(), v.clone())));
        pairs
    }

    /// Rebuilds a query from raw query-string parameters; the reverse of
    /// [`ListQuery::to_pairs`]. Unknown keys become filters.
    pub fn from_params(
        params: &HashMap<String, String>,
        sort_params: Option<(&str, &str)>,
    ) -> Self {
        let limit = params
            .get("limit")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PAGE_SIZE);
        let page = params
            .get("page")
            .and_then(|v| v.parse().ok())
            .unwrap_or(1);
        let mut query = ListQuery::new(limit).with_page(page);
        if let Some(keyword) = params.get("keyword").or_else(|| params.get("search")) {
            query = query.with_keyword(keyword.as_str());
        }

        let mut reserved = vec!["page", "limit", "keyword", "search"];
        if let Some((field_param, order_param)) = sort_params {
            reserved.extend([field_param, order_param]);
            if let Some(field) = params.get(field_param).filter(|f| !f.is_empty()) {
                let order = params
                    .get(order_param)
                    .and_then(|o| SortOrder::parse(o))
                    .unwrap_or(SortOrder::Asc);
                query.sort = Some(SortSpec::new(field.clone(), order));
            }
        }
        for (key, value) in params {
            if !reserved.contains(&key.as_str()) && !value.is_empty() {
                query.filters.insert(key.clone(), value.clone());
            }
        }
        query
    }
}

/// Where a page's ordering came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortScope {
    /// Backend sorted the full result set (or no sort was requested).
    Server,
    /// Client sorted the complete result set before slicing.
    FullSet,
    /// Client could only reorder the rows of the returned page.
    CurrentPage,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub sort_scope: SortScope,
}

impl<T> Page<T> {
    pub fn empty(query: &ListQuery) -> Self {
        Self {
            items: Vec::new(),
            page: query.page,
            limit: query.limit,
            total: 0,
            sort_scope: SortScope::Server,
        }
    }

    pub fn page_count(&self) -> u64 {
        page_count(self.total, self.limit)
    }
}

fn page_count(total: u64, limit: u32) -> u64 {
    if limit == 0 {
        0
    } else {
        total.div_ceil(u64::from(limit))
    }
}

/// State of the pagination control under a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub current: u32,
    pub page_size: u32,
    pub total: u64,
}

impl Pagination {
    pub fn page_count(&self) -> u64 {
        page_count(self.total, self.page_size)
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.current) < self.page_count()
    }

    pub fn has_previous(&self) -> bool {
        self.current > 1
    }
}

/// Keyword and filter match for one record.
pub fn matches_query<R: Resource>(record: &R::Record, query: &ListQuery) -> bool {
    let keyword_ok = query
        .keyword
        .as_deref()
        .map_or(true, |k| R::matches_keyword(record, &k.to_lowercase()));
    keyword_ok
        && query
            .filters
            .iter()
            .all(|(key, value)| R::matches_filter(record, key, value))
}

pub fn sort_for<R: Resource>(records: &mut [R::Record], sort: &SortSpec) {
    sort_records(records, sort, R::tie_breakers(&sort.field), |r, f| {
        R::sort_value(r, f)
    });
}

/// Filters, sorts and slices a complete result set.
///
/// Used when the backend answers with a bare array: the array is the whole
/// collection, so every step runs over all of it rather than one page.
pub fn paginate_locally<R: Resource>(
    mut records: Vec<R::Record>,
    query: &ListQuery,
) -> Page<R::Record> {
    records.retain(|r| matches_query::<R>(r, query));
    let sort_scope = match &query.sort {
        Some(sort) => {
            sort_for::<R>(&mut records, sort);
            SortScope::FullSet
        }
        None => SortScope::Server,
    };
    let total = records.len() as u64;
    let start = (query.page.saturating_sub(1) as usize).saturating_mul(query.limit as usize);
    let items = records
        .into_iter()
        .skip(start)
        .take(query.limit as usize)
        .collect();
    Page {
        items,
        page: query.page,
        limit: query.limit,
        total,
        sort_scope,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::role::{Role, Roles};

    fn role(name: &str) -> Role {
        Role {
            id: format!("r-{name}"),
            name: name.to_string(),
            description: None,
            permissions: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn pairs_follow_a_stable_order() {
        let query = ListQuery::new(5)
            .with_page(2)
            .with_keyword(" chain ")
            .with_sort(SortSpec::desc("email"))
            .with_filter("role", "admin");
        let pairs = query.to_pairs(Some(("sortField", "sortOrder")));
        let rendered: Vec<String> = pairs.iter().map(|(k, v)| format!("{k}={v}")).collect();
        assert_eq!(
            rendered,
            vec!["page=2", "limit=5", "sortField=email", "sortOrder=desc", "keyword=chain", "role=admin"]
        );
    }

    #[test]
    fn sort_is_dropped_without_sort_params() {
        let query = ListQuery::new(5).with_sort(SortSpec::asc("name"));
        assert_eq!(query.to_pairs(None).len(), 2);
    }

    #[test]
    fn from_params_reads_back_pairs() {
        let params: HashMap<String, String> = [
            ("page", "3"),
            ("limit", "500"),
            ("sort_by", "city"),
            ("sort_type", "desc"),
            ("keyword", "ana"),
            ("active", "true"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let query = ListQuery::from_params(&params, Some(("sort_by", "sort_type")));
        assert_eq!(query.page, 3);
        assert_eq!(query.limit, MAX_PAGE_SIZE);
        assert_eq!(query.sort, Some(SortSpec::desc("city")));
        assert_eq!(query.keyword.as_deref(), Some("ana"));
        assert_eq!(query.filters.get("active").map(String::as_str), Some("true"));
        assert_eq!(query.filters.len(), 1);
    }

    #[test]
    fn local_pagination_sorts_the_whole_set_before_slicing() {
        let records = vec![role("staff"), role("auditor"), role("admin"), role("owner")];
        let query = ListQuery::new(2).with_page(2).with_sort(SortSpec::asc("name"));
        let page = paginate_locally::<Roles>(records, &query);
        let names: Vec<&str> = page.items.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["owner", "staff"]);
        assert_eq!(page.total, 4);
        assert_eq!(page.sort_scope, SortScope::FullSet);
    }

    #[test]
    fn local_pagination_filters_by_keyword_first() {
        let records = vec![role("staff"), role("Admin"), role("super admin")];
        let query = ListQuery::new(10).with_keyword("ADMIN");
        let page = paginate_locally::<Roles>(records, &query);
        assert_eq!(page.total, 2);
        assert_eq!(page.page_count(), 1);
    }

    #[test]
    fn pagination_counts_pages() {
        let control = Pagination {
            current: 2,
            page_size: 5,
            total: 11,
        };
        assert_eq!(control.page_count(), 3);
        assert!(control.has_next());
        assert!(control.has_previous());
    }
}
