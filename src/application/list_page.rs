use std::marker::PhantomData;
use std::sync::Arc;

use crate::domain::listing::{ListQuery, Page, Pagination, SortScope};
use crate::domain::resource::Resource;
use crate::domain::sorting::{SortOrder, SortSpec};
use crate::errors::AppError;

use super::context::AdminContext;
use super::notifications::Notification;

/// Table state for one resource: the query, the rows on screen and the
/// loading/error flags.
///
/// Any change to the keyword or a filter sends the table back to page 1.
/// While a fetch is running the previous rows stay visible.
pub struct ListPage<R: Resource> {
    query: ListQuery,
    rows: Vec<R::Record>,
    total: u64,
    sort_scope: SortScope,
    loading: bool,
    error: Option<AppError>,
    _resource: PhantomData<R>,
}

impl<R: Resource> ListPage<R> {
    pub fn new(page_size: u32) -> Self {
        let query = R::default_filters()
            .iter()
            .fold(ListQuery::new(page_size), |q, (k, v)| q.with_filter(*k, *v));
        Self::with_query(query)
    }

    pub fn with_query(query: ListQuery) -> Self {
        Self {
            query,
            rows: Vec::new(),
            total: 0,
            sort_scope: SortScope::Server,
            loading: false,
            error: None,
            _resource: PhantomData,
        }
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    pub fn rows(&self) -> &[R::Record] {
        &self.rows
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn sort_scope(&self) -> SortScope {
        self.sort_scope
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&AppError> {
        self.error.as_ref()
    }

    pub fn pagination(&self) -> Pagination {
        Pagination {
            current: self.query.page,
            page_size: self.query.limit,
            total: self.total,
        }
    }

    pub fn set_keyword(&mut self, keyword: &str) {
        self.query = self.query.clone().with_keyword(keyword).with_page(1);
    }

    pub fn set_filter(&mut self, key: &str, value: &str) {
        if value.trim().is_empty() {
            self.query.filters.remove(key);
        } else {
            self.query.filters.insert(key.to_string(), value.to_string());
        }
        self.query.page = 1;
    }

    pub fn clear_filter(&mut self, key: &str) {
        self.query.filters.remove(key);
        self.query.page = 1;
    }

    pub fn set_page(&mut self, page: u32) {
        self.query.page = page.max(1);
    }

    pub fn set_page_size(&mut self, page_size: u32) {
        self.query.limit = ListQuery::new(page_size).limit;
        self.query.page = 1;
    }

    /// Column header click: unsorted, then ascending, then descending, then
    /// unsorted again. A different column starts at ascending.
    pub fn toggle_sort(&mut self, field: &str) {
        self.query.sort = match self.query.sort.take() {
            Some(current) if current.field == field => match current.order {
                SortOrder::Asc => Some(SortSpec::desc(field)),
                SortOrder::Desc => None,
            },
            _ => Some(SortSpec::asc(field)),
        };
    }

    /// Marks the page as loading and returns the query to fetch.
    pub fn begin_fetch(&mut self) -> ListQuery {
        self.loading = true;
        self.query.clone()
    }

    /// Applies a fetch result. Results for a query that is no longer
    /// current are dropped; failures keep the rows already shown.
    pub fn complete(&mut self, query: &ListQuery, result: Result<Arc<Page<R::Record>>, AppError>) {
        if *query != self.query {
            log::debug!("Dropping stale {} page", R::NAME);
            return;
        }
        self.loading = false;
        match result {
            Ok(page) => {
                self.rows = page
                    .items
                    .iter()
                    .take(self.query.limit as usize)
                    .cloned()
                    .collect();
                self.total = page.total;
                self.sort_scope = page.sort_scope;
                self.error = None;
            }
            Err(err) => self.error = Some(err),
        }
    }

    pub async fn refresh(&mut self, ctx: &AdminContext) -> Result<(), AppError> {
        let query = self.begin_fetch();
        let result = ctx.service::<R>().list(&query).await;
        let outcome = result.as_ref().map(|_| ()).map_err(Clone::clone);
        if let Err(err) = &outcome {
            ctx.notify(Notification::error(format!(
                "Could not load {}: {}",
                R::NAME,
                err
            )));
        }
        self.complete(&query, result);
        outcome
    }
}
