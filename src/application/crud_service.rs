use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;

use crate::domain::listing::{paginate_locally, sort_for, ListQuery, Page, SortScope};
use crate::domain::ports::{Method, Transport};
use crate::domain::resource::{FormMode, Resource};
use crate::errors::AppError;
use crate::infrastructure::envelope::{normalize_list, unwrap_record, ListShape};

use super::query_cache::{QueryCache, QueryKey};

/// Reads and writes one backend collection.
///
/// Writes normalise and validate the draft first, so an invalid draft never
/// reaches the transport. Every successful write invalidates the
/// resource's cached queries.
pub struct CrudService<R: Resource> {
    transport: Arc<dyn Transport>,
    cache: Arc<QueryCache>,
    _resource: PhantomData<R>,
}

impl<R: Resource> CrudService<R> {
    pub fn new(transport: Arc<dyn Transport>, cache: Arc<QueryCache>) -> Self {
        Self {
            transport,
            cache,
            _resource: PhantomData,
        }
    }

    fn item_path(id: &str) -> String {
        format!("{}/{}", R::PATH, id)
    }

    fn ensure_writable(action: &str) -> Result<(), AppError> {
        if R::READ_ONLY {
            return Err(AppError::Forbidden(format!(
                "{} {}",
                action,
                R::LABEL.to_lowercase()
            )));
        }
        Ok(())
    }

    /// One page through the query cache.
    pub async fn list(&self, query: &ListQuery) -> Result<Arc<Page<R::Record>>, AppError> {
        let key = QueryKey::new(R::NAME, query.to_pairs(R::SORT_PARAMS));
        let transport = self.transport.clone();
        let query = query.clone();
        self.cache
            .fetch(key, move || async move {
                fetch_page::<R>(transport.as_ref(), &query).await
            })
            .await
    }

    pub async fn get(&self, id: &str) -> Result<R::Record, AppError> {
        let path = Self::item_path(id);
        let key = QueryKey::new(R::NAME, vec![("id".to_string(), id.to_string())]);
        let transport = self.transport.clone();
        let record = self
            .cache
            .fetch(key, move || async move {
                let body = transport.get(&path, &[]).await?;
                Ok(serde_json::from_value::<R::Record>(unwrap_record(body))?)
            })
            .await?;
        Ok(record.as_ref().clone())
    }

    pub async fn create(&self, draft: &R::Draft) -> Result<Value, AppError> {
        Self::ensure_writable("create")?;
        let draft = R::normalize(draft.clone());
        R::validate(&draft, FormMode::Create)?;
        let body = R::create_body(&draft)?;
        let created = self.transport.send(Method::Post, R::PATH, body).await?;
        self.cache.invalidate(R::NAME);
        log::info!("Created {}", R::LABEL.to_lowercase());
        Ok(unwrap_record(created))
    }

    pub async fn update(&self, id: &str, draft: &R::Draft) -> Result<Value, AppError> {
        Self::ensure_writable("edit")?;
        let draft = R::normalize(draft.clone());
        R::validate(&draft, FormMode::Edit)?;
        let body = R::update_body(&draft)?;
        let updated = self
            .transport
            .send(Method::Put, &Self::item_path(id), body)
            .await?;
        self.cache.invalidate(R::NAME);
        log::info!("Updated {} {}", R::LABEL.to_lowercase(), id);
        Ok(unwrap_record(updated))
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        Self::ensure_writable("delete")?;
        self.transport.delete(&Self::item_path(id)).await?;
        self.cache.invalidate(R::NAME);
        log::info!("Deleted {} {}", R::LABEL.to_lowercase(), id);
        Ok(())
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub(crate) fn cache(&self) -> &QueryCache {
        &self.cache
    }
}

/// Fetches one page, bypassing the cache.
///
/// An envelope is a server-paged result and is only truncated to the page
/// size; a sort the backend cannot apply is applied to the returned rows
/// and reported as [`SortScope::CurrentPage`]. A bare array is the whole
/// collection and is filtered, sorted and sliced locally.
pub async fn fetch_page<R: Resource>(
    transport: &dyn Transport,
    query: &ListQuery,
) -> Result<Page<R::Record>, AppError> {
    let body = transport.get(R::PATH, &query.to_pairs(R::SORT_PARAMS)).await?;
    let raw = normalize_list(body, R::COLLECTION_KEY)?;
    let mut records = raw
        .items
        .into_iter()
        .map(serde_json::from_value::<R::Record>)
        .collect::<Result<Vec<_>, _>>()?;

    if raw.shape == ListShape::Bare {
        return Ok(paginate_locally::<R>(records, query));
    }

    let sort_scope = match (&query.sort, R::SORT_PARAMS) {
        (Some(sort), None) => {
            sort_for::<R>(&mut records, sort);
            SortScope::CurrentPage
        }
        _ => SortScope::Server,
    };
    records.truncate(query.limit as usize);
    Ok(Page {
        items: records,
        page: raw.page.unwrap_or(query.page),
        limit: query.limit,
        total: raw.total,
        sort_scope,
    })
}
