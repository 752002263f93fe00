use std::marker::PhantomData;

use crate::domain::access::CrudAction;
use crate::domain::resource::Resource;
use crate::errors::AppError;

use super::context::AdminContext;
use super::list_page::ListPage;
use super::notifications::Notification;

/// Two-step delete: `request` opens the confirmation, `confirm` sends it.
///
/// Rows are only removed by refetching the list after the backend has
/// accepted the delete.
pub struct DeleteConfirmation<R: Resource> {
    pending: Option<String>,
    _resource: PhantomData<R>,
}

impl<R: Resource> Default for DeleteConfirmation<R> {
    fn default() -> Self {
        Self {
            pending: None,
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> DeleteConfirmation<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self, id: impl Into<String>) {
        self.pending = Some(id.into());
    }

    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Returns `Ok(false)` when nothing was awaiting confirmation.
    pub async fn confirm(
        &mut self,
        ctx: &AdminContext,
        list: &mut ListPage<R>,
    ) -> Result<bool, AppError> {
        let Some(id) = self.pending.take() else {
            return Ok(false);
        };
        if let Err(err) = ctx.authorize::<R>(CrudAction::Delete) {
            ctx.notify(Notification::error(err.to_string()));
            return Err(err);
        }

        if let Err(err) = ctx.service::<R>().delete(&id).await {
            ctx.notify(Notification::error(err.to_string()));
            return Err(err);
        }
        ctx.notify(Notification::success(format!("{} deleted", R::LABEL)));
        if let Err(err) = list.refresh(ctx).await {
            log::warn!("Refetch after deleting {} {} failed: {}", R::NAME, id, err);
        }
        Ok(true)
    }
}
