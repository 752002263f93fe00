use std::sync::Arc;

use crate::domain::access::{CrudAction, Gate};
use crate::domain::ports::Transport;
use crate::domain::resource::Resource;
use crate::domain::session::Session;
use crate::errors::AppError;

use super::auth::{self, LoginForm};
use super::crud_service::CrudService;
use super::notifications::{Notification, Notifier};
use super::query_cache::QueryCache;

/// Everything a page controller needs: the transport, the shared query
/// cache, the notifier and the signed-in session, if any.
pub struct AdminContext {
    base: Arc<dyn Transport>,
    transport: Arc<dyn Transport>,
    cache: Arc<QueryCache>,
    notifier: Arc<dyn Notifier>,
    session: Option<Session>,
}

impl AdminContext {
    pub fn new(transport: Arc<dyn Transport>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            base: transport.clone(),
            transport,
            cache: Arc::new(QueryCache::new()),
            notifier,
            session: None,
        }
    }

    /// A context that is already signed in.
    pub fn with_session(
        transport: Arc<dyn Transport>,
        notifier: Arc<dyn Notifier>,
        session: Session,
    ) -> Self {
        let mut ctx = Self::new(transport, notifier);
        ctx.transport = ctx.base.authorized(&session);
        ctx.session = Some(session);
        ctx
    }

    pub async fn sign_in(&mut self, form: &LoginForm) -> Result<&Session, AppError> {
        match auth::login(self.base.as_ref(), form).await {
            Ok(session) => {
                self.transport = self.base.authorized(&session);
                self.cache.clear();
                self.notify(Notification::success(format!(
                    "Welcome back, {}",
                    if session.display_name.is_empty() {
                        &session.email
                    } else {
                        &session.display_name
                    }
                )));
                Ok(self.session.insert(session))
            }
            Err(err) => {
                if err.field_errors().is_none() {
                    self.notify(Notification::error(err.to_string()));
                }
                Err(err)
            }
        }
    }

    pub fn sign_out(&mut self) {
        self.session = None;
        self.transport = self.base.clone();
        self.cache.clear();
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn notify(&self, notification: Notification) {
        self.notifier.notify(notification);
    }

    pub fn service<R: Resource>(&self) -> CrudService<R> {
        CrudService::new(self.transport.clone(), self.cache.clone())
    }

    pub fn allows(&self, gate: &Gate) -> bool {
        self.session.as_ref().is_some_and(|s| gate.allows(s))
    }

    /// Refuses `action` on `R` up front when the session's gates do not
    /// allow it.
    pub fn authorize<R: Resource>(&self, action: CrudAction) -> Result<(), AppError> {
        if self.allows(R::GATES.for_action(action)) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "{} {}",
                action.as_str(),
                R::LABEL.to_lowercase()
            )))
        }
    }
}
