use crate::domain::access::CrudAction;
use crate::domain::resource::{FormMode, Resource};
use crate::domain::validation::ValidationErrors;
use crate::errors::AppError;

use super::context::AdminContext;
use super::notifications::Notification;

/// Create/edit modal for one resource.
pub struct FormModal<R: Resource> {
    open: bool,
    mode: FormMode,
    editing_id: Option<String>,
    draft: R::Draft,
    errors: ValidationErrors,
}

impl<R: Resource> Default for FormModal<R> {
    fn default() -> Self {
        Self {
            open: false,
            mode: FormMode::Create,
            editing_id: None,
            draft: R::Draft::default(),
            errors: ValidationErrors::default(),
        }
    }
}

impl<R: Resource> FormModal<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_create(&mut self) {
        *self = Self {
            open: true,
            ..Self::default()
        };
    }

    pub fn open_edit(&mut self, record: &R::Record) {
        *self = Self {
            open: true,
            mode: FormMode::Edit,
            editing_id: Some(R::record_id(record).to_string()),
            draft: R::draft_from(record),
            errors: ValidationErrors::default(),
        };
    }

    pub fn cancel(&mut self) {
        *self = Self::default();
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn editing_id(&self) -> Option<&str> {
        self.editing_id.as_deref()
    }

    pub fn draft(&self) -> &R::Draft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut R::Draft {
        &mut self.draft
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Normalises and validates the draft, then creates or updates.
    ///
    /// Field errors stay on the form and nothing is sent. A failed request
    /// raises an error notification and leaves the modal open with the
    /// draft intact; success closes and resets it.
    pub async fn submit(&mut self, ctx: &AdminContext) -> Result<(), AppError> {
        let action = match self.mode {
            FormMode::Create => CrudAction::Create,
            FormMode::Edit => CrudAction::Edit,
        };
        if let Err(err) = ctx.authorize::<R>(action) {
            ctx.notify(Notification::error(err.to_string()));
            return Err(err);
        }

        self.draft = R::normalize(self.draft.clone());
        if let Err(errors) = R::validate(&self.draft, self.mode) {
            self.errors = errors.clone();
            return Err(AppError::Validation(errors));
        }
        self.errors = ValidationErrors::default();

        let service = ctx.service::<R>();
        let result = match (self.mode, self.editing_id.as_deref()) {
            (FormMode::Create, _) => service.create(&self.draft).await,
            (FormMode::Edit, Some(id)) => service.update(id, &self.draft).await,
            (FormMode::Edit, None) => Err(AppError::Decode(format!(
                "{} has no id to update",
                R::LABEL
            ))),
        };

        match result {
            Ok(_) => {
                let verb = match self.mode {
                    FormMode::Create => "created",
                    FormMode::Edit => "updated",
                };
                ctx.notify(Notification::success(format!("{} {}", R::LABEL, verb)));
                *self = Self::default();
                Ok(())
            }
            Err(err) => {
                if let Some(errors) = err.field_errors() {
                    self.errors = errors.clone();
                } else {
                    ctx.notify(Notification::error(err.to_string()));
                }
                Err(err)
            }
        }
    }
}
