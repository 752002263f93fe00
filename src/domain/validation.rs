use std::fmt;
use std::ops::RangeInclusive;

/// A single inline error attached to a form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Field errors collected while checking a draft, at most one per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn for_field(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

/// Accumulates field errors for a draft.
///
/// Length and range checks skip blank or absent values; pair them with
/// `required` / `present` when the field is mandatory.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, field: &'static str, message: String) {
        if self.errors.iter().all(|e| e.field != field) {
            self.errors.push(FieldError { field, message });
        }
    }

    pub fn required(&mut self, field: &'static str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.push(field, format!("{} is required", humanize(field)));
        }
        self
    }

    pub fn present<T>(&mut self, field: &'static str, value: &Option<T>) -> &mut Self {
        if value.is_none() {
            self.push(field, format!("{} is required", humanize(field)));
        }
        self
    }

    pub fn length(
        &mut self,
        field: &'static str,
        value: &str,
        range: RangeInclusive<usize>,
    ) -> &mut Self {
        let len = value.trim().chars().count();
        if len == 0 {
            return self;
        }
        if len < *range.start() {
            self.push(
                field,
                format!("{} must be at least {} characters", humanize(field), range.start()),
            );
        } else if len > *range.end() {
            self.push(
                field,
                format!("{} cannot exceed {} characters", humanize(field), range.end()),
            );
        }
        self
    }

    pub fn max_length(&mut self, field: &'static str, value: &str, max: usize) -> &mut Self {
        if value.chars().count() > max {
            self.push(
                field,
                format!("{} cannot exceed {} characters", humanize(field), max),
            );
        }
        self
    }

    pub fn range<T>(
        &mut self,
        field: &'static str,
        value: Option<T>,
        range: RangeInclusive<T>,
    ) -> &mut Self
    where
        T: PartialOrd + fmt::Display + Copy,
    {
        if let Some(v) = value {
            if !range.contains(&v) {
                self.push(
                    field,
                    format!(
                        "{} must be between {} and {}",
                        humanize(field),
                        range.start(),
                        range.end()
                    ),
                );
            }
        }
        self
    }

    pub fn check(
        &mut self,
        field: &'static str,
        ok: bool,
        message: impl Into<String>,
    ) -> &mut Self {
        if !ok {
            self.push(field, message.into());
        }
        self
    }

    pub fn finish(&mut self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(std::mem::take(&mut self.errors)))
        }
    }
}

fn humanize(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
