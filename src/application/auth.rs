use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::lenient;
use crate::domain::ports::{Method, RequestBody, Transport};
use crate::domain::session::Session;
use crate::domain::user::UserRole;
use crate::domain::validation::{ValidationErrors, Validator};
use crate::errors::AppError;
use crate::infrastructure::envelope::unwrap_record;

pub const LOGIN_PATH: &str = "/v1/auth/login";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .required("email", &self.email)
            .check(
                "email",
                self.email.trim().is_empty() || self.email.contains('@'),
                "Please enter a valid email",
            )
            .required("password", &self.password)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(alias = "accessToken", alias = "token")]
    access_token: String,
    #[serde(default)]
    user: Option<LoginUser>,
}

#[derive(Debug, Default, Deserialize)]
struct LoginUser {
    #[serde(default, rename = "_id", alias = "id")]
    id: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    /// Kept as strings; roles this client does not know are ignored.
    #[serde(default, alias = "role", deserialize_with = "lenient::one_or_many")]
    roles: Vec<String>,
    #[serde(default, deserialize_with = "lenient::one_or_many")]
    permissions: Vec<String>,
}

/// Exchanges credentials for a [`Session`].
///
/// An incomplete form fails locally without a request.
pub async fn login(transport: &dyn Transport, form: &LoginForm) -> Result<Session, AppError> {
    form.validate()?;
    let email = form.email.trim().to_lowercase();
    let body = json!({ "email": email, "password": form.password });
    let response = transport
        .send(Method::Post, LOGIN_PATH, RequestBody::Json(body))
        .await?;
    let response: LoginResponse = serde_json::from_value(unwrap_record(response))?;
    let user = response.user.unwrap_or_default();

    let display_name = format!("{} {}", user.first_name, user.last_name)
        .trim()
        .to_string();
    let session = Session {
        token: response.access_token,
        user_id: user.id,
        email: if user.email.is_empty() { email } else { user.email },
        display_name,
        roles: user.roles.iter().filter_map(|r| UserRole::parse(r)).collect(),
        permissions: user.permissions,
    };
    log::info!("Signed in as {}", session.email);
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeTransport;

    #[tokio::test]
    async fn empty_password_issues_no_request() {
        let fake = FakeTransport::replying(|_, _| Ok(serde_json::Value::Null));
        let err = login(fake.as_ref(), &LoginForm::new("admin@gmail.com", ""))
            .await
            .unwrap_err();
        assert_eq!(
            err.field_errors().and_then(|e| e.for_field("password")),
            Some("Password is required")
        );
        assert_eq!(fake.request_count(), 0);
    }

    #[tokio::test]
    async fn decodes_token_and_roles() {
        let fake = FakeTransport::replying(|_, _| {
            Ok(json!({
                "accessToken": "tok-1",
                "user": {
                    "_id": "u1", "email": "admin@gmail.com",
                    "first_name": "Ada", "last_name": "Admin",
                    "roles": ["admin", "auditor"],
                    "permissions": ["brand.view"]
                }
            }))
        });
        let session = login(fake.as_ref(), &LoginForm::new(" Admin@Gmail.com ", "secret"))
            .await
            .unwrap();
        assert_eq!(session.token, "tok-1");
        assert_eq!(session.display_name, "Ada Admin");
        assert_eq!(session.roles, vec![UserRole::Admin]);
        assert!(session.has_permission("brand.view"));

        let sent = fake.sent();
        let RequestBody::Json(body) = &sent[0].2 else {
            panic!("expected json");
        };
        assert_eq!(body["email"], json!("admin@gmail.com"));
    }

    #[tokio::test]
    async fn rejected_credentials_surface_the_backend_message() {
        let fake = FakeTransport::replying(|_, _| {
            Err(AppError::Backend {
                status: 401,
                message: "Invalid email or password".into(),
            })
        });
        let err = login(fake.as_ref(), &LoginForm::new("a@b.c", "nope"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid email or password");
    }
}
