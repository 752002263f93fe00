pub mod auth;
pub mod context;
pub mod crud_service;
pub mod dashboard;
pub mod delete_confirm;
pub mod form_modal;
pub mod list_page;
pub mod notifications;
pub mod order_workflow;
pub mod query_cache;
