//! HTTP handlers.
//!
//! One module per resource. Handlers stay thin: decode the request, call a
//! repository or the invoice service, map errors through [`ApiError`].
//!
//! [`ApiError`]: crate::error::ApiError

pub mod auth_service;
pub mod customer_service;
pub mod health_service;
pub mod invoice_service;
pub mod transaction_service;
