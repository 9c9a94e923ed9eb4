//! Request handlers.
//!
//! Handlers stay thin: they extract the request, call into `snapbox_core`,
//! and map errors via [`AppError`](crate::error::AppError).

pub mod media;
