pub mod auth;
pub mod dispatch;
pub mod handlers;
pub mod router;
