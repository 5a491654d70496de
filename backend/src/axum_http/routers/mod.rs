pub mod auth;
pub mod plans;
pub mod posts;
pub mod subscriptions;
