pub mod identity;
pub mod plans;
pub mod posts;
pub mod subscriptions;
pub mod validation;
