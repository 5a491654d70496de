pub mod passwords;
pub mod plans;
pub mod posts;
pub mod storage;
pub mod subscriptions;
pub mod users;
