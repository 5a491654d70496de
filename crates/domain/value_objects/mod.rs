pub mod enums;
pub mod iam;
pub mod persistence;
pub mod plans;
pub mod posts;
pub mod storage;
pub mod subscriptions;
