pub mod hierarchy;
pub mod lifecycle;
pub mod query;
pub mod store;
