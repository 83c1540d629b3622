pub mod metrics;
pub mod observability;
pub mod persistence;
pub mod scanning;
pub mod storage;
