pub mod app;
pub mod clock;
pub mod config;
pub mod error;
pub mod model;
pub mod schedule;
pub mod storage;
pub mod task_store;
pub mod validation;
pub mod view;
