pub mod categories;
pub mod metrics;
pub mod projects;
pub mod seed;
pub mod stats;
pub mod tasks;
