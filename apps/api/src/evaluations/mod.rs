// Evaluation history (Postgres) and downloadable reports.

pub mod handlers;
pub mod report;
pub mod store;
