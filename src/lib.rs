pub mod app;
pub mod cli;
pub mod client;
pub mod config;
pub mod output;
pub mod pagination;
pub mod profiler;
pub mod query;
pub mod telemetry;
pub mod view;

#[cfg(test)]
mod tests;
