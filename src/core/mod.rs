pub mod aggregate;
pub mod api;
pub mod config;
pub mod formatter;
pub mod models;
pub mod quota;
pub mod report;
pub mod style;
pub mod width;
pub mod window;
