pub mod quota;
pub mod usage;
