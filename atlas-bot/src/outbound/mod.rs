pub mod metrics;
pub mod painters;
pub mod repositories;
