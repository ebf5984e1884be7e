pub mod core_pool;
pub mod position;
pub mod swap;
pub mod tick;
