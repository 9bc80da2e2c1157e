pub mod baseline;
pub mod change_pool;
pub mod error;
pub mod update_writer;
