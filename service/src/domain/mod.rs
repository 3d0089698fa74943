pub mod dimension;
pub mod envelope;
pub mod error;
pub mod page;
pub mod query;
pub mod server_timing;
pub mod student;
