pub mod bid;
pub mod context;
pub mod media_type;
pub mod slot;
