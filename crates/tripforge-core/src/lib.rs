pub mod adapter;
pub mod error;
pub mod model;
pub mod protocol;
