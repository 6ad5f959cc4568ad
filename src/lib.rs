pub mod cleaning;
pub mod cli;
pub mod ctx;
pub mod error;
pub mod inference;
pub mod io;
pub mod math;
pub mod pipeline;
pub mod records;
pub mod schema;
pub mod service;
pub mod store;
