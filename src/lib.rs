pub mod config;
pub mod fetch;
pub mod pipeline;
pub mod spell;
pub mod table;

pub use config::Config;
pub use pipeline::{enrich, run, Summary};
pub use spell::{Resolution, Resolver, NOT_FOUND};
pub use table::Table;
