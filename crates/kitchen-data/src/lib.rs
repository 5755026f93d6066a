//! Level files for the kitchen: catalog, configuration and layout in RON,
//! TOML or JSON, resolved into a ready [`kitchen_core::kitchen::Kitchen`].

pub mod loader;
pub mod schema;

pub use loader::{load_level, DataLoadError, Level};
