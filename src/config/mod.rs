pub mod explorer;

pub use explorer::ExplorerConfig;
