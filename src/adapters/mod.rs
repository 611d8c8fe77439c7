// Adapters layer: concrete implementations of the domain ports.

pub mod settings;

pub use settings::{HttpSettingsProvider, StaticSettingsProvider};
