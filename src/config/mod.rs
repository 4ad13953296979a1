pub mod settings;

pub use settings::{AppConfig, AuthConfig, CacheConfig, ConfigError, SourceConfig};
