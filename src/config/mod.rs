//! Configuration module

mod settings;

pub use settings::{
    AuthSettings, DatabaseSettings, LoggingSettings, ProviderSettings, RateLimitSettings,
    ServerSettings, Settings, StorageSettings,
};
