mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    DatabaseSettings, LoggingSettings, RepositoryProviderSetting, ScannerProviderSetting,
    ScannerSettings, SchedulerSettings, ServerSettings, Settings, StorageProviderSetting,
    StorageSettings,
};
