pub mod pipe;
pub mod settings_file;
pub mod store;

pub use pipe::PipeGateway;
pub use settings_file::SettingsFileSync;
pub use store::MemorySettingsStore;
