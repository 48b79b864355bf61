//! Configuration: raw TOML structure and multi-source loader.

mod file_config;
mod loader;

pub use file_config::{
    FileConfig, FileDiscussionConfig, FileExtractionConfig, FileOpenAiConfig, FileReportsConfig,
    FileSlackConfig,
};
pub use loader::ConfigLoader;
