//! Webserver service implementations

pub mod file_manager;
pub mod pipeline_analyzer;

#[cfg(test)]
mod tests;

pub use file_manager::RealFileManager;
pub use pipeline_analyzer::PipelineAnalyzer;
