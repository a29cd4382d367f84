mod code_generator;
mod file_service;
mod registry;

pub use code_generator::CodeGenerator;
pub use file_service::{FileDownload, FilePreview, FileService};
pub use registry::{Registry, RegistryStats};
