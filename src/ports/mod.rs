mod mapping_driver;
mod renderer;

pub use mapping_driver::MappingDriver;
pub use renderer::MetadataRenderer;
