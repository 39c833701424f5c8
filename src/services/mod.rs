mod aggregator;
mod annotation_driver;
mod export;
mod native_registry;
mod source_scan;
mod xml_driver;
mod yaml_driver;

pub use aggregator::{MappingSource, MetadataAggregator};
pub use annotation_driver::{AnnotationDriver, AttributeReader, TypeDecl};
pub use export::{AnnotationRenderer, Exporter, NativeRenderer, XmlRenderer, YamlRenderer};
pub use native_registry::{NativeModuleRegistry, NativeProvider};
pub use xml_driver::XmlDriver;
pub use yaml_driver::YamlDriver;
