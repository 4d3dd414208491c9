//! tfla core — entity model, source classification, graph assembly and cycle reporting

pub mod assembler;
pub mod cycles;
pub mod entity;
pub mod export;
pub mod graph;
pub mod hierarchy;
pub mod model;
pub mod refs;
pub mod source;


#[cfg(test)]
pub mod test_utils;

pub use assembler::{BuildOptions, build_graph};
pub use cycles::find_cycles;
pub use entity::{ModuleInfo, ModuleKind, NameIndex, ParsedTerraform, ResourceInfo};
pub use export::{GraphDocument, GraphStats};
pub use graph::Graph;
pub use hierarchy::Hierarchy;
pub use model::{EdgeKind, EdgeStyle, GraphEdge, GraphNode, ModuleType, NodeData, NodeId, NodeKind};
pub use source::{GitSource, RegistrySource, SourceClass, classify, classify_opt};
