pub mod catalog;
pub mod error;
pub mod factory;
pub mod id;
pub mod lint;
pub mod model;
pub mod scene;
pub mod serialize;
pub mod starter;
pub mod template;

pub use catalog::{DataFieldDescriptor, data_fields_for, is_known_field};
pub use error::TemplateError;
pub use id::ObjectId;
pub use lint::{LintDiagnostic, LintSeverity, lint_template};
pub use model::*;
pub use scene::SceneGraph;
pub use serialize::{LoadReport, SkippedObject, collect_tokens, deserialize_scene, serialize_scene};
pub use starter::{starter_scene, starter_template};
pub use template::Template;

// Re-export kurbo so downstream crates share one geometry vocabulary.
pub use kurbo;
