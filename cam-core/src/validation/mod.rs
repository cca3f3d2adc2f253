pub mod validate;

pub use validate::{design_rules_check, validate_registry, validate_tool, ValidationResult};
