//! Schema validation errors.

use thiserror::Error;

use crate::ObjectType;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors that can occur when building or validating a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Two layouts were registered for the same object type.
    #[error("duplicate layout for {object_type}")]
    DuplicateType { object_type: ObjectType },

    /// A layout names a base type that has no layout of its own.
    #[error("{object_type} extends {base}, which has no layout")]
    MissingBase {
        object_type: ObjectType,
        base: ObjectType,
    },

    /// Following base links from this type never terminates.
    #[error("base chain of {object_type} is cyclic")]
    BaseCycle { object_type: ObjectType },

    /// A field occupies zero blocks.
    #[error("field {name} of {object_type} is empty")]
    EmptyField { object_type: ObjectType, name: String },

    /// Two fields visible from the same type cover a common block.
    #[error("fields {first} and {second} overlap at block {index} of {object_type}")]
    OverlappingFields {
        object_type: ObjectType,
        index: u16,
        first: String,
        second: String,
    },

    /// Two dynamic fields share an index.
    #[error("duplicate dynamic field {index} in {object_type}")]
    DuplicateDynamicField { object_type: ObjectType, index: u16 },
}
