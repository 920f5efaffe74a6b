//! Schema tables and validation.

use std::collections::HashSet;

use crate::error::{SchemaError, SchemaResult};
use crate::{DynamicFieldDef, FieldDef, ObjectType, ValueShape};

/// Lookup of update fields by object type and block index.
///
/// The decoder only ever talks to this trait, so a table built in code and
/// one loaded from JSON are interchangeable.
pub trait FieldSchema: Send + Sync {
    /// The field covering block `index` for objects of `object_type`.
    fn field(&self, object_type: ObjectType, index: u16) -> Option<&FieldDef>;

    /// The dynamic field registered at `index` for objects of `object_type`.
    fn dynamic_field(&self, object_type: ObjectType, index: u16) -> Option<&DynamicFieldDef>;
}

/// Fields introduced by one object type on top of its base.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeLayout {
    pub object_type: ObjectType,
    #[cfg_attr(feature = "serde", serde(default))]
    pub base: Option<ObjectType>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub fields: Vec<FieldDef>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub dynamic: Vec<DynamicFieldDef>,
}

impl TypeLayout {
    /// Creates a layout with no base and no fields.
    #[must_use]
    pub const fn new(object_type: ObjectType) -> Self {
        Self {
            object_type,
            base: None,
            fields: Vec::new(),
            dynamic: Vec::new(),
        }
    }

    /// Inherits every field of `base`.
    #[must_use]
    pub const fn extends(mut self, base: ObjectType) -> Self {
        self.base = Some(base);
        self
    }

    /// Adds a value field.
    #[must_use]
    pub fn field(mut self, index: u16, name: &str, shape: ValueShape) -> Self {
        self.fields.push(FieldDef::new(index, name, shape));
        self
    }

    /// Adds a dynamic field.
    #[must_use]
    pub fn dynamic(mut self, index: u16, name: &str) -> Self {
        self.dynamic.push(DynamicFieldDef::new(index, name));
        self
    }
}

/// A versioned set of type layouts.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemaTable {
    /// Free-form label, usually the client build the table describes.
    pub name: String,
    pub layouts: Vec<TypeLayout>,
}

impl SchemaTable {
    /// Creates a table after validation.
    pub fn new(name: impl Into<String>, layouts: Vec<TypeLayout>) -> SchemaResult<Self> {
        let table = Self {
            name: name.into(),
            layouts,
        };
        table.validate()?;
        Ok(table)
    }

    /// Creates a table builder.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            layouts: Vec::new(),
        }
    }

    /// The layout registered for `object_type` itself, without its bases.
    #[must_use]
    pub fn layout(&self, object_type: ObjectType) -> Option<&TypeLayout> {
        self.layouts.iter().find(|l| l.object_type == object_type)
    }

    /// Layouts visible from `object_type`, most derived first.
    pub fn chain(&self, object_type: ObjectType) -> BaseChain<'_> {
        BaseChain {
            table: self,
            next: Some(object_type),
            steps: 0,
        }
    }

    /// Validates table invariants.
    pub fn validate(&self) -> SchemaResult<()> {
        let mut types = HashSet::new();
        for layout in &self.layouts {
            if !types.insert(layout.object_type) {
                return Err(SchemaError::DuplicateType {
                    object_type: layout.object_type,
                });
            }
        }

        for layout in &self.layouts {
            if let Some(base) = layout.base {
                if !types.contains(&base) {
                    return Err(SchemaError::MissingBase {
                        object_type: layout.object_type,
                        base,
                    });
                }
            }
        }

        for layout in &self.layouts {
            if self.chain_is_cyclic(layout.object_type) {
                return Err(SchemaError::BaseCycle {
                    object_type: layout.object_type,
                });
            }
            if let Some(field) = layout.fields.iter().find(|f| f.shape.blocks() == 0) {
                return Err(SchemaError::EmptyField {
                    object_type: layout.object_type,
                    name: field.name.clone(),
                });
            }
            self.validate_visible_fields(layout.object_type)?;
        }
        Ok(())
    }

    /// Only meaningful once every base is known to exist: a chain that uses
    /// up the step budget and still points at a base must revisit a layout.
    fn chain_is_cyclic(&self, object_type: ObjectType) -> bool {
        let mut visited = 0;
        let mut last = None;
        for layout in self.chain(object_type) {
            visited += 1;
            last = Some(layout);
        }
        visited == self.layouts.len() && last.is_some_and(|l| l.base.is_some())
    }

    fn validate_visible_fields(&self, object_type: ObjectType) -> SchemaResult<()> {
        let mut fields: Vec<&FieldDef> = self
            .chain(object_type)
            .flat_map(|l| l.fields.iter())
            .collect();
        fields.sort_by_key(|f| f.index);
        for pair in fields.windows(2) {
            if u32::from(pair[1].index) < pair[0].end() {
                return Err(SchemaError::OverlappingFields {
                    object_type,
                    index: pair[1].index,
                    first: pair[0].name.clone(),
                    second: pair[1].name.clone(),
                });
            }
        }

        let mut dynamic = HashSet::new();
        for field in self.chain(object_type).flat_map(|l| l.dynamic.iter()) {
            if !dynamic.insert(field.index) {
                return Err(SchemaError::DuplicateDynamicField {
                    object_type,
                    index: field.index,
                });
            }
        }
        Ok(())
    }
}

impl FieldSchema for SchemaTable {
    fn field(&self, object_type: ObjectType, index: u16) -> Option<&FieldDef> {
        self.chain(object_type)
            .find_map(|l| l.fields.iter().find(|f| f.covers(index)))
    }

    fn dynamic_field(&self, object_type: ObjectType, index: u16) -> Option<&DynamicFieldDef> {
        self.chain(object_type)
            .find_map(|l| l.dynamic.iter().find(|f| f.index == index))
    }
}

/// Iterator over a type's layout and its bases.
///
/// Stops after visiting as many layouts as the table holds, so an
/// unvalidated cyclic table cannot loop forever.
#[derive(Debug, Clone)]
pub struct BaseChain<'a> {
    table: &'a SchemaTable,
    next: Option<ObjectType>,
    steps: usize,
}

impl<'a> Iterator for BaseChain<'a> {
    type Item = &'a TypeLayout;

    fn next(&mut self) -> Option<Self::Item> {
        if self.steps >= self.table.layouts.len() {
            return None;
        }
        let layout = self.table.layout(self.next?)?;
        self.steps += 1;
        self.next = layout.base;
        Some(layout)
    }
}

/// Builder for `SchemaTable`.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    name: String,
    layouts: Vec<TypeLayout>,
}

impl SchemaBuilder {
    /// Adds a type layout.
    #[must_use]
    pub fn layout(mut self, layout: TypeLayout) -> Self {
        self.layouts.push(layout);
        self
    }

    /// Builds the table after validation.
    pub fn build(self) -> SchemaResult<SchemaTable> {
        SchemaTable::new(self.name, self.layouts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object_layout() -> TypeLayout {
        TypeLayout::new(ObjectType::Object)
            .field(0, "OBJECT_FIELD_GUID", ValueShape::Guid)
            .field(4, "OBJECT_FIELD_ENTRY_ID", ValueShape::UInt32)
            .field(5, "OBJECT_FIELD_SCALE_X", ValueShape::Float)
    }

    #[test]
    fn builder_roundtrip() {
        let table = SchemaTable::builder("test")
            .layout(object_layout())
            .layout(
                TypeLayout::new(ObjectType::Unit)
                    .extends(ObjectType::Object)
                    .field(6, "UNIT_FIELD_HEALTH", ValueShape::UInt32),
            )
            .build()
            .unwrap();
        assert_eq!(table.layouts.len(), 2);
        assert_eq!(table.chain(ObjectType::Unit).count(), 2);
    }

    #[test]
    fn lookup_walks_base_chain() {
        let table = SchemaTable::builder("test")
            .layout(object_layout().dynamic(0, "OBJECT_DYNAMIC_FIELD_TEST"))
            .layout(
                TypeLayout::new(ObjectType::Unit)
                    .extends(ObjectType::Object)
                    .field(6, "UNIT_FIELD_HEALTH", ValueShape::UInt32),
            )
            .build()
            .unwrap();

        assert_eq!(
            table.field(ObjectType::Unit, 2).map(|f| f.name.as_str()),
            Some("OBJECT_FIELD_GUID")
        );
        assert_eq!(
            table.field(ObjectType::Unit, 6).map(|f| f.name.as_str()),
            Some("UNIT_FIELD_HEALTH")
        );
        assert!(table.field(ObjectType::Object, 6).is_none());
        assert!(table.field(ObjectType::Player, 0).is_none());
        assert!(table.dynamic_field(ObjectType::Unit, 0).is_some());
        assert!(table.dynamic_field(ObjectType::Unit, 1).is_none());
    }

    #[test]
    fn rejects_duplicate_types() {
        let err = SchemaTable::new("test", vec![object_layout(), object_layout()]).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateType { .. }));
    }

    #[test]
    fn rejects_missing_base() {
        let unit = TypeLayout::new(ObjectType::Unit).extends(ObjectType::Object);
        let err = SchemaTable::new("test", vec![unit]).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingBase {
                object_type: ObjectType::Unit,
                base: ObjectType::Object
            }
        );
    }

    #[test]
    fn rejects_base_cycle() {
        let unit = TypeLayout::new(ObjectType::Unit).extends(ObjectType::Player);
        let player = TypeLayout::new(ObjectType::Player).extends(ObjectType::Unit);
        let err = SchemaTable::new("test", vec![unit, player]).unwrap_err();
        assert!(matches!(err, SchemaError::BaseCycle { .. }));
    }

    #[test]
    fn rejects_overlap_across_bases() {
        let unit = TypeLayout::new(ObjectType::Unit)
            .extends(ObjectType::Object)
            .field(5, "UNIT_FIELD_CHARM", ValueShape::Guid);
        let err = SchemaTable::new("test", vec![object_layout(), unit]).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::OverlappingFields { index: 5, .. }
        ));
    }

    #[test]
    fn rejects_empty_field() {
        let object =
            object_layout().field(6, "OBJECT_FIELD_NOTHING", ValueShape::UInts { count: 0 });
        let err = SchemaTable::new("test", vec![object]).unwrap_err();
        assert!(matches!(err, SchemaError::EmptyField { .. }));
    }

    #[test]
    fn rejects_duplicate_dynamic_field() {
        let object = object_layout().dynamic(1, "A").dynamic(1, "B");
        let err = SchemaTable::new("test", vec![object]).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::DuplicateDynamicField { index: 1, .. }
        ));
    }

    #[test]
    fn chain_on_unvalidated_cycle_terminates() {
        let table = SchemaTable {
            name: "broken".into(),
            layouts: vec![
                TypeLayout::new(ObjectType::Unit).extends(ObjectType::Player),
                TypeLayout::new(ObjectType::Player).extends(ObjectType::Unit),
            ],
        };
        assert_eq!(table.chain(ObjectType::Unit).count(), 2);
        assert!(table.field(ObjectType::Unit, 0).is_none());
    }
}
