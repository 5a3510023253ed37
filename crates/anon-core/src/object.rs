//! Catalog objects that can carry a security label.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Catalog class id of `pg_database`.
pub const DATABASE_RELATION_ID: u32 = 1262;
/// Catalog class id of `pg_class`.
pub const RELATION_RELATION_ID: u32 = 1259;
/// Catalog class id of `pg_authid`.
pub const AUTH_ID_RELATION_ID: u32 = 1260;
/// Catalog class id of `pg_namespace`.
pub const NAMESPACE_RELATION_ID: u32 = 2615;

/// Kind of object a label targets.
///
/// `Other` covers every catalog kind the label grammar does not know about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Database,
    Table,
    Column,
    Role,
    Schema,
    Other,
}

impl ObjectKind {
    /// Map a catalog class id onto an object kind.
    ///
    /// Columns share the relation class id; they are told apart from tables
    /// by a non-zero sub-object id on the [`ObjectRef`].
    pub fn from_class_id(class_id: u32) -> Self {
        match class_id {
            DATABASE_RELATION_ID => ObjectKind::Database,
            RELATION_RELATION_ID => ObjectKind::Table,
            AUTH_ID_RELATION_ID => ObjectKind::Role,
            NAMESPACE_RELATION_ID => ObjectKind::Schema,
            _ => ObjectKind::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Database => "database",
            ObjectKind::Table => "table",
            ObjectKind::Column => "column",
            ObjectKind::Role => "role",
            ObjectKind::Schema => "schema",
            ObjectKind::Other => "other",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectKind {
    type Err = std::convert::Infallible;

    /// Unknown names map to [`ObjectKind::Other`], like unknown class ids.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "database" => ObjectKind::Database,
            "table" => ObjectKind::Table,
            "column" => ObjectKind::Column,
            "role" => ObjectKind::Role,
            "schema" => ObjectKind::Schema,
            _ => ObjectKind::Other,
        })
    }
}

/// Address of a labelled object.
///
/// A column has two spellings: `Table` with a column number, or `Column`.
/// [`ObjectRef::new`] keeps the first one, see [`ObjectRef::canonical`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectRef {
    pub kind: ObjectKind,
    pub object_id: u32,
    /// Column number for a column of a table, `0` for the object itself.
    #[serde(default)]
    pub sub_object_id: i32,
}

impl ObjectRef {
    pub fn new(kind: ObjectKind, object_id: u32, sub_object_id: i32) -> Self {
        Self {
            kind,
            object_id,
            sub_object_id,
        }
        .canonical()
    }

    /// The address labels are stored under.
    ///
    /// A numbered `Column` becomes a `Table` with a sub-object. A `Column`
    /// without a column number is left as is: it names no column.
    pub fn canonical(self) -> Self {
        match self.kind {
            ObjectKind::Column if self.has_sub_object() => Self {
                kind: ObjectKind::Table,
                ..self
            },
            _ => self,
        }
    }

    /// Build a reference from a catalog address (class id, object id, sub id).
    pub fn from_catalog(class_id: u32, object_id: u32, sub_object_id: i32) -> Self {
        Self::new(ObjectKind::from_class_id(class_id), object_id, sub_object_id)
    }

    pub fn database(object_id: u32) -> Self {
        Self::new(ObjectKind::Database, object_id, 0)
    }

    pub fn table(object_id: u32) -> Self {
        Self::new(ObjectKind::Table, object_id, 0)
    }

    /// A column, addressed as attribute `attnum` of relation `table_id`.
    pub fn column(table_id: u32, attnum: i32) -> Self {
        Self::new(ObjectKind::Table, table_id, attnum)
    }

    pub fn role(object_id: u32) -> Self {
        Self::new(ObjectKind::Role, object_id, 0)
    }

    pub fn schema(object_id: u32) -> Self {
        Self::new(ObjectKind::Schema, object_id, 0)
    }

    pub fn has_sub_object(&self) -> bool {
        self.sub_object_id != 0
    }

    /// True for a numbered column, whichever way it was addressed.
    pub fn is_column(&self) -> bool {
        matches!(self.kind, ObjectKind::Table | ObjectKind::Column) && self.has_sub_object()
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_sub_object() {
            write!(f, "{} {}.{}", self.kind, self.object_id, self.sub_object_id)
        } else {
            write!(f, "{} {}", self.kind, self.object_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_ids_map_to_kinds() {
        assert_eq!(ObjectKind::from_class_id(1262), ObjectKind::Database);
        assert_eq!(ObjectKind::from_class_id(1259), ObjectKind::Table);
        assert_eq!(ObjectKind::from_class_id(1260), ObjectKind::Role);
        assert_eq!(ObjectKind::from_class_id(2615), ObjectKind::Schema);
        // pg_proc
        assert_eq!(ObjectKind::from_class_id(1255), ObjectKind::Other);
    }

    #[test]
    fn column_is_a_table_with_sub_object() {
        let col = ObjectRef::from_catalog(RELATION_RELATION_ID, 42, 2);
        assert_eq!(col.kind, ObjectKind::Table);
        assert!(col.is_column());
        assert!(!ObjectRef::table(42).is_column());
        assert!(!ObjectRef::new(ObjectKind::Column, 42, 0).is_column());
    }

    #[test]
    fn column_kind_is_stored_as_table_column() {
        assert_eq!(
            ObjectRef::new(ObjectKind::Column, 42, 2),
            ObjectRef::column(42, 2)
        );
        let literal = ObjectRef {
            kind: ObjectKind::Column,
            object_id: 42,
            sub_object_id: 2,
        };
        assert_eq!(literal.canonical(), ObjectRef::column(42, 2));
        // nothing to normalize without a column number
        assert_eq!(
            ObjectRef::new(ObjectKind::Column, 42, 0).kind,
            ObjectKind::Column
        );
    }

    #[test]
    fn kind_names_parse() {
        assert_eq!("Schema".parse::<ObjectKind>().unwrap(), ObjectKind::Schema);
        assert_eq!("function".parse::<ObjectKind>().unwrap(), ObjectKind::Other);
    }
}
