//! Column types, requested output types and the coercion matrix between them.

use std::fmt;

use crate::error::CoercionError;

/// The types a worksheet column can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColumnType {
    Boolean,
    Date,
    DateTime,
    Double,
    Long,
    String,
    Time,
}

impl ColumnType {
    /// Every column type, in declaration order.
    pub const ALL: [ColumnType; 7] = [
        ColumnType::Boolean,
        ColumnType::Date,
        ColumnType::DateTime,
        ColumnType::Double,
        ColumnType::Long,
        ColumnType::String,
        ColumnType::Time,
    ];

    /// The requested types a cell of this column can be converted to.
    #[must_use]
    pub fn coercions(self) -> &'static [TypeTag] {
        use TypeTag::*;
        match self {
            ColumnType::Boolean => &[
                Boolean, Int8, Int16, Int32, Int64, Float32, Float64, Decimal,
            ],
            ColumnType::Date => &[Date, Timestamp, Int64, Decimal],
            ColumnType::DateTime => &[Date, Timestamp, DateTime, Int64, Decimal],
            ColumnType::Double => &[Float64, Int8, Int16, Int32, Int64, Float32, Decimal],
            ColumnType::Long => &[Int64, Int8, Int16, Int32, Float64, Float32, Decimal],
            ColumnType::String => &[String],
            ColumnType::Time => &[Date, Timestamp, Int64, Decimal],
        }
    }

    /// Returns true when `requested` appears in this column's coercion matrix row.
    #[must_use]
    pub fn accepts(self, requested: TypeTag) -> bool {
        self.coercions().contains(&requested)
    }

    /// Fails with [`CoercionError::Unsupported`] unless `requested` is legal for this column.
    pub fn check_coercion(self, requested: TypeTag) -> Result<(), CoercionError> {
        if self.accepts(requested) {
            Ok(())
        } else {
            Err(CoercionError::Unsupported {
                column_type: self,
                requested,
            })
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColumnType::Boolean => "Boolean",
            ColumnType::Date => "Date",
            ColumnType::DateTime => "DateTime",
            ColumnType::Double => "Double",
            ColumnType::Long => "Long",
            ColumnType::String => "String",
            ColumnType::Time => "Time",
        })
    }
}

/// Representation a caller asks a cell to be returned as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeTag {
    /// `bool`.
    Boolean,
    /// `i8`.
    Int8,
    /// `i16`.
    Int16,
    /// `i32`.
    Int32,
    /// `i64`; the epoch-millisecond encoding for temporal columns.
    Int64,
    /// `f32`.
    Float32,
    /// `f64`.
    Float64,
    /// [`rust_decimal::Decimal`].
    Decimal,
    /// [`chrono::NaiveDate`].
    Date,
    /// [`chrono::NaiveDateTime`].
    Timestamp,
    /// [`chrono::DateTime<Utc>`](chrono::DateTime), the combined date and time.
    DateTime,
    /// Display-formatted text.
    String,
    /// Opaque marker for columns that are filtered on but not returned.
    Unit,
}

impl TypeTag {
    /// Every tag, in declaration order.
    pub const ALL: [TypeTag; 13] = [
        TypeTag::Boolean,
        TypeTag::Int8,
        TypeTag::Int16,
        TypeTag::Int32,
        TypeTag::Int64,
        TypeTag::Float32,
        TypeTag::Float64,
        TypeTag::Decimal,
        TypeTag::Date,
        TypeTag::Timestamp,
        TypeTag::DateTime,
        TypeTag::String,
        TypeTag::Unit,
    ];
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TypeTag::Boolean => "bool",
            TypeTag::Int8 => "i8",
            TypeTag::Int16 => "i16",
            TypeTag::Int32 => "i32",
            TypeTag::Int64 => "i64",
            TypeTag::Float32 => "f32",
            TypeTag::Float64 => "f64",
            TypeTag::Decimal => "decimal",
            TypeTag::Date => "date",
            TypeTag::Timestamp => "timestamp",
            TypeTag::DateTime => "datetime",
            TypeTag::String => "string",
            TypeTag::Unit => "unit",
        })
    }
}

/// A requested type plus how empty cells should be reported.
///
/// With `optional` set an empty cell reads as [`Empty::Absent`](crate::Empty::Absent);
/// otherwise it reads as [`Empty::Null`](crate::Empty::Null).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DesiredType {
    pub tag: TypeTag,
    pub optional: bool,
}

impl DesiredType {
    /// Bare request: empty cells read as `Null`.
    #[must_use]
    pub const fn bare(tag: TypeTag) -> Self {
        Self {
            tag,
            optional: false,
        }
    }

    /// Optional request: empty cells read as `Absent`.
    #[must_use]
    pub const fn optional(tag: TypeTag) -> Self {
        Self {
            tag,
            optional: true,
        }
    }

    /// The opaque type carried by columns that are not projected.
    #[must_use]
    pub const fn unit() -> Self {
        Self::bare(TypeTag::Unit)
    }
}

impl From<TypeTag> for DesiredType {
    fn from(tag: TypeTag) -> Self {
        DesiredType::bare(tag)
    }
}

impl fmt::Display for DesiredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.optional {
            write!(f, "Option<{}>", self.tag)
        } else {
            write!(f, "{}", self.tag)
        }
    }
}
