//! Column type mapping
//!
//! Maps MySQL `DATA_TYPE` names onto a small language-neutral set of field
//! kinds. Generators decide how each kind is spelled in their language.

/// Base type of a generated field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldKind {
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Int64,
    Uint64,
    Float32,
    Float64,
    String,
    Bytes,
    Timestamp,
}

impl FieldKind {
    /// Look up the kind for a raw type name
    ///
    /// Unknown types map to `String`.
    pub fn from_raw(raw_type: &str, unsigned: bool) -> Self {
        let signed_or = |signed: Self, unsigned_kind: Self| {
            if unsigned {
                unsigned_kind
            } else {
                signed
            }
        };

        match raw_type.trim().to_lowercase().as_str() {
            "tinyint" => signed_or(Self::Int8, Self::Uint8),
            "smallint" | "year" => signed_or(Self::Int16, Self::Uint16),
            "mediumint" | "int" | "integer" => signed_or(Self::Int32, Self::Uint32),
            "bigint" => signed_or(Self::Int64, Self::Uint64),
            "float" => Self::Float32,
            "double" | "real" | "decimal" | "numeric" => Self::Float64,
            "char" | "varchar" | "text" | "tinytext" | "mediumtext" | "longtext" | "enum"
            | "set" | "json" => Self::String,
            "binary" | "varbinary" | "blob" | "tinyblob" | "mediumblob" | "longblob" | "bit" => {
                Self::Bytes
            }
            "datetime" | "timestamp" | "date" | "time" => Self::Timestamp,
            _ => Self::String,
        }
    }

    /// Whether a nullable column of this kind needs an optional wrapper.
    /// Byte sequences already have an absent state.
    pub fn wraps_when_nullable(self) -> bool {
        self != Self::Bytes
    }
}

/// Mapped type of one field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldType {
    pub kind: FieldKind,
    /// The value may be absent (rendered as the language's optional form)
    pub optional: bool,
}

/// Map a column's raw type, nullability and signedness to a field type
pub fn map_type(raw_type: &str, nullable: bool, unsigned: bool) -> FieldType {
    let kind = FieldKind::from_raw(raw_type, unsigned);
    FieldType {
        kind,
        optional: nullable && kind.wraps_when_nullable(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use super::FieldKind::*;

    #[test]
    fn test_integer_family() {
        let cases = [
            ("tinyint", Int8, Uint8),
            ("smallint", Int16, Uint16),
            ("mediumint", Int32, Uint32),
            ("int", Int32, Uint32),
            ("integer", Int32, Uint32),
            ("bigint", Int64, Uint64),
            ("year", Int16, Uint16),
        ];
        for (raw, signed, unsigned) in cases {
            assert_eq!(FieldKind::from_raw(raw, false), signed, "{raw}");
            assert_eq!(FieldKind::from_raw(raw, true), unsigned, "{raw} unsigned");
        }
    }

    #[test]
    fn test_non_integer_families_ignore_unsigned() {
        let cases = [
            ("float", Float32),
            ("double", Float64),
            ("real", Float64),
            ("decimal", Float64),
            ("numeric", Float64),
            ("char", String),
            ("varchar", String),
            ("text", String),
            ("tinytext", String),
            ("mediumtext", String),
            ("longtext", String),
            ("enum", String),
            ("set", String),
            ("json", String),
            ("binary", Bytes),
            ("varbinary", Bytes),
            ("blob", Bytes),
            ("tinyblob", Bytes),
            ("mediumblob", Bytes),
            ("longblob", Bytes),
            ("bit", Bytes),
            ("datetime", Timestamp),
            ("timestamp", Timestamp),
            ("date", Timestamp),
            ("time", Timestamp),
        ];
        for (raw, kind) in cases {
            assert_eq!(FieldKind::from_raw(raw, false), kind, "{raw}");
            assert_eq!(FieldKind::from_raw(raw, true), kind, "{raw} unsigned");
        }
    }

    #[test]
    fn test_unknown_types_fall_back_to_string() {
        assert_eq!(FieldKind::from_raw("geometry", false), String);
        assert_eq!(FieldKind::from_raw("unknown_type", true), String);
        assert_eq!(FieldKind::from_raw("", false), String);
    }

    #[test]
    fn test_raw_type_is_normalized() {
        assert_eq!(FieldKind::from_raw("BIGINT", true), Uint64);
        assert_eq!(FieldKind::from_raw(" datetime ", false), Timestamp);
    }

    #[test]
    fn test_nullable_wraps_scalars() {
        let scalars = [
            "tinyint", "int", "bigint", "float", "decimal", "varchar", "datetime", "year",
            "mystery",
        ];
        for raw in scalars {
            let field = map_type(raw, true, false);
            assert!(field.optional, "{raw} should be optional");
            assert!(!map_type(raw, false, false).optional, "{raw} should not be optional");
        }
    }

    #[test]
    fn test_nullable_bytes_stay_unwrapped() {
        for raw in ["binary", "varbinary", "blob", "tinyblob", "mediumblob", "longblob", "bit"] {
            assert_eq!(
                map_type(raw, true, false),
                FieldType {
                    kind: Bytes,
                    optional: false
                },
                "{raw}"
            );
        }
    }

    #[test]
    fn test_map_type_unsigned_nullable() {
        assert_eq!(
            map_type("bigint", true, true),
            FieldType {
                kind: Uint64,
                optional: true
            }
        );
    }
}
