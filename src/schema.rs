//! Schema data structures
//!
//! These types represent table metadata and form the contract between
//! introspection (produces) and code generation (consumes).

/// Role a column plays in the table's indexes, as reported by `COLUMN_KEY`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyRole {
    #[default]
    None,
    /// `PRI`
    Primary,
    /// `UNI`
    Unique,
    /// `MUL`: first column of a non-unique index
    Multiple,
}

impl KeyRole {
    /// Parse an `information_schema.COLUMNS.COLUMN_KEY` value
    pub fn from_column_key(key: &str) -> Self {
        match key.trim() {
            "PRI" => Self::Primary,
            "UNI" => Self::Unique,
            "MUL" => Self::Multiple,
            _ => Self::None,
        }
    }
}

/// A table column
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    /// Database-reported type name without modifiers, e.g. `bigint`
    pub raw_type: String,
    pub nullable: bool,
    /// Only meaningful for the integer family
    pub unsigned: bool,
    pub key_role: KeyRole,
    /// e.g. `auto_increment`, `on update CURRENT_TIMESTAMP`
    pub extra: String,
    pub comment: String,
}

impl Column {
    /// Column with the given name and type, not null, signed, no key
    pub fn new(name: impl Into<String>, raw_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            raw_type: raw_type.into(),
            nullable: false,
            unsigned: false,
            key_role: KeyRole::None,
            extra: String::new(),
            comment: String::new(),
        }
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn unsigned(mut self, unsigned: bool) -> Self {
        self.unsigned = unsigned;
        self
    }

    pub fn with_key_role(mut self, key_role: KeyRole) -> Self {
        self.key_role = key_role;
        self
    }

    pub fn with_extra(mut self, extra: impl Into<String>) -> Self {
        self.extra = extra.into();
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn is_auto_increment(&self) -> bool {
        self.extra.to_lowercase().contains("auto_increment")
    }
}

/// Database table
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    /// Columns in ordinal position order
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Name of the generated type
    pub fn type_name(&self) -> String {
        to_field_case(&self.name)
    }

    /// Stem of the generated file name (without extension)
    pub fn file_stem(&self) -> String {
        to_file_case(&self.name)
    }

    /// Get primary key columns in ordinal order
    pub fn primary_key_columns(&self) -> Vec<&Column> {
        self.columns
            .iter()
            .filter(|col| col.key_role == KeyRole::Primary)
            .collect()
    }

    pub fn has_auto_increment(&self) -> bool {
        self.columns.iter().any(Column::is_auto_increment)
    }
}

/// Convert an underscore-delimited identifier to field case
///
/// Each non-empty segment gets its first character uppercased; the rest of
/// the segment is left alone, so `USER` stays `USER` and `a_b_c` becomes
/// `ABC`. Shared by every code generator for type and field names.
pub fn to_field_case(s: &str) -> String {
    s.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => {
                    let first_upper = first.to_uppercase().to_string();
                    first_upper + chars.as_str()
                }
            }
        })
        .collect()
}

/// Convert a capitalized identifier to file case
///
/// Every uppercase character after the first is prefixed with `_`, and all
/// uppercase characters are lowercased. Runs of capitals are split one
/// letter at a time (`ID` becomes `i_d`).
pub fn to_file_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(c.to_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_field_case() {
        let cases = [
            ("user", "User"),
            ("user_id", "UserId"),
            ("user_account", "UserAccount"),
            ("created_at", "CreatedAt"),
            ("id", "Id"),
            ("USER", "USER"),
            ("user_name_test", "UserNameTest"),
            ("", ""),
            ("a", "A"),
            ("a_b_c", "ABC"),
        ];
        for (input, want) in cases {
            assert_eq!(to_field_case(input), want, "to_field_case({input:?})");
        }
    }

    #[test]
    fn test_to_field_case_skips_empty_segments() {
        assert_eq!(to_field_case("__user__id_"), "UserId");
        assert_eq!(to_field_case("_"), "");
    }

    #[test]
    fn test_to_file_case() {
        let cases = [
            ("User", "user"),
            ("UserId", "user_id"),
            ("UserAccount", "user_account"),
            ("CreatedAt", "created_at"),
            ("ID", "i_d"),
            ("user", "user"),
            ("userNameTest", "user_name_test"),
            ("", ""),
            ("A", "a"),
            ("ABC", "a_b_c"),
        ];
        for (input, want) in cases {
            assert_eq!(to_file_case(input), want, "to_file_case({input:?})");
        }
    }

    #[test]
    fn test_snake_case_table_names_pass_through_file_case() {
        assert_eq!(to_file_case("user_accounts"), "user_accounts");
    }

    #[test]
    fn test_key_role_from_column_key() {
        assert_eq!(KeyRole::from_column_key("PRI"), KeyRole::Primary);
        assert_eq!(KeyRole::from_column_key("UNI"), KeyRole::Unique);
        assert_eq!(KeyRole::from_column_key("MUL"), KeyRole::Multiple);
        assert_eq!(KeyRole::from_column_key(""), KeyRole::None);
        assert_eq!(KeyRole::from_column_key("???"), KeyRole::None);
    }

    #[test]
    fn test_table_names() {
        let table = Table::new("UserAccounts", vec![]);
        assert_eq!(table.type_name(), "UserAccounts");
        assert_eq!(table.file_stem(), "user_accounts");
    }

    #[test]
    fn test_primary_key_columns_in_ordinal_order() {
        let table = Table::new(
            "order_items",
            vec![
                Column::new("order_id", "bigint").with_key_role(KeyRole::Primary),
                Column::new("note", "text").nullable(true),
                Column::new("line_no", "int").with_key_role(KeyRole::Primary),
            ],
        );

        let names: Vec<_> = table
            .primary_key_columns()
            .iter()
            .map(|col| col.name.as_str())
            .collect();
        assert_eq!(names, ["order_id", "line_no"]);
    }

    #[test]
    fn test_has_auto_increment() {
        let table = Table::new(
            "users",
            vec![Column::new("id", "bigint")
                .unsigned(true)
                .with_key_role(KeyRole::Primary)
                .with_extra("auto_increment")],
        );
        assert!(table.has_auto_increment());

        let table = Table::new(
            "audit",
            vec![Column::new("updated_at", "timestamp").with_extra("on update CURRENT_TIMESTAMP")],
        );
        assert!(!table.has_auto_increment());
    }

    #[test]
    fn test_empty_table() {
        let table = Table::new("empty_table", vec![]);
        assert!(table.columns.is_empty());
        assert!(table.primary_key_columns().is_empty());
    }
}
