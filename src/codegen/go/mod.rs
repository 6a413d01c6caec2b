//! Go code generator
//!
//! Generates one Go struct per table, with a `db` struct tag carrying the
//! original column name.

use std::collections::{BTreeSet, HashMap};

use minijinja::Environment;
use tracing::trace;

use crate::codegen::types::{map_type, FieldKind, FieldType};
use crate::codegen::{CodeGenConfig, CodeGenerator};
use crate::error::SqlgenError;
use crate::schema::{to_field_case, Table};

/// One field of a generated struct
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: String,
    pub field_type: FieldType,
    /// Exact source column name
    pub column_name: String,
    pub comment: String,
}

/// Everything needed to render one table
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub type_name: String,
    /// Fields in column order
    pub fields: Vec<FieldDecl>,
    /// Import paths, sorted
    pub imports: Vec<&'static str>,
}

impl Declaration {
    /// Build the declaration for a table
    ///
    /// Fails when the table or a column name does not convert to a usable
    /// identifier, or when two columns convert to the same field name.
    pub fn from_table(table: &Table) -> Result<Self, SqlgenError> {
        let codegen_error = |message: String| SqlgenError::CodeGen {
            table: table.name.clone(),
            message,
        };

        let type_name = table.type_name();
        if !is_identifier(&type_name) {
            return Err(codegen_error(format!(
                "table name does not convert to a valid type name (got '{}')",
                type_name
            )));
        }

        let mut seen: HashMap<String, &str> = HashMap::new();
        let mut fields = Vec::with_capacity(table.columns.len());
        for col in &table.columns {
            let name = to_field_case(&col.name);
            if !is_identifier(&name) {
                return Err(codegen_error(format!(
                    "column '{}' does not convert to a valid field name (got '{}')",
                    col.name, name
                )));
            }
            if let Some(previous) = seen.insert(name.clone(), &col.name) {
                return Err(codegen_error(format!(
                    "columns '{}' and '{}' both convert to field '{}'",
                    previous, col.name, name
                )));
            }

            fields.push(FieldDecl {
                name,
                field_type: map_type(&col.raw_type, col.nullable, col.unsigned),
                column_name: col.name.clone(),
                comment: col.comment.clone(),
            });
        }

        Ok(Self {
            type_name,
            fields,
            imports: collect_imports(table),
        })
    }
}

/// Go code generator
pub struct GoGenerator {
    env: Environment<'static>,
}

impl GoGenerator {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);

        env.add_template("struct", include_str!("templates/struct.go.jinja"))
            .expect("Failed to load go struct template");

        Self { env }
    }
}

impl Default for GoGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeGenerator for GoGenerator {
    fn file_extension(&self) -> &'static str {
        "go"
    }

    fn validate_config(&self, config: &CodeGenConfig) -> Result<(), SqlgenError> {
        if config.package != "_" && is_identifier(&config.package) {
            Ok(())
        } else {
            Err(SqlgenError::Config(format!(
                "'{}' is not a valid Go package name (set one with --package)",
                config.package
            )))
        }
    }

    fn render_table(&self, table: &Table, config: &CodeGenConfig) -> Result<String, SqlgenError> {
        let template = self
            .env
            .get_template("struct")
            .map_err(|e| SqlgenError::CodeGen {
                table: table.name.clone(),
                message: format!("Template error: {}", e),
            })?;

        let declaration = Declaration::from_table(table)?;
        trace!(
            table = ?table.name,
            type_name = ?declaration.type_name,
            fields = declaration.fields.len(),
            imports = ?declaration.imports,
            "Rendering struct"
        );

        let ctx = minijinja::context! {
            package => &config.package,
            type_name => &declaration.type_name,
            imports => &declaration.imports,
            fields => declaration.fields.iter().map(|field| {
                minijinja::context! {
                    name => &field.name,
                    go_type => go_type(field.field_type),
                    tag => struct_tag(&field.column_name),
                    comment => config.with_comments.then(|| line_comment(&field.comment)),
                }
            }).collect::<Vec<_>>(),
        };

        template.render(ctx).map_err(|e| SqlgenError::CodeGen {
            table: table.name.clone(),
            message: format!("Render error: {}", e),
        })
    }
}

const KEYWORDS: &[&str] = &[
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

/// Whether `name` is a Go identifier that is not a keyword
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_ok = chars
        .next()
        .is_some_and(|first| first == '_' || first.is_alphabetic());

    starts_ok
        && chars.all(|c| c == '_' || c.is_alphanumeric())
        && !KEYWORDS.contains(&name)
}

/// Convert a FieldType to its Go spelling
pub fn go_type(field_type: FieldType) -> String {
    let base = match field_type.kind {
        FieldKind::Int8 => "int8",
        FieldKind::Uint8 => "uint8",
        FieldKind::Int16 => "int16",
        FieldKind::Uint16 => "uint16",
        FieldKind::Int32 => "int32",
        FieldKind::Uint32 => "uint32",
        FieldKind::Int64 => "int64",
        FieldKind::Uint64 => "uint64",
        FieldKind::Float32 => "float32",
        FieldKind::Float64 => "float64",
        FieldKind::String => "string",
        FieldKind::Bytes => "[]byte",
        FieldKind::Timestamp => "time.Time",
    };

    if field_type.optional {
        format!("*{}", base)
    } else {
        base.to_string()
    }
}

/// Import path a field kind depends on
fn kind_import(kind: FieldKind) -> Option<&'static str> {
    match kind {
        FieldKind::Timestamp => Some("time"),
        _ => None,
    }
}

/// Collect required imports for a table, sorted
///
/// Pointers need no import, so nullability never adds one.
pub fn collect_imports(table: &Table) -> Vec<&'static str> {
    let imports: BTreeSet<_> = table
        .columns
        .iter()
        .filter_map(|col| kind_import(FieldKind::from_raw(&col.raw_type, col.unsigned)))
        .collect();

    imports.into_iter().collect()
}

/// Struct tag holding the column name, e.g. `` `db:"user_id"` ``
///
/// Falls back to an interpreted string literal when the name contains a
/// backtick, which a raw string cannot hold.
pub fn struct_tag(column_name: &str) -> String {
    let tag = format!("db:\"{}\"", escape_go_string(column_name));
    if tag.contains('`') {
        format!("\"{}\"", escape_go_string(&tag))
    } else {
        format!("`{}`", tag)
    }
}

fn escape_go_string(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Flatten a column comment onto one line
fn line_comment(comment: &str) -> String {
    comment.split_whitespace().collect::<Vec<_>>().join(" ")
}
