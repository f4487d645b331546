use std::fmt::{Error, Result, Write as _};

use super::{CompositeType, Field, FieldType};

/// Format a resolved schema in a readable style:
/// primitive fields are rendered in one line, composite fields are pretty-printed.
/// Nested fields follow the same rule.
pub fn format_schema(root: &CompositeType) -> std::result::Result<String, Error> {
    let mut out = String::new();
    writeln!(out, "{}:", root.name())?;
    for field in root.fields() {
        format_field(field, 4, &mut out)?;
    }
    Ok(out)
}

fn format_field(field: &Field, indent: usize, out: &mut String) -> Result {
    let pad = " ".repeat(indent);
    match field.field_type() {
        FieldType::Primitive(p) => writeln!(
            out,
            "{pad}{}: {{ type: {}, qualifier: {}, index: {} }}",
            field.name(),
            p.type_name(),
            field.qualifier().as_str(),
            field.index()
        ),
        FieldType::Composite(child) => {
            writeln!(out, "{pad}{}:", field.name())?;
            writeln!(out, "{pad}    type: {}", child.name())?;
            writeln!(out, "{pad}    qualifier: {}", field.qualifier().as_str())?;
            writeln!(out, "{pad}    index: {}", field.index())?;
            writeln!(out, "{pad}    fields:")?;
            for nested in child.fields() {
                format_field(nested, indent + 8, out)?;
            }
            Ok(())
        }
    }
}
