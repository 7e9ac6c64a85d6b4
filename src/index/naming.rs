//! View name derivation
//!
//! A view is addressed by the shape of the query that needs it: the document
//! type plus the clause fields in clause order. Operators and bound values do
//! not take part, so repeated queries with different bounds share one view.
//! Inside a component `%` becomes `%25` and `-` becomes `%2D`.

/// Prefix of every derived view name
pub const INDEX_PREFIX: &str = "QC";

/// Separator between name components
pub const NAME_SEPARATOR: &str = "-";

/// Escapes `%` and the separator so components never run together
fn escape_component(component: &str) -> String {
    component.replace('%', "%25").replace(NAME_SEPARATOR, "%2D")
}

/// Derives the view name for a document type and ordered clause fields.
///
/// Components containing `-` or `%` are escaped, so distinct shapes always
/// get distinct names.
pub fn derive_index_name<S: AsRef<str>>(document_type: &str, fields: &[S]) -> String {
    let mut columns = Vec::with_capacity(fields.len() + 2);
    columns.push(INDEX_PREFIX.to_string());
    columns.push(escape_component(document_type));
    columns.extend(fields.iter().map(|f| escape_component(f.as_ref())));
    columns.join(NAME_SEPARATOR)
}
