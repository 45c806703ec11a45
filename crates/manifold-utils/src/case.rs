use convert_case::{Case, Casing};

///
/// Case helpers
///
/// Names flow between three worlds: folder names on disk (snake_case),
/// human labels ("Title Case") and generated Python class names
/// (UpperCamel).  These helpers keep the conversions in one place so the
/// generator and the translator agree on every derived name.
///

/// Convert a free-form name into a filesystem-safe snake_case identifier.
///
/// Path separators and punctuation collapse into single underscores, and
/// anything outside `[a-z0-9_]` is dropped.
#[must_use]
pub fn to_snake_case(name: &str) -> String {
    let value = name.trim().replace(['/', '\\'], " ");
    if value.is_empty() {
        return String::new();
    }

    let cased = value.to_case(Case::Snake);
    let mut out = String::with_capacity(cased.len());
    for ch in cased.chars() {
        let ch = if ch.is_ascii_alphanumeric() {
            ch.to_ascii_lowercase()
        } else {
            '_'
        };
        if ch == '_' && (out.is_empty() || out.ends_with('_')) {
            continue;
        }
        out.push(ch);
    }

    while out.ends_with('_') {
        out.pop();
    }

    out
}

/// Derive a display label from a field identifier (`customer_id` → `Customer Id`).
#[must_use]
pub fn to_label(field_id: &str) -> String {
    field_id.trim().replace('_', " ").to_case(Case::Title)
}

/// Derive a class-name stem with no spaces (`sales invoice` → `SalesInvoice`).
///
/// The result is always a valid Python identifier; a leading digit gets a
/// `Doc` prefix.
#[must_use]
pub fn to_type_name(name: &str) -> String {
    let stem: String = name
        .trim()
        .to_case(Case::UpperCamel)
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect();

    match stem.chars().next() {
        Some(first) if first.is_ascii_digit() => format!("Doc{stem}"),
        _ => stem,
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_case_collapses_separators() {
        assert_eq!(to_snake_case("Sales Invoice"), "sales_invoice");
        assert_eq!(to_snake_case("  billing / licensing "), "billing_licensing");
        assert_eq!(to_snake_case("identity_access"), "identity_access");
        assert_eq!(to_snake_case(""), "");
    }

    #[test]
    fn label_is_title_cased_words() {
        assert_eq!(to_label("customer"), "Customer");
        assert_eq!(to_label("customer_name"), "Customer Name");
    }

    #[test]
    fn type_name_has_no_spaces() {
        assert_eq!(to_type_name("Sales Invoice"), "SalesInvoice");
        assert_eq!(to_type_name("sales_invoice"), "SalesInvoice");
        assert_eq!(to_type_name("customer"), "Customer");
    }

    #[test]
    fn type_name_never_starts_with_digit() {
        let name = to_type_name("2fa device");
        assert!(name.starts_with("Doc"), "got {name}");
    }
}
