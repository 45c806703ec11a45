use manifold_utils::case::to_snake_case;

///
/// PackageInit
/// generated `__init__.py` contents
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PackageInit {
    /// structure folder root, re-exports its module packages
    Wildcard,

    /// module package, star-imports each generated file
    Modules(Vec<String>),
}

impl PackageInit {
    /// Init for a module folder holding the given `.py` file stems.
    /// Stems are normalised to snake case and sorted so the output does not
    /// depend on directory listing order.
    pub fn for_files<I, S>(stems: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut modules: Vec<String> = stems
            .into_iter()
            .filter(|s| s.as_ref() != "__init__")
            .map(|s| to_snake_case(s.as_ref()))
            .filter(|s| !s.is_empty())
            .collect();
        modules.sort();
        modules.dedup();

        Self::Modules(modules)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Render;

    #[test]
    fn module_init_is_sorted_and_skips_itself() {
        let init = PackageInit::for_files(["payment", "__init__", "invoice"]);

        assert_eq!(
            init.render(),
            "from .invoice import *\nfrom .payment import *\n"
        );
    }

    #[test]
    fn wildcard_init() {
        assert_eq!(PackageInit::Wildcard.render(), "from . import *\n");
    }
}
