/// Output options of one bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleOptions {
    /// Omit the generated-by banner comment
    pub no_banner: bool,
    /// Order declarations by name instead of by module order
    pub sort_nodes: bool,
    /// Export every referenced declaration that kept its name
    pub export_referenced_types: bool,
    /// Keep `declare global {}` blocks of bundled files
    pub inline_declare_global: bool,
    /// Keep `declare module "m" {}` blocks of bundled files
    pub inline_declare_externals: bool,
}

impl Default for BundleOptions {
    fn default() -> Self {
        BundleOptions {
            no_banner: false,
            sort_nodes: false,
            export_referenced_types: true,
            inline_declare_global: false,
            inline_declare_externals: false,
        }
    }
}
