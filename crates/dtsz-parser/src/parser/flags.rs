//! Node flags (packed into `Node::flags`) and modifier flags (kept in
//! `ExtendedNodeInfo::modifier_flags`).

pub mod node_flags {
    pub const NONE: u16 = 0;
    pub const LET: u16 = 1 << 0;
    pub const CONST: u16 = 1 << 1;
    /// Inner part of `namespace A.B {}`
    pub const NESTED_NAMESPACE: u16 = 1 << 2;
    /// Declared with the `namespace` keyword rather than `module`
    pub const NAMESPACE: u16 = 1 << 3;
    /// `declare global { ... }`
    pub const GLOBAL_AUGMENTATION: u16 = 1 << 4;
    /// Produced during error recovery; has no source text
    pub const MISSING: u16 = 1 << 5;
    pub const BLOCK_SCOPED: u16 = LET | CONST;
}

pub mod modifier_flags {
    pub const NONE: u32 = 0;
    pub const EXPORT: u32 = 1 << 0;
    pub const AMBIENT: u32 = 1 << 1;
    pub const PUBLIC: u32 = 1 << 2;
    pub const PRIVATE: u32 = 1 << 3;
    pub const PROTECTED: u32 = 1 << 4;
    pub const STATIC: u32 = 1 << 5;
    pub const READONLY: u32 = 1 << 6;
    pub const ABSTRACT: u32 = 1 << 7;
    pub const ASYNC: u32 = 1 << 8;
    pub const DEFAULT: u32 = 1 << 9;
    pub const CONST: u32 = 1 << 10;
    pub const OVERRIDE: u32 = 1 << 11;
    pub const ACCESSOR: u32 = 1 << 12;
    pub const IN: u32 = 1 << 13;
    pub const OUT: u32 = 1 << 14;

    use dtsz_scanner::SyntaxKind;

    /// Flag for a single modifier keyword.
    pub fn from_modifier_kind(kind: u16) -> u32 {
        match kind {
            k if k == SyntaxKind::ExportKeyword as u16 => EXPORT,
            k if k == SyntaxKind::DeclareKeyword as u16 => AMBIENT,
            k if k == SyntaxKind::PublicKeyword as u16 => PUBLIC,
            k if k == SyntaxKind::PrivateKeyword as u16 => PRIVATE,
            k if k == SyntaxKind::ProtectedKeyword as u16 => PROTECTED,
            k if k == SyntaxKind::StaticKeyword as u16 => STATIC,
            k if k == SyntaxKind::ReadonlyKeyword as u16 => READONLY,
            k if k == SyntaxKind::AbstractKeyword as u16 => ABSTRACT,
            k if k == SyntaxKind::AsyncKeyword as u16 => ASYNC,
            k if k == SyntaxKind::DefaultKeyword as u16 => DEFAULT,
            k if k == SyntaxKind::ConstKeyword as u16 => CONST,
            k if k == SyntaxKind::OverrideKeyword as u16 => OVERRIDE,
            k if k == SyntaxKind::AccessorKeyword as u16 => ACCESSOR,
            k if k == SyntaxKind::InKeyword as u16 => IN,
            k if k == SyntaxKind::OutKeyword as u16 => OUT,
            _ => NONE,
        }
    }
}
