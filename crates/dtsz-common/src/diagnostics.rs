//! Diagnostic types and message lookup.
//!
//! Parser diagnostics reuse TypeScript's numeric codes so that messages look
//! familiar next to `tsc` output. Bundler-specific diagnostics live in the
//! 9000 range.

use serde::Serialize;

/// Diagnostic category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticCategory {
    Warning = 0,
    Error = 1,
    Suggestion = 2,
    Message = 3,
}

/// Related information for a diagnostic (e.g., "see also" locations).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiagnosticRelatedInformation {
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
}

/// A diagnostic message with optional related information.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
    /// Related information spans (e.g., where a conflicting declaration lives)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related_information: Vec<DiagnosticRelatedInformation>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(
        file: impl Into<String>,
        start: u32,
        length: u32,
        message: impl Into<String>,
        code: u32,
    ) -> Self {
        Self {
            file: file.into(),
            start,
            length,
            message_text: message.into(),
            category: DiagnosticCategory::Error,
            code,
            related_information: Vec::new(),
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(
        file: impl Into<String>,
        start: u32,
        length: u32,
        message: impl Into<String>,
        code: u32,
    ) -> Self {
        Self {
            category: DiagnosticCategory::Warning,
            ..Self::error(file, start, length, message, code)
        }
    }

    /// Create a diagnostic that is not attached to any source location.
    pub fn global(category: DiagnosticCategory, message: impl Into<String>, code: u32) -> Self {
        Self {
            category,
            ..Self::error(String::new(), 0, 0, message, code)
        }
    }

    pub fn with_related(
        mut self,
        file: impl Into<String>,
        start: u32,
        length: u32,
        message: impl Into<String>,
    ) -> Self {
        self.related_information.push(DiagnosticRelatedInformation {
            file: file.into(),
            start,
            length,
            message_text: message.into(),
            category: DiagnosticCategory::Message,
            code: 0,
        });
        self
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

pub mod diagnostic_codes {
    // Scanner / parser (TypeScript codes)
    pub const UNTERMINATED_STRING_LITERAL: u32 = 1002;
    pub const IDENTIFIER_EXPECTED: u32 = 1003;
    pub const TOKEN_EXPECTED: u32 = 1005;
    pub const ASTERISK_SLASH_EXPECTED: u32 = 1010;
    pub const TYPE_EXPECTED: u32 = 1110;
    pub const INVALID_CHARACTER: u32 = 1127;
    pub const DECLARATION_OR_STATEMENT_EXPECTED: u32 = 1128;
    pub const UNTERMINATED_TEMPLATE_LITERAL: u32 = 1160;

    // Module resolution
    pub const CANNOT_FIND_MODULE: u32 = 2307;

    // Bundler
    pub const MISSING_TOP_LEVEL_SYMBOL: u32 = 9001;
    pub const UNSUPPORTED_TOP_LEVEL_DECLARATION: u32 = 9002;
    pub const INCONSISTENT_DECLARATION_SCOPES: u32 = 9003;
    pub const CIRCULAR_MODULE_DEPENDENCY: u32 = 9004;
    pub const NAMESPACE_IMPORT_NOT_FLATTENED: u32 = 9005;
    pub const UNSUPPORTED_EXPORT: u32 = 9006;
    pub const UNRESOLVED_EXPORT: u32 = 9007;
}

pub mod diagnostic_messages {
    pub const UNTERMINATED_STRING_LITERAL: &str = "Unterminated string literal.";
    pub const IDENTIFIER_EXPECTED: &str = "Identifier expected.";
    pub const TOKEN_EXPECTED: &str = "'{0}' expected.";
    pub const ASTERISK_SLASH_EXPECTED: &str = "'*/' expected.";
    pub const TYPE_EXPECTED: &str = "Type expected.";
    pub const INVALID_CHARACTER: &str = "Invalid character.";
    pub const DECLARATION_OR_STATEMENT_EXPECTED: &str = "Declaration or statement expected.";
    pub const UNTERMINATED_TEMPLATE_LITERAL: &str = "Unterminated template literal.";
    pub const CANNOT_FIND_MODULE: &str =
        "Cannot find module '{0}' or its corresponding type declarations.";
    pub const MISSING_TOP_LEVEL_SYMBOL: &str =
        "Cannot find a symbol for top-level identifier '{0}' (from '{1}').";
    pub const UNSUPPORTED_TOP_LEVEL_DECLARATION: &str =
        "Declaration '{0}' cannot be renamed; it is emitted with its original name.";
    pub const INCONSISTENT_DECLARATION_SCOPES: &str =
        "Declarations of '{0}' are nested in different namespaces; using the first one.";
    pub const CIRCULAR_MODULE_DEPENDENCY: &str = "Circular module dependency: {0}.";
    pub const NAMESPACE_IMPORT_NOT_FLATTENED: &str =
        "Reference '{0}' goes through a namespace import and cannot be flattened.";
    pub const UNSUPPORTED_EXPORT: &str = "Export '{0}' is not supported by the bundler.";
    pub const UNRESOLVED_EXPORT: &str = "Export '{0}' does not resolve to a declaration.";
}

/// Substitute `{0}`, `{1}`, ... placeholders in a message template.
pub fn format_message(message: &str, args: &[&str]) -> String {
    let mut result = message.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}
