//! Token kinds produced by the scanner.
//!
//! Values are sequential `u16`s so that AST node kinds (see
//! `dtsz_parser::syntax_kind_ext`) can live above `SyntaxKind::Count` in the
//! same numeric space.

use serde::Serialize;

#[repr(u16)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SyntaxKind {
    Unknown,
    EndOfFileToken,
    // Literals
    NumericLiteral,
    BigIntLiteral,
    StringLiteral,
    NoSubstitutionTemplateLiteral,
    TemplateHead,
    TemplateMiddle,
    TemplateTail,
    // Punctuation
    OpenBraceToken,
    CloseBraceToken,
    OpenParenToken,
    CloseParenToken,
    OpenBracketToken,
    CloseBracketToken,
    DotToken,
    DotDotDotToken,
    SemicolonToken,
    CommaToken,
    QuestionDotToken,
    LessThanToken,
    GreaterThanToken,
    EqualsToken,
    EqualsGreaterThanToken,
    PlusToken,
    MinusToken,
    AsteriskToken,
    SlashToken,
    PercentToken,
    AmpersandToken,
    BarToken,
    CaretToken,
    ExclamationToken,
    TildeToken,
    QuestionToken,
    ColonToken,
    AtToken,
    HashToken,
    // Identifiers
    Identifier,
    PrivateIdentifier,
    // Reserved words
    BreakKeyword,
    CaseKeyword,
    CatchKeyword,
    ClassKeyword,
    ConstKeyword,
    ContinueKeyword,
    DebuggerKeyword,
    DefaultKeyword,
    DeleteKeyword,
    DoKeyword,
    ElseKeyword,
    EnumKeyword,
    ExportKeyword,
    ExtendsKeyword,
    FalseKeyword,
    FinallyKeyword,
    ForKeyword,
    FunctionKeyword,
    IfKeyword,
    ImportKeyword,
    InKeyword,
    InstanceOfKeyword,
    NewKeyword,
    NullKeyword,
    ReturnKeyword,
    SuperKeyword,
    SwitchKeyword,
    ThisKeyword,
    ThrowKeyword,
    TrueKeyword,
    TryKeyword,
    TypeOfKeyword,
    VarKeyword,
    VoidKeyword,
    WhileKeyword,
    WithKeyword,
    // Strict mode reserved words
    ImplementsKeyword,
    InterfaceKeyword,
    LetKeyword,
    PackageKeyword,
    PrivateKeyword,
    ProtectedKeyword,
    PublicKeyword,
    StaticKeyword,
    YieldKeyword,
    // Contextual keywords
    AbstractKeyword,
    AccessorKeyword,
    AsKeyword,
    AssertsKeyword,
    AnyKeyword,
    AsyncKeyword,
    AwaitKeyword,
    BigIntKeyword,
    BooleanKeyword,
    ConstructorKeyword,
    DeclareKeyword,
    GetKeyword,
    InferKeyword,
    IntrinsicKeyword,
    IsKeyword,
    KeyOfKeyword,
    ModuleKeyword,
    NamespaceKeyword,
    NeverKeyword,
    OutKeyword,
    ReadonlyKeyword,
    RequireKeyword,
    NumberKeyword,
    ObjectKeyword,
    SatisfiesKeyword,
    SetKeyword,
    StringKeyword,
    SymbolKeyword,
    TypeKeyword,
    UndefinedKeyword,
    UniqueKeyword,
    UnknownKeyword,
    UsingKeyword,
    FromKeyword,
    GlobalKeyword,
    OfKeyword,
    OverrideKeyword,
    /// Number of token kinds. Node kinds start here.
    Count,
}

impl SyntaxKind {
    pub const FIRST_KEYWORD: SyntaxKind = SyntaxKind::BreakKeyword;
    pub const LAST_KEYWORD: SyntaxKind = SyntaxKind::OverrideKeyword;
    pub const FIRST_RESERVED_WORD: SyntaxKind = SyntaxKind::BreakKeyword;
    pub const LAST_RESERVED_WORD: SyntaxKind = SyntaxKind::WithKeyword;
}

use SyntaxKind::*;

macro_rules! define_keywords {
    ($($text:literal => $kind:ident),+ $(,)?) => {
        /// Look up the keyword kind for an identifier's text.
        pub fn text_to_keyword(text: &str) -> Option<SyntaxKind> {
            match text {
                $($text => Some(SyntaxKind::$kind),)+
                _ => None,
            }
        }

        /// Source text of a keyword or punctuation token.
        pub fn keyword_to_text(kind: SyntaxKind) -> Option<&'static str> {
            match kind {
                $(SyntaxKind::$kind => Some($text),)+
                _ => punctuation_to_text(kind),
            }
        }
    };
}

define_keywords! {
    "break" => BreakKeyword,
    "case" => CaseKeyword,
    "catch" => CatchKeyword,
    "class" => ClassKeyword,
    "const" => ConstKeyword,
    "continue" => ContinueKeyword,
    "debugger" => DebuggerKeyword,
    "default" => DefaultKeyword,
    "delete" => DeleteKeyword,
    "do" => DoKeyword,
    "else" => ElseKeyword,
    "enum" => EnumKeyword,
    "export" => ExportKeyword,
    "extends" => ExtendsKeyword,
    "false" => FalseKeyword,
    "finally" => FinallyKeyword,
    "for" => ForKeyword,
    "function" => FunctionKeyword,
    "if" => IfKeyword,
    "import" => ImportKeyword,
    "in" => InKeyword,
    "instanceof" => InstanceOfKeyword,
    "new" => NewKeyword,
    "null" => NullKeyword,
    "return" => ReturnKeyword,
    "super" => SuperKeyword,
    "switch" => SwitchKeyword,
    "this" => ThisKeyword,
    "throw" => ThrowKeyword,
    "true" => TrueKeyword,
    "try" => TryKeyword,
    "typeof" => TypeOfKeyword,
    "var" => VarKeyword,
    "void" => VoidKeyword,
    "while" => WhileKeyword,
    "with" => WithKeyword,
    "implements" => ImplementsKeyword,
    "interface" => InterfaceKeyword,
    "let" => LetKeyword,
    "package" => PackageKeyword,
    "private" => PrivateKeyword,
    "protected" => ProtectedKeyword,
    "public" => PublicKeyword,
    "static" => StaticKeyword,
    "yield" => YieldKeyword,
    "abstract" => AbstractKeyword,
    "accessor" => AccessorKeyword,
    "as" => AsKeyword,
    "asserts" => AssertsKeyword,
    "any" => AnyKeyword,
    "async" => AsyncKeyword,
    "await" => AwaitKeyword,
    "bigint" => BigIntKeyword,
    "boolean" => BooleanKeyword,
    "constructor" => ConstructorKeyword,
    "declare" => DeclareKeyword,
    "get" => GetKeyword,
    "infer" => InferKeyword,
    "intrinsic" => IntrinsicKeyword,
    "is" => IsKeyword,
    "keyof" => KeyOfKeyword,
    "module" => ModuleKeyword,
    "namespace" => NamespaceKeyword,
    "never" => NeverKeyword,
    "out" => OutKeyword,
    "readonly" => ReadonlyKeyword,
    "require" => RequireKeyword,
    "number" => NumberKeyword,
    "object" => ObjectKeyword,
    "satisfies" => SatisfiesKeyword,
    "set" => SetKeyword,
    "string" => StringKeyword,
    "symbol" => SymbolKeyword,
    "type" => TypeKeyword,
    "undefined" => UndefinedKeyword,
    "unique" => UniqueKeyword,
    "unknown" => UnknownKeyword,
    "using" => UsingKeyword,
    "from" => FromKeyword,
    "global" => GlobalKeyword,
    "of" => OfKeyword,
    "override" => OverrideKeyword,
}

fn punctuation_to_text(kind: SyntaxKind) -> Option<&'static str> {
    Some(match kind {
        OpenBraceToken => "{",
        CloseBraceToken => "}",
        OpenParenToken => "(",
        CloseParenToken => ")",
        OpenBracketToken => "[",
        CloseBracketToken => "]",
        DotToken => ".",
        DotDotDotToken => "...",
        SemicolonToken => ";",
        CommaToken => ",",
        QuestionDotToken => "?.",
        LessThanToken => "<",
        GreaterThanToken => ">",
        EqualsToken => "=",
        EqualsGreaterThanToken => "=>",
        PlusToken => "+",
        MinusToken => "-",
        AsteriskToken => "*",
        SlashToken => "/",
        PercentToken => "%",
        AmpersandToken => "&",
        BarToken => "|",
        CaretToken => "^",
        ExclamationToken => "!",
        TildeToken => "~",
        QuestionToken => "?",
        ColonToken => ":",
        AtToken => "@",
        HashToken => "#",
        _ => return None,
    })
}

/// True for reserved and contextual keywords.
#[inline]
pub fn token_is_keyword(kind: SyntaxKind) -> bool {
    kind >= SyntaxKind::FIRST_KEYWORD && kind <= SyntaxKind::LAST_KEYWORD
}

/// True for words that can never be used as a plain identifier.
#[inline]
pub fn token_is_reserved_word(kind: SyntaxKind) -> bool {
    kind >= SyntaxKind::FIRST_RESERVED_WORD && kind <= SyntaxKind::LAST_RESERVED_WORD
}

/// True for tokens usable as a binding name (identifiers and non-reserved keywords).
#[inline]
pub fn token_is_identifier(kind: SyntaxKind) -> bool {
    kind == SyntaxKind::Identifier || (token_is_keyword(kind) && !token_is_reserved_word(kind))
}

/// True for tokens usable as a property name (identifiers and every keyword).
#[inline]
pub fn token_is_identifier_or_keyword(kind: SyntaxKind) -> bool {
    kind == SyntaxKind::Identifier || token_is_keyword(kind)
}

/// Keywords that name a primitive type in type position.
pub fn token_is_type_keyword(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        AnyKeyword
            | UnknownKeyword
            | NumberKeyword
            | BigIntKeyword
            | ObjectKeyword
            | BooleanKeyword
            | StringKeyword
            | SymbolKeyword
            | VoidKeyword
            | UndefinedKeyword
            | NullKeyword
            | NeverKeyword
            | IntrinsicKeyword
    )
}

/// Declaration modifiers recognised in statement and member position.
pub fn token_is_modifier(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        ExportKeyword
            | DefaultKeyword
            | DeclareKeyword
            | AbstractKeyword
            | ConstKeyword
            | PublicKeyword
            | PrivateKeyword
            | ProtectedKeyword
            | StaticKeyword
            | ReadonlyKeyword
            | OverrideKeyword
            | AccessorKeyword
            | AsyncKeyword
            | InKeyword
            | OutKeyword
    )
}
