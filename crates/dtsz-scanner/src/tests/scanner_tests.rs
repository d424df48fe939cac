use crate::{ScannerState, SyntaxKind, keyword_to_text, skip_trivia, text_to_keyword};

fn tokens(source: &str) -> Vec<(SyntaxKind, String)> {
    let mut scanner = ScannerState::new(source);
    let mut out = Vec::new();
    loop {
        let kind = scanner.scan();
        if kind == SyntaxKind::EndOfFileToken {
            break;
        }
        out.push((kind, scanner.get_token_text().to_string()));
    }
    out
}

#[test]
fn test_scans_declaration_tokens() {
    let kinds: Vec<SyntaxKind> = tokens("export declare function f<T>(x?: T[]): Foo.Bar;")
        .into_iter()
        .map(|(kind, _)| kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            SyntaxKind::ExportKeyword,
            SyntaxKind::DeclareKeyword,
            SyntaxKind::FunctionKeyword,
            SyntaxKind::Identifier,
            SyntaxKind::LessThanToken,
            SyntaxKind::Identifier,
            SyntaxKind::GreaterThanToken,
            SyntaxKind::OpenParenToken,
            SyntaxKind::Identifier,
            SyntaxKind::QuestionToken,
            SyntaxKind::ColonToken,
            SyntaxKind::Identifier,
            SyntaxKind::OpenBracketToken,
            SyntaxKind::CloseBracketToken,
            SyntaxKind::CloseParenToken,
            SyntaxKind::ColonToken,
            SyntaxKind::Identifier,
            SyntaxKind::DotToken,
            SyntaxKind::Identifier,
            SyntaxKind::SemicolonToken,
        ]
    );
}

#[test]
fn test_greater_than_is_never_combined() {
    let kinds: Vec<SyntaxKind> = tokens("A<B<C>>").into_iter().map(|(k, _)| k).collect();
    assert_eq!(
        &kinds[5..],
        &[SyntaxKind::GreaterThanToken, SyntaxKind::GreaterThanToken]
    );
}

#[test]
fn test_comments_and_line_breaks() {
    let mut scanner = ScannerState::new("/** doc */ interface\n// trailing\nX");
    assert_eq!(scanner.scan(), SyntaxKind::InterfaceKeyword);
    assert_eq!(scanner.get_token_start(), 11);
    assert!(!scanner.has_preceding_line_break());
    assert_eq!(scanner.scan(), SyntaxKind::Identifier);
    assert!(scanner.has_preceding_line_break());
    assert_eq!(scanner.get_token_value_ref(), "X");
}

#[test]
fn test_string_literal_value_is_cooked() {
    let mut scanner = ScannerState::new(r#"'a\'b' "A""#);
    assert_eq!(scanner.scan(), SyntaxKind::StringLiteral);
    assert_eq!(scanner.get_token_value_ref(), "a'b");
    assert_eq!(scanner.scan(), SyntaxKind::StringLiteral);
    assert_eq!(scanner.get_token_value_ref(), "A");
}

#[test]
fn test_unterminated_string_reports_diagnostic() {
    let mut scanner = ScannerState::new("'abc\nnext");
    assert_eq!(scanner.scan(), SyntaxKind::StringLiteral);
    assert!(scanner.is_unterminated());
    assert_eq!(scanner.get_diagnostics().len(), 1);
    assert_eq!(scanner.get_diagnostics()[0].code, 1002);
}

#[test]
fn test_template_literal_rescan() {
    let mut scanner = ScannerState::new("`a${B}c`");
    assert_eq!(scanner.scan(), SyntaxKind::TemplateHead);
    assert_eq!(scanner.get_token_value_ref(), "a");
    assert_eq!(scanner.scan(), SyntaxKind::Identifier);
    assert_eq!(scanner.scan(), SyntaxKind::CloseBraceToken);
    assert_eq!(scanner.re_scan_template_token(), SyntaxKind::TemplateTail);
    assert_eq!(scanner.get_token_value_ref(), "c");
    assert_eq!(scanner.scan(), SyntaxKind::EndOfFileToken);
}

#[test]
fn test_numbers_and_private_names() {
    let toks = tokens("0x1F 1_000n 1.5e-3 #secret");
    assert_eq!(toks[0].0, SyntaxKind::NumericLiteral);
    assert_eq!(toks[1], (SyntaxKind::BigIntLiteral, "1_000n".to_string()));
    assert_eq!(toks[2], (SyntaxKind::NumericLiteral, "1.5e-3".to_string()));
    assert_eq!(toks[3], (SyntaxKind::PrivateIdentifier, "#secret".to_string()));
}

#[test]
fn test_invalid_character_is_reported() {
    let mut scanner = ScannerState::new("\\");
    assert_eq!(scanner.scan(), SyntaxKind::Unknown);
    assert_eq!(scanner.get_diagnostics()[0].code, 1127);
}

#[test]
fn test_save_and_restore_state() {
    let mut scanner = ScannerState::new("a b c");
    scanner.scan();
    let snapshot = scanner.save_state();
    scanner.scan();
    scanner.scan();
    scanner.restore_state(snapshot);
    assert_eq!(scanner.get_token_value_ref(), "a");
    scanner.scan();
    assert_eq!(scanner.get_token_value_ref(), "b");
}

#[test]
fn test_keyword_tables_agree() {
    for word in ["namespace", "declare", "typeof", "keyof", "global"] {
        let kind = text_to_keyword(word).unwrap();
        assert_eq!(keyword_to_text(kind), Some(word));
    }
    assert_eq!(keyword_to_text(SyntaxKind::DotDotDotToken), Some("..."));
    assert_eq!(text_to_keyword("Foo"), None);
}

#[test]
fn test_skip_trivia_helper() {
    let text = "export  /* c */ declare";
    assert_eq!(skip_trivia(text, 6), 16);
    assert_eq!(skip_trivia(text, text.len()), text.len());
}
