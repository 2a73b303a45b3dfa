use rcdiff::rc::ast::{ResourceStatement, TranslationEntry};
use rcdiff::rc::{parse_str, DiagnosticKind, ParseError, TokenKind};

const SAMPLE: &str = r#"// Microsoft Visual C++ generated resource script.
//
#include "resource.h"

#define APSTUDIO_READONLY_SYMBOLS
#include "winres.h"
#undef APSTUDIO_READONLY_SYMBOLS

/////////////////////////////////////////////////////////////////////////////
// English (United States) resources

#if !defined(AFX_RESOURCE_DLL) || defined(AFX_TARG_ENU)
LANGUAGE LANG_ENGLISH, SUBLANG_ENGLISH_US
#pragma code_page(1252)

IDI_APP                 ICON                    "res\\app.ico"

IDR_MAINFRAME MENU DISCARDABLE
BEGIN
    POPUP "&File"
    BEGIN
        MENUITEM "&New\tCtrl+N",                ID_FILE_NEW
        MENUITEM SEPARATOR
        MENUITEM "E&xit",                       ID_APP_EXIT
    END
    POPUP "&Help"
    BEGIN
        MENUITEM "&About...",                   ID_APP_ABOUT
    END
END

IDD_ABOUTBOX DIALOGEX 0, 0, 170, 62
STYLE DS_SETFONT | DS_MODALFRAME | DS_FIXEDSYS | WS_POPUP | WS_CAPTION | WS_SYSMENU
CAPTION "About Sample"
FONT 8, "MS Shell Dlg", 0, 0, 0x1
BEGIN
    ICON            IDR_MAINFRAME,IDC_STATIC,14,14,21,20
    LTEXT           "Sample, Version 1.0",IDC_STATIC,42,14,114,8,SS_NOPREFIX
    LTEXT           "Copyright (C) 2024",IDC_STATIC,42,26,114,8
    DEFPUSHBUTTON   "OK",IDOK,113,41,50,14,WS_GROUP
    CONTROL         "",IDC_SPIN,"msctls_updown32",UDS_ARROWKEYS,100,10,10,14
END

1 VERSIONINFO
 FILEVERSION 1,0,0,1
 PRODUCTVERSION 1,0,0,1
BEGIN
    BLOCK "StringFileInfo"
    BEGIN
        BLOCK "040904b0"
        BEGIN
            VALUE "FileDescription", "Sample"
        END
    END
END

STRINGTABLE
BEGIN
    IDS_APP_TITLE           "Sample"
    IDS_GREETING            "Say ""hello""\nto everyone"
END

#endif    // English (United States) resources
"#;

#[test]
fn test_parse_realistic_script() {
    let script = parse_str(SAMPLE).unwrap();
    assert_eq!(script.unclosed_scopes, 0);
    assert!(script
        .diagnostics
        .iter()
        .all(|d| d.kind == DiagnosticKind::UnrecognizedTopLevelStatement));

    let kinds: Vec<&str> = script
        .definitions()
        .map(|s| match s {
            ResourceStatement::Language(_) => "language",
            ResourceStatement::Menu(_) => "menu",
            ResourceStatement::Dialog(_) => "dialog",
            ResourceStatement::StringTable(_) => "strings",
            ResourceStatement::Recovery(_) => "recovery",
        })
        .collect();
    assert_eq!(kinds, vec!["language", "menu", "dialog", "strings"]);
}

#[test]
fn test_menu_and_dialog_contents() {
    let script = parse_str(SAMPLE).unwrap();
    let mut defs = script.definitions();
    defs.next();

    let menu = match defs.next() {
        Some(ResourceStatement::Menu(menu)) => menu,
        other => panic!("expected menu, got {:?}", other),
    };
    assert_eq!(menu.items.len(), 2);
    let file = &menu.items[0];
    assert_eq!(file.children.len(), 3);
    assert_eq!(
        rcdiff::rc::unescape_string(file.children[0].text_value().unwrap()),
        "&New\tCtrl+N"
    );

    let dialog = match defs.next() {
        Some(ResourceStatement::Dialog(dialog)) => dialog,
        other => panic!("expected dialog, got {:?}", other),
    };
    assert_eq!(dialog.controls.len(), 5);
    assert_eq!(dialog.controls[0].entry_type.kind, TokenKind::Icon);
    assert_eq!(dialog.controls[1].style.as_ref().unwrap().process(), "SS_NOPREFIX");
    assert_eq!(dialog.controls[3].identifier.process(), "IDOK");
    assert_eq!(dialog.controls[3].control_class, "BUTTON");
    assert_eq!(dialog.controls[4].control_class, "msctls_updown32");
    assert_eq!(dialog.controls[4].style.as_ref().unwrap().process(), "UDS_ARROWKEYS");
}

#[test]
fn test_doubled_quotes_in_string_table() {
    let script = parse_str(SAMPLE).unwrap();
    let table = script
        .definitions()
        .find_map(|s| match s {
            ResourceStatement::StringTable(t) => Some(t),
            _ => None,
        })
        .unwrap();
    assert_eq!(
        rcdiff::rc::unescape_string(&table.entries[1].text),
        "Say \"hello\"\nto everyone"
    );
}

#[test]
fn test_balanced_nesting_leaves_empty_stack() {
    let source = "1 RCDATA BEGIN BEGIN { } END { BEGIN END } END\nSTRINGTABLE { IDS_A \"a\" }";
    let script = parse_str(source).unwrap();
    assert_eq!(script.unclosed_scopes, 0);
    assert!(script
        .diagnostics
        .iter()
        .all(|d| d.kind != DiagnosticKind::UnbalancedScopeClose));
}

#[test]
fn test_lexical_errors_carry_positions() {
    let err = parse_str("STRINGTABLE\nBEGIN\n  IDS_A \"a\" @\nEND").unwrap_err();
    assert!(err.is_lexical());
    assert_eq!(err.position().line, 3);
    assert!(matches!(err, ParseError::UnexpectedCharacter { found: '@', .. }));

    let err = parse_str("IDD_X DIALOG 0, 0, 1.e, 5 BEGIN END").unwrap_err();
    assert!(matches!(err, ParseError::MalformedNumericLiteral { .. }));
}

#[test]
fn test_unexpected_token_message() {
    let err = parse_str("IDM_X MENU BEGIN MENUITEM 42 END").unwrap_err();
    assert!(!err.is_lexical());
    let message = err.to_string();
    assert!(message.starts_with("[Line 1:"), "{}", message);
    assert!(message.contains("string"), "{}", message);
}
