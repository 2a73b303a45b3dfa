//! Property-based tests for escaping, identifier synthesis and scope tracking

use proptest::prelude::*;
use std::collections::HashSet;
use std::path::PathBuf;

use rcdiff::model::ComponentFolder;
use rcdiff::rc::{escape_string, parse_str, tokenize, unescape_string, TokenKind};

/// Control keywords that take a leading text argument
const CONTROL_KEYWORDS: &[&str] = &["LTEXT", "RTEXT", "CTEXT", "GROUPBOX", "PUSHBUTTON", "CHECKBOX"];

/// Identifiers including the degenerate ones
fn identifier_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("-1".to_string()),
        Just("IDC_STATIC".to_string()),
        "IDC_[A-C]{1,2}",
    ]
}

fn control_strategy() -> impl Strategy<Value = (String, String)> {
    (prop::sample::select(CONTROL_KEYWORDS), identifier_strategy())
        .prop_map(|(keyword, id)| (keyword.to_string(), id))
}

fn dialog_source(controls: &[(String, String)]) -> String {
    let mut source = String::from("IDD_TEST DIALOG 0, 0, 100, 100\nBEGIN\n");
    for (i, (keyword, id)) in controls.iter().enumerate() {
        source.push_str(&format!("    {} \"text {}\", {}, 0, {}, 10, 10\n", keyword, i, id, i));
    }
    source.push_str("END\n");
    source
}

/// Nested BEGIN/END blocks with filler tokens
fn balanced_blocks() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![Just("1".to_string()), Just("\"s\"".to_string()), Just("X,".to_string())];
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop::collection::vec(inner, 0..4).prop_map(|items| format!("BEGIN {} END", items.join(" ")))
    })
}

proptest! {
    #[test]
    fn test_escape_round_trip(text in any::<String>()) {
        let literal = escape_string(&text);
        let tokens = tokenize(&literal).unwrap();
        prop_assert_eq!(tokens.len(), 1);
        prop_assert_eq!(tokens[0].kind, TokenKind::String);
        prop_assert_eq!(unescape_string(&tokens[0]), text);
    }

    #[test]
    fn test_synthesized_ids_are_unique(controls in prop::collection::vec(control_strategy(), 1..20)) {
        let source = dialog_source(&controls);
        let mut folder = ComponentFolder::new("/p", "/p/c");
        folder.add_source(PathBuf::from("/p/c/en-US.rc"), &source);
        folder.compare();

        prop_assert!(folder.failures.is_empty());
        // dialog plus every control
        prop_assert_eq!(folder.references.len(), controls.len() + 1);
        let ids: HashSet<&str> = folder.references.iter().map(|r| r.id.as_str()).collect();
        prop_assert_eq!(ids.len(), folder.references.len());
    }

    #[test]
    fn test_balanced_input_closes_every_scope(blocks in prop::collection::vec(balanced_blocks(), 0..4)) {
        let source = format!("1 RCDATA {}\nSTRINGTABLE {{ IDS_A \"a\" }}", blocks.join("\n"));
        let script = parse_str(&source).unwrap();
        prop_assert_eq!(script.unclosed_scopes, 0);
        prop_assert_eq!(script.definitions().count(), 1);
    }
}
