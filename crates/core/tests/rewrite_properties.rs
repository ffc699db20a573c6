//! Behavioural properties of the rewriter, exercised through parsed sources.

use envcond_core::ast::{self, ExprKind, ItemKind, Pattern};
use envcond_core::{
    parse_source, print_structure, rewrite_source, rewrite_structure, Error, MapEnvironment,
    RewriteOptions, Structure,
};

fn compact() -> RewriteOptions {
    RewriteOptions {
        keep_placeholders: false,
        ..RewriteOptions::default()
    }
}

fn rewrite(src: &str, env: &MapEnvironment) -> Structure {
    rewrite_source(src, "props.ml", env, &compact()).unwrap()
}

/// Rewritten output compared against an expected source, ignoring locations.
fn assert_rewrites_to(src: &str, env: &MapEnvironment, expected: &str) {
    let got = rewrite(src, env);
    let want = parse_source(expected, "expected.ml").unwrap();
    assert_eq!(
        ast::without_locs(&got),
        ast::without_locs(&want),
        "\n--- got\n{}\n--- want\n{}",
        print_structure(&got),
        expected
    );
}

#[test]
fn tree_without_markers_is_unchanged() {
    let src = r#"
type shape = | Circle of int | Square of int * int
let area s = match s with | Circle r -> 3 * r * r | Square (w, h) -> w * h
module Util = struct
  let twice f x = f (f x)
  let names = ["a"; "b"]
end
"#;
    let parsed = parse_source(src, "props.ml").unwrap();
    let rewritten = rewrite_structure(parsed.clone(), &MapEnvironment::new(), &RewriteOptions::default())
        .unwrap();
    assert_eq!(rewritten, parsed);
}

#[test]
fn rewriting_twice_changes_nothing() {
    let src = r#"
[%%IFDEF DEBUG]
let level = 3
[%%ELSE]
let level = 0
[%%END]
let home = [%GETENV HOME]
type t = | A [@IFDEF DEBUG] | B [@IFNDEF DEBUG]
"#;
    let env = MapEnvironment::new().with("HOME", "/home/ada");
    let once = rewrite(src, &env);
    let twice = rewrite_structure(once.clone(), &env, &compact()).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn ifdef_without_else_keeps_or_suppresses() {
    let src = "[%%IFDEF X]\nlet a = 1\n[%%END]\nlet b = 2\n";
    assert_rewrites_to(src, &MapEnvironment::new().with("X", "1"), "let a = 1\nlet b = 2");
    assert_rewrites_to(src, &MapEnvironment::new(), "let b = 2");
}

#[test]
fn empty_value_counts_as_undefined() {
    let src = "[%%IFDEF X]\nlet a = 1\n[%%ELSE]\nlet a = 2\n[%%END]\n";
    assert_rewrites_to(src, &MapEnvironment::new().with("X", ""), "let a = 2");
}

#[test]
fn else_branch_selected_when_undefined() {
    let src = "[%%IFDEF X]\nlet a = 1\n[%%ELSE]\nlet b = 2\n[%%END]\n";
    assert_rewrites_to(src, &MapEnvironment::new(), "let b = 2");
    assert_rewrites_to(src, &MapEnvironment::new().with("X", "yes"), "let a = 1");
}

#[test]
fn nested_blocks_follow_innermost_state() {
    let src = r#"
[%%IFDEF OUTER]
let o = 1
[%%IFDEF INNER]
let i = 2
[%%ELSE]
let j = 3
[%%END]
let p = 4
[%%END]
"#;
    let both = MapEnvironment::new().with("OUTER", "1").with("INNER", "1");
    assert_rewrites_to(src, &both, "let o = 1\nlet i = 2\nlet p = 4");

    let outer_only = MapEnvironment::new().with("OUTER", "1");
    assert_rewrites_to(src, &outer_only, "let o = 1\nlet j = 3\nlet p = 4");
}

#[test]
fn innermost_block_alone_decides_liveness() {
    let src = r#"
[%%IFDEF OUTER]
[%%IFDEF INNER]
let i = 1
[%%ELSE]
let j = 2
[%%END]
let o = 3
[%%END]
let k = 4
"#;
    assert_rewrites_to(src, &MapEnvironment::new(), "let j = 2\nlet k = 4");
    assert_rewrites_to(src, &MapEnvironment::new().with("INNER", "1"), "let i = 1\nlet k = 4");
}

#[test]
fn block_spans_a_module_boundary() {
    let src = r#"
[%%IFDEF X]
let a = 1
module M = struct
  let b = 2
  [%%END]
  let c = 3
end
"#;
    assert_rewrites_to(
        src,
        &MapEnvironment::new().with("X", "1"),
        "let a = 1\nmodule M = struct\n  let b = 2\n  let c = 3\nend",
    );
}

#[test]
fn block_opened_in_module_governs_following_items() {
    let src = r#"
module M = struct
  let a = 1
  [%%IFDEF X]
  let b = 2
end
let c = 3
[%%END]
let d = 4
"#;
    assert_rewrites_to(
        src,
        &MapEnvironment::new(),
        "module M = struct\n  let a = 1\nend\nlet d = 4",
    );
}

#[test]
fn placeholders_keep_item_count() {
    let src = "[%%IFDEF X]\nlet a = 1\n[%%END]\nlet b = 2\n";
    let out = rewrite_source(src, "p.ml", &MapEnvironment::new(), &RewriteOptions::default()).unwrap();
    assert_eq!(out.len(), 4);
    assert!(out[..3].iter().all(|i| i.is_empty()));
    assert_eq!(print_structure(&out), "let b = 2\n");
}

#[test]
fn standalone_end_is_unmatched() {
    let err = rewrite_source(
        "let a = 1\n\n[%%END]\n",
        "stray.ml",
        &MapEnvironment::new(),
        &RewriteOptions::default(),
    )
    .unwrap_err();
    match &err {
        Error::UnmatchedDirective { loc, directive } => {
            assert_eq!(loc.line, 3);
            assert_eq!(directive, "END");
        }
        other => panic!("expected unmatched directive, got {:?}", other),
    }
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn standalone_else_is_unmatched() {
    let err = rewrite_source("[%%ELSE]\n", "stray.ml", &MapEnvironment::new(), &RewriteOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::UnmatchedDirective { ref directive, .. } if directive == "ELSE"));
}

#[test]
fn malformed_ifdef_argument_is_rejected() {
    for src in [
        "[%%IFDEF]\n[%%END]\n",
        "[%%IFDEF \"X\"]\n[%%END]\n",
        "[%%IFDEF A.B]\n[%%END]\n",
        "[%%IFDEF f x]\n[%%END]\n",
    ] {
        let err = rewrite_source(src, "bad.ml", &MapEnvironment::new(), &RewriteOptions::default())
            .unwrap_err();
        assert!(
            matches!(err, Error::MalformedArgument { ref directive, .. } if directive == "IFDEF"),
            "{:?} gave {:?}",
            src,
            err
        );
    }
}

#[test]
fn getenv_resolves_at_any_depth() {
    let src = r#"
let config =
  let base = [%GETENV PREFIX] in
  match mode with
  | Some m -> (base, [m; [%GETENV SUFFIX]])
  | None -> (base, [])
module Inner = struct
  let f = fun x -> x ^ [%GETENV PREFIX]
end
"#;
    let env = MapEnvironment::new().with("PREFIX", "pre");
    let expected = r#"
let config =
  let base = "pre" in
  match mode with
  | Some m -> (base, [m; ""])
  | None -> (base, [])
module Inner = struct
  let f = fun x -> x ^ "pre"
end
"#;
    assert_rewrites_to(src, &env, expected);
}

#[test]
fn variant_constructors_filtered_by_attributes() {
    let src = "type t =\n  | A [@IFDEF X]\n  | B [@IFNDEF X]\n  | C\n";
    assert_rewrites_to(src, &MapEnvironment::new(), "type t = | B | C");
    assert_rewrites_to(src, &MapEnvironment::new().with("X", "1"), "type t = | A | C");
}

#[test]
fn match_guard_keeps_or_drops_case() {
    let src = r#"
let describe v = match v with
  | 0 when [%IFDEF VERBOSE] -> "zero, verbosely"
  | 0 -> "zero"
  | _ -> "other"
"#;
    let env = MapEnvironment::new();
    let out = rewrite(src, &env);
    let ItemKind::Let { body, .. } = &out[0].kind else {
        panic!("expected let item");
    };
    let ExprKind::Match { cases, .. } = &body.kind else {
        panic!("expected match");
    };
    assert_eq!(cases.len(), 2);
    assert_eq!(cases[0].pattern, Pattern::Int(0));
    assert_eq!(cases[0].body.kind, ExprKind::Str("zero".into()));

    let verbose = MapEnvironment::new().with("VERBOSE", "1");
    let expected = r#"
let describe v = match v with
  | 0 -> "zero, verbosely"
  | 0 -> "zero"
  | _ -> "other"
"#;
    assert_rewrites_to(src, &verbose, expected);
}

#[test]
fn suppressed_region_is_not_inspected() {
    let src = "[%%IFDEF X]\nlet a = [%GETENV A.b]\ntype t = | K [@IFDEF]\n[%%END]\n";
    let out = rewrite_source(src, "s.ml", &MapEnvironment::new(), &compact()).unwrap();
    assert!(out.is_empty());
}

#[test]
fn printed_output_parses_back_to_the_same_tree() {
    let src = r#"
[%%IFDEF A]
let a = (1, -2, "x\ny")
[%%END]
let g x y = x + y * 2 - (3 - 1)
let h = match f (g 1 2) with | Some (a, b) when a > b -> [a; b] | _ -> []
let nested = match x with | 1 -> (match y with | _ -> 0) | _ -> 1
module M = struct
  type t = | K of int list [@IFDEF A] [@deprecated]
end
"#;
    let env = MapEnvironment::new().with("A", "1");
    let out = rewrite(src, &env);
    let printed = print_structure(&out);
    let reparsed = parse_source(&printed, "printed.ml").unwrap();
    assert_eq!(ast::without_locs(&reparsed), ast::without_locs(&out), "{}", printed);
}

#[test]
fn variant_emptied_by_attributes_still_prints_as_source() {
    let src = "type t = | A [@IFDEF X]\nlet y = 1\n";
    let out = rewrite(src, &MapEnvironment::new());
    let ItemKind::Type { constructors, .. } = &out[0].kind else {
        panic!("expected type item");
    };
    assert!(constructors.is_empty());
    let printed = print_structure(&out);
    let reparsed = parse_source(&printed, "printed.ml").unwrap();
    assert_eq!(ast::without_locs(&reparsed), ast::without_locs(&out), "{}", printed);
}
