//! Property-based tests for both transforms
//!
//! Programs are assembled from statement fragments whose conversion is known to be clean,
//! joined by line breaks, so the properties hold for every combination proptest picks.

use proptest::prelude::*;
use typeshift::{convert_str, Direction};

fn strip(source: &str) -> String {
    convert_str(Direction::StripTypes, source).expect("source to convert")
}

fn annotate(source: &str) -> String {
    convert_str(Direction::AddPlaceholders, source).expect("source to convert")
}

const TYPED_FRAGMENTS: &[&str] = &[
    "let a: number = 1;",
    "function f(x: string): void { g(x); }",
    "interface I { a: number; b?: string }",
    "type T = string | number;",
    "const o = { k: 1, j: a ? b : c };",
    "class C implements I { private p: number = 0; }",
    "const id = <T>(v: T): T => v;",
    "switch (k) { case 1: go(); break; default: stop(); }",
    "export interface Props {\n  items: Array<string>;\n}",
    "let cb: (e: Event) => void = noop;",
];

const UNTYPED_FRAGMENTS: &[&str] = &[
    "let a = 1;",
    "function f(x) { return x * 2; }",
    "if (a < b) { swap(a, b); }",
    "const o = { k: 1, j: a ? b : c };",
    "// comment with: colon",
    "const s = 'it is: fine';",
    "const t = `sum: ${a + b}`;",
    "const r = /a:b/g.test(s);",
    "x = y / 2;",
    "let t = 1;   ",
    "outer: for (const k of ks) { continue outer; }",
];

const IMPORTS: &[&str] = &[
    "import { A } from './a';",
    "import B, { c as C } from \"../b\";",
    "import * as ns from 'ns';",
    "import './side-effect';",
    "import type { Shape } from './shape';",
];

const SEPARATORS: &[&str] = &["\n", "\n\n", "\n    ", "\r\n", "\n  \t\n\t"];

const DECLARATION_KEYWORDS: &[&str] = &["var", "let", "const"];

/// Fragments, each preceded by a line break and optional indentation
fn program(fragments: &'static [&'static str]) -> impl Strategy<Value = String> {
    prop::collection::vec(
        (prop::sample::select(SEPARATORS), prop::sample::select(fragments)),
        1..10,
    )
    .prop_map(|parts| {
        let mut source: String = parts
            .into_iter()
            .map(|(separator, fragment)| format!("{}{}", separator, fragment))
            .collect();
        source.push('\n');
        source
    })
}

fn identifier(prefix: &'static str) -> impl Strategy<Value = String> {
    "[a-z]{1,5}".prop_map(move |tail| format!("{}{}", prefix, tail))
}

proptest! {
    #[test]
    fn stripping_is_idempotent(source in program(TYPED_FRAGMENTS)) {
        let once = strip(&source);
        prop_assert_eq!(strip(&once), once);
    }

    #[test]
    fn stripping_keeps_line_count(source in program(TYPED_FRAGMENTS)) {
        let output = strip(&source);
        prop_assert_eq!(output.matches('\n').count(), source.matches('\n').count());
    }

    #[test]
    fn stripping_keeps_braces_balanced(source in program(TYPED_FRAGMENTS)) {
        let output = strip(&source);
        prop_assert_eq!(output.matches('{').count(), output.matches('}').count());
    }

    #[test]
    fn untyped_source_is_reproduced_exactly(source in program(UNTYPED_FRAGMENTS)) {
        prop_assert_eq!(strip(&source), source);
    }

    #[test]
    fn byte_order_mark_is_kept(source in program(UNTYPED_FRAGMENTS)) {
        let marked = format!("\u{feff}{}", source);
        prop_assert_eq!(strip(&marked), marked);
    }

    #[test]
    fn imports_pass_through_verbatim(
        imports in prop::collection::vec(prop::sample::select(IMPORTS), 1..5),
        body in program(TYPED_FRAGMENTS),
    ) {
        let header = imports.join("\n");
        let source = format!("{}{}", header, body);
        let output = strip(&source);
        prop_assert!(output.starts_with(&header), "imports changed:\n{}", output);
    }

    #[test]
    fn every_parameter_is_annotated(
        name in identifier("f_"),
        parameters in prop::collection::vec(identifier("p_"), 0..6),
    ) {
        let source = format!("function {}({}) {{ return 0; }}", name, parameters.join(", "));
        let annotated: Vec<String> = parameters.iter().map(|p| format!("{}: any", p)).collect();
        let expected = format!(
            "function {}({}): any {{ return 0; }}",
            name,
            annotated.join(", ")
        );
        prop_assert_eq!(annotate(&source), expected);
    }

    #[test]
    fn every_initialized_declaration_is_annotated(
        keyword in prop::sample::select(DECLARATION_KEYWORDS),
        name in identifier("v_"),
        value in 0u32..1000,
    ) {
        let source = format!("{} {} = {};", keyword, name, value);
        prop_assert_eq!(
            annotate(&source),
            format!("{} {}: any = {};", keyword, name, value)
        );
    }
}
