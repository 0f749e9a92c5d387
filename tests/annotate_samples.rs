//! Integration tests for the annotate transform

use rstest::rstest;
use std::fs;
use typeshift::{convert_str, convert_str_with, ConvertOptions, Direction};

fn annotate(source: &str) -> String {
    convert_str(Direction::AddPlaceholders, source).expect("source to convert")
}

#[rstest]
#[case::function("function add(a, b) { return a + b; }", "function add(a: any, b: any): any { return a + b; }")]
#[case::declaration("let x = 5;", "let x: any = 5;")]
#[case::no_parameters("function now() { return 1; }", "function now(): any { return 1; }")]
#[case::generator("function* gen(n) {}", "function* gen(n: any): any {}")]
#[case::anonymous("run(function (e) { log(e); });", "run(function (e: any): any { log(e); });")]
#[case::async_arrow("const load = async (url) => fetch(url);", "const load: any = async (url: any): any => fetch(url);")]
#[case::destructured_declaration("const { a, b } = obj;", "const { a, b }: any = obj;")]
#[case::loop_binding("for (let i = 0; i < n; i++) {}", "for (let i: any = 0; i < n; i++) {}")]
#[case::call_untouched("console.log(a, b);", "console.log(a, b);")]
fn test_annotate(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(annotate(source), expected);
}

#[test]
fn test_person_sample() {
    let source = fs::read_to_string("tests/samples/person.js").expect("sample to exist");
    let output = annotate(&source);

    assert_eq!(output.lines().count(), source.lines().count());
    insta::assert_snapshot!(output, @r"
    class Person {
        constructor(name: any, age: any) {
            this.name = name;
            this.age = age;
        }

        greet(message: any): any {
            return `${message}, I'm ${this.name}`;
        }

        birthday(): any {
            this.age += 1;
        }
    }

    function sum(x: any, y: any): any {
        return x + y
    }

    const multiply: any = (x: any, y: any): any => x * y;

    const variable: any = 7;
    ");
}

#[test]
fn test_annotated_output_strips_back() {
    let source = fs::read_to_string("tests/samples/person.js").expect("sample to exist");
    let typed = annotate(&source);
    let untyped = convert_str(Direction::StripTypes, &typed).expect("typed output to strip");
    assert_eq!(untyped, source);
}

#[test]
fn test_configured_placeholder() {
    let options = ConvertOptions {
        placeholder: "unknown".to_string(),
    };
    let output =
        convert_str_with(Direction::AddPlaceholders, "const f = (a) => a;", &options).unwrap();
    assert_eq!(output, "const f: unknown = (a: unknown): unknown => a;");
}
