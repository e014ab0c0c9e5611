//! Pest dialect tests
//!
//! Verifies synthetic suite names, describe nesting, fluent chain markers
//! and data sets from `->with()`.

use phptest::{TestDefinition, TestParser, TestType};
use std::path::Path;

const PROJECT_ROOT: &str = "/project";
const EXAMPLE_PATH: &str = "/project/tests/Feature/ExampleTest.php";
const CLASS_ID: &str = "P\\Tests\\Feature\\ExampleTest";

fn parse_example() -> Vec<TestDefinition> {
    let fixture = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/php/pest/ExampleTest.php");
    let code = std::fs::read_to_string(fixture).unwrap();
    let mut parser = TestParser::new().unwrap().with_root(PROJECT_ROOT);
    parser
        .parse(&code, EXAMPLE_PATH)
        .expect("Pest file should contain tests")
}

fn method_id(method: &str) -> String {
    format!("{CLASS_ID}::{method}")
}

#[test]
fn test_pest_synthetic_suite() {
    println!("\n=== Testing Pest Synthetic Suite ===");

    let tests = parse_example();

    assert_eq!(tests.len(), 1);
    let namespace = &tests[0];
    println!("  namespace: {}", namespace.id);
    assert_eq!(namespace.test_type, TestType::Namespace);
    assert_eq!(namespace.id, "P\\Tests\\Feature");

    let suite = &namespace.children[0];
    assert_eq!(suite.test_type, TestType::Class);
    assert_eq!(suite.id, CLASS_ID);
    assert_eq!(suite.label, "ExampleTest");

    let labels: Vec<_> = suite.children.iter().map(|t| t.label.as_str()).collect();
    println!("  top level: {labels:?}");
    assert_eq!(
        labels,
        vec![
            "basic example",
            "it has a name",
            "it adds numbers",
            "math",
            "it is pending",
            "skipped one",
            "arch app",
        ],
        "hooks and empty describe blocks are not tests"
    );

    println!("✓ Suite named after the file path");
}

#[test]
fn test_pest_describe_nesting() {
    println!("\n=== Testing Pest Describe Nesting ===");

    let tests = parse_example();
    let suite = &tests[0].children[0];

    let math = suite.find(&method_id("`math`")).expect("describe block");
    assert_eq!(math.test_type, TestType::Describe);
    assert_eq!(math.label, "math");
    assert_eq!(math.depth, 2);

    let ids: Vec<_> = math.iter().map(|t| t.id.clone()).collect();
    println!("  describe subtree: {ids:#?}");
    assert_eq!(
        ids,
        vec![
            method_id("`math`"),
            method_id("`math` → sum"),
            method_id("`math` → `nested`"),
            method_id("`math` → `nested` → it divides"),
        ]
    );

    let divides = math
        .find(&method_id("`math` → `nested` → it divides"))
        .unwrap();
    assert_eq!(divides.test_type, TestType::Method);
    assert_eq!(divides.label, "it divides");
    assert_eq!(divides.depth, 4);

    println!("✓ Describe blocks nest their tests");
}

#[test]
fn test_pest_fluent_chain_markers() {
    println!("\n=== Testing Pest Fluent Chains ===");

    let tests = parse_example();
    let suite = &tests[0].children[0];

    let named = suite.find(&method_id("it has a name")).unwrap();
    assert_eq!(named.annotations.group, vec!["models"]);

    let adds = suite.find(&method_id("it adds numbers")).unwrap();
    assert_eq!(adds.annotations.test_with, vec!["[1, 2]", "[3, 4]"]);
    let data_sets: Vec<_> = adds.children.iter().map(|d| d.label.as_str()).collect();
    println!("  data sets: {data_sets:?}");
    assert_eq!(
        data_sets,
        vec!["with data set \"(1, 2)\"", "with data set \"(3, 4)\""],
        "inline rows are named the way Pest names them"
    );
    assert_eq!(
        adds.children[1].id,
        method_id("it adds numbers with data set \"(3, 4)\"")
    );

    let pending = suite.find(&method_id("it is pending")).unwrap();
    assert!(pending.annotations.incomplete, "a test without closure is incomplete");

    let skipped = suite.find(&method_id("skipped one")).unwrap();
    assert!(skipped.annotations.skipped);

    let arch = suite.find(&method_id("arch app")).unwrap();
    assert!(!arch.annotations.incomplete, "arch tests need no closure");

    println!("✓ Chained calls become annotations");
}

#[test]
fn test_pest_file_outside_root() {
    println!("\n=== Testing Pest File Outside Root ===");

    let code = "<?php\n\ntest('works', function () {\n    expect(1)->toBe(1);\n});\n";
    let mut parser = TestParser::new().unwrap().with_root("/project");
    let tests = parser.parse(code, "/elsewhere/SmokeTest.php").unwrap();

    assert_eq!(tests[0].id, "P");
    assert_eq!(tests[0].children[0].id, "P\\SmokeTest");
    assert_eq!(tests[0].children[0].children[0].id, "P\\SmokeTest::works");

    println!("✓ Falls back to the file stem");
}

#[test]
fn test_pest_suite_ignores_path_spelling() {
    println!("\n=== Testing Pest Path Spellings ===");

    let code = "<?php\n\ntest('works', function () {\n    expect(1)->toBe(1);\n});\n";
    let cwd = std::env::current_dir().unwrap();
    let absolute = cwd.join("tests/Unit/SmokeTest.php");

    for root in [Path::new("."), cwd.as_path()] {
        let mut parser = TestParser::new().unwrap().with_root(root);
        for file in [
            Path::new("tests/Unit/SmokeTest.php"),
            Path::new("./tests/Unit/SmokeTest.php"),
            absolute.as_path(),
        ] {
            let tests = parser.parse(code, file).unwrap();
            let ids: Vec<_> = tests[0].iter().map(|t| t.id.as_str()).collect();
            println!("  {} from {}: {ids:?}", file.display(), root.display());
            assert_eq!(
                ids,
                vec![
                    "P\\Tests\\Unit",
                    "P\\Tests\\Unit\\SmokeTest",
                    "P\\Tests\\Unit\\SmokeTest::works"
                ],
                "root={root:?} file={file:?}"
            );
        }
    }

    println!("✓ Relative, dotted and absolute paths agree");
}

#[test]
fn test_pest_keyed_dataset_rows() {
    println!("\n=== Testing Pest Keyed Dataset Rows ===");

    let code = r#"<?php

it('logs in', function (string $role) {
    expect($role)->not->toBeEmpty();
})->with(['admin' => ['admin'], 'guest' => ['guest']]);
"#;
    let mut parser = TestParser::new().unwrap().with_root("/project");
    let tests = parser.parse(code, "/project/tests/LoginTest.php").unwrap();
    let test = tests[0].find("P\\Tests\\LoginTest::it logs in").unwrap();

    let labels: Vec<_> = test.children.iter().map(|d| d.label.as_str()).collect();
    println!("  data sets: {labels:?}");
    assert_eq!(
        labels,
        vec![
            "with data set \"dataset \"admin\"\"",
            "with data set \"dataset \"guest\"\""
        ]
    );

    println!("✓ Keyed rows are named after their key");
}

#[test]
fn test_pest_only_hooks_is_not_a_test_file() {
    println!("\n=== Testing Pest File Without Tests ===");

    let code = "<?php\n\nbeforeEach(function () {\n    $this->ready = true;\n});\n\ndescribe('nothing', function () {\n});\n";
    let mut parser = TestParser::new().unwrap();
    assert!(parser.parse(code, "tests/HooksTest.php").is_none());

    println!("✓ Hooks alone yield no tests");
}
