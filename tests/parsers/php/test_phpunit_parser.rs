//! PHPUnit dialect tests against fixture files
//!
//! Verifies class qualification, test method selection, docblock and
//! attribute markers, and namespace grouping.

use phptest::{TestDefinition, TestParser, TestType};
use std::path::{Path, PathBuf};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/php/phpunit")
        .join(name)
}

fn parse_fixture(name: &str) -> Vec<TestDefinition> {
    let path = fixture(name);
    let code = std::fs::read_to_string(&path).unwrap();
    let mut parser = TestParser::new().unwrap();
    parser
        .parse(&code, &path)
        .unwrap_or_else(|| panic!("{name} should contain tests"))
}

fn ids_of(tests: &[TestDefinition], test_type: TestType) -> Vec<String> {
    tests
        .iter()
        .flat_map(TestDefinition::iter)
        .filter(|test| test.test_type == test_type)
        .map(|test| test.id.clone())
        .collect()
}

#[test]
fn test_phpunit_namespaced_class() {
    println!("\n=== Testing PHPUnit Namespaced Test Case ===");

    let tests = parse_fixture("CalculatorTest.php");

    assert_eq!(tests.len(), 1, "one namespace root expected");
    let namespace = &tests[0];
    assert_eq!(namespace.test_type, TestType::Namespace);
    assert_eq!(namespace.id, "Tests\\Unit");
    assert_eq!(namespace.depth, 0);

    assert_eq!(namespace.children.len(), 1);
    let class = &namespace.children[0];
    println!("  class: {} (line {})", class.id, class.start.line);
    assert_eq!(class.test_type, TestType::Class);
    assert_eq!(class.id, "Tests\\Unit\\CalculatorTest");
    assert_eq!(class.label, "CalculatorTest");
    assert_eq!(class.qualified_class.as_deref(), Some("Tests\\Unit\\CalculatorTest"));
    assert_eq!(class.depth, 1);
    assert_eq!(class.start.line, 10, "class span starts at its declaration");

    let methods: Vec<_> = class.children.iter().map(|m| m.label.as_str()).collect();
    println!("  methods: {methods:?}");
    assert_eq!(
        methods,
        vec![
            "test_adds_numbers",
            "testAddsProvidedNumbers",
            "it_subtracts",
            "multiplies"
        ],
        "protected, static and private methods are not tests"
    );
    assert!(class.children.iter().all(|m| m.depth == 2));

    println!("✓ PHPUnit namespaced class extracted");
}

#[test]
fn test_phpunit_docblock_and_attribute_markers() {
    println!("\n=== Testing PHPUnit Markers ===");

    let tests = parse_fixture("CalculatorTest.php");
    let class = &tests[0].children[0];

    let provided = class
        .find("Tests\\Unit\\CalculatorTest::testAddsProvidedNumbers")
        .expect("data provider test");
    assert_eq!(provided.annotations.data_provider, vec!["additionProvider"]);
    assert_eq!(provided.annotations.test_with, vec!["[1, 1, 2]", "[2, 3, 5]"]);

    let data_sets: Vec<_> = provided.children.iter().map(|d| d.id.as_str()).collect();
    println!("  data sets: {data_sets:?}");
    assert_eq!(
        data_sets,
        vec![
            "Tests\\Unit\\CalculatorTest::testAddsProvidedNumbers with data set #0",
            "Tests\\Unit\\CalculatorTest::testAddsProvidedNumbers with data set #1",
        ]
    );
    assert!(
        provided
            .children
            .iter()
            .all(|d| d.test_type == TestType::DataSet && d.depth == 3)
    );

    // #[Test] and /** @test */ mark methods without the test prefix
    assert!(class.find("Tests\\Unit\\CalculatorTest::it_subtracts").is_some());
    assert!(class.find("Tests\\Unit\\CalculatorTest::multiplies").is_some());

    println!("✓ Docblock tags and attributes recognized");
}

#[test]
fn test_phpunit_local_hierarchy() {
    println!("\n=== Testing PHPUnit Class Hierarchy ===");

    let tests = parse_fixture("Hierarchy.php");

    let classes = ids_of(&tests, TestType::Class);
    println!("  classes: {classes:?}");
    assert_eq!(
        classes,
        vec!["OrderSpec"],
        "abstract bases and unrelated classes are skipped"
    );

    let order = &tests[0];
    assert_eq!(order.depth, 0, "classes without namespace are roots");
    assert_eq!(order.namespace, None);
    assert_eq!(ids_of(&tests, TestType::Method), vec!["OrderSpec::testTotals"]);

    println!("✓ Test case detected through an abstract base");
}

#[test]
fn test_phpunit_multiple_namespaces() {
    println!("\n=== Testing PHPUnit Bracketed Namespaces ===");

    let tests = parse_fixture("MultiNamespace.php");

    let namespaces: Vec<_> = tests.iter().map(|t| t.id.as_str()).collect();
    println!("  namespaces: {namespaces:?}");
    assert_eq!(namespaces, vec!["App\\Tests\\Models", "App\\Tests\\Http"]);
    assert!(tests.iter().all(|t| t.test_type == TestType::Namespace));

    assert_eq!(
        ids_of(&tests, TestType::Method),
        vec![
            "App\\Tests\\Models\\UserTest::testName",
            "App\\Tests\\Http\\RouteTest::testIndex",
            "App\\Tests\\Http\\RouteTest::testShow",
        ]
    );

    println!("✓ Each namespace block becomes its own root");
}

#[test]
fn test_phpunit_attribute_markers() {
    println!("\n=== Testing PHPUnit Attribute Markers ===");

    let tests = parse_fixture("AttributesCheck.php");
    let class = &tests[0].children[0];
    assert_eq!(
        class.id, "Tests\\Feature\\AttributesCheck",
        "extending an aliased TestCase qualifies the class"
    );

    let methods: Vec<_> = class.children.iter().map(|m| m.label.as_str()).collect();
    println!("  methods: {methods:?}");
    assert_eq!(
        methods,
        vec!["testProvided", "testSeed", "testChained", "sumsPairs"],
        "static providers are not tests"
    );

    let provided = class.find("Tests\\Feature\\AttributesCheck::testProvided").unwrap();
    assert_eq!(
        provided.annotations.data_provider,
        vec!["rows", "App\\Providers::more"],
        "external providers are recorded as Class::method"
    );
    assert!(provided.children.is_empty(), "providers are not expanded");

    let chained = class.find("Tests\\Feature\\AttributesCheck::testChained").unwrap();
    assert_eq!(
        chained.annotations.depends,
        vec!["testSeed", "Other::testRemote", "SetupCheck"]
    );
    assert_eq!(chained.annotations.group, vec!["chain"]);

    let pairs = class.find("Tests\\Feature\\AttributesCheck::sumsPairs").unwrap();
    assert_eq!(pairs.annotations.test_with, vec!["[1, 2]", "[3, 5]", "[8, 13]"]);
    let data_sets: Vec<_> = pairs.children.iter().map(|d| d.label.as_str()).collect();
    println!("  data sets: {data_sets:?}");
    assert_eq!(
        data_sets,
        vec!["with data set #0", "with data set #1", "with data set #2"]
    );
    assert!(
        pairs
            .children
            .iter()
            .all(|d| d.test_type == TestType::DataSet && d.depth == 3)
    );

    println!("✓ Attribute markers recorded and expanded");
}

#[test]
fn test_phpunit_same_short_name_in_two_namespaces() {
    println!("\n=== Testing PHPUnit Same Class Name Per Namespace ===");

    let code = r#"<?php
namespace A {
    class Base extends \PHPUnit\Framework\TestCase {}

    class Foo extends Base
    {
        public function testX(): void
        {
        }
    }
}

namespace B {
    class Base {}

    class Bar extends Base
    {
        public function testY(): void
        {
        }
    }
}
"#;
    let mut parser = TestParser::new().unwrap();
    let tests = parser
        .parse(code, "tests/Namespaces.php")
        .expect("A\\Foo extends a test case");

    let methods = ids_of(&tests, TestType::Method);
    println!("  methods: {methods:?}");
    assert_eq!(
        methods,
        vec!["A\\Foo::testX"],
        "B\\Base does not shadow A\\Base"
    );

    println!("✓ Parents resolved within their own namespace");
}

#[test]
fn test_phpunit_imports_are_scoped_to_their_namespace() {
    println!("\n=== Testing PHPUnit Import Scope ===");

    let code = r#"<?php
namespace A {
    use PHPUnit\Framework\TestCase as Base;

    class FirstCheck extends Base
    {
        public function testOne(): void
        {
        }
    }
}

namespace B {
    class SecondCheck extends Base
    {
        public function testTwo(): void
        {
        }
    }
}
"#;
    let mut parser = TestParser::new().unwrap();
    let tests = parser.parse(code, "tests/Scoped.php").unwrap();

    assert_eq!(
        ids_of(&tests, TestType::Method),
        vec!["A\\FirstCheck::testOne"],
        "an alias imported in A means nothing in B"
    );

    println!("✓ Imports stay inside their namespace block");
}

#[test]
fn test_phpunit_class_without_tests_is_ignored() {
    println!("\n=== Testing PHPUnit Class Without Tests ===");

    let code = r#"<?php
namespace Tests;

use PHPUnit\Framework\TestCase;

class EmptyTest extends TestCase
{
    protected function setUp(): void
    {
    }
}
"#;
    let mut parser = TestParser::new().unwrap();
    let result = parser.parse(code, "tests/EmptyTest.php");
    assert!(result.is_none(), "a test case without tests yields nothing");

    println!("✓ Empty test case ignored");
}

#[test]
fn test_phpunit_class_level_group_and_testdox() {
    println!("\n=== Testing PHPUnit Class Level Markers ===");

    let code = r#"<?php
use PHPUnit\Framework\Attributes\Group;
use PHPUnit\Framework\Attributes\TestDox;

#[Group('slow')]
#[TestDox('Invoice totals')]
class InvoiceChecks extends Checks
{
    #[TestDox('adds tax to the net amount')]
    public function testTax(): void
    {
    }

    /**
     * @depends testTax
     * @group regression
     */
    public function testRounding(): void
    {
    }
}
"#;
    let mut parser = TestParser::new().unwrap();
    let tests = parser.parse(code, "tests/InvoiceChecks.php").unwrap();

    let class = &tests[0];
    assert_eq!(class.id, "InvoiceChecks");
    assert_eq!(class.label, "Invoice totals", "class testdox becomes the label");
    assert_eq!(class.annotations.group, vec!["slow"]);
    assert_eq!(class.annotations.testdox, vec!["Invoice totals"]);

    let tax = class.find("InvoiceChecks::testTax").unwrap();
    assert_eq!(tax.label, "adds tax to the net amount", "testdox becomes the label");

    let rounding = class.find("InvoiceChecks::testRounding").unwrap();
    assert_eq!(rounding.annotations.depends, vec!["testTax"]);
    assert_eq!(rounding.annotations.group, vec!["regression"]);

    println!("✓ Class level markers qualify the class");
}
