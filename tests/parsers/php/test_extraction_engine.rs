//! Extraction engine tests
//!
//! Covers dialect priority, event emission, malformed input, source
//! normalization and async file parsing.

use parking_lot::Mutex;
use phptest::parsing::PhpSyntaxParser;
use phptest::{DiscoveryError, ParseError, TestDefinition, TestParser, TestType};
use std::path::Path;
use std::sync::Arc;

const PHPUNIT_CODE: &str = r#"<?php
namespace Tests;

use PHPUnit\Framework\TestCase;

class MathTest extends TestCase
{
    /**
     * @testWith [1, 2]
     *           [3, 4]
     *           [5, 6]
     */
    public function testPairs(): void
    {
    }

    public function testSingle(): void
    {
    }
}
"#;

#[test]
fn test_parse_is_deterministic() {
    println!("\n=== Testing Deterministic Parsing ===");

    let mut parser = TestParser::new().unwrap();
    let first = parser.parse(PHPUNIT_CODE, "tests/MathTest.php").unwrap();
    let second = parser.parse(PHPUNIT_CODE, "tests/MathTest.php").unwrap();

    let mut fresh = TestParser::new().unwrap();
    let third = fresh.parse(PHPUNIT_CODE, "tests/MathTest.php").unwrap();

    let json = |tests: &Vec<TestDefinition>| serde_json::to_string(tests).unwrap();
    assert_eq!(json(&first), json(&second), "reusing the parser changes nothing");
    assert_eq!(json(&first), json(&third), "fresh parser gives the same tree");

    println!("✓ Same input, same tree");
}

#[test]
fn test_phpunit_has_priority_over_pest() {
    println!("\n=== Testing Dialect Priority ===");

    let code = r#"<?php
use PHPUnit\Framework\TestCase;

class MixedTest extends TestCase
{
    public function testClassic(): void
    {
    }
}

test('functional', function () {
    expect(true)->toBeTrue();
});
"#;
    let mut parser = TestParser::new().unwrap();
    let tests = parser.parse(code, "tests/MixedTest.php").unwrap();

    let ids: Vec<_> = tests[0].iter().map(|t| t.id.as_str()).collect();
    println!("  ids: {ids:?}");
    assert_eq!(ids, vec!["MixedTest", "MixedTest::testClassic"]);

    println!("✓ Classic dialect wins when both match");
}

#[test]
fn test_listeners_follow_tree_order() {
    println!("\n=== Testing Event Emission Order ===");

    let events = Arc::new(Mutex::new(Vec::new()));
    let mut parser = TestParser::new().unwrap();
    for test_type in [
        TestType::Namespace,
        TestType::Class,
        TestType::Method,
        TestType::DataSet,
    ] {
        let events = Arc::clone(&events);
        parser.on(test_type, move |test, index| {
            events.lock().push((test.test_type, test.id.clone(), index));
            Ok(())
        });
    }

    parser.parse(PHPUNIT_CODE, "tests/MathTest.php").unwrap();

    let events = events.lock();
    for event in events.iter() {
        println!("  {event:?}");
    }
    assert_eq!(
        *events,
        vec![
            (TestType::Namespace, "Tests".to_string(), None),
            (TestType::Class, "Tests\\MathTest".to_string(), None),
            (TestType::Method, "Tests\\MathTest::testPairs".to_string(), None),
            (
                TestType::DataSet,
                "Tests\\MathTest::testPairs with data set #0".to_string(),
                Some(0)
            ),
            (
                TestType::DataSet,
                "Tests\\MathTest::testPairs with data set #1".to_string(),
                Some(1)
            ),
            (
                TestType::DataSet,
                "Tests\\MathTest::testPairs with data set #2".to_string(),
                Some(2)
            ),
            (TestType::Method, "Tests\\MathTest::testSingle".to_string(), None),
        ]
    );

    println!("✓ Parents before children, data sets indexed");
}

#[test]
fn test_failing_listener_does_not_abort_parse() {
    println!("\n=== Testing Failing Listener ===");

    let seen = Arc::new(Mutex::new(0usize));
    let mut parser = TestParser::new().unwrap();
    parser.on(TestType::Method, |_, _| anyhow::bail!("listener unavailable"));
    {
        let seen = Arc::clone(&seen);
        parser.on(TestType::Method, move |_, _| {
            *seen.lock() += 1;
            Ok(())
        });
    }

    let tests = parser.parse(PHPUNIT_CODE, "tests/MathTest.php");

    assert!(tests.is_some(), "the parse result is still returned");
    assert_eq!(*seen.lock(), 2, "later listeners still run");

    println!("✓ Listener errors are contained");
}

#[test]
fn test_no_events_without_tests() {
    println!("\n=== Testing Silence On Non-Test Files ===");

    let calls = Arc::new(Mutex::new(0usize));
    let mut parser = TestParser::new().unwrap();
    {
        let calls = Arc::clone(&calls);
        parser.on(TestType::Class, move |_, _| {
            *calls.lock() += 1;
            Ok(())
        });
    }

    let code = "<?php\nnamespace App;\n\nclass Invoice\n{\n    public function total(): int\n    {\n        return 0;\n    }\n}\n";
    assert!(parser.parse(code, "src/Invoice.php").is_none());
    assert_eq!(*calls.lock(), 0);

    println!("✓ No tests, no events");
}

#[test]
fn test_malformed_input_yields_nothing() {
    println!("\n=== Testing Malformed Input ===");

    let code = "<?php\nclass BrokenTest extends TestCase\n{\n    public function testA(\n";
    let mut parser = TestParser::new().unwrap();

    assert!(parser.parse(code, "tests/BrokenTest.php").is_none());

    let error = parser.try_parse(code, "tests/BrokenTest.php").unwrap_err();
    println!("  error: {error}");
    assert!(matches!(error, ParseError::Syntax { .. }));

    // The parser stays usable after a failure
    assert!(parser.parse(PHPUNIT_CODE, "tests/MathTest.php").is_some());

    println!("✓ Syntax errors are reported, not panicked on");
}

#[test]
fn test_comment_spans_exclude_line_terminator() {
    println!("\n=== Testing Comment Span Normalization ===");

    let code = "<?php\n// first note\r\n# second note\nfunction helper() {}\n";
    let mut syntax = PhpSyntaxParser::new().unwrap();
    let tree = syntax.parse(code, Path::new("helper.php")).unwrap();

    let comments = tree.comments();
    assert_eq!(comments.len(), 2);
    for comment in comments {
        println!("  {:?} {:?}", comment.text, comment.span);
        assert!(!comment.text.ends_with('\n') && !comment.text.ends_with('\r'));
        assert_eq!(
            comment.span.start.line, comment.span.end.line,
            "line comments end on their own line"
        );
        assert_eq!(
            comment.span.end.offset - comment.span.start.offset,
            comment.text.len()
        );
    }
    assert_eq!(comments[0].text, "// first note");
    assert_eq!(comments[0].span.start.line, 2);
    assert_eq!(comments[1].text, "# second note");
    assert_eq!(comments[1].span.start.line, 3);

    println!("✓ Comment spans stop before the line break");
}

#[test]
fn test_inline_tags_keep_line_numbers() {
    println!("\n=== Testing Inline Tag Rewrite ===");

    let code = r#"<?php
class AlphaTest extends TestCase
{
    public function testA(): void {}
}
?>
<?php
class BetaTest extends TestCase
{
    public function testB(): void {}
}
"#;
    let mut parser = TestParser::new().unwrap();
    let tests = parser.parse(code, "tests/InlineTest.php").unwrap();

    let classes: Vec<_> = tests.iter().map(|t| (t.id.as_str(), t.start.line)).collect();
    println!("  classes: {classes:?}");
    assert_eq!(classes, vec![("AlphaTest", 2), ("BetaTest", 8)]);
    assert_eq!(tests[1].children[0].start.line, 10);

    println!("✓ Lines match the original text");
}

#[tokio::test]
async fn test_parse_file_reads_from_disk() {
    println!("\n=== Testing Async File Parsing ===");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("MathTest.php");
    std::fs::write(&path, PHPUNIT_CODE).unwrap();

    let mut parser = TestParser::new().unwrap();
    let tests = parser.parse_file(&path).await.unwrap();
    assert_eq!(tests[0].children[0].id, "Tests\\MathTest");
    assert_eq!(tests[0].file, path);

    println!("✓ File parsed");
}

#[tokio::test]
async fn test_parse_file_errors() {
    println!("\n=== Testing Async File Errors ===");

    let dir = tempfile::tempdir().unwrap();
    let mut parser = TestParser::new().unwrap();

    let missing = dir.path().join("MissingTest.php");
    assert!(parser.parse_file(&missing).await.is_none());
    assert!(matches!(
        parser.try_parse_file(&missing).await,
        Err(DiscoveryError::FileRead { .. })
    ));

    let binary = dir.path().join("BinaryTest.php");
    std::fs::write(&binary, [0x3c, 0x3f, 0xff, 0xfe]).unwrap();
    assert!(parser.parse_file(&binary).await.is_none());
    assert!(matches!(
        parser.try_parse_file(&binary).await,
        Err(DiscoveryError::Parse {
            source: ParseError::InvalidUtf8,
            ..
        })
    ));

    println!("✓ Unreadable files yield nothing");
}
