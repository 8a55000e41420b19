use std::{fs, path::PathBuf, time::Duration};

use grading::{
    Arguments, GradingError, OutputFormat, RunStrategy, Statistics, Test, TestSuite, check,
    check_int,
    format::{self, GradescopeSubmission},
};

fn graded_suite() -> TestSuite {
    let mut suite = TestSuite::new();
    suite
        .add("sum")
        .description("sum of 1..=4 is 10")
        .weight(3)
        .tag("arith")
        .run(|| drop(check_int(10, (1..=4).sum())))
        .add("product")
        .description("product of 1..=4 is 24")
        .weight(1)
        .tag("arith")
        .run(|| drop(check_int(25, (1..=4).product())))
        .add("empty")
        .description("an empty string is empty")
        .timeout(Duration::from_secs(5))
        .tag("strings")
        .run(|| drop(check("".is_empty(), "empty string")));
    suite
}

fn args(format: OutputFormat) -> Arguments {
    Arguments {
        format,
        run_strategy: RunStrategy::Separated,
        timeout: Some(Duration::from_secs(5)),
        ..Arguments::default()
    }
}

#[test]
fn builder_chains_add_tests_in_order() {
    let suite = graded_suite();
    let names: Vec<_> = suite.tests().iter().map(Test::name).collect();

    assert_eq!(names, ["sum", "product", "empty"]);
    assert_eq!(suite.total_weight(), 5);
    assert_eq!(suite.tests()[2].timeout(), Some(Duration::from_secs(5)));
    assert!(suite.tests()[0].has_tag("arith"));
}

#[test]
fn scores_are_weighted() {
    let suite = graded_suite();
    let mut out = Vec::new();
    let mut formatter = format::create(OutputFormat::Brief, &mut out, false);

    let stats = suite
        .run_with(&args(OutputFormat::Brief), formatter.as_mut())
        .expect("run suite");
    drop(formatter);

    assert_eq!(stats.total, 3);
    assert_eq!(stats.passed, 2);
    assert_eq!(stats.failed, 1);
    assert!((stats.score - 4.0 / 5.0).abs() < 1e-9);

    let report = String::from_utf8(out).expect("utf-8 report");
    assert!(report.contains("Running test 'product'... "));
    assert!(report.contains("failed"));
    assert!(report.contains("Passed 2 out of 3 tests"));
}

#[test]
fn tags_select_tests_and_their_weight() {
    let suite = graded_suite();
    let mut arguments = args(OutputFormat::Brief);
    arguments.tags = vec![String::from("strings")];

    let mut out = Vec::new();
    let mut formatter = format::create(OutputFormat::Brief, &mut out, false);
    let stats = suite
        .run_with(&arguments, formatter.as_mut())
        .expect("run suite");

    assert_eq!(stats.total, 1);
    assert_eq!(stats.passed, 1);
    assert_eq!(stats.score, 1.0);
}

#[test]
fn skipping_runs_nothing() {
    let suite = TestSuite::from(vec![Test::new("never", "", || {
        panic!("skipped tests must not run")
    })]);
    let mut arguments = args(OutputFormat::Verbose);
    arguments.skip = true;

    let stats = suite.run(&arguments).expect("run suite");
    assert_eq!(stats, Statistics::default());
}

#[test]
fn empty_suites_score_zero() {
    let suite = TestSuite::new();
    let mut out = Vec::new();
    let mut formatter = format::create(OutputFormat::Table, &mut out, false);

    let stats = suite
        .run_with(&args(OutputFormat::Table), formatter.as_mut())
        .expect("run suite");
    assert_eq!(stats.total, 0);
    assert_eq!(stats.score, 0.0);
}

#[test]
fn gradescope_results_are_written_to_the_output_file() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("results.json");

    let mut arguments = args(OutputFormat::Gradescope);
    arguments.output = Some(path.clone());
    graded_suite().run(&arguments).expect("run suite");

    let text = fs::read_to_string(&path).expect("read results");
    let submission: GradescopeSubmission = serde_json::from_str(&text).expect("parse results");

    assert_eq!(submission.tests.len(), 3);
    let sum = &submission.tests[0];
    assert_eq!(sum.name.as_deref(), Some("sum"));
    assert_eq!(sum.score, Some(3.0));
    assert_eq!(sum.max_score, Some(3.0));
    assert_eq!(sum.tags.as_deref(), Some(&[String::from("arith")][..]));

    let product = &submission.tests[1];
    assert_eq!(product.score, Some(0.0));
    assert_eq!(product.max_score, Some(1.0));
    assert!(
        product
            .output
            .as_deref()
            .is_some_and(|output| output.contains("Result: failed"))
    );
}

#[test]
fn suites_collect_from_iterators() {
    let suite: TestSuite = (1..=3)
        .map(|i| Test::new(format!("t{i}"), "", || {}).with_weight(i))
        .collect();

    assert_eq!(suite.len(), 3);
    assert_eq!(suite.total_weight(), 6);
    assert_eq!((&suite).into_iter().count(), 3);
}

#[test]
fn unwritable_output_files_are_report_errors() {
    let mut arguments = args(OutputFormat::Gradescope);
    arguments.output = Some(PathBuf::from("/nonexistent/dir/results.json"));

    let err = graded_suite()
        .run(&arguments)
        .expect_err("output file cannot be created");
    assert!(matches!(err, GradingError::Output(_)));
}

#[test]
fn reports_written_to_files_are_not_coloured() {
    // SAFETY: no test in this binary reads or writes CLICOLOR_FORCE otherwise.
    unsafe { std::env::set_var("CLICOLOR_FORCE", "1") };
    let dir = tempfile::tempdir().expect("create temp dir");

    for format in [OutputFormat::Brief, OutputFormat::Verbose] {
        let path = dir.path().join(format!("{format}.txt"));
        let mut arguments = args(format);
        arguments.output = Some(path.clone());
        graded_suite().run(&arguments).expect("run suite");

        let text = fs::read_to_string(&path).expect("read report");
        assert!(text.contains("passed"));
        assert!(text.contains("failed"));
        assert!(!text.contains("\x1b["), "{format} report contains escapes");
    }
}
