use std::io::{self, Write};

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use super::{Formatter, line};
use crate::{results::TestResult, suite::Statistics, test::Test};

/// Represents output format settings for Gradescope submissions.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GradescopeOutputFormat {
    /// Plain text format.
    Text,
    /// HTML format.
    Html,
    /// This is very similar to the "html" format option but will also convert
    /// \n into <br /> and \n\n+ into a page break.
    SimpleFormat,
    /// Markdown format.
    Md,
    /// ANSI format for including ANSI escape codes (often used in terminal
    /// outputs).
    Ansi,
}

/// Represents visibility settings for Gradescope submissions and test cases.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GradescopeVisibility {
    /// Hidden from students.
    Hidden,
    /// Visible after the due date of the assignment.
    AfterDueDate,
    /// Visible after the grades are published.
    AfterPublished,
    /// Always visible to students.
    Visible,
}

/// Represents the status of a test case in Gradescope submissions.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GradescopeStatus {
    /// Indicates the test case passed successfully.
    Passed,
    /// Indicates the test case failed.
    Failed,
}

/// Represents the overall submission data.
#[derive(Serialize, Deserialize, Debug, TypedBuilder)]
#[builder(field_defaults(default, setter(into)))]
#[builder(doc)]
pub struct GradescopeSubmission {
    /// Optional overall score. Overrides total of test cases if specified.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    /// Optional text relevant to the entire submission.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Optional default output format for test case outputs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_output_format: Option<GradescopeOutputFormat>,

    /// Optional visibility setting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<GradescopeVisibility>,

    /// Optional stdout visibility setting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout_visibility: Option<GradescopeVisibility>,

    /// Test cases.
    pub tests: Vec<GradescopeTestCase>,
}

/// Represents an individual test case.
#[derive(Serialize, Deserialize, Debug, TypedBuilder)]
#[builder(field_defaults(default, setter(into)))]
#[builder(doc)]
pub struct GradescopeTestCase {
    /// Optional score for the test case.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    /// Optional maximum score for the test case.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_score: Option<f64>,

    /// Optional status of the test case.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<GradescopeStatus>,

    /// Optional name of the test case.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Optional detailed output for the test case.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Optional tags associated with the test case.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    /// Optional visibility setting for the test case.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<GradescopeVisibility>,
}

/// Collects test cases and writes a Gradescope `results.json` document once
/// the suite completes.
///
/// See <https://gradescope-autograders.readthedocs.io/en/latest/specs/>.
pub struct GradescopeFormatter<W: Write> {
    /// Report destination
    out:   W,
    /// `-` separator used inside test output
    line:  String,
    /// Cases collected so far
    tests: Vec<GradescopeTestCase>,
}

impl<W: Write> GradescopeFormatter<W> {
    /// Creates a formatter writing to `out`.
    pub fn new(out: W) -> Self {
        Self {
            out,
            line: line(),
            tests: Vec::new(),
        }
    }

    /// The student-facing text of one test case.
    fn case_output(&self, test: &Test, result: &TestResult) -> String {
        let line = &self.line;
        format!(
            "Test description:\n{}\n\n{line}\nConsole output:\n{line}\n{}\n{line}\nError \
             output:\n{line}\n{}\n{line}\nResult: {}\n",
            test.description(),
            result.output,
            result.error_output,
            result.status,
        )
    }
}

impl<W: Write> Formatter for GradescopeFormatter<W> {
    fn test_ended(&mut self, test: &Test, result: &TestResult) -> io::Result<()> {
        let weight = f64::from(test.weight());
        let passed = result.passed();

        let case = GradescopeTestCase::builder()
            .name(test.name().to_string())
            .score(if passed { weight } else { 0.0 })
            .max_score(weight)
            .status(if passed {
                GradescopeStatus::Passed
            } else {
                GradescopeStatus::Failed
            })
            .output(self.case_output(test, result))
            .tags(
                (!test.tags().is_empty())
                    .then(|| test.tags().iter().cloned().collect::<Vec<_>>()),
            )
            .build();

        self.tests.push(case);
        Ok(())
    }

    fn suite_complete(&mut self, _stats: &Statistics) -> io::Result<()> {
        let submission = GradescopeSubmission::builder()
            .tests(std::mem::take(&mut self.tests))
            .test_output_format(GradescopeOutputFormat::Text)
            .stdout_visibility(GradescopeVisibility::Visible)
            .visibility(GradescopeVisibility::Visible)
            .build();

        serde_json::to_writer(&mut self.out, &submission)?;
        writeln!(self.out)?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::TestExitStatus;

    #[test]
    fn cases_carry_weight_tags_and_escaped_output() {
        let mut buf = Vec::new();
        {
            let mut formatter = GradescopeFormatter::new(&mut buf);
            let pass = Test::new("quotes", "with \"quoted\" text", || {})
                .with_weight(3)
                .with_tag("public");
            let fail = Test::new("tabs", "", || {});

            formatter
                .test_ended(
                    &pass,
                    &TestResult::with_output(TestExitStatus::Pass, "say \"hi\"\n\tbye", ""),
                )
                .unwrap();
            formatter
                .test_ended(&fail, &TestResult::new(TestExitStatus::Segfault))
                .unwrap();
            formatter.suite_complete(&Statistics::default()).unwrap();
        }

        let json: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(json["visibility"], "visible");
        assert_eq!(json["stdout_visibility"], "visible");

        let tests = json["tests"].as_array().unwrap();
        assert_eq!(tests.len(), 2);

        assert_eq!(tests[0]["name"], "quotes");
        assert_eq!(tests[0]["score"], 3.0);
        assert_eq!(tests[0]["max_score"], 3.0);
        assert_eq!(tests[0]["status"], "passed");
        assert_eq!(tests[0]["tags"][0], "public");
        let output = tests[0]["output"].as_str().unwrap();
        assert!(output.contains("with \"quoted\" text"));
        assert!(output.contains("say \"hi\"\n\tbye"));

        assert_eq!(tests[1]["score"], 0.0);
        assert_eq!(tests[1]["status"], "failed");
        assert!(tests[1].get("tags").is_none());
        assert!(tests[1]["output"].as_str().unwrap().contains("Result: segmentation fault"));
    }
}
