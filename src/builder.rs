#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::time::Duration;

use crate::{
    suite::TestSuite,
    test::{TagSet, Test},
};

/// Declares a test in place and adds it to a suite.
///
/// ```
/// use grading::{TestSuite, check_int};
///
/// let mut suite = TestSuite::new();
/// suite
///     .add("addition")
///     .description("2 + 2 should be 4")
///     .weight(2)
///     .run(|| drop(check_int(4, 2 + 2)));
/// assert_eq!(suite.total_weight(), 2);
/// ```
#[must_use = "a TestBuilder adds nothing until `run` or `with_expectation` is called"]
pub struct TestBuilder<'a> {
    /// Suite receiving the test
    suite:       &'a mut TestSuite,
    /// Test name
    name:        String,
    /// Test description
    description: String,
    /// Per-test time limit
    timeout:     Duration,
    /// Test weight
    weight:      u32,
    /// Test tags
    tags:        TagSet,
}

impl<'a> TestBuilder<'a> {
    /// Starts a builder with no timeout and a weight of 1.
    pub(crate) fn new(suite: &'a mut TestSuite, name: String) -> Self {
        Self {
            suite,
            name,
            description: String::new(),
            timeout: Duration::ZERO,
            weight: 1,
            tags: TagSet::new(),
        }
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the time limit.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the weight.
    pub fn weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    /// Adds a tag.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Adds the test with `closure` as its body.
    pub fn run(self, closure: impl Fn() + Send + Sync + 'static) -> &'a mut TestSuite {
        let test = Test::new(self.name, self.description, closure);
        Self::finish(self.suite, test, self.timeout, self.weight, self.tags)
    }

    /// Adds a test calling `f` with `expectation`.
    pub fn with_expectation<E>(
        self,
        f: impl Fn(&E) + Send + Sync + 'static,
        expectation: E,
    ) -> &'a mut TestSuite
    where
        E: Send + Sync + 'static,
    {
        let test = Test::with_expectation(self.name, self.description, f, expectation);
        Self::finish(self.suite, test, self.timeout, self.weight, self.tags)
    }

    /// Applies the collected settings and pushes the test.
    fn finish(
        suite: &'a mut TestSuite,
        test: Test,
        timeout: Duration,
        weight: u32,
        tags: TagSet,
    ) -> &'a mut TestSuite {
        suite.push(
            test.with_timeout(timeout)
                .with_weight(weight)
                .with_tags(tags),
        )
    }
}
