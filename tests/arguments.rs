use std::{path::PathBuf, sync::Mutex, time::Duration};

use grading::{Arguments, ArgumentsError, OutputFormat, RunStrategy};

static ENV_LOCK: Mutex<()> = Mutex::new(());

const VARS: [&str; 4] = [
    "GRADING_FORMAT",
    "GRADING_RUN_STRATEGY",
    "GRADING_TIMEOUT",
    "GRADING_OUTPUT",
];

fn with_env<T>(vars: &[(&str, &str)], f: impl FnOnce() -> T) -> T {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    // SAFETY: every test touching the environment holds ENV_LOCK.
    unsafe {
        for name in VARS {
            std::env::remove_var(name);
        }
        for (name, value) in vars {
            std::env::set_var(name, value);
        }
    }

    let out = f();

    unsafe {
        for name in VARS {
            std::env::remove_var(name);
        }
    }
    out
}

#[test]
fn environment_fills_in_missing_flags() {
    let args = with_env(
        &[
            ("GRADING_FORMAT", "verbose"),
            ("GRADING_RUN_STRATEGY", "separated"),
            ("GRADING_TIMEOUT", "7"),
            ("GRADING_OUTPUT", "report.txt"),
        ],
        || Arguments::parse(Vec::<String>::new()),
    )
    .expect("parse arguments");

    assert_eq!(args.format, OutputFormat::Verbose);
    assert_eq!(args.run_strategy, RunStrategy::Separated);
    assert_eq!(args.timeout, Some(Duration::from_secs(7)));
    assert_eq!(args.output, Some(PathBuf::from("report.txt")));
}

#[test]
fn flags_take_precedence_over_environment() {
    let args = with_env(&[("GRADING_FORMAT", "verbose"), ("GRADING_TIMEOUT", "7")], || {
        Arguments::parse(["--format", "table", "-t", "2"])
    })
    .expect("parse arguments");

    assert_eq!(args.format, OutputFormat::Table);
    assert_eq!(args.timeout, Some(Duration::from_secs(2)));
}

#[test]
fn invalid_environment_values_are_rejected() {
    let format = with_env(&[("GRADING_FORMAT", "html")], || {
        Arguments::parse(Vec::<String>::new())
    });
    assert!(matches!(format, Err(ArgumentsError::Invalid(_))));

    let strategy = with_env(&[("GRADING_RUN_STRATEGY", "threads")], || {
        Arguments::parse(Vec::<String>::new())
    });
    assert!(matches!(strategy, Err(ArgumentsError::Invalid(_))));

    let timeout = with_env(&[("GRADING_TIMEOUT", "soon")], || {
        Arguments::parse(Vec::<String>::new())
    });
    assert!(matches!(timeout, Err(ArgumentsError::Invalid(_))));
}
