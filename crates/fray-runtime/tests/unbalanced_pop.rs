// Copyright (c) 2025-2026 The fray authors

// SPDX-License-Identifier: MIT
// All contributions are certified under the DCO

//! A machine pops with nothing on its stack.

mod common;

use fray_runtime::{Config, IterationDriver};

#[test]
fn popping_an_empty_stack_reports_the_exact_bug_text() {
    let mut driver = IterationDriver::new(Config::new().with_seed(5)).expect("valid config");

    let report = driver.run(|runtime| {
        common::spawn_root(runtime, Some("M".to_owned()), |ctx| {
            let _ = ctx.pop()?;
            Ok(())
        })?;
        Ok(())
    });

    assert_eq!(report.num_bugs, 1);
    assert_eq!(
        report.bug_reports[0].message,
        "Machine 'M()' popped with no matching push."
    );
}
