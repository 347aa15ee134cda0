// Copyright (c) 2025-2026 The fray authors

// SPDX-License-Identifier: MIT
// All contributions are certified under the DCO

//! A user entry point captures a runtime from one iteration and reuses it
//! in the next. The first iteration succeeds; the second reports a
//! disposed-object failure.

mod common;

use std::sync::Mutex;

use fray_runtime::{Config, IterationDriver, Runtime};

#[test]
fn reusing_a_captured_runtime_in_the_next_iteration_is_a_bug() {
    let mut driver = IterationDriver::new(Config::new().with_num_iterations(2).with_seed(9))
        .expect("valid config");

    let captured: Mutex<Option<Runtime>> = Mutex::new(None);

    let report = driver.run(move |runtime| {
        if let Some(stale) = captured.lock().expect("not poisoned").take() {
            // Touches the runtime from the previous iteration - disposed-object misuse.
            stale.root_handle()?;
        }
        *captured.lock().expect("not poisoned") = Some(runtime.clone());

        common::spawn_root(runtime, Some("M".to_owned()), |_ctx| Ok(()))?;
        Ok(())
    });

    assert_eq!(report.num_bugs, 1);
    assert_eq!(
        report.bug_reports[0].message,
        "runtime used after its iteration ended"
    );
}
