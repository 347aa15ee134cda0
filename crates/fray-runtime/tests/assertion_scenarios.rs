// Copyright (c) 2025-2026 The fray authors

// SPDX-License-Identifier: MIT
// All contributions are certified under the DCO

//! A single machine asserts false on entry, with and without an
//! `on_failure` observer installed.

mod common;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use fray_runtime::{Config, FailureKind, IterationDriver};

#[test]
fn assertion_with_no_handler_is_reported_exactly_once() {
    let mut driver = IterationDriver::new(Config::new().with_seed(11)).expect("valid config");

    let report = driver.run(|runtime| {
        common::spawn_root(runtime, Some("M".to_owned()), |ctx| {
            ctx.assert(false, "Assertion failed: invariant violated on entry")?;
            ctx.halt()?;
            Ok(())
        })?;
        Ok(())
    });

    assert_eq!(report.num_bugs, 1);
    assert_eq!(report.bug_reports.len(), 1);
    assert!(report.bug_reports[0].message.starts_with("Assertion failed"));
}

#[test]
fn assertion_with_handler_notifies_it_exactly_once() {
    let calls = Arc::new(AtomicU32::new(0));
    let observed_calls = Arc::clone(&calls);

    let mut driver = IterationDriver::new(Config::new().with_seed(12))
        .expect("valid config")
        .with_on_failure(move |kind, _message| {
            assert_eq!(kind, FailureKind::Assertion);
            observed_calls.fetch_add(1, Ordering::SeqCst);
        });

    let report = driver.run(|runtime| {
        common::spawn_root(runtime, Some("M".to_owned()), |ctx| {
            ctx.assert(false, "Assertion failed: invariant violated on entry")?;
            ctx.halt()?;
            Ok(())
        })?;
        Ok(())
    });

    assert_eq!(report.num_bugs, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
