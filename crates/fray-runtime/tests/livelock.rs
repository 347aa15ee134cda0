// Copyright (c) 2025-2026 The fray authors

// SPDX-License-Identifier: MIT
// All contributions are certified under the DCO

//! Two machines each wait to receive an event neither one sends.

mod common;

use fray_runtime::{Config, IterationDriver};

#[test]
fn two_machines_blocked_on_receive_report_a_deterministic_livelock() {
    let mut driver = IterationDriver::new(Config::new().with_seed(3)).expect("valid config");

    let report = driver.run(|runtime| {
        common::spawn_root(runtime, Some("M0".to_owned()), |m0| {
            m0.create(Some("M1".to_owned()), |m1| {
                let _ = m1.receive()?;
                Ok(())
            })?;
            let _ = m0.receive()?;
            Ok(())
        })?;
        Ok(())
    });

    assert_eq!(report.num_bugs, 1);
    assert_eq!(
        report.bug_reports[0].message,
        "Livelock detected. Machine 'M0' is waiting for an event, but no other machine is enabled."
    );
}
