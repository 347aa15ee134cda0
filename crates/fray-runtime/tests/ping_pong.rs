// Copyright (c) 2025-2026 The fray authors

// SPDX-License-Identifier: MIT
// All contributions are certified under the DCO

//! Two machines exchange one event; every iteration of a 100-iteration
//! random(seed = 7) run terminates cleanly.

mod common;

use fray_runtime::{Config, IterationDriver};

#[test]
fn ping_pong_explores_every_iteration_without_a_bug() {
    let mut driver = IterationDriver::new(Config::new().with_num_iterations(100).with_seed(7))
        .expect("valid config");

    let report = driver.run(|runtime| {
        common::spawn_root(runtime, Some("Ping".to_owned()), |ping| {
            let pong = ping.create(Some("Pong".to_owned()), {
                let ping_id = ping.id.clone();
                move |pong| {
                    let event = pong.receive()?;
                    pong.send(&ping_id, format!("{event}-reply"))?;
                    Ok(())
                }
            })?;

            ping.send(&pong, "ping")?;
            let reply = ping.receive()?;
            ping.assert(reply == "ping-reply", "unexpected reply from Pong")?;
            Ok(())
        })?;
        Ok(())
    });

    assert_eq!(report.num_bugs, 0, "bug reports: {:?}", report.bug_reports);
    assert_eq!(report.num_explored_unfair_schedules, 100);
    assert_eq!(report.num_explored_fair_schedules, 0);
}
