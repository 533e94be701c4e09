// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Registration phase: ordering, capacity and closing.

use procvisor::{RegistrationRejected, Registry};

fn noop(_: &()) {}

#[test]
fn register_appends_in_call_order() {
    let mut reg = Registry::with_capacity(4);
    assert!(reg.is_open());
    assert!(reg.is_empty());

    assert_eq!(reg.try_register(noop, (), true), Ok(0));
    assert_eq!(reg.try_register(noop, (), false), Ok(1));
    assert!(reg.register(noop, (), true));

    assert_eq!(reg.len(), 3);
    assert!(reg[0].restart_on_abnormal_exit());
    assert!(!reg[1].restart_on_abnormal_exit());
    assert!(reg[2].restart_on_abnormal_exit());
}

#[test]
fn fresh_descriptor_has_no_pid() {
    let mut reg = Registry::with_capacity(1);
    reg.register(noop, (), true);

    let worker = reg.get(0).expect("registered");
    assert_eq!(worker.pid(), None);
    assert!(!worker.is_running());
    assert_eq!(worker.spawn_count(), 0);
    assert_eq!(reg.live_pids().count(), 0);
}

#[test]
fn default_and_custom_names() {
    let mut reg = Registry::with_capacity(3);
    reg.register(noop, (), true);
    reg.register_named("indexer", noop, (), false)
        .expect("register named");
    reg.register(noop, (), true);

    let names: Vec<&str> = reg.iter().map(|w| w.name()).collect();
    assert_eq!(names, ["worker-0", "indexer", "worker-2"]);
}

#[test]
fn full_registry_rejects_without_side_effects() {
    let mut reg = Registry::with_capacity(2);
    assert!(reg.register(noop, (), true));
    assert!(reg.register(noop, (), true));

    assert!(!reg.register(noop, (), false));
    assert_eq!(
        reg.try_register(noop, (), false),
        Err(RegistrationRejected::Full { capacity: 2 })
    );
    assert_eq!(reg.len(), 2);
    assert_eq!(reg.capacity(), 2);
}

#[test]
fn zero_capacity_rejects_everything() {
    let mut reg = Registry::with_capacity(0);
    assert!(!reg.register(noop, (), true));
    assert!(reg.is_empty());
}

#[test]
fn closed_registry_rejects_without_side_effects() {
    let mut reg = Registry::with_capacity(8);
    reg.register(noop, (), true);
    reg.close();

    assert!(!reg.is_open());
    assert!(!reg.register(noop, (), true));
    assert_eq!(
        reg.try_register(noop, (), true),
        Err(RegistrationRejected::Closed)
    );
    assert_eq!(reg.len(), 1);
    assert_eq!(reg[0].name(), "worker-0");
}

#[test]
fn closed_takes_precedence_over_full() {
    let mut reg = Registry::with_capacity(1);
    reg.register(noop, (), true);
    reg.close();
    assert_eq!(
        reg.try_register(noop, (), true),
        Err(RegistrationRejected::Closed)
    );
}

#[test]
fn index_of_unknown_pid_is_none() {
    let mut reg = Registry::with_capacity(1);
    reg.register(noop, (), true);
    assert_eq!(reg.index_of(procvisor::Pid::current()), None);
}

#[test]
fn parameter_is_moved_into_the_descriptor() {
    let mut reg = Registry::with_capacity(1);
    let label = String::from("owned by the worker");
    assert!(reg.register(|s: &String| assert!(!s.is_empty()), label, false));
}
