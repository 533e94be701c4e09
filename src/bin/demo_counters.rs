// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Three workers, each with its own shared run counter. The first two are
// restarted until they reach their target; the third is never restarted
// and gives up after its first interrupted run.

use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;
use std::time::Duration;

use procvisor::{shared, Host, Registry, SharedRegion};

#[derive(Clone, Copy)]
struct Counter {
    label: &'static str,
    runs: SharedRegion,
    target: u32,
}

fn count(counter: &Counter) {
    let runs = unsafe { counter.runs.get::<AtomicU32>() };
    let n = runs.fetch_add(1, Ordering::SeqCst) + 1;
    println!("{}: {n}", counter.label);

    thread::sleep(Duration::from_secs(1));

    if n < counter.target {
        unsafe {
            libc::raise(libc::SIGINT);
        }
    }
}

#[derive(Default)]
struct Counters {
    regions: Vec<SharedRegion>,
}

impl Counters {
    fn add(
        &mut self,
        workers: &mut Registry,
        label: &'static str,
        target: u32,
        restart: bool,
    ) -> procvisor::Result<()> {
        let runs = shared::allocate_for::<AtomicU32>()?;
        self.regions.push(runs);
        workers.register(count, Counter { label, runs, target }, restart);
        Ok(())
    }

    fn register_all(&mut self, workers: &mut Registry) -> procvisor::Result<()> {
        self.add(workers, "first", 10, true)?;
        self.add(workers, "second", 13, true)?;
        self.add(workers, "third", 13, false)?;
        Ok(())
    }
}

impl Host for Counters {
    fn before_start(&mut self, _args: &[String], workers: &mut Registry) -> i32 {
        if let Err(err) = self.register_all(workers) {
            eprintln!("{err}");
            return 1;
        }
        println!("before");
        0
    }

    fn after_stop(&mut self) {
        for region in self.regions.drain(..) {
            if let Err(err) = unsafe { shared::free(region) } {
                eprintln!("{err}");
            }
        }
        println!("after");
    }
}

fn main() {
    procvisor::run_main(Counters::default())
}
