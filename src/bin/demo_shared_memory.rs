// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// A run counter in shared memory survives restarts: the worker interrupts
// itself until it has run ten times, then returns normally and the
// supervisor stops on its own.

use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;
use std::time::Duration;

use procvisor::{shared, Host, Registry, SharedRegion};

fn child(counter: &SharedRegion) {
    let runs = unsafe { counter.get::<AtomicU32>() };
    let n = runs.fetch_add(1, Ordering::SeqCst) + 1;
    println!("Child executed {n} times");

    thread::sleep(Duration::from_secs(1));

    if n < 10 {
        unsafe {
            libc::raise(libc::SIGINT);
        }
    }
}

#[derive(Default)]
struct SharedMemory {
    counter: Option<SharedRegion>,
}

impl Host for SharedMemory {
    fn before_start(&mut self, _args: &[String], workers: &mut Registry) -> i32 {
        println!("This is executed before everything else");
        let counter = match shared::allocate_for::<AtomicU32>() {
            Ok(region) => region,
            Err(err) => {
                eprintln!("{err}");
                return 1;
            }
        };
        self.counter = Some(counter);
        workers.register(child, counter, true);
        0
    }

    fn after_stop(&mut self) {
        if let Some(counter) = self.counter.take() {
            // Every worker has been told to stop; nothing reads the counter now.
            if let Err(err) = unsafe { shared::free(counter) } {
                eprintln!("{err}");
            }
        }
        println!("This is executed after everything else");
    }
}

fn main() {
    procvisor::run_main(SharedMemory::default())
}
