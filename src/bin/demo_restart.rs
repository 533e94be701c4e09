// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Restart policy demo. Both workers crash with SIGSEGV; only the first one
// is restarted, forever, until the supervisor receives Ctrl-C or SIGTERM.

use std::thread;
use std::time::Duration;

use procvisor::{Host, Registry};

fn crash(line: &&'static str) {
    println!("I'll crash with SIGSEGV and {line}");
    thread::sleep(Duration::from_millis(500));
    unsafe {
        libc::raise(libc::SIGSEGV);
    }
    println!("Exited normally."); // never printed
}

struct Restart;

impl Host for Restart {
    fn before_start(&mut self, _args: &[String], workers: &mut Registry) -> i32 {
        println!("This is executed before everything else");
        workers.register(crash, "I'll restart", true);
        workers.register(crash, "I'll not restart", false);
        0
    }

    fn after_stop(&mut self) {
        println!("This is executed after everything else");
    }
}

fn main() {
    procvisor::run_main(Restart)
}
