// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Two independent workers with opposite restart policies. Both return
// normally, so neither is restarted.

use procvisor::{Host, Registry};

fn child(id: &u32) {
    println!("I'm child {id}");
}

struct Multiple;

impl Host for Multiple {
    fn before_start(&mut self, _args: &[String], workers: &mut Registry) -> i32 {
        println!("This is executed before everything else");
        workers.register(child, 1u32, true);
        workers.register(child, 2u32, false);
        0
    }

    fn after_stop(&mut self) {
        println!("This is executed after everything else");
    }
}

fn main() {
    procvisor::run_main(Multiple)
}
