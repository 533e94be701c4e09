// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Smallest possible supervised program: one worker that prints and returns.
// It exits normally, so it is never restarted and the supervisor stops once
// it has been reaped.

use procvisor::{Host, Registry};

struct Simple;

impl Host for Simple {
    fn before_start(&mut self, _args: &[String], workers: &mut Registry) -> i32 {
        println!("This is executed before everything else");
        workers.register(|_: &()| println!("this is the child executing"), (), true);
        0
    }

    fn after_stop(&mut self) {
        println!("This is executed after everything else");
    }
}

fn main() {
    procvisor::run_main(Simple)
}
