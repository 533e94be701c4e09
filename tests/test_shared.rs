// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Anonymous shared regions: allocation, access and visibility across fork().

use std::sync::atomic::{AtomicU32, Ordering};

use procvisor::{shared, Error};
use serial_test::serial;

#[test]
fn allocate_zero_bytes_fails() {
    match shared::allocate(0) {
        Err(Error::SharedMemory { op, source }) => {
            assert_eq!(op, "allocate");
            assert_eq!(source.kind(), std::io::ErrorKind::InvalidInput);
        }
        other => panic!("expected allocation error, got {other:?}"),
    }
}

#[test]
fn write_read_free() {
    let region = shared::allocate(4096).expect("allocate");
    assert_eq!(region.len(), 4096);
    assert!(!region.is_empty());
    assert!(!region.as_ptr().is_null());

    unsafe {
        let bytes = region.as_mut_slice();
        bytes[0] = 42;
        bytes[4095] = 99;
        assert_eq!(region.as_slice()[0], 42);
        assert_eq!(region.as_slice()[4095], 99);
        shared::free(region).expect("free");
    }
}

#[test]
fn fresh_region_is_zeroed() {
    let region = shared::allocate(1024).expect("allocate");
    unsafe {
        assert!(region.as_slice().iter().all(|&b| b == 0));
        shared::free(region).expect("free");
    }
}

#[test]
fn allocate_for_fits_the_type() {
    let region = shared::allocate_for::<[u64; 4]>().expect("allocate");
    assert!(region.len() >= 32);
    unsafe {
        let counters = region.get::<[AtomicU32; 8]>();
        counters[7].store(5, Ordering::SeqCst);
        assert_eq!(counters[7].load(Ordering::SeqCst), 5);
        shared::free(region).expect("free");
    }
}

#[test]
#[should_panic(expected = "cannot hold")]
fn get_rejects_oversized_type() {
    let region = shared::allocate(2).expect("allocate");
    let _ = unsafe { region.get::<u64>() };
}

#[test]
#[serial]
fn parent_writes_are_visible_to_later_fork_and_back() {
    let region = shared::allocate_for::<AtomicU32>().expect("allocate");
    let cell = unsafe { region.get::<AtomicU32>() };
    cell.store(41, Ordering::SeqCst);

    let pid = unsafe { libc::fork() };
    assert!(pid >= 0, "fork failed");
    if pid == 0 {
        // Child: report what it saw through the exit code and bump the value.
        let seen = cell.load(Ordering::SeqCst);
        cell.store(seen + 1, Ordering::SeqCst);
        unsafe { libc::_exit(if seen == 41 { 0 } else { 1 }) };
    }

    let mut status = 0;
    let ret = unsafe { libc::waitpid(pid, &mut status, 0) };
    assert_eq!(ret, pid);
    assert!(libc::WIFEXITED(status));
    assert_eq!(libc::WEXITSTATUS(status), 0, "child did not see the parent's write");
    assert_eq!(cell.load(Ordering::SeqCst), 42);

    unsafe { shared::free(region).expect("free after child stopped") };
}

#[test]
fn copies_of_a_handle_share_bytes() {
    let region = shared::allocate(16).expect("allocate");
    let copy = region;
    unsafe {
        region.as_mut_slice()[3] = 7;
        assert_eq!(copy.as_slice()[3], 7);
        shared::free(region).expect("free");
    }
}
