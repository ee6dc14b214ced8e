//! Build script for pio-envoy: picks the linker memory layout for the target board.

use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rustc-check-cfg=cfg(rust_analyzer)");

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
    let target = env::var("TARGET").expect("TARGET is set by cargo");

    let (memory_file, link_scripts): (&str, &[&str]) = if target.starts_with("thumbv8m") {
        // Pico 2 ARM
        ("memory-pico2.x", &["-Tlink.x", "-Tdefmt.x"])
    } else if target.starts_with("riscv32imac") {
        // Pico 2 RISC-V
        ("memory-pico2-riscv.x", &["-Tlink.x", "-Tdefmt.x"])
    } else if target.starts_with("thumbv6m") {
        // Pico 1 / Pico 1W
        ("memory-pico1w.x", &["-Tlink.x", "-Tlink-rp.x", "-Tdefmt.x"])
    } else {
        // Host: nothing to link against.
        return;
    };

    let memory_x = fs::read_to_string(memory_file)
        .unwrap_or_else(|err| panic!("Failed to read {memory_file}: {err}"));
    fs::write(out_dir.join("memory.x"), memory_x).expect("Failed to write memory.x");
    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rerun-if-changed={memory_file}");

    println!("cargo:rustc-link-arg-bins=--nmagic");
    for script in link_scripts {
        println!("cargo:rustc-link-arg-bins={script}");
    }
}
