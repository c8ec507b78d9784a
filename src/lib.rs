// lib.rs

//! The elements that drive the `fswatch` binary.
//!
//! The watch engine lives in [`watcher`]; [`command`], [`config`] and
//! [`console`] are the narrow collaborators the binary wires around it.

#![warn(
    explicit_outlives_requirements,
    macro_use_extern_crate,
    meta_variable_misuse,
    missing_crate_level_docs,
    missing_docs,
    private_doc_tests,
    single_use_lifetimes,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unused_extern_crates,
    unused_lifetimes,
    variant_size_differences,
    clippy::cargo,
    clippy::pedantic
)]

pub mod command;
pub mod config;
pub mod console;

#[cfg(target_os = "linux")]
pub mod watcher;
