#![doc(test(attr(deny(warnings))))]

//! Finance Core offers the ledger, scheduling, and interest-accrual
//! primitives behind a single-user personal finance manager, plus the
//! interactive CLI built on top of them.

pub mod cli;
pub mod config;
pub mod errors;
pub mod ledger;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Finance Core tracing initialized.");
    });
}
