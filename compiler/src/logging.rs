//! Logging setup for the sable compiler
//!
//! Uses the `log` facade with `env_logger` as the backend. The lowering
//! stage logs at these levels:
//!
//! - `error!` - contract violations, right before the panic
//! - `debug!` - one line per lowered access
//! - `trace!` - temporary bindings and dumped HIR (`dump_lowered`)
//!
//! ```bash
//! RUST_LOG=sable_compiler::ir=debug cargo test
//! RUST_LOG=sable_compiler::ir::temporaries=trace cargo test
//! ```

use env_logger::Builder;
use log::LevelFilter;
use std::io::Write;
use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize logging at Warn level. Later calls are no-ops.
pub fn init() {
    init_with_level(LevelFilter::Warn);
}

/// Initialize logging with a specific level. Later calls are no-ops.
pub fn init_with_level(level: LevelFilter) {
    INIT.call_once(|| {
        Builder::new()
            .filter_level(level)
            .format(|buf, record| {
                writeln!(
                    buf,
                    "[{:5}] {} - {}",
                    record.level(),
                    record.module_path().unwrap_or("sable"),
                    record.args()
                )
            })
            .init();
    });
}

/// Initialize logging from `RUST_LOG`, defaulting to Warn.
pub fn init_from_env() {
    INIT.call_once(|| {
        Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    });
}

/// Initialize logging for tests.
///
/// Output goes through the test harness capture, so it only shows for
/// failing tests. Honors `RUST_LOG` when set.
pub fn init_test() {
    // try_init() doesn't panic if already initialized
    let _ = Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .is_test(true)
        .try_init();
}

/// Whether `init`, `init_with_level` or `init_from_env` has run.
pub fn is_initialized() -> bool {
    INIT.is_completed()
}
