//! Raw signal handling (`spec.md` §5: "a SIGALRM-driven pagination timeout
//! and SIGINT restoring the terminal before the default handler runs").
//! The rest of the workspace is synchronous with no async runtime, so this
//! installs `libc::signal` handlers directly rather than reaching for
//! `tokio::signal`, grounded on the raw `libc::signal` call already used
//! for `SIGHUP` in the teacher's session-spawn path. A signal handler may
//! only touch async-signal-safe state, so both handlers do nothing but
//! store to a `static` `AtomicBool`; the main loop polls it between reads.

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

static INTERRUPTED: AtomicBool = AtomicBool::new(false);
static PAGINATION_TIMED_OUT: AtomicBool = AtomicBool::new(false);

extern "C" fn on_sigint(_: libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

extern "C" fn on_sigalrm(_: libc::c_int) {
    PAGINATION_TIMED_OUT.store(true, Ordering::SeqCst);
}

/// Install both handlers. Idempotent: calling it more than once just
/// re-registers the same function pointers.
pub fn install() {
    // SAFETY: both handler functions only perform an atomic store, which is
    // async-signal-safe; `libc::signal` itself is safe to call from any
    // thread at any point in the process lifetime.
    unsafe {
        libc::signal(libc::SIGINT, on_sigint as libc::sighandler_t);
        libc::signal(libc::SIGALRM, on_sigalrm as libc::sighandler_t);
    }
}

/// True if SIGINT has arrived since the last [`take_interrupted`] call.
pub fn take_interrupted() -> bool {
    INTERRUPTED.swap(false, Ordering::SeqCst)
}

/// Arm a one-shot pagination timeout (`spec.md` §4.2, "a stuck reader must
/// not block the process forever"). `seconds == 0` cancels any pending
/// alarm.
pub fn arm_pagination_timeout(seconds: u32) {
    // SAFETY: `alarm` has no preconditions beyond a valid process.
    unsafe {
        libc::alarm(seconds);
    }
}

pub fn take_pagination_timed_out() -> bool {
    PAGINATION_TIMED_OUT.swap(false, Ordering::SeqCst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_interrupted_clears_the_flag() {
        INTERRUPTED.store(true, Ordering::SeqCst);
        assert!(take_interrupted());
        assert!(!take_interrupted());
    }

    #[test]
    fn take_pagination_timed_out_clears_the_flag() {
        PAGINATION_TIMED_OUT.store(true, Ordering::SeqCst);
        assert!(take_pagination_timed_out());
        assert!(!take_pagination_timed_out());
    }
}
