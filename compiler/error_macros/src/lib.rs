/// For invariants the compiler itself must uphold. Reaching one of these is
/// never the user's fault, so the panic message sends them to the issue
/// tracker rather than asking them to change their program. Missing
/// features should use `unimplemented!` instead, and problems in the user's
/// program belong in the solver's `TypeError` list.
#[macro_export]
macro_rules! internal_error {
    ($($arg:tt)*) => ({
        eprintln!("The compiler violated one of its own invariants.");
        eprintln!("This is a bug in tern, not in your program.");
        eprintln!("Please open an issue: https://github.com/tern-lang/tern/issues/new");
        #[allow(clippy::panic)] {
            panic!($($arg)*);
        }
    })
}

/// Pin a type to an exact byte size on every target; the build breaks when
/// the size drifts.
#[macro_export]
macro_rules! assert_sizeof_all {
    ($t: ty, $expected_size: expr) => {
        static_assertions::assert_eq_size!($t, [u8; $expected_size]);
    };
}
