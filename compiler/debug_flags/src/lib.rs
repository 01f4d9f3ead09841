//! Environment-variable switches for verbose solver output.
//!
//! Each flag below names an environment variable; setting it to anything
//! but "0" turns the matching trace on. The checks only exist in debug
//! builds, so release binaries pay nothing for them. A typical session:
//!
//! ```bash
//! TERN_PRINT_UNIFICATIONS=1 cargo test -p tern_solve
//! ```

#[macro_export]
macro_rules! dbg_set {
    ($flag:path) => {{
        #[cfg(not(debug_assertions))]
        {
            false
        }
        #[cfg(debug_assertions)]
        {
            let flag = std::env::var($flag);
            flag.is_ok() && flag.as_deref() != Ok("0")
        }
    }};
}

#[macro_export]
macro_rules! dbg_do {
    ($flag:path, $expr:expr) => {
        #[cfg(debug_assertions)]
        {
            if $crate::dbg_set!($flag) {
                $expr
            }
        }
    };
}

macro_rules! flags {
    ($($(#[doc = $doc:expr])+ $flag:ident)*) => {$(
        $(#[doc = $doc])+
        pub static $flag: &str = stringify!($flag);
    )*};
}

flags! {
    // ===Unify===

    /// Trace every unification as it is dispatched, with both contents.
    /// The output interleaves badly across threads; single-threaded only.
    TERN_PRINT_UNIFICATIONS

    /// Name the source location of every mismatch the unifier produces.
    TERN_PRINT_MISMATCHES

    // ===Solve===

    /// Announce each pool as generalization closes it out.
    TERN_PRINT_GENERALIZATIONS
}
