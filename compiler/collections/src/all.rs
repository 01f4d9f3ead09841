use std::hash::BuildHasherDefault;

pub use wyhash::WyHash;

#[inline(always)]
pub fn default_hasher() -> BuildHasherDefault<WyHash> {
    BuildHasherDefault::default()
}

pub type BuildHasher = BuildHasherDefault<WyHash>;

// The std and im maps, re-hashed with WyHash. The compiler hashes tiny
// interned keys on every lookup, and SipHash's flood resistance buys
// nothing here: nobody feeds a type checker attacker-controlled keys.
pub type MutMap<K, V> = std::collections::HashMap<K, V, BuildHasher>;

pub type MutSet<K> = std::collections::HashSet<K, BuildHasher>;

pub type ImMap<K, V> = im_rc::hashmap::HashMap<K, V, BuildHasher>;

pub type ImSet<K> = im_rc::hashset::HashSet<K, BuildHasher>;

// The Send variant, for data that crosses module boundaries. Constraint
// headers and the solver's environment use this because constraint
// generation happens on a different thread than solving.
pub type SendMap<K, V> = im::hashmap::HashMap<K, V, BuildHasher>;
