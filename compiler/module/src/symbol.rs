use inlinable_string::InlinableString;
use std::collections::HashMap;
use std::fmt;
use tern_collections::all::{default_hasher, MutMap};

/// An interned identifier: the owning module in the low 32 bits, the ident
/// within that module in the high 32 bits. Packing both halves into one u64
/// keeps a Symbol register-sized and free to copy, which matters because the
/// solver compares and hashes these constantly.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u64);

impl Symbol {
    // The builtin constants (Symbol::INT_INT and friends) are generated by
    // the define_builtins! invocation at the bottom of this file.

    pub const fn new(module_id: ModuleId, ident_id: IdentId) -> Symbol {
        // The module half sits low because it is the half we extract most
        // often, and truncating is cheaper than shifting.
        let bits = ((ident_id.0 as u64) << 32) | (module_id.0 as u64);

        Symbol(bits)
    }

    pub fn module_id(self) -> ModuleId {
        ModuleId(self.0 as u32)
    }

    pub fn ident_id(self) -> IdentId {
        IdentId((self.0 >> 32) as u32)
    }

    /// Kernel identifiers live in the builtin modules. The solver treats a
    /// lookup of one of these that is missing from the environment as a
    /// foreign primitive rather than an internal failure.
    pub fn is_builtin(self) -> bool {
        self.module_id().is_builtin()
    }

    pub fn module_string<'a>(&self, interns: &'a Interns) -> &'a InlinableString {
        interns
            .module_ids
            .get_name(self.module_id())
            .unwrap_or_else(|| {
                panic!(
                    "module_string could not find module name for {:?}",
                    self.module_id()
                )
            })
    }

    pub fn ident_string(self, interns: &Interns) -> &InlinableString {
        let ident_ids = interns
            .all_ident_ids
            .get(&self.module_id())
            .unwrap_or_else(|| {
                panic!(
                    "ident_string could not find IdentIds for {:?}",
                    self.module_id()
                )
            });

        ident_ids.get_name(self.ident_id()).unwrap_or_else(|| {
            panic!(
                "Could not find name for ident ID {} in module {:?}",
                self.ident_id().0,
                self.module_id()
            )
        })
    }
}

/// Debug-prints as `` `List.map` `` rather than as a pair of opaque numbers,
/// whenever the debug-build name tables know the name. Release builds have
/// no name tables and fall back to the numbers.
impl fmt::Debug for Symbol {
    #[cfg(debug_assertions)]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let module_id = self.module_id();
        let ident_id = self.ident_id();
        let names = DEBUG_IDENT_IDS_BY_MODULE_ID
            .lock()
            .expect("the debug ident-name table mutex was poisoned");

        match names
            .get(&module_id.0)
            .and_then(|ident_ids| ident_ids.get_name(ident_id))
        {
            Some(ident_str) => write!(f, "`{:?}.{}`", module_id, ident_str),
            None => write!(f, "`{:?}.{:?}`", module_id, ident_id),
        }
    }

    #[cfg(not(debug_assertions))]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let module_id = self.module_id();
        let ident_id = self.ident_id();

        write!(f, "`{:?}.{:?}`", module_id, ident_id)
    }
}

#[cfg(debug_assertions)]
lazy_static! {
    /// Debug-build side table from raw module ids to module names, filled
    /// in as modules are interned. Keyed by the raw u32 so that dumping the
    /// table can never re-enter ModuleId's Debug impl.
    static ref DEBUG_MODULE_ID_NAMES: std::sync::Mutex<MutMap<u32, Box<str>>> =
        std::sync::Mutex::new(MutMap::default());
}

#[cfg(debug_assertions)]
lazy_static! {
    /// Debug-build side table from raw module ids to their ident names;
    /// same raw-u32 keying as DEBUG_MODULE_ID_NAMES, for the same reason.
    static ref DEBUG_IDENT_IDS_BY_MODULE_ID: std::sync::Mutex<MutMap<u32, IdentIds>> =
        std::sync::Mutex::new(MutMap::default());
}

#[derive(Debug)]
pub struct Interns {
    pub module_ids: ModuleIds,
    pub all_ident_ids: MutMap<ModuleId, IdentIds>,
}

/// Numbers a module. The builtin modules claim the low ids at startup;
/// everything else gets the next free id as it is interned.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(u32);

impl ModuleId {
    // The builtin constants (ModuleId::LIST and friends) are generated by
    // the define_builtins! invocation at the bottom of this file.

    pub fn is_builtin(self) -> bool {
        (self.0 as usize) < NUM_BUILTIN_MODULES
    }

    #[cfg(debug_assertions)]
    pub fn name(self) -> Box<str> {
        let names = DEBUG_MODULE_ID_NAMES
            .lock()
            .expect("the debug module-name table mutex was poisoned");

        match names.get(&self.0) {
            Some(str_ref) => str_ref.clone(),
            None => {
                panic!(
                    "No debug name was ever registered for module ID {} in {:?}",
                    self.0, names,
                );
            }
        }
    }

    #[cfg(debug_assertions)]
    pub fn register_debug_idents(self, ident_ids: &IdentIds) {
        let mut all = DEBUG_IDENT_IDS_BY_MODULE_ID
            .lock()
            .expect("the debug ident-name table mutex was poisoned");

        all.insert(self.0, ident_ids.clone());
    }

    #[cfg(not(debug_assertions))]
    pub fn register_debug_idents(self, _ident_ids: &IdentIds) {
        // release builds have no name tables to fill
    }
}

/// Debug-prints as the module's name in debug builds. The name lives in a
/// global table behind a mutex, which is why release builds don't maintain
/// it and print the raw id instead.
impl fmt::Debug for ModuleId {
    #[cfg(debug_assertions)]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }

    #[cfg(not(debug_assertions))]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The module-name intern table. An id indexes straight into `by_id`;
/// `by_name` answers the reverse lookup without a scan. Both directions hold
/// the same interned strings, so the duplication costs little.
#[derive(Debug, Clone)]
pub struct ModuleIds {
    by_name: MutMap<InlinableString, ModuleId>,
    by_id: Vec<InlinableString>,
}

impl ModuleIds {
    pub fn get_or_insert(&mut self, module_name: &InlinableString) -> ModuleId {
        match self.by_name.get(module_name) {
            Some(id) => *id,
            None => {
                let by_id = &mut self.by_id;
                let module_id = ModuleId(by_id.len() as u32);

                by_id.push(module_name.clone());

                self.by_name.insert(module_name.clone(), module_id);

                if cfg!(debug_assertions) {
                    Self::insert_debug_name(module_id, module_name);
                }

                module_id
            }
        }
    }

    #[cfg(debug_assertions)]
    fn insert_debug_name(module_id: ModuleId, module_name: &InlinableString) {
        let mut names = DEBUG_MODULE_ID_NAMES
            .lock()
            .expect("the debug module-name table mutex was poisoned");

        names.insert(module_id.0, module_name.to_string().into());
    }

    #[cfg(not(debug_assertions))]
    fn insert_debug_name(_module_id: ModuleId, _module_name: &InlinableString) {
        // release builds have no name tables to fill
    }

    pub fn get_name(&self, id: ModuleId) -> Option<&InlinableString> {
        self.by_id.get(id.0 as usize)
    }
}

/// Numbers an identifier within one module. Only the pair (ModuleId,
/// IdentId) identifies a name globally; that pair is what `Symbol` packs.
/// Everything downstream of canonicalization works on these numbers so it
/// never has to hash strings again.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentId(u32);

/// The per-module ident intern table; same two-way layout as `ModuleIds`.
#[derive(Clone, Debug, Default)]
pub struct IdentIds {
    by_ident: MutMap<InlinableString, IdentId>,
    by_id: Vec<InlinableString>,
}

impl IdentIds {
    pub fn get_or_insert(&mut self, name: &InlinableString) -> IdentId {
        match self.by_ident.get(name) {
            Some(id) => *id,
            None => {
                let by_id = &mut self.by_id;
                let ident_id = IdentId(by_id.len() as u32);

                by_id.push(name.clone());

                self.by_ident.insert(name.clone(), ident_id);

                ident_id
            }
        }
    }

    pub fn get_name(&self, id: IdentId) -> Option<&InlinableString> {
        self.by_id.get(id.0 as usize)
    }
}

// BUILTINS

macro_rules! define_builtins {
    {
        $(
            $module_id:literal $module_const:ident: $module_name:literal => {
                $(
                    $ident_id:literal $ident_const:ident: $ident_name:literal
                )+
            }
        )+
        num_modules: $total:literal
    } => {
        /// How many modules the table below declares; every ModuleId under
        /// this is a builtin.
        pub const NUM_BUILTIN_MODULES: usize = $total;

        impl IdentIds {
            pub fn exposed_builtins() -> MutMap<ModuleId, IdentIds> {
                let mut exposed_idents_by_module = MutMap::default();

                $(
                    debug_assert!(!exposed_idents_by_module.contains_key(&ModuleId($module_id)), "builtin module {} {:?} is declared twice in define_builtins!", $module_id, $module_name);

                    let ident_ids = {
                            let by_id = vec! [
                                $(
                                    $ident_name.into(),
                                )+
                            ];
                            let mut by_ident = MutMap::default();

                            $(
                                debug_assert!(!by_ident.contains_key(&InlinableString::from($ident_name)), "builtin ident {:?} is declared twice in module {:?}", $ident_name, $module_name);
                                debug_assert!(by_ident.len() == $ident_id, "builtin ident {:?} in module {:?} is declared as {} but sits at position {}; renumber it", $ident_name, $module_name, $ident_id, by_ident.len());

                                by_ident.insert($ident_name.into(), IdentId($ident_id));
                            )+

                            IdentIds {
                                by_ident,
                                by_id,
                            }
                        };

                    if cfg!(debug_assertions) {
                        let module_id = ModuleId($module_id);

                        ModuleIds::insert_debug_name(module_id, &$module_name.into());
                        module_id.register_debug_idents(&ident_ids);
                    }

                    exposed_idents_by_module.insert(
                        ModuleId($module_id),
                        ident_ids
                    );
                )+

                debug_assert!(exposed_idents_by_module.len() == $total, "num_modules says {} but {} builtin modules are declared", $total, exposed_idents_by_module.len());

                exposed_idents_by_module
            }
        }

        impl ModuleId {
            $(
                pub const $module_const: ModuleId = ModuleId($module_id);
            )+
        }

        impl Default for ModuleIds {
            fn default() -> Self {
                // room for the builtins plus the module being compiled
                let capacity = $total + 1;

                let mut by_name = HashMap::with_capacity_and_hasher(capacity, default_hasher());
                let mut by_id = Vec::with_capacity(capacity);

                let mut insert_both = |id: ModuleId, name_str: &'static str| {
                    let name: InlinableString = name_str.into();

                    if cfg!(debug_assertions) {
                        Self::insert_debug_name(id, &name);
                    }

                    by_name.insert(name.clone(), id);
                    by_id.push(name);
                };

                $(
                    insert_both(ModuleId($module_id), $module_name);
                )+

                ModuleIds { by_name, by_id }
            }
        }

        impl Symbol {
            $(
                $(
                    pub const $ident_const: Symbol = Symbol::new(ModuleId($module_id), IdentId($ident_id));
                )+
            )+
        }
    };
}

define_builtins! {
    0 NUM: "Num" => {
        0 NUM_ABS: "abs"
        1 NUM_ADD: "add"
        2 NUM_SUB: "sub"
        3 NUM_MUL: "mul"
        4 NUM_NEG: "neg"
    }
    1 INT: "Int" => {
        0 INT_INT: "Int" // the Int.Int type
        1 INT_DIV: "div"
        2 INT_MOD: "mod"
    }
    2 FLOAT: "Float" => {
        0 FLOAT_FLOAT: "Float" // the Float.Float type
        1 FLOAT_DIV: "div"
        2 FLOAT_SQRT: "sqrt"
    }
    3 BOOL: "Bool" => {
        0 BOOL_BOOL: "Bool" // the Bool.Bool type
        1 BOOL_AND: "and"
        2 BOOL_OR: "or"
        3 BOOL_NOT: "not"
    }
    4 STR: "Str" => {
        0 STR_STR: "Str" // the Str.Str type
        1 STR_CONCAT: "concat"
        2 STR_ISEMPTY: "isEmpty"
    }
    5 CHAR: "Char" => {
        0 CHAR_CHAR: "Char" // the Char.Char type
    }
    6 LIST: "List" => {
        0 LIST_LIST: "List" // the List.List type
        1 LIST_ISEMPTY: "isEmpty"
        2 LIST_MAP: "map"
        3 LIST_APPEND: "append"
    }
    7 TUPLE: "Tuple" => {
        0 TUPLE_PAIR: "Pair" // the Tuple.Pair type
        1 TUPLE_TRIPLE: "Triple" // the Tuple.Triple type
    }

    num_modules: 8 // counted by hand; the macro cannot do the arithmetic
}
