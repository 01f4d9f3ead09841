use crate::types::{name_type_var, ErrorType, TypeExt};
use crate::unification_table::UnificationTable;
use std::fmt;
use tern_collections::all::{ImMap, ImSet, MutSet, SendMap};
use tern_module::ident::Lowercase;
use tern_module::symbol::Symbol;

tern_error_macros::assert_sizeof_all!(Variable, 4);
tern_error_macros::assert_sizeof_all!(OptVariable, 4);
tern_error_macros::assert_sizeof_all!(Rank, 4);
tern_error_macros::assert_sizeof_all!(Mark, 4);

#[derive(Clone, Copy, Hash, PartialEq, Eq)]
pub struct Mark(i32);

impl Mark {
    pub const NONE: Mark = Mark(2);
    pub const OCCURS: Mark = Mark(1);
    pub const GET_VAR_NAMES: Mark = Mark(0);

    #[inline(always)]
    pub fn next(self) -> Mark {
        Mark(self.0 + 1)
    }
}

impl fmt::Debug for Mark {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self == &Mark::NONE {
            write!(f, "none")
        } else if self == &Mark::OCCURS {
            write!(f, "occurs")
        } else if self == &Mark::GET_VAR_NAMES {
            write!(f, "get_var_names")
        } else {
            write!(f, "Mark({})", self.0)
        }
    }
}

/// The entire substitution: a table of variables, where unified variables
/// share a single descriptor through the union-find structure.
#[derive(Clone)]
pub struct Subs {
    utable: UnificationTable,
}

impl Default for Subs {
    fn default() -> Self {
        Subs::new()
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct OptVariable(u32);

impl OptVariable {
    pub const NONE: OptVariable = OptVariable(Variable::NULL.0);

    pub fn is_none(self) -> bool {
        self == OptVariable::NONE
    }

    pub fn is_some(self) -> bool {
        self != OptVariable::NONE
    }

    pub fn into_variable(self) -> Option<Variable> {
        if self.is_none() {
            None
        } else {
            Some(Variable(self.0))
        }
    }
}

impl fmt::Debug for OptVariable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        (*self).into_variable().fmt(f)
    }
}

impl From<Variable> for OptVariable {
    fn from(var: Variable) -> Self {
        OptVariable(var.0)
    }
}

impl From<OptVariable> for Option<Variable> {
    fn from(opt_var: OptVariable) -> Self {
        opt_var.into_variable()
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable(u32);

impl Variable {
    /// Index 0 is never allocated to a real variable; `OptVariable` uses it
    /// as its absence niche. Every descriptor carries a copy slot, so paying
    /// for a full `Option<Variable>` there would widen all of them.
    const NULL: Variable = Variable(0);

    /// The first index handed out by a fresh `Subs` (index 0 is `NULL`).
    pub const FIRST_USER_SPACE_VAR: Variable = Variable(1);

    pub(crate) const fn from_index(index: u32) -> Variable {
        Variable(index)
    }

    pub const fn index(&self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rank(u32);

impl Rank {
    /// The generalized sentinel: a class whose rank is NONE is a quantifier
    /// of some closed-over scheme and no longer belongs to any pool.
    pub const NONE: Rank = Rank(0);

    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }

    /// The outermost binder depth.
    pub fn toplevel() -> Self {
        Rank(1)
    }

    pub fn next(self) -> Self {
        Rank(self.0 + 1)
    }

    pub fn into_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Debug for Rank {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Rank> for usize {
    fn from(rank: Rank) -> Self {
        rank.0 as usize
    }
}

impl From<usize> for Rank {
    fn from(index: usize) -> Self {
        Rank(index as u32)
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub content: Content,
    pub rank: Rank,
    pub mark: Mark,
    pub copy: OptVariable,
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:?}, r: {:?}, m: {:?} c: {:?}",
            self.content,
            self.rank,
            self.mark,
            self.copy.into_variable()
        )
    }
}

impl Default for Descriptor {
    fn default() -> Self {
        unnamed_flex_var().into()
    }
}

impl From<Content> for Descriptor {
    fn from(content: Content) -> Descriptor {
        Descriptor {
            content,
            rank: Rank::NONE,
            mark: Mark::NONE,
            copy: OptVariable::NONE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Content {
    /// An unsolved variable. It starts out nameless; once error rendering
    /// or pretty-printing assigns it a letter, the letter is stored here so
    /// the variable prints the same way on every later appearance.
    FlexVar(Option<Lowercase>),
    /// An unsolved variable that may only unify with members of a super
    /// kind, e.g. `number` or `comparable`.
    FlexSuper(Super, Option<Lowercase>),
    /// A quantifier the user wrote in an annotation. While its scheme is
    /// being checked it stands only for itself.
    RigidVar(Lowercase),
    /// A rigid variable that additionally promises membership in a super
    /// kind, e.g. an annotated `number`.
    RigidSuper(Super, Lowercase),
    Structure(FlatType),
    /// A named abbreviation applied to arguments. The last variable is the
    /// expansion, which unification falls back to when the alias names
    /// differ.
    Alias(Symbol, Vec<(Lowercase, Variable)>, Variable),
    /// A class that was involved in a type error. Unifying anything with it
    /// succeeds silently, so one mistake doesn't cascade into dozens of
    /// reported errors.
    Error(ErrorReason),
}

/// The super kinds: each names the set of concrete types an unsolved
/// variable with that constraint may become.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Super {
    /// Int or Float
    Number,
    /// Int, Float, Char, Str, lists and tuples of comparables
    Comparable,
    /// Str or any list
    Appendable,
    /// Str or a list of comparables
    CompAppend,
}

impl Super {
    pub fn as_str(self) -> &'static str {
        match self {
            Super::Number => "number",
            Super::Comparable => "comparable",
            Super::Appendable => "appendable",
            Super::CompAppend => "compappend",
        }
    }
}

/// Why a class collapsed to `Content::Error`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorReason {
    /// Two incompatible types were unified.
    Mismatch,
    /// The occurs check found the class inside itself.
    Infinite,
    /// A super kind constraint was violated.
    BadSuper(Super),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlatType {
    Apply(Symbol, Vec<Variable>),
    Func(Variable, Variable),
    EmptyRecord,
    Record(SendMap<Lowercase, Variable>, Variable),
}

impl Subs {
    pub fn new() -> Self {
        let mut utable = UnificationTable::with_capacity(64);

        // Index 0 is reserved as the NULL sentinel that OptVariable encodes
        // its absence with, so it must never be handed out as a real
        // variable.
        utable.push(unnamed_flex_var(), Rank::NONE, Mark::NONE, OptVariable::NONE);

        Subs { utable }
    }

    #[inline(always)]
    pub fn fresh(&mut self, value: Descriptor) -> Variable {
        self.utable
            .push(value.content, value.rank, value.mark, value.copy)
    }

    #[inline(always)]
    pub fn fresh_unnamed_flex_var(&mut self) -> Variable {
        self.fresh(flex_var_descriptor())
    }

    /// Turn an (already allocated) variable into a rigid one, keeping its
    /// rank. Constraint generation uses this for annotation quantifiers.
    pub fn rigid_var(&mut self, var: Variable, name: Lowercase) {
        self.set_content(var, Content::RigidVar(name));
    }

    /// Like `rigid_var`, but the quantifier also carries a super kind.
    pub fn rigid_super_var(&mut self, var: Variable, sup: Super, name: Lowercase) {
        self.set_content(var, Content::RigidSuper(sup, name));
    }

    /// Merge two classes; this cannot fail. The table decides which root
    /// survives, so callers supply only the merged descriptor and must not
    /// assume either input stays a representative.
    pub fn union(&mut self, left: Variable, right: Variable, desc: Descriptor) {
        self.utable.union(left, right, desc)
    }

    pub fn get(&mut self, key: Variable) -> Descriptor {
        let root = self.utable.root_key(key);
        self.utable.get_descriptor(root)
    }

    #[inline(always)]
    pub fn get_without_compacting(&self, key: Variable) -> Descriptor {
        self.utable.get_descriptor(key)
    }

    pub fn get_rank(&self, key: Variable) -> Rank {
        self.utable.get_rank(key)
    }

    pub fn get_mark(&self, key: Variable) -> Mark {
        self.utable.get_mark(key)
    }

    pub fn get_copy(&self, key: Variable) -> OptVariable {
        self.utable.get_copy(key)
    }

    pub fn get_content_without_compacting(&self, key: Variable) -> &Content {
        self.utable.get_content(key)
    }

    pub fn get_root_key(&mut self, key: Variable) -> Variable {
        self.utable.root_key(key)
    }

    pub fn get_root_key_without_compacting(&self, key: Variable) -> Variable {
        self.utable.root_key_without_compacting(key)
    }

    #[inline(always)]
    pub fn set(&mut self, key: Variable, r_value: Descriptor) {
        self.utable.set_descriptor(key, r_value)
    }

    pub fn set_rank(&mut self, key: Variable, rank: Rank) {
        self.utable.set_rank(key, rank)
    }

    pub fn set_mark(&mut self, key: Variable, mark: Mark) {
        self.utable.set_mark(key, mark)
    }

    pub fn set_copy(&mut self, key: Variable, copy: OptVariable) {
        self.utable.set_copy(key, copy)
    }

    pub fn set_rank_mark(&mut self, key: Variable, rank: Rank, mark: Mark) {
        let root = self.utable.root_key(key);
        self.utable.set_rank_unchecked(root, rank);
        self.utable.set_mark_unchecked(root, mark);
    }

    pub fn set_content(&mut self, key: Variable, content: Content) {
        self.utable.set_content(key, content)
    }

    pub fn modify<F, T>(&mut self, key: Variable, mapper: F) -> T
    where
        F: FnOnce(&mut Descriptor) -> T,
    {
        self.utable.modify(key, mapper)
    }

    /// Reads the rank and stamps the mark in one root lookup; generalization
    /// runs this over every inhabitant of the young pool.
    pub fn get_rank_set_mark(&mut self, key: Variable, mark: Mark) -> Rank {
        self.utable.get_rank_set_mark(key, mark)
    }

    pub fn equivalent(&mut self, left: Variable, right: Variable) -> bool {
        self.utable.unioned(left, right)
    }

    /// True iff this variable has been unioned into another class and is no
    /// longer a representative.
    pub fn redundant(&self, var: Variable) -> bool {
        self.utable.is_redirect(var)
    }

    pub fn occurs(&self, var: Variable) -> Result<(), (Variable, Vec<Variable>)> {
        occurs(self, &ImSet::default(), var)
    }

    pub fn var_to_error_type(&mut self, var: Variable) -> ErrorType {
        let names = get_var_names(self, var, ImMap::default());
        let mut taken = MutSet::default();

        for (name, _) in names {
            taken.insert(name);
        }

        let mut state = ErrorTypeState {
            taken,
            letters_used: 0,
        };

        var_to_err_type(self, &mut state, var)
    }

    pub fn len(&self) -> usize {
        self.utable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utable.is_empty()
    }
}

#[inline(always)]
fn flex_var_descriptor() -> Descriptor {
    Descriptor::from(unnamed_flex_var())
}

#[inline(always)]
const fn unnamed_flex_var() -> Content {
    Content::FlexVar(None)
}

impl fmt::Debug for Subs {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f)?;
        for i in Variable::FIRST_USER_SPACE_VAR.index()..self.len() as u32 {
            let var = Variable(i);
            let root = self.get_root_key_without_compacting(var);

            if var == root {
                let desc = self.get_without_compacting(var);

                writeln!(f, "{} => {:?}", i, desc)?;
            } else {
                writeln!(f, "{} => <{:?}>", i, root)?;
            }
        }

        Ok(())
    }
}

// OCCURS

fn occurs(
    subs: &Subs,
    seen: &ImSet<Variable>,
    input_var: Variable,
) -> Result<(), (Variable, Vec<Variable>)> {
    use self::Content::*;
    use self::FlatType::*;

    let root_var = subs.get_root_key_without_compacting(input_var);

    if seen.contains(&root_var) {
        Err((root_var, vec![]))
    } else {
        match subs.get_content_without_compacting(root_var) {
            FlexVar(_) | FlexSuper(_, _) | RigidVar(_) | RigidSuper(_, _) | Error(_) => Ok(()),

            Structure(flat_type) => {
                let mut new_seen = seen.clone();

                new_seen.insert(root_var);

                match flat_type {
                    Apply(_, args) => short_circuit(subs, root_var, &new_seen, args.iter()),
                    Func(arg_var, ret_var) => {
                        short_circuit_help(subs, root_var, &new_seen, *arg_var)?;
                        short_circuit_help(subs, root_var, &new_seen, *ret_var)
                    }
                    Record(vars_by_field, ext_var) => {
                        for (_, var) in vars_by_field.iter() {
                            short_circuit_help(subs, root_var, &new_seen, *var)?;
                        }

                        short_circuit_help(subs, root_var, &new_seen, *ext_var)
                    }
                    EmptyRecord => Ok(()),
                }
            }
            Alias(_, args, real_var) => {
                let mut new_seen = seen.clone();
                new_seen.insert(root_var);

                for (_, var) in args {
                    short_circuit_help(subs, root_var, &new_seen, *var)?;
                }

                short_circuit_help(subs, root_var, &new_seen, *real_var)
            }
        }
    }
}

fn short_circuit<'a, T>(
    subs: &Subs,
    root_key: Variable,
    seen: &ImSet<Variable>,
    iter: T,
) -> Result<(), (Variable, Vec<Variable>)>
where
    T: Iterator<Item = &'a Variable>,
{
    for var in iter {
        short_circuit_help(subs, root_key, seen, *var)?;
    }

    Ok(())
}

fn short_circuit_help(
    subs: &Subs,
    root_key: Variable,
    seen: &ImSet<Variable>,
    var: Variable,
) -> Result<(), (Variable, Vec<Variable>)> {
    if let Err((v, mut vec)) = occurs(subs, seen, var) {
        vec.push(root_key);
        return Err((v, vec));
    }

    Ok(())
}

// ERROR TYPES

struct ErrorTypeState {
    taken: MutSet<Lowercase>,
    letters_used: u32,
}

/// Collect the names already attached to variables reachable from `var`, so
/// that generated names never collide with them. A name attached to a second,
/// non-equivalent variable gets an index suffix along the way.
fn get_var_names(
    subs: &mut Subs,
    var: Variable,
    taken_names: ImMap<Lowercase, Variable>,
) -> ImMap<Lowercase, Variable> {
    use self::Content::*;

    let desc = subs.get(var);

    if desc.mark == Mark::GET_VAR_NAMES {
        taken_names
    } else {
        subs.set_mark(var, Mark::GET_VAR_NAMES);

        match desc.content {
            Error(_) | FlexVar(None) | FlexSuper(_, None) => taken_names,

            FlexVar(Some(name)) => {
                add_name(subs, 0, name, var, |name| FlexVar(Some(name)), taken_names)
            }

            FlexSuper(sup, Some(name)) => add_name(
                subs,
                0,
                name,
                var,
                move |name| FlexSuper(sup, Some(name)),
                taken_names,
            ),

            RigidVar(name) => add_name(subs, 0, name, var, RigidVar, taken_names),

            RigidSuper(sup, name) => add_name(
                subs,
                0,
                name,
                var,
                move |name| RigidSuper(sup, name),
                taken_names,
            ),

            Alias(_, args, real_var) => {
                let taken_names = args.into_iter().fold(taken_names, |answer, (_, arg_var)| {
                    get_var_names(subs, arg_var, answer)
                });

                get_var_names(subs, real_var, taken_names)
            }

            Structure(flat_type) => match flat_type {
                FlatType::Apply(_, args) => {
                    args.into_iter().fold(taken_names, |answer, arg_var| {
                        get_var_names(subs, arg_var, answer)
                    })
                }

                FlatType::Func(arg_var, ret_var) => {
                    let taken_names = get_var_names(subs, arg_var, taken_names);

                    get_var_names(subs, ret_var, taken_names)
                }

                FlatType::EmptyRecord => taken_names,

                FlatType::Record(vars_by_field, ext_var) => {
                    let mut accum = get_var_names(subs, ext_var, taken_names);

                    for (_, arg_var) in vars_by_field {
                        accum = get_var_names(subs, arg_var, accum)
                    }

                    accum
                }
            },
        }
    }
}

fn add_name<F>(
    subs: &mut Subs,
    index: usize,
    given_name: Lowercase,
    var: Variable,
    content_from_name: F,
    taken_names: ImMap<Lowercase, Variable>,
) -> ImMap<Lowercase, Variable>
where
    F: FnOnce(Lowercase) -> Content,
{
    let indexed_name = if index == 0 {
        given_name.clone()
    } else {
        // a numeric suffix disambiguates a reused name: x, x1, x2, ...
        Lowercase::from(format!("{}{}", given_name.as_str(), index))
    };

    match taken_names.get(&indexed_name) {
        None => {
            if indexed_name != given_name {
                subs.set_content(var, content_from_name(indexed_name.clone()));
            }

            let mut answer = taken_names.clone();

            answer.insert(indexed_name, var);

            answer
        }
        Some(&other_var) => {
            if subs.equivalent(var, other_var) {
                taken_names
            } else {
                add_name(
                    subs,
                    index + 1,
                    given_name,
                    var,
                    content_from_name,
                    taken_names,
                )
            }
        }
    }
}

fn get_fresh_var_name(state: &mut ErrorTypeState) -> Lowercase {
    let (name, new_index) = name_type_var(state.letters_used, &mut state.taken);

    state.letters_used = new_index;

    name
}

fn var_to_err_type(subs: &mut Subs, state: &mut ErrorTypeState, var: Variable) -> ErrorType {
    let desc = subs.get(var);

    if desc.mark == Mark::OCCURS {
        // We hit this class again while still rendering it: the type is
        // cyclic. Emit a placeholder instead of looping; the graph itself is
        // left alone.
        ErrorType::Infinite
    } else {
        subs.set_mark(var, Mark::OCCURS);

        let err_type = content_to_err_type(subs, state, var, desc.content);

        subs.set_mark(var, desc.mark);

        err_type
    }
}

fn content_to_err_type(
    subs: &mut Subs,
    state: &mut ErrorTypeState,
    var: Variable,
    content: Content,
) -> ErrorType {
    use self::Content::*;

    match content {
        Structure(flat_type) => flat_type_to_err_type(subs, state, flat_type),

        FlexVar(opt_name) => {
            let name = match opt_name {
                Some(name) => name,
                None => {
                    let name = get_fresh_var_name(state);

                    subs.set_content(var, FlexVar(Some(name.clone())));

                    name
                }
            };

            ErrorType::FlexVar(name)
        }

        FlexSuper(sup, opt_name) => {
            let name = match opt_name {
                Some(name) => name,
                None => {
                    // unnamed super vars render as their kind: `number`,
                    // `comparable`, ...
                    let name = Lowercase::from(sup.as_str());

                    subs.set_content(var, FlexSuper(sup, Some(name.clone())));

                    name
                }
            };

            ErrorType::FlexVar(name)
        }

        RigidVar(name) => ErrorType::RigidVar(name),

        RigidSuper(_, name) => ErrorType::RigidVar(name),

        Alias(symbol, args, aliased_to) => {
            let err_type = var_to_err_type(subs, state, aliased_to);

            let mut err_args = Vec::with_capacity(args.len());

            for (arg_name, arg_var) in args {
                let arg = var_to_err_type(subs, state, arg_var);

                err_args.push((arg_name, arg));
            }

            ErrorType::Alias(symbol, err_args, Box::new(err_type))
        }

        Error(_) => ErrorType::Error,
    }
}

fn flat_type_to_err_type(
    subs: &mut Subs,
    state: &mut ErrorTypeState,
    flat_type: FlatType,
) -> ErrorType {
    use self::FlatType::*;

    match flat_type {
        Apply(symbol, args) => {
            let arg_types = args
                .into_iter()
                .map(|arg_var| var_to_err_type(subs, state, arg_var))
                .collect();

            ErrorType::Type(symbol, arg_types)
        }

        Func(arg_var, ret_var) => {
            let arg = var_to_err_type(subs, state, arg_var);
            let ret = var_to_err_type(subs, state, ret_var);

            ErrorType::Function(Box::new(arg), Box::new(ret))
        }

        EmptyRecord => ErrorType::Record(SendMap::default(), TypeExt::Closed),

        Record(vars_by_field, ext_var) => {
            let mut err_fields = SendMap::default();

            for (field, var) in vars_by_field {
                let error_type = var_to_err_type(subs, state, var);

                err_fields.insert(field, error_type);
            }

            match var_to_err_type(subs, state, ext_var).unwrap_alias() {
                ErrorType::Record(sub_fields, sub_ext) => {
                    ErrorType::Record(sub_fields.union(err_fields), sub_ext)
                }

                ErrorType::FlexVar(var) => ErrorType::Record(err_fields, TypeExt::FlexOpen(var)),

                ErrorType::RigidVar(var) => ErrorType::Record(err_fields, TypeExt::RigidOpen(var)),

                // The extension is cyclic or already knotted with an error;
                // report the fields we have over a closed extension rather
                // than give up on the whole record.
                ErrorType::Infinite | ErrorType::Error => {
                    ErrorType::Record(err_fields, TypeExt::Closed)
                }

                other => tern_error_macros::internal_error!(
                    "a record extension variable resolved to the non-extension type {:?}",
                    other
                ),
            }
        }
    }
}
