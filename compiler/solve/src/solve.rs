#![allow(clippy::too_many_arguments)]

use tern_collections::all::SendMap;
use tern_debug_flags::{dbg_do, TERN_PRINT_GENERALIZATIONS};
use tern_error_macros::internal_error;
use tern_module::symbol::Symbol;
use tern_region::all::{Located, Region};
use tern_types::solved_types::Solved;
use tern_types::subs::{
    Content, Descriptor, ErrorReason, FlatType, Mark, OptVariable, Rank, Subs, Super, Variable,
};
use tern_types::types::{Constraint, ErrorType, Expected, Type};
use tern_unify::unify::{unify, Unified};

/// A user-facing type problem. These accumulate while the solver keeps
/// walking; a non-empty list at the end means the program does not type
/// check.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeError {
    BadExpr(Region, ErrorType, Expected<ErrorType>),
    BadSuperKind(Region, Super, ErrorType, Expected<ErrorType>),
    CircularType(Symbol, ErrorType, Region),
    UnexposedLookup(Symbol),
}

/// A broken solver invariant. Unlike `TypeError`s, one of these aborts the
/// solve immediately; there is no sensible state to continue from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalProblem {
    /// Generalization finished, yet a rigid quantifier of the scheme still
    /// has a rank.
    RigidNotGeneralized(Variable),
}

#[derive(Clone, Debug, Default)]
pub struct Env {
    pub bindings: SendMap<Symbol, Located<Variable>>,
}

impl Env {
    pub fn get_var(&self, symbol: Symbol) -> Option<Variable> {
        self.bindings.get(&symbol).map(|loc_var| loc_var.value)
    }

    /// The first binding of a name wins; shadowing was already resolved
    /// before constraints were generated.
    #[inline(always)]
    fn insert_if_absent(&mut self, symbol: Symbol, loc_var: Located<Variable>) {
        if !self.bindings.contains_key(&symbol) {
            self.bindings.insert(symbol, loc_var);
        }
    }
}

const DEFAULT_POOLS: usize = 8;

/// The pool at index N holds every variable introduced while solving at
/// binder depth N; the pool at the current rank is the "young" pool that
/// generalization drains when its `let` closes.
#[derive(Clone, Debug)]
pub struct Pools(Vec<Vec<Variable>>);

impl Default for Pools {
    fn default() -> Self {
        Pools::new(DEFAULT_POOLS)
    }
}

impl Pools {
    pub fn new(num_pools: usize) -> Self {
        Pools(vec![Vec::new(); num_pools])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get_mut(&mut self, rank: Rank) -> &mut Vec<Variable> {
        match self.0.get_mut(rank.into_usize()) {
            Some(reference) => reference,
            None => internal_error!("could not find pool at rank {}", rank),
        }
    }

    pub fn get(&self, rank: Rank) -> &Vec<Variable> {
        match self.0.get(rank.into_usize()) {
            Some(reference) => reference,
            None => internal_error!("could not find pool at rank {}", rank),
        }
    }

    pub fn extend_to(&mut self, n: usize) {
        for _ in self.len()..n {
            self.0.push(Vec::new());
        }
    }
}

#[derive(Clone)]
struct State {
    env: Env,
    mark: Mark,
}

/// The single entry point: solve a constraint against an environment of
/// imported schemes. On success the returned `Env` is the snapshot captured
/// by the most recent `SaveTheEnvironment`.
pub fn run(
    env: &Env,
    problems: &mut Vec<TypeError>,
    mut subs: Subs,
    constraint: &Constraint,
) -> Result<(Solved<Subs>, Env), InternalProblem> {
    let env = run_in_place(env, problems, &mut subs, constraint)?;

    Ok((Solved(subs), env))
}

/// Modify an existing subs in-place instead of consuming it.
pub fn run_in_place(
    env: &Env,
    problems: &mut Vec<TypeError>,
    subs: &mut Subs,
    constraint: &Constraint,
) -> Result<Env, InternalProblem> {
    let mut pools = Pools::default();
    let state = State {
        env: env.clone(),
        // Start the mark counter past the reserved marks, so stored marks
        // from a previous solve can never collide with ours.
        mark: Mark::NONE.next(),
    };
    let rank = Rank::toplevel();

    let state = solve(env, state, rank, &mut pools, problems, subs, constraint)?;

    Ok(state.env)
}

fn solve(
    env: &Env,
    state: State,
    rank: Rank,
    pools: &mut Pools,
    problems: &mut Vec<TypeError>,
    subs: &mut Subs,
    constraint: &Constraint,
) -> Result<State, InternalProblem> {
    match constraint {
        Constraint::True => Ok(state),

        Constraint::SaveTheEnvironment => {
            // The final step of a module's constraint snapshots the
            // environment for consumers; everything bound so far is in
            // scope here.
            let mut copy = state;

            copy.env = env.clone();

            Ok(copy)
        }

        Constraint::Eq(typ, expectation, region) => {
            let actual = type_to_var(subs, rank, pools, typ);

            unify_var_with_expected(subs, rank, pools, problems, actual, expectation, *region);

            Ok(state)
        }

        Constraint::Lookup(symbol, expectation, region) => {
            match env.get_var(*symbol) {
                Some(var) => {
                    // The scheme behind this name may be polymorphic, so
                    // every use site gets its own copy; otherwise all the
                    // usages would constrain each other.
                    let actual = instantiate(subs, rank, pools, var);

                    unify_var_with_expected(
                        subs, rank, pools, problems, actual, expectation, *region,
                    );

                    Ok(state)
                }
                None if symbol.is_builtin() => {
                    // A kernel value the caller chose not to seed the
                    // environment with. We know nothing about its type, so
                    // give it a fresh variable and let the use site decide.
                    let actual = register(subs, rank, pools, Content::FlexVar(None));

                    unify_var_with_expected(
                        subs, rank, pools, problems, actual, expectation, *region,
                    );

                    Ok(state)
                }
                None => {
                    // Canonicalization should have caught unknown names
                    // before constraints were ever generated.
                    problems.push(TypeError::UnexposedLookup(*symbol));

                    Ok(state)
                }
            }
        }

        Constraint::And(sub_constraints) => {
            let mut state = state;

            // Order matters: later constraints observe earlier unifications.
            for sub_constraint in sub_constraints.iter() {
                state = solve(env, state, rank, pools, problems, subs, sub_constraint)?;
            }

            Ok(state)
        }

        Constraint::Let(let_con) => {
            match &let_con.ret_constraint {
                Constraint::True if let_con.rigid_vars.is_empty() => {
                    introduce(subs, rank, pools, &let_con.flex_vars);

                    // A True body can't look anything up, so there is
                    // nothing to bind and nothing to generalize: check the
                    // definitions in the current pool and be done.
                    solve(
                        env,
                        state,
                        rank,
                        pools,
                        problems,
                        subs,
                        &let_con.defs_constraint,
                    )
                }
                ret_con if let_con.rigid_vars.is_empty() && let_con.flex_vars.is_empty() => {
                    // No quantifiers means no new binder depth: the
                    // definitions stay monomorphic in the current pool.
                    let state = solve(
                        env,
                        state,
                        rank,
                        pools,
                        problems,
                        subs,
                        &let_con.defs_constraint,
                    )?;

                    let header_vars = flatten_header(subs, rank, pools, &let_con.def_types);

                    let mut new_env = env.clone();
                    for (symbol, loc_var) in header_vars.iter() {
                        new_env.insert_if_absent(*symbol, loc_var.clone());
                    }

                    // Only the body sees the extended scope; the caller
                    // keeps the env it passed in.
                    let new_state =
                        solve(&new_env, state, rank, pools, problems, subs, ret_con)?;

                    for (symbol, loc_var) in header_vars {
                        occurs_check(subs, problems, symbol, loc_var);
                    }

                    Ok(new_state)
                }
                ret_con => {
                    let rigid_vars = &let_con.rigid_vars;
                    let flex_vars = &let_con.flex_vars;

                    // The definitions are checked one binder further in,
                    // with a pool of their own.
                    let next_rank = rank.next();

                    if next_rank.into_usize() >= pools.len() {
                        pools.extend_to(next_rank.into_usize() + 1);
                    }

                    for &var in rigid_vars.iter().chain(flex_vars.iter()) {
                        subs.set_rank(var, next_rank);
                    }

                    // That pool starts over holding exactly this scheme's
                    // quantifiers; whatever a sibling let left in it is
                    // long generalized.
                    let pool: &mut Vec<Variable> = pools.get_mut(next_rank);
                    pool.clear();
                    pool.reserve(rigid_vars.len() + flex_vars.len());
                    pool.extend(rigid_vars.iter());
                    pool.extend(flex_vars.iter());

                    let new_state = solve(
                        env,
                        state,
                        next_rank,
                        pools,
                        problems,
                        subs,
                        &let_con.defs_constraint,
                    )?;

                    let young_mark = new_state.mark;
                    let visit_mark = young_mark.next();
                    let final_mark = visit_mark.next();

                    // The header must be flattened while the deeper pool is
                    // still open, so its variables take part in
                    // generalization below.
                    let header_vars =
                        flatten_header(subs, next_rank, pools, &let_con.def_types);

                    generalize(subs, young_mark, visit_mark, next_rank, pools);

                    debug_assert!(pools.get(next_rank).is_empty());

                    // A rigid quantifier that kept a rank leaked out of its
                    // scheme somehow; nothing downstream can be trusted.
                    for &var in rigid_vars.iter() {
                        if !subs.redundant(var) && subs.get_rank(var) != Rank::NONE {
                            return Err(InternalProblem::RigidNotGeneralized(var));
                        }
                    }

                    let mut new_env = env.clone();
                    for (symbol, loc_var) in header_vars.iter() {
                        new_env.insert_if_absent(*symbol, loc_var.clone());
                    }

                    // Back at the outer rank for the body, which sees the
                    // new bindings; the caller keeps its own env.
                    let state_for_ret_con = State {
                        env: new_state.env,
                        mark: final_mark,
                    };

                    let solved_state =
                        solve(&new_env, state_for_ret_con, rank, pools, problems, subs, ret_con)?;

                    // After the body, check that none of the definitions
                    // turned out to contain themselves.
                    for (symbol, loc_var) in header_vars {
                        occurs_check(subs, problems, symbol, loc_var);
                    }

                    Ok(solved_state)
                }
            }
        }
    }
}

fn unify_var_with_expected(
    subs: &mut Subs,
    rank: Rank,
    pools: &mut Pools,
    problems: &mut Vec<TypeError>,
    actual: Variable,
    expectation: &Expected<Type>,
    region: Region,
) {
    let expected = type_to_var(subs, rank, pools, expectation.get_type_ref());

    match unify(subs, actual, expected) {
        Unified::Success(vars) => {
            introduce(subs, rank, pools, &vars);
        }
        Unified::Failure(vars, actual_type, expected_type) => {
            introduce(subs, rank, pools, &vars);

            let problem =
                TypeError::BadExpr(region, actual_type, expectation.replace_ref(expected_type));

            problems.push(problem);
        }
        Unified::BadSuper(vars, sup, actual_type, expected_type) => {
            introduce(subs, rank, pools, &vars);

            let problem = TypeError::BadSuperKind(
                region,
                sup,
                actual_type,
                expectation.replace_ref(expected_type),
            );

            problems.push(problem);
        }
    }
}

/// Flatten each definition's annotated type and pair it with the defined
/// name; this is the header the body's lookups will resolve against.
fn flatten_header(
    subs: &mut Subs,
    rank: Rank,
    pools: &mut Pools,
    def_types: &SendMap<Symbol, Located<Type>>,
) -> Vec<(Symbol, Located<Variable>)> {
    let mut header_vars = Vec::with_capacity(def_types.len());

    for (symbol, loc_type) in def_types.iter() {
        let var = type_to_var(subs, rank, pools, &loc_type.value);

        header_vars.push((*symbol, Located::at(loc_type.region, var)));
    }

    header_vars
}

/// Flatten a syntactic type into the graph. Every constructor application
/// becomes a fresh variable registered in the pool at the given rank; leaves
/// that are already variables are used as-is.
pub fn type_to_var(subs: &mut Subs, rank: Rank, pools: &mut Pools, typ: &Type) -> Variable {
    match typ {
        Type::Variable(var) => *var,

        Type::Apply(symbol, args) => {
            let mut arg_vars = Vec::with_capacity(args.len());

            for arg in args {
                arg_vars.push(type_to_var(subs, rank, pools, arg));
            }

            let content = Content::Structure(FlatType::Apply(*symbol, arg_vars));

            register(subs, rank, pools, content)
        }

        Type::Function(arg, ret) => {
            let arg_var = type_to_var(subs, rank, pools, arg);
            let ret_var = type_to_var(subs, rank, pools, ret);
            let content = Content::Structure(FlatType::Func(arg_var, ret_var));

            register(subs, rank, pools, content)
        }

        Type::EmptyRec => {
            let content = Content::Structure(FlatType::EmptyRecord);

            register(subs, rank, pools, content)
        }

        Type::Record(fields, ext) => {
            let mut field_vars = SendMap::default();

            for (field, field_type) in fields {
                field_vars.insert(field.clone(), type_to_var(subs, rank, pools, field_type));
            }

            let ext_var = type_to_var(subs, rank, pools, ext);
            let content = Content::Structure(FlatType::Record(field_vars, ext_var));

            register(subs, rank, pools, content)
        }

        Type::Alias(symbol, args, real_type) => {
            let mut arg_vars = Vec::with_capacity(args.len());

            for (arg_name, arg_type) in args {
                arg_vars.push((arg_name.clone(), type_to_var(subs, rank, pools, arg_type)));
            }

            let real_var = type_to_var(subs, rank, pools, real_type);
            let content = Content::Alias(*symbol, arg_vars, real_var);

            register(subs, rank, pools, content)
        }
    }
}

fn occurs_check(
    subs: &mut Subs,
    problems: &mut Vec<TypeError>,
    symbol: Symbol,
    loc_var: Located<Variable>,
) {
    let var = loc_var.value;

    while let Err((recursive, _chain)) = subs.occurs(var) {
        // There are no recursive types in this language, so a cycle is
        // always an error. Render the type before poisoning it: the
        // rendering shows the infinity placeholder at the knot.
        let error_type = subs.var_to_error_type(var);

        subs.set_content(recursive, Content::Error(ErrorReason::Infinite));

        problems.push(TypeError::CircularType(symbol, error_type, loc_var.region));
    }
}

/// Close out the pool at `young_rank`. Every inhabitant meets one of three
/// fates: it was unified away and needs no slot anywhere; its settled rank
/// proves an enclosing scope still constrains it, so it moves to that
/// scope's pool; or nothing outside the closing `let` reaches it, and its
/// rank is erased to make it a quantifier of the scheme.
fn generalize(
    subs: &mut Subs,
    young_mark: Mark,
    visit_mark: Mark,
    young_rank: Rank,
    pools: &mut Pools,
) {
    let inhabitants = std::mem::take(pools.get_mut(young_rank));
    let mut buckets = rank_buckets(subs, young_mark, young_rank, inhabitants);

    // Settle ranks lowest-first: once a bucket is reached, everything
    // shallower than it has already been finalized, so each class is
    // walked at most once.
    for (index, bucket) in buckets.iter().enumerate() {
        for &var in bucket.iter() {
            adjust_rank(subs, young_mark, visit_mark, Rank::from(index), var);
        }
    }

    let mut youngest = match buckets.pop() {
        Some(bucket) => bucket,
        None => internal_error!("rank_buckets built no bucket for the young rank"),
    };

    // Everything that was already below the young rank escapes to the pool
    // it now belongs to.
    for bucket in buckets {
        for var in bucket {
            if !subs.redundant(var) {
                let rank = subs.get_rank(var);

                pools.get_mut(rank).push(var);
            }
        }
    }

    // The young bucket splits: classes whose settled rank dropped escape
    // like the others, and the ones still anchored here become quantifiers.
    for var in youngest.drain(..) {
        if !subs.redundant(var) {
            let rank = subs.get_rank(var);

            if rank < young_rank {
                pools.get_mut(rank).push(var);
            } else {
                subs.set_rank(var, Rank::NONE);
            }
        }
    }

    dbg_do!(TERN_PRINT_GENERALIZATIONS, {
        eprintln!("generalized the pool at rank {}", young_rank);
    });

    // hand the drained vector back so its capacity gets reused
    *pools.get_mut(young_rank) = youngest;
}

/// Distribute the young pool over one bucket per rank (index = rank),
/// stamping `young_mark` on each class so `adjust_rank` can tell pool
/// members from outside classes. Members that share a root land in the same
/// bucket twice; the mark makes the second visit cheap.
fn rank_buckets(
    subs: &mut Subs,
    young_mark: Mark,
    young_rank: Rank,
    inhabitants: Vec<Variable>,
) -> Vec<Vec<Variable>> {
    let mut buckets = vec![Vec::new(); young_rank.into_usize() + 1];

    for var in inhabitants {
        let var = subs.get_root_key(var);
        let rank = subs.get_rank_set_mark(var, young_mark);

        debug_assert!(
            rank <= young_rank,
            "variable {:?} outranks its own pool",
            var
        );

        buckets[rank.into_usize()].push(var);
    }

    buckets
}

/// Settle the rank of one class and everything reachable from it. A
/// structure ends up carrying the largest rank found anywhere inside it,
/// and no rank ever grows here, so afterwards the top of a type says how
/// deep the whole thing is bound.
fn adjust_rank(
    subs: &mut Subs,
    young_mark: Mark,
    visit_mark: Mark,
    group_rank: Rank,
    var: Variable,
) -> Rank {
    let var = subs.get_root_key(var);

    let desc_rank = subs.get_rank(var);
    let desc_mark = subs.get_mark(var);

    if desc_mark == young_mark {
        // First visit to a pool member. Flip the mark before descending:
        // the content may loop back to this very class.
        subs.set_mark(var, visit_mark);

        let content = subs.get_content_without_compacting(var).clone();

        let max_rank = adjust_rank_content(subs, young_mark, visit_mark, group_rank, &content);

        subs.set_rank(var, max_rank);

        max_rank
    } else if desc_mark == visit_mark {
        // A repeat visit; several pool entries can share one root. The
        // rank was settled the first time through.
        desc_rank
    } else {
        // Not a member of the young pool at all. An outside class may be
        // dragged down by the group walking into it, never up.
        let min_rank = group_rank.min(desc_rank);

        subs.set_rank_mark(var, min_rank, visit_mark);

        min_rank
    }
}

fn adjust_rank_content(
    subs: &mut Subs,
    young_mark: Mark,
    visit_mark: Mark,
    group_rank: Rank,
    content: &Content,
) -> Rank {
    use tern_types::subs::Content::*;
    use tern_types::subs::FlatType::*;

    match content {
        FlexVar(_) | FlexSuper(_, _) | RigidVar(_) | RigidSuper(_, _) | Error(_) => group_rank,

        Structure(flat_type) => {
            match flat_type {
                Apply(_, args) => {
                    let mut args = args.iter();

                    match args.next() {
                        None => group_rank,
                        Some(&first) => {
                            let mut rank =
                                adjust_rank(subs, young_mark, visit_mark, group_rank, first);

                            for &var in args {
                                rank = rank.max(adjust_rank(
                                    subs, young_mark, visit_mark, group_rank, var,
                                ));
                            }

                            rank
                        }
                    }
                }

                Func(arg_var, ret_var) => {
                    let mut rank = adjust_rank(subs, young_mark, visit_mark, group_rank, *arg_var);

                    rank =
                        rank.max(adjust_rank(subs, young_mark, visit_mark, group_rank, *ret_var));

                    rank
                }

                // {} mentions no variables, so no scope can be holding on
                // to it; pin it at the outermost binder depth.
                EmptyRecord => Rank::toplevel(),

                Record(fields, ext_var) => {
                    let mut rank = adjust_rank(subs, young_mark, visit_mark, group_rank, *ext_var);

                    for (_, var) in fields {
                        rank = rank
                            .max(adjust_rank(subs, young_mark, visit_mark, group_rank, *var));
                    }

                    rank
                }
            }
        }

        Alias(_, args, real_var) => {
            // The expansion determines the alias's meaning, but unused
            // alias arguments can still escape into the environment, so
            // recurse through both.
            let mut rank = adjust_rank(subs, young_mark, visit_mark, group_rank, *real_var);

            for (_, var) in args {
                rank = rank.max(adjust_rank(subs, young_mark, visit_mark, group_rank, *var));
            }

            rank
        }
    }
}

/// Put variables created outside the solver (during unification) into the
/// pool of the given rank, and stamp that rank on their descriptors.
fn introduce(subs: &mut Subs, rank: Rank, pools: &mut Pools, vars: &[Variable]) {
    let pool: &mut Vec<Variable> = pools.get_mut(rank);

    for &var in vars.iter() {
        subs.set_rank(var, rank);
    }

    pool.extend(vars);
}

#[inline(always)]
fn register(subs: &mut Subs, rank: Rank, pools: &mut Pools, content: Content) -> Variable {
    let descriptor = Descriptor {
        content,
        rank,
        mark: Mark::NONE,
        copy: OptVariable::NONE,
    };

    let var = subs.fresh(descriptor);

    pools.get_mut(rank).push(var);

    var
}

/// Instantiate a scheme: copy exactly the generalized (rank NONE) classes
/// reachable from `var`, reusing everything else. The fresh copies land in
/// the pool at `max_rank`, and every `copy` slot written along the way is
/// cleared again before returning.
fn instantiate(subs: &mut Subs, max_rank: Rank, pools: &mut Pools, var: Variable) -> Variable {
    let mut visited = Vec::with_capacity(16);

    let copy = instantiate_help(subs, max_rank, pools, &mut visited, var);

    for var in visited {
        subs.set_copy(var, OptVariable::NONE);
    }

    copy
}

fn instantiate_help(
    subs: &mut Subs,
    max_rank: Rank,
    pools: &mut Pools,
    visited: &mut Vec<Variable>,
    var: Variable,
) -> Variable {
    use tern_types::subs::Content::*;
    use tern_types::subs::FlatType::*;

    let var = subs.get_root_key(var);
    let desc = subs.get_without_compacting(var);

    if let Some(copy) = desc.copy.into_variable() {
        return copy;
    } else if desc.rank != Rank::NONE {
        // not generalized; keep sharing the original
        return var;
    }

    let make_descriptor = |content| Descriptor {
        content,
        rank: max_rank,
        mark: Mark::NONE,
        copy: OptVariable::NONE,
    };

    let content = desc.content;
    let copy = subs.fresh(make_descriptor(content.clone()));

    pools.get_mut(max_rank).push(copy);

    // Memoize the copy on the original before descending into the content:
    // a class that reaches itself must find the link and reuse it, or the
    // copy would never terminate.
    visited.push(var);
    subs.set_copy(var, OptVariable::from(copy));

    match content {
        Structure(flat_type) => {
            let new_flat_type = match flat_type {
                Apply(symbol, args) => {
                    let args = args
                        .into_iter()
                        .map(|var| instantiate_help(subs, max_rank, pools, visited, var))
                        .collect();

                    Apply(symbol, args)
                }

                Func(arg_var, ret_var) => {
                    let new_arg_var = instantiate_help(subs, max_rank, pools, visited, arg_var);
                    let new_ret_var = instantiate_help(subs, max_rank, pools, visited, ret_var);

                    Func(new_arg_var, new_ret_var)
                }

                same @ EmptyRecord => same,

                Record(fields, ext_var) => {
                    let mut new_fields = SendMap::default();

                    for (field, var) in fields {
                        let new_var = instantiate_help(subs, max_rank, pools, visited, var);

                        new_fields.insert(field, new_var);
                    }

                    let new_ext_var = instantiate_help(subs, max_rank, pools, visited, ext_var);

                    Record(new_fields, new_ext_var)
                }
            };

            subs.set_content(copy, Structure(new_flat_type));
        }

        FlexVar(_) | FlexSuper(_, _) | Error(_) => {
            // the initial clone of the content is already right
        }

        RigidVar(name) => {
            // Rigid quantifiers are only rigid inside their own scheme;
            // every use site sees a flexible copy that remembers the name.
            subs.set_content(copy, FlexVar(Some(name)));
        }

        RigidSuper(sup, name) => {
            subs.set_content(copy, FlexSuper(sup, Some(name)));
        }

        Alias(symbol, args, real_var) => {
            let new_args = args
                .into_iter()
                .map(|(name, var)| {
                    (name, instantiate_help(subs, max_rank, pools, visited, var))
                })
                .collect();

            let new_real_var = instantiate_help(subs, max_rank, pools, visited, real_var);

            subs.set_content(copy, Alias(symbol, new_args, new_real_var));
        }
    }

    copy
}
