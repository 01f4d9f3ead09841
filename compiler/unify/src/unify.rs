use tern_collections::all::SendMap;
use tern_debug_flags::{dbg_do, TERN_PRINT_MISMATCHES, TERN_PRINT_UNIFICATIONS};
use tern_module::ident::Lowercase;
use tern_module::symbol::Symbol;
use tern_types::subs::{
    Content, Descriptor, ErrorReason, FlatType, Mark, OptVariable, Subs, Super, Variable,
};
use tern_types::types::ErrorType;

/// Variables allocated during a unification (record extensions, super kind
/// probes). The caller is responsible for introducing them into its current
/// pool, so generalization sees them.
type Pool = Vec<Variable>;

#[derive(Debug)]
pub enum Unified {
    Success(Pool),
    /// The two types cannot be the same; both rendered for reporting.
    Failure(Pool, ErrorType, ErrorType),
    /// A super kind constraint was violated, e.g. a `number` variable met Str.
    BadSuper(Pool, Super, ErrorType, ErrorType),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mismatch {
    TypeMismatch,
    BadSuperKind(Super),
}

type Outcome = Vec<Mismatch>;

macro_rules! mismatch {
    () => {{
        dbg_do!(TERN_PRINT_MISMATCHES, {
            eprintln!("type mismatch produced at {}:{}:{}", file!(), line!(), column!());
        });

        vec![Mismatch::TypeMismatch]
    }};
    ($($arg:tt)*) => {{
        dbg_do!(TERN_PRINT_MISMATCHES, {
            eprintln!("type mismatch produced at {}:{}:{}", file!(), line!(), column!());
            eprintln!($($arg)*);
        });

        vec![Mismatch::TypeMismatch]
    }};
}

macro_rules! bad_super {
    ($sup:expr) => {{
        dbg_do!(TERN_PRINT_MISMATCHES, {
            eprintln!(
                "super kind violation produced at {}:{}:{}",
                file!(),
                line!(),
                column!()
            );
        });

        vec![Mismatch::BadSuperKind($sup)]
    }};
}

/// A snapshot of both sides at the moment dispatch begins. The descriptors
/// are copies; every write goes back through `Subs`, so the copies never get
/// stale behind our backs within one dispatch step.
struct Context {
    first: Variable,
    first_desc: Descriptor,
    second: Variable,
    second_desc: Descriptor,
}

/// Make the two variables denote the same type.
///
/// On failure, both classes are overwritten with `Content::Error` after
/// rendering, so downstream constraints involving them unify silently
/// instead of re-reporting the same conflict.
pub fn unify(subs: &mut Subs, var1: Variable, var2: Variable) -> Unified {
    let mut vars = Vec::new();
    let mismatches = unify_pool(subs, &mut vars, var1, var2);

    if mismatches.is_empty() {
        Unified::Success(vars)
    } else {
        let type1 = subs.var_to_error_type(var1);
        let type2 = subs.var_to_error_type(var2);

        let first_bad_super = mismatches.iter().find_map(|mismatch| match mismatch {
            Mismatch::BadSuperKind(sup) => Some(*sup),
            Mismatch::TypeMismatch => None,
        });

        let reason = match first_bad_super {
            Some(sup) => ErrorReason::BadSuper(sup),
            None => ErrorReason::Mismatch,
        };

        subs.set_content(var1, Content::Error(reason));
        subs.set_content(var2, Content::Error(reason));

        match first_bad_super {
            Some(sup) => Unified::BadSuper(vars, sup, type1, type2),
            None => Unified::Failure(vars, type1, type2),
        }
    }
}

pub fn unify_pool(subs: &mut Subs, pool: &mut Pool, var1: Variable, var2: Variable) -> Outcome {
    if subs.equivalent(var1, var2) {
        Vec::new()
    } else {
        let ctx = Context {
            first: var1,
            first_desc: subs.get(var1),
            second: var2,
            second_desc: subs.get(var2),
        };

        unify_context(subs, pool, ctx)
    }
}

fn unify_context(subs: &mut Subs, pool: &mut Pool, ctx: Context) -> Outcome {
    dbg_do!(TERN_PRINT_UNIFICATIONS, {
        eprintln!(
            "{:?} {:?} ~ {:?} {:?}",
            ctx.first, ctx.first_desc.content, ctx.second, ctx.second_desc.content
        );
    });

    match &ctx.first_desc.content {
        Content::FlexVar(opt_name) => unify_flex(subs, &ctx, opt_name, &ctx.second_desc.content),
        Content::FlexSuper(sup, opt_name) => {
            unify_flex_super(subs, pool, &ctx, *sup, opt_name, &ctx.second_desc.content)
        }
        Content::RigidVar(name) => unify_rigid(subs, &ctx, name, &ctx.second_desc.content),
        Content::RigidSuper(sup, name) => {
            unify_rigid_super(subs, &ctx, *sup, name, &ctx.second_desc.content)
        }
        Content::Structure(flat_type) => {
            unify_structure(subs, pool, &ctx, flat_type, &ctx.second_desc.content)
        }
        Content::Alias(symbol, args, real_var) => {
            unify_alias(subs, pool, &ctx, *symbol, args, *real_var, &ctx.second_desc.content)
        }
        Content::Error(reason) => {
            // Error propagates. Whatever we're comparing it to, the class was
            // already reported; stay quiet.
            merge(subs, &ctx, Content::Error(*reason))
        }
    }
}

#[inline(always)]
fn unify_flex(
    subs: &mut Subs,
    ctx: &Context,
    opt_name: &Option<Lowercase>,
    other: &Content,
) -> Outcome {
    match other {
        Content::FlexVar(None) => {
            // If both are flex, and only left has a name, keep the name around.
            merge(subs, ctx, Content::FlexVar(opt_name.clone()))
        }
        Content::FlexSuper(sup, None) if opt_name.is_some() => {
            // keep the name around too
            merge(subs, ctx, Content::FlexSuper(*sup, opt_name.clone()))
        }
        Content::FlexVar(Some(_))
        | Content::FlexSuper(_, _)
        | Content::RigidVar(_)
        | Content::RigidSuper(_, _)
        | Content::Structure(_)
        | Content::Alias(_, _, _)
        | Content::Error(_) => {
            // The plain flex defers to whatever the other side is.
            merge(subs, ctx, other.clone())
        }
    }
}

#[inline(always)]
fn unify_flex_super(
    subs: &mut Subs,
    pool: &mut Pool,
    ctx: &Context,
    sup: Super,
    opt_name: &Option<Lowercase>,
    other: &Content,
) -> Outcome {
    match other {
        Content::FlexVar(other_name) => {
            let name = opt_name.clone().or_else(|| other_name.clone());

            merge(subs, ctx, Content::FlexSuper(sup, name))
        }
        Content::FlexSuper(other_sup, other_name) => match combine_supers(sup, *other_sup) {
            Some(combined) => {
                let name = opt_name.clone().or_else(|| other_name.clone());

                merge(subs, ctx, Content::FlexSuper(combined, name))
            }
            None => bad_super!(sup),
        },
        Content::RigidVar(_) => {
            // A rigid variable with no super kind cannot promise one.
            mismatch!()
        }
        Content::RigidSuper(other_sup, other_name) => {
            if rigid_satisfies_super(*other_sup, sup) {
                merge(subs, ctx, Content::RigidSuper(*other_sup, other_name.clone()))
            } else {
                mismatch!()
            }
        }
        Content::Structure(flat_type) => {
            let problems = check_super(subs, pool, ctx, sup, flat_type);

            if problems.is_empty() {
                merge(subs, ctx, Content::Structure(flat_type.clone()))
            } else {
                problems
            }
        }
        Content::Alias(_, _, real_var) => {
            // Check the constraint against the expansion, then take on the
            // alias so error messages keep its name.
            let problems = unify_pool(subs, pool, ctx.first, *real_var);

            if problems.is_empty() {
                merge(subs, ctx, other.clone())
            } else {
                problems
            }
        }
        Content::Error(reason) => merge(subs, ctx, Content::Error(*reason)),
    }
}

#[inline(always)]
fn unify_rigid(subs: &mut Subs, ctx: &Context, name: &Lowercase, other: &Content) -> Outcome {
    match other {
        Content::FlexVar(_) => {
            // the flex side simply takes on the rigid
            merge(subs, ctx, Content::RigidVar(name.clone()))
        }
        Content::FlexSuper(_, _) => {
            // A rigid variable without a super kind can't satisfy one.
            mismatch!()
        }
        Content::RigidVar(_)
        | Content::RigidSuper(_, _)
        | Content::Structure(_)
        | Content::Alias(_, _, _) => {
            // A rigid stands only for itself. Had the two sides been the
            // same quantifier, unify_pool would already have short-circuited
            // on their shared root.
            mismatch!("rigid {:?} would be unified away", name)
        }
        Content::Error(reason) => merge(subs, ctx, Content::Error(*reason)),
    }
}

#[inline(always)]
fn unify_rigid_super(
    subs: &mut Subs,
    ctx: &Context,
    sup: Super,
    name: &Lowercase,
    other: &Content,
) -> Outcome {
    match other {
        Content::FlexVar(_) => merge(subs, ctx, Content::RigidSuper(sup, name.clone())),
        Content::FlexSuper(other_sup, _) => {
            if rigid_satisfies_super(sup, *other_sup) {
                merge(subs, ctx, Content::RigidSuper(sup, name.clone()))
            } else {
                mismatch!()
            }
        }
        Content::RigidVar(_)
        | Content::RigidSuper(_, _)
        | Content::Structure(_)
        | Content::Alias(_, _, _) => mismatch!("rigid {:?} would be unified away", name),
        Content::Error(reason) => merge(subs, ctx, Content::Error(*reason)),
    }
}

#[inline(always)]
fn unify_structure(
    subs: &mut Subs,
    pool: &mut Pool,
    ctx: &Context,
    flat_type: &FlatType,
    other: &Content,
) -> Outcome {
    match other {
        Content::FlexVar(_) => {
            // the flex side takes on the structure
            merge(subs, ctx, Content::Structure(flat_type.clone()))
        }
        Content::FlexSuper(sup, _) => {
            let problems = check_super(subs, pool, ctx, *sup, flat_type);

            if problems.is_empty() {
                merge(subs, ctx, Content::Structure(flat_type.clone()))
            } else {
                problems
            }
        }
        Content::RigidVar(_) | Content::RigidSuper(_, _) => {
            // a concrete type can never be a rigid quantifier
            mismatch!()
        }
        Content::Structure(ref other_flat_type) => {
            unify_flat_type(subs, pool, ctx, flat_type, other_flat_type)
        }
        Content::Alias(_, _, real_var) => {
            // Expand the alias on the right and keep its name on the merged
            // class.
            let problems = unify_pool(subs, pool, ctx.first, *real_var);

            if problems.is_empty() {
                merge(subs, ctx, other.clone())
            } else {
                problems
            }
        }
        Content::Error(reason) => merge(subs, ctx, Content::Error(*reason)),
    }
}

#[inline(always)]
fn unify_alias(
    subs: &mut Subs,
    pool: &mut Pool,
    ctx: &Context,
    symbol: Symbol,
    args: &[(Lowercase, Variable)],
    real_var: Variable,
    other: &Content,
) -> Outcome {
    match other {
        Content::FlexVar(_) => {
            // the flex side takes on the alias
            merge(subs, ctx, Content::Alias(symbol, args.to_vec(), real_var))
        }
        Content::Alias(other_symbol, other_args, other_real_var) => {
            if symbol == *other_symbol {
                if args.len() == other_args.len() {
                    let mut problems = Vec::new();

                    for ((_, l_var), (_, r_var)) in args.iter().zip(other_args.iter()) {
                        problems.extend(unify_pool(subs, pool, *l_var, *r_var));
                    }

                    if problems.is_empty() {
                        problems.extend(merge(
                            subs,
                            ctx,
                            Content::Alias(symbol, args.to_vec(), real_var),
                        ));
                    }

                    problems
                } else {
                    mismatch!("{:?} applied to a different number of arguments", symbol)
                }
            } else {
                // Different aliases: their expansions must agree. Keep the
                // second alias on the merged class.
                let problems = unify_pool(subs, pool, real_var, *other_real_var);

                if problems.is_empty() {
                    merge(subs, ctx, other.clone())
                } else {
                    problems
                }
            }
        }
        Content::FlexSuper(_, _) | Content::Structure(_) => {
            // Expand the alias and retry on the expansion.
            let problems = unify_pool(subs, pool, real_var, ctx.second);

            if problems.is_empty() {
                merge(subs, ctx, Content::Alias(symbol, args.to_vec(), real_var))
            } else {
                problems
            }
        }
        Content::RigidVar(_) | Content::RigidSuper(_, _) => mismatch!(),
        Content::Error(reason) => merge(subs, ctx, Content::Error(*reason)),
    }
}

#[inline(always)]
fn unify_flat_type(
    subs: &mut Subs,
    pool: &mut Pool,
    ctx: &Context,
    left: &FlatType,
    right: &FlatType,
) -> Outcome {
    use tern_types::subs::FlatType::*;

    match (left, right) {
        (EmptyRecord, EmptyRecord) => merge(subs, ctx, Content::Structure(left.clone())),

        (Record(fields, ext), EmptyRecord) if fields.is_empty() => {
            // a record with no fields is just its extension
            let problems = unify_pool(subs, pool, *ext, ctx.second);

            if problems.is_empty() {
                merge(subs, ctx, Content::Structure(EmptyRecord))
            } else {
                problems
            }
        }

        (EmptyRecord, Record(fields, ext)) if fields.is_empty() => {
            let problems = unify_pool(subs, pool, ctx.first, *ext);

            if problems.is_empty() {
                merge(subs, ctx, Content::Structure(EmptyRecord))
            } else {
                problems
            }
        }

        (Record(fields1, ext1), Record(fields2, ext2)) => {
            let rec1 = gather_fields(subs, fields1.clone(), *ext1);
            let rec2 = gather_fields(subs, fields2.clone(), *ext2);

            unify_record(subs, pool, ctx, rec1, rec2)
        }

        (Record(_, _), EmptyRecord) | (EmptyRecord, Record(_, _)) => {
            // A record with fields can never be the empty record.
            mismatch!("record with fields vs empty record")
        }

        (Apply(l_symbol, l_args), Apply(r_symbol, r_args)) if l_symbol == r_symbol => {
            if l_args.len() != r_args.len() {
                return mismatch!("{:?} applied to a different number of arguments", l_symbol);
            }

            let problems = unify_zip(subs, pool, l_args.iter().zip(r_args.iter()));

            if problems.is_empty() {
                merge(
                    subs,
                    ctx,
                    Content::Structure(Apply(*r_symbol, r_args.clone())),
                )
            } else {
                problems
            }
        }

        (Func(l_arg, l_ret), Func(r_arg, r_ret)) => {
            let mut problems = unify_pool(subs, pool, *l_arg, *r_arg);

            problems.extend(unify_pool(subs, pool, *l_ret, *r_ret));

            if problems.is_empty() {
                merge(subs, ctx, Content::Structure(Func(*r_arg, *r_ret)))
            } else {
                problems
            }
        }

        _ => mismatch!(),
    }
}

fn unify_zip<'a, I>(subs: &mut Subs, pool: &mut Pool, zipped: I) -> Outcome
where
    I: Iterator<Item = (&'a Variable, &'a Variable)>,
{
    let mut problems = Vec::new();

    for (&l_var, &r_var) in zipped {
        problems.extend(unify_pool(subs, pool, l_var, r_var));
    }

    problems
}

// SUPER KINDS

/// The merged constraint when two flex super vars meet, if one exists.
fn combine_supers(first: Super, second: Super) -> Option<Super> {
    use Super::*;

    match (first, second) {
        (a, b) if a == b => Some(a),

        (Number, Comparable) | (Comparable, Number) => Some(Number),

        (Comparable, Appendable) | (Appendable, Comparable) => Some(CompAppend),
        (CompAppend, Comparable) | (Comparable, CompAppend) => Some(CompAppend),
        (CompAppend, Appendable) | (Appendable, CompAppend) => Some(CompAppend),

        // nothing is both a number and appendable
        _ => None,
    }
}

/// Does a rigid variable constrained to `rigid` keep the promise a flex
/// variable constrained to `flex` requires?
fn rigid_satisfies_super(rigid: Super, flex: Super) -> bool {
    use Super::*;

    match (rigid, flex) {
        (a, b) if a == b => true,

        // numbers are comparable
        (Number, Comparable) => true,

        (CompAppend, Comparable) => true,
        (CompAppend, Appendable) => true,

        _ => false,
    }
}

/// Does this structure satisfy the super kind? List and tuple members are
/// constrained recursively by unifying each one against a fresh variable
/// carrying the member constraint.
fn check_super(
    subs: &mut Subs,
    pool: &mut Pool,
    ctx: &Context,
    sup: Super,
    flat_type: &FlatType,
) -> Outcome {
    use tern_types::subs::FlatType::*;

    match sup {
        Super::Number => match flat_type {
            Apply(symbol, args) if args.is_empty() && is_number_atom(*symbol) => Vec::new(),
            _ => bad_super!(sup),
        },

        Super::Appendable => match flat_type {
            Apply(symbol, args) if args.is_empty() && *symbol == Symbol::STR_STR => Vec::new(),
            Apply(symbol, args) if args.len() == 1 && *symbol == Symbol::LIST_LIST => Vec::new(),
            _ => bad_super!(sup),
        },

        Super::Comparable => match flat_type {
            Apply(symbol, args) if args.is_empty() && is_comparable_atom(*symbol) => Vec::new(),
            Apply(symbol, args) if args.len() == 1 && *symbol == Symbol::LIST_LIST => {
                constrain_comparable(subs, pool, ctx, args[0])
            }
            Apply(symbol, args) if is_tuple_head(*symbol, args.len()) => {
                let mut problems = Vec::new();

                for arg in args {
                    problems.extend(constrain_comparable(subs, pool, ctx, *arg));
                }

                problems
            }
            _ => bad_super!(sup),
        },

        Super::CompAppend => match flat_type {
            Apply(symbol, args) if args.is_empty() && *symbol == Symbol::STR_STR => Vec::new(),
            Apply(symbol, args) if args.len() == 1 && *symbol == Symbol::LIST_LIST => {
                constrain_comparable(subs, pool, ctx, args[0])
            }
            _ => bad_super!(sup),
        },
    }
}

fn is_number_atom(symbol: Symbol) -> bool {
    symbol == Symbol::INT_INT || symbol == Symbol::FLOAT_FLOAT
}

fn is_comparable_atom(symbol: Symbol) -> bool {
    symbol == Symbol::INT_INT
        || symbol == Symbol::FLOAT_FLOAT
        || symbol == Symbol::CHAR_CHAR
        || symbol == Symbol::STR_STR
}

fn is_tuple_head(symbol: Symbol, arity: usize) -> bool {
    (symbol == Symbol::TUPLE_PAIR && arity == 2) || (symbol == Symbol::TUPLE_TRIPLE && arity == 3)
}

fn constrain_comparable(
    subs: &mut Subs,
    pool: &mut Pool,
    ctx: &Context,
    var: Variable,
) -> Outcome {
    let comparable = fresh(subs, pool, ctx, Content::FlexSuper(Super::Comparable, None));

    unify_pool(subs, pool, comparable, var)
}

// RECORDS

#[derive(Debug)]
struct RecordStructure {
    fields: SendMap<Lowercase, Variable>,
    ext: Variable,
}

/// Chase the extension chain, accumulating every field along the way, until
/// the extension is no longer a record. Outer fields shadow inner ones.
fn gather_fields(
    subs: &mut Subs,
    fields: SendMap<Lowercase, Variable>,
    var: Variable,
) -> RecordStructure {
    use tern_types::subs::FlatType::*;

    match subs.get(var).content {
        Content::Structure(Record(sub_fields, sub_ext)) => {
            gather_fields(subs, fields.union(sub_fields), sub_ext)
        }

        Content::Alias(_, _, real_var) => {
            // an alias in the extension position is invisible to field
            // gathering
            gather_fields(subs, fields, real_var)
        }

        _ => RecordStructure { fields, ext: var },
    }
}

fn unify_record(
    subs: &mut Subs,
    pool: &mut Pool,
    ctx: &Context,
    rec1: RecordStructure,
    rec2: RecordStructure,
) -> Outcome {
    let fields1 = rec1.fields;
    let fields2 = rec2.fields;

    let mut shared_fields = Vec::new();
    let mut unique_fields1 = SendMap::default();
    let mut unique_fields2 = SendMap::default();

    for (field, var) in fields1.iter() {
        match fields2.get(field) {
            Some(other_var) => shared_fields.push((field.clone(), (*var, *other_var))),
            None => {
                unique_fields1.insert(field.clone(), *var);
            }
        }
    }

    for (field, var) in fields2.iter() {
        if !fields1.contains_key(field) {
            unique_fields2.insert(field.clone(), *var);
        }
    }

    if unique_fields1.is_empty() {
        if unique_fields2.is_empty() {
            let ext_problems = unify_pool(subs, pool, rec1.ext, rec2.ext);

            if !ext_problems.is_empty() {
                return ext_problems;
            }

            unify_shared_fields(subs, pool, ctx, shared_fields, SendMap::default(), rec1.ext)
        } else {
            // The second record has fields the first one does not have.
            // Unify the first extension with { unique_fields2 | ext2 }; a
            // closed first record fails here, which is exactly the "extra
            // fields on the other side" error.
            let flat_type = FlatType::Record(unique_fields2.clone(), rec2.ext);
            let sub_record = fresh(subs, pool, ctx, Content::Structure(flat_type));
            let ext_problems = unify_pool(subs, pool, rec1.ext, sub_record);

            if !ext_problems.is_empty() {
                return ext_problems;
            }

            unify_shared_fields(subs, pool, ctx, shared_fields, unique_fields2, rec2.ext)
        }
    } else if unique_fields2.is_empty() {
        let flat_type = FlatType::Record(unique_fields1.clone(), rec1.ext);
        let sub_record = fresh(subs, pool, ctx, Content::Structure(flat_type));
        let ext_problems = unify_pool(subs, pool, sub_record, rec2.ext);

        if !ext_problems.is_empty() {
            return ext_problems;
        }

        unify_shared_fields(subs, pool, ctx, shared_fields, unique_fields1, rec1.ext)
    } else {
        // Both sides have fields the other lacks. Each extension must absorb
        // the other side's unique fields over one shared fresh extension.
        let other_fields = unique_fields1.clone().union(unique_fields2.clone());

        let ext = fresh(subs, pool, ctx, Content::FlexVar(None));
        let flat_type1 = FlatType::Record(unique_fields1, ext);
        let flat_type2 = FlatType::Record(unique_fields2, ext);

        let sub1 = fresh(subs, pool, ctx, Content::Structure(flat_type1));
        let sub2 = fresh(subs, pool, ctx, Content::Structure(flat_type2));

        let rec1_problems = unify_pool(subs, pool, rec1.ext, sub2);

        if !rec1_problems.is_empty() {
            return rec1_problems;
        }

        let rec2_problems = unify_pool(subs, pool, sub1, rec2.ext);

        if !rec2_problems.is_empty() {
            return rec2_problems;
        }

        unify_shared_fields(subs, pool, ctx, shared_fields, other_fields, ext)
    }
}

fn unify_shared_fields(
    subs: &mut Subs,
    pool: &mut Pool,
    ctx: &Context,
    shared_fields: Vec<(Lowercase, (Variable, Variable))>,
    other_fields: SendMap<Lowercase, Variable>,
    ext: Variable,
) -> Outcome {
    let mut matching_fields = SendMap::default();
    let num_shared_fields = shared_fields.len();

    for (name, (actual, expected)) in shared_fields {
        let problems = unify_pool(subs, pool, actual, expected);

        if problems.is_empty() {
            matching_fields.insert(name, actual);
        }
    }

    if num_shared_fields == matching_fields.len() {
        let flat_type = FlatType::Record(matching_fields.union(other_fields), ext);

        merge(subs, ctx, Content::Structure(flat_type))
    } else {
        // A shared field failed to unify. Report one mismatch for the whole
        // record; the conflicting field is visible in the rendered types.
        mismatch!("in shared record fields")
    }
}

// PLUMBING

fn merge(subs: &mut Subs, ctx: &Context, content: Content) -> Outcome {
    // The merged class must be bound at least as far out as either side was.
    let rank = ctx.first_desc.rank.min(ctx.second_desc.rank);
    let desc = Descriptor {
        content,
        rank,
        mark: Mark::NONE,
        copy: OptVariable::NONE,
    };

    subs.union(ctx.first, ctx.second, desc);

    Vec::new()
}

fn fresh(subs: &mut Subs, pool: &mut Pool, ctx: &Context, content: Content) -> Variable {
    let descriptor = Descriptor {
        content,
        rank: ctx.first_desc.rank.min(ctx.second_desc.rank),
        mark: Mark::NONE,
        copy: OptVariable::NONE,
    };

    let var = subs.fresh(descriptor);

    pool.push(var);

    var
}
