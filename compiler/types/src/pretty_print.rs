use crate::subs::{Content, FlatType, Subs, Variable};
use crate::types::name_type_var;
use tern_collections::all::{MutMap, MutSet, SendMap};
use tern_module::ident::Lowercase;
use tern_module::symbol::{Interns, ModuleId, Symbol};

pub static WILDCARD: &str = "*";
static EMPTY_RECORD: &str = "{}";

/// What the position being printed demands in the way of parentheses.
///
/// A function type in argument position needs them, as in `(a -> b) -> c`,
/// and so does a parameterized type applied inside another application, as
/// in `List (List a)`. At the top level neither does.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Parens {
    InFn,
    InTypeParam,
    Unnecessary,
}

macro_rules! write_parens {
    ($insert_parens:expr, $buf:expr, $body:expr) => {{
        if $insert_parens {
            $buf.push('(');
        }

        $body

        if $insert_parens {
            $buf.push(')');
        }
    }
    };
}

struct Env<'a> {
    home: ModuleId,
    interns: &'a Interns,
}

/// Whether a nameless root shows up once or several times under the type
/// being printed. One appearance renders as the `*` wildcard; repeats earn
/// a generated letter so the reader can see the sharing.
enum Appearances {
    Single,
    Multiple,
}

/// One pass over the type collecting two things: how often each nameless
/// root appears, and which names are already spoken for. `name_all_type_vars`
/// then hands out letters to the repeated roots without colliding with
/// anything the user wrote.
fn find_names_needed(
    variable: Variable,
    subs: &mut Subs,
    roots: &mut Vec<Variable>,
    root_appearances: &mut MutMap<Variable, Appearances>,
    names_taken: &mut MutSet<Lowercase>,
) {
    use crate::subs::Content::*;
    use crate::subs::FlatType::*;

    match subs.get_content_without_compacting(variable).clone() {
        FlexVar(None) | FlexSuper(_, None) => {
            // count the root, not the member: every alias of a class bumps
            // the same entry
            let root = subs.get_root_key_without_compacting(variable);

            match root_appearances.get(&root) {
                Some(Appearances::Single) => {
                    root_appearances.insert(root, Appearances::Multiple);
                }
                Some(Appearances::Multiple) => {
                    // already known to repeat
                }
                None => {
                    roots.push(root);
                    root_appearances.insert(root, Appearances::Single);
                }
            }
        }
        FlexVar(Some(name)) | FlexSuper(_, Some(name)) => {
            // already named; just make sure no generated letter reuses it
            names_taken.insert(name);
        }
        RigidVar(name) | RigidSuper(_, name) => {
            names_taken.insert(name);
        }
        Structure(Apply(_, args)) => {
            for var in args {
                find_names_needed(var, subs, roots, root_appearances, names_taken);
            }
        }
        Structure(Func(arg_var, ret_var)) => {
            find_names_needed(arg_var, subs, roots, root_appearances, names_taken);
            find_names_needed(ret_var, subs, roots, root_appearances, names_taken);
        }
        Structure(Record(fields, ext_var)) => {
            for (_, var) in fields {
                find_names_needed(var, subs, roots, root_appearances, names_taken);
            }

            find_names_needed(ext_var, subs, roots, root_appearances, names_taken);
        }
        Alias(_symbol, args, _actual) => {
            // the expansion can only mention variables the arguments
            // already mention, so walking the arguments covers it
            for (_, var) in args {
                find_names_needed(var, subs, roots, root_appearances, names_taken);
            }
        }
        Error(_) | Structure(EmptyRecord) => {
            // Errors and empty records don't need names.
        }
    }
}

pub fn name_all_type_vars(variable: Variable, subs: &mut Subs) {
    let mut roots = Vec::new();
    let mut letters_used = 0;
    let mut appearances = MutMap::default();
    let mut taken = MutSet::default();

    find_names_needed(variable, subs, &mut roots, &mut appearances, &mut taken);

    for root in roots {
        if let Some(Appearances::Multiple) = appearances.get(&root) {
            letters_used = name_root(letters_used, root, subs, &mut taken);
        }
    }
}

fn name_root(
    letters_used: u32,
    root: Variable,
    subs: &mut Subs,
    taken: &mut MutSet<Lowercase>,
) -> u32 {
    let (generated_name, new_letters_used) = name_type_var(letters_used, taken);

    set_root_name(root, generated_name, subs);

    new_letters_used
}

fn set_root_name(root: Variable, name: Lowercase, subs: &mut Subs) {
    use crate::subs::Content::*;

    match subs.get_content_without_compacting(root).clone() {
        FlexVar(None) => {
            subs.set_content(root, FlexVar(Some(name)));
        }
        FlexSuper(sup, None) => {
            subs.set_content(root, FlexSuper(sup, Some(name)));
        }
        _ => (),
    }
}

pub fn content_to_string(
    content: &Content,
    subs: &Subs,
    home: ModuleId,
    interns: &Interns,
) -> String {
    let mut buf = String::new();
    let env = Env { home, interns };

    write_content(&env, content, subs, &mut buf, Parens::Unnecessary);

    buf
}

fn write_content(env: &Env, content: &Content, subs: &Subs, buf: &mut String, parens: Parens) {
    use crate::subs::Content::*;

    match content {
        FlexVar(Some(name)) => buf.push_str(name.as_str()),
        FlexVar(None) => buf.push_str(WILDCARD),
        FlexSuper(sup, opt_name) => match opt_name {
            Some(name) => buf.push_str(name.as_str()),
            // unnamed super vars print as their kind, e.g. `number`
            None => buf.push_str(sup.as_str()),
        },
        RigidVar(name) => buf.push_str(name.as_str()),
        RigidSuper(_, name) => buf.push_str(name.as_str()),
        Structure(flat_type) => write_flat_type(env, flat_type, subs, buf, parens),
        Alias(symbol, args, _actual) => {
            let write_parens = parens == Parens::InTypeParam && !args.is_empty();

            write_parens!(write_parens, buf, {
                write_symbol(env, *symbol, buf);

                for (_, var) in args {
                    buf.push(' ');
                    write_content(
                        env,
                        subs.get_content_without_compacting(*var),
                        subs,
                        buf,
                        Parens::InTypeParam,
                    );
                }
            })
        }
        Error(_) => buf.push_str("<type mismatch>"),
    }
}

enum ExtContent<'a> {
    Empty,
    Content(&'a Content),
}

impl<'a> ExtContent<'a> {
    fn from_var(subs: &'a Subs, ext: Variable) -> Self {
        let content = subs.get_content_without_compacting(ext);
        match content {
            Content::Structure(FlatType::EmptyRecord) => ExtContent::Empty,

            // A poisoned extension prints as closed; the mismatch is
            // reported through the error list, not the record syntax.
            Content::Error(_) => ExtContent::Empty,

            Content::FlexVar(_)
            | Content::FlexSuper(_, _)
            | Content::RigidVar(_)
            | Content::RigidSuper(_, _) => ExtContent::Content(content),

            other => tern_error_macros::internal_error!(
                "something weird ended up in a record extension: {:?}",
                other
            ),
        }
    }
}

fn write_ext_content(env: &Env, subs: &Subs, buf: &mut String, ext_content: ExtContent<'_>) {
    if let ExtContent::Content(content) = ext_content {
        // an open record shows its extension directly after the closing
        // brace, like the r in { x : Int }r
        write_content(env, content, subs, buf, Parens::Unnecessary)
    }
}

/// Chase the extension chain so nested records print as one flat record;
/// fields come back sorted by name to keep the output deterministic.
fn sorted_record_fields(
    subs: &Subs,
    fields: &SendMap<Lowercase, Variable>,
    ext_var: Variable,
) -> (Vec<(Lowercase, Variable)>, Variable) {
    let mut all_fields: Vec<(Lowercase, Variable)> =
        fields.iter().map(|(k, v)| (k.clone(), *v)).collect();
    let mut ext = ext_var;

    loop {
        match subs.get_content_without_compacting(ext) {
            Content::Structure(FlatType::Record(sub_fields, sub_ext)) => {
                all_fields.extend(sub_fields.iter().map(|(k, v)| (k.clone(), *v)));
                ext = *sub_ext;
            }
            Content::Alias(_, _, real_var) => {
                // the alias is not seen by the user, so print the expansion
                ext = *real_var;
            }
            _ => break,
        }
    }

    all_fields.sort_by(|(a, _), (b, _)| a.cmp(b));

    (all_fields, ext)
}

fn write_sorted_fields(
    env: &Env,
    subs: &Subs,
    buf: &mut String,
    sorted_fields: Vec<(Lowercase, Variable)>,
) {
    let mut any_written_yet = false;

    for (label, var) in sorted_fields {
        if any_written_yet {
            buf.push_str(", ");
        } else {
            any_written_yet = true;
        }

        buf.push_str(label.as_str());
        buf.push_str(" : ");

        write_content(
            env,
            subs.get_content_without_compacting(var),
            subs,
            buf,
            Parens::Unnecessary,
        );
    }
}

fn write_flat_type(env: &Env, flat_type: &FlatType, subs: &Subs, buf: &mut String, parens: Parens) {
    use crate::subs::FlatType::*;

    match flat_type {
        Apply(symbol, args) => write_apply(env, *symbol, args, subs, buf, parens),
        EmptyRecord => buf.push_str(EMPTY_RECORD),
        Func(arg_var, ret_var) => write_fn(env, *arg_var, *ret_var, subs, buf, parens),
        Record(fields, ext_var) => {
            let (sorted_fields, ext) = sorted_record_fields(subs, fields, *ext_var);
            let ext_content = ExtContent::from_var(subs, ext);

            if sorted_fields.is_empty() {
                match ext_content {
                    ExtContent::Empty => buf.push_str(EMPTY_RECORD),
                    ExtContent::Content(_) => write_ext_content(env, subs, buf, ext_content),
                }
            } else {
                buf.push_str("{ ");

                write_sorted_fields(env, subs, buf, sorted_fields);

                buf.push_str(" }");

                write_ext_content(env, subs, buf, ext_content)
            }
        }
    }
}

fn write_apply(
    env: &Env,
    symbol: Symbol,
    args: &[Variable],
    subs: &Subs,
    buf: &mut String,
    parens: Parens,
) {
    let write_parens = parens == Parens::InTypeParam && !args.is_empty();

    write_parens!(write_parens, buf, {
        write_symbol(env, symbol, buf);

        for arg in args {
            buf.push(' ');
            write_content(
                env,
                subs.get_content_without_compacting(*arg),
                subs,
                buf,
                Parens::InTypeParam,
            );
        }
    });
}

fn write_fn(
    env: &Env,
    arg_var: Variable,
    ret_var: Variable,
    subs: &Subs,
    buf: &mut String,
    parens: Parens,
) {
    let use_parens = parens != Parens::Unnecessary;

    write_parens!(use_parens, buf, {
        write_content(
            env,
            subs.get_content_without_compacting(arg_var),
            subs,
            buf,
            Parens::InFn,
        );

        buf.push_str(" -> ");

        // functions associate to the right, so the return position never
        // needs parens of its own
        write_content(
            env,
            subs.get_content_without_compacting(ret_var),
            subs,
            buf,
            Parens::Unnecessary,
        );
    });
}

fn write_symbol(env: &Env, symbol: Symbol, buf: &mut String) {
    let interns = env.interns;
    let ident = symbol.ident_string(interns);
    let module_id = symbol.module_id();

    // Builtin types are named after their modules (Int.Int, Str.Str, ...)
    // and print unqualified, like every symbol from the home module.
    if module_id == env.home || ident == symbol.module_string(interns) {
        buf.push_str(ident);
    } else {
        buf.push_str(symbol.module_string(interns));
        buf.push('.');
        buf.push_str(ident);
    }
}
