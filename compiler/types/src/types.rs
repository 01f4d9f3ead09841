use crate::subs::Variable;
use std::fmt;
use tern_collections::all::{MutSet, SendMap};
use tern_module::ident::Lowercase;
use tern_module::symbol::Symbol;
use tern_region::all::{Located, Region};

/// The elaborator's syntactic view of a type. Leaves may be variables that
/// were already allocated in the substitution; everything else gets a fresh
/// variable when the solver flattens the type into the graph.
#[derive(PartialEq, Eq, Clone)]
pub enum Type {
    EmptyRec,
    /// A function. The type of its argument, then the type of its return
    /// value. Multi-argument functions are curried chains of these.
    Function(Box<Type>, Box<Type>),
    Record(SendMap<Lowercase, Type>, Box<Type>),
    /// A named abbreviation and its expansion, e.g. Name : { first : Str }
    Alias(Symbol, Vec<(Lowercase, Type)>, Box<Type>),
    /// Applying a type to some arguments (e.g. List Int)
    Apply(Symbol, Vec<Type>),
    Variable(Variable),
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Type::EmptyRec => write!(f, "{{}}"),
            Type::Function(arg, ret) => {
                write!(f, "Fn(")?;

                arg.fmt(f)?;

                write!(f, " -> ")?;

                ret.fmt(f)?;

                write!(f, ")")
            }
            Type::Variable(var) => write!(f, "<{:?}>", var),

            Type::Apply(symbol, args) => {
                write!(f, "({:?}", symbol)?;

                for arg in args {
                    write!(f, " {:?}", arg)?;
                }

                write!(f, ")")
            }
            Type::Alias(symbol, args, _actual) => {
                write!(f, "Alias {:?}", symbol)?;

                for (_, arg) in args {
                    write!(f, " {:?}", arg)?;
                }

                Ok(())
            }
            Type::Record(fields, ext) => {
                write!(f, "{{")?;

                if !fields.is_empty() {
                    write!(f, " ")?;
                }

                let mut any_written_yet = false;

                for (label, field_type) in fields {
                    if any_written_yet {
                        write!(f, ", ")?;
                    } else {
                        any_written_yet = true;
                    }

                    write!(f, "{:?} : {:?}", label, field_type)?;
                }

                if !fields.is_empty() {
                    write!(f, " ")?;
                }

                write!(f, "}}")?;

                match *ext.clone() {
                    // a closed record ends at the brace
                    Type::EmptyRec => Ok(()),
                    // an open one shows its extension right after it,
                    // like the r in { x : Int }r
                    other => other.fmt(f),
                }
            }
        }
    }
}

impl Type {
    pub fn int() -> Self {
        Type::Apply(Symbol::INT_INT, Vec::new())
    }

    pub fn float() -> Self {
        Type::Apply(Symbol::FLOAT_FLOAT, Vec::new())
    }

    pub fn string() -> Self {
        Type::Apply(Symbol::STR_STR, Vec::new())
    }

    pub fn character() -> Self {
        Type::Apply(Symbol::CHAR_CHAR, Vec::new())
    }

    /// what `if` conditions get constrained against
    pub fn bool() -> Self {
        Type::Apply(Symbol::BOOL_BOOL, Vec::new())
    }

    pub fn list(elem: Type) -> Self {
        Type::Apply(Symbol::LIST_LIST, vec![elem])
    }

    pub fn pair(first: Type, second: Type) -> Self {
        Type::Apply(Symbol::TUPLE_PAIR, vec![first, second])
    }

    pub fn function(arg: Type, ret: Type) -> Self {
        Type::Function(Box::new(arg), Box::new(ret))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected<T> {
    NoExpectation(T),
    FromAnnotation(Lowercase, Region, T),
    ForReason(Reason, T, Region),
}

impl<T> Expected<T> {
    pub fn get_type(self) -> T {
        match self {
            Expected::NoExpectation(val) => val,
            Expected::ForReason(_, val, _) => val,
            Expected::FromAnnotation(_, _, val) => val,
        }
    }

    pub fn get_type_ref(&self) -> &T {
        match self {
            Expected::NoExpectation(val) => val,
            Expected::ForReason(_, val, _) => val,
            Expected::FromAnnotation(_, _, val) => val,
        }
    }

    pub fn replace<U>(self, new: U) -> Expected<U> {
        match self {
            Expected::NoExpectation(_val) => Expected::NoExpectation(new),
            Expected::ForReason(reason, _val, region) => Expected::ForReason(reason, new, region),
            Expected::FromAnnotation(name, region, _val) => {
                Expected::FromAnnotation(name, region, new)
            }
        }
    }

    pub fn replace_ref<U>(&self, new: U) -> Expected<U> {
        match self {
            Expected::NoExpectation(_val) => Expected::NoExpectation(new),
            Expected::ForReason(reason, _val, region) => {
                Expected::ForReason(reason.clone(), new, *region)
            }
            Expected::FromAnnotation(name, region, _val) => {
                Expected::FromAnnotation(name.clone(), *region, new)
            }
        }
    }
}

/// Why we expected a particular type. This rides along inside `Expected` and
/// ends up in error reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    AnonymousFnArg { arg_index: u8 },
    NamedFnArg(String /* function name */, u8 /* arg index */),
    AnonymousFnCall { arity: u8 },
    NamedFnCall(String /* function name */, u8 /* arity */),
    FloatLiteral,
    IntLiteral,
    InterpolatedStringVar,
    WhenBranch { index: usize },
    IfCondition,
    IfBranch { index: usize },
    ElemInList,
    RecordUpdateValue(Lowercase),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Eq(Type, Expected<Type>, Region),
    Lookup(Symbol, Expected<Type>, Region),
    True, // trivially satisfied; emitted where elaboration had nothing to check
    SaveTheEnvironment,
    Let(Box<LetConstraint>),
    And(Vec<Constraint>),
}

/// One `let` scheme: the quantifiers introduced for its definitions, the
/// header mapping each defined name to its (syntactic) type, the constraint
/// generated for the definitions, and the constraint for the body the
/// definitions are in scope for.
#[derive(Debug, Clone, PartialEq)]
pub struct LetConstraint {
    pub rigid_vars: Vec<Variable>,
    pub flex_vars: Vec<Variable>,
    pub def_types: SendMap<Symbol, Located<Type>>,
    pub defs_constraint: Constraint,
    pub ret_constraint: Constraint,
}

/// A type as it appears in an error report: fully resolved against the
/// substitution, with generated names for anonymous variables and an
/// `Infinite` placeholder wherever the graph loops back on itself.
#[derive(PartialEq, Eq, Debug, Clone)]
pub enum ErrorType {
    Infinite,
    Type(Symbol, Vec<ErrorType>),
    FlexVar(Lowercase),
    RigidVar(Lowercase),
    Record(SendMap<Lowercase, ErrorType>, TypeExt),
    Function(Box<ErrorType>, Box<ErrorType>),
    Alias(Symbol, Vec<(Lowercase, ErrorType)>, Box<ErrorType>),
    Error,
}

impl ErrorType {
    pub fn unwrap_alias(self) -> ErrorType {
        match self {
            ErrorType::Alias(_, _, real) => real.unwrap_alias(),
            real => real,
        }
    }
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub enum TypeExt {
    Closed,
    FlexOpen(Lowercase),
    RigidOpen(Lowercase),
}

static THE_LETTER_A: u32 = 'a' as u32;

pub fn name_type_var(letters_used: u32, taken: &mut MutSet<Lowercase>) -> (Lowercase, u32) {
    // single letters a..z first
    let generated_name: Lowercase = if letters_used < 26 {
        std::char::from_u32(THE_LETTER_A + letters_used)
            .unwrap_or_else(|| panic!("Tried to convert {} to a char", THE_LETTER_A + letters_used))
            .to_string()
            .into()
    } else {
        // a type with more than 26 anonymous variables is hopeless anyway;
        // number the rest rather than get clever about it
        format!("v{}", letters_used - 25).into()
    };

    if taken.contains(&generated_name) {
        // skip past names the user already claimed
        name_type_var(letters_used + 1, taken)
    } else {
        taken.insert(generated_name.clone());

        (generated_name, letters_used + 1)
    }
}
