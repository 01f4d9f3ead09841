#[macro_use]
extern crate pretty_assertions;

extern crate tern_types;

#[cfg(test)]
mod test_subs {
    use tern_types::subs::{
        Content, Descriptor, ErrorReason, FlatType, Mark, OptVariable, Rank, Subs, Variable,
    };
    use tern_types::types::{ErrorType, TypeExt};

    // HELPERS

    fn int_descriptor() -> Descriptor {
        Descriptor::from(Content::Structure(FlatType::Apply(
            tern_module::symbol::Symbol::INT_INT,
            Vec::new(),
        )))
    }

    // UNION-FIND

    #[test]
    fn fresh_vars_are_distinct_roots() {
        let mut subs = Subs::new();

        let a = subs.fresh_unnamed_flex_var();
        let b = subs.fresh_unnamed_flex_var();

        assert_ne!(a, b);
        assert!(!subs.equivalent(a, b));
        assert!(!subs.redundant(a));
        assert!(!subs.redundant(b));
        assert!(a >= Variable::FIRST_USER_SPACE_VAR);
    }

    #[test]
    fn union_shares_one_descriptor() {
        let mut subs = Subs::new();

        let a = subs.fresh_unnamed_flex_var();
        let b = subs.fresh_unnamed_flex_var();

        subs.union(a, b, int_descriptor());

        assert!(subs.equivalent(a, b));

        // every member observes the merged descriptor
        assert_eq!(subs.get(a).content, subs.get(b).content);
        assert_eq!(
            subs.get(a).content,
            Content::Structure(FlatType::Apply(
                tern_module::symbol::Symbol::INT_INT,
                Vec::new()
            ))
        );

        // exactly one of the two is still a representative
        assert_ne!(subs.redundant(a), subs.redundant(b));
    }

    #[test]
    fn union_is_idempotent_on_one_class() {
        let mut subs = Subs::new();

        let a = subs.fresh_unnamed_flex_var();
        let b = subs.fresh_unnamed_flex_var();

        subs.union(a, b, int_descriptor());

        let root_before = subs.get_root_key(a);

        subs.union(a, b, int_descriptor());

        assert_eq!(root_before, subs.get_root_key(a));
        assert_eq!(root_before, subs.get_root_key(b));
    }

    #[test]
    fn chained_unions_compress_to_one_root() {
        let mut subs = Subs::new();

        let a = subs.fresh_unnamed_flex_var();
        let b = subs.fresh_unnamed_flex_var();
        let c = subs.fresh_unnamed_flex_var();
        let d = subs.fresh_unnamed_flex_var();

        subs.union(a, b, Descriptor::from(Content::FlexVar(None)));
        subs.union(c, d, Descriptor::from(Content::FlexVar(None)));
        subs.union(b, c, int_descriptor());

        let root = subs.get_root_key(a);

        for var in [a, b, c, d] {
            assert_eq!(root, subs.get_root_key(var));
            assert!(subs.equivalent(var, root));
        }
    }

    #[test]
    fn modify_is_visible_through_every_member() {
        let mut subs = Subs::new();

        let a = subs.fresh_unnamed_flex_var();
        let b = subs.fresh_unnamed_flex_var();

        subs.union(a, b, Descriptor::from(Content::FlexVar(None)));

        subs.modify(a, |desc| {
            desc.rank = Rank::toplevel();
            desc.mark = Mark::NONE.next();
        });

        assert_eq!(subs.get_rank(b), Rank::toplevel());
        assert_eq!(subs.get_mark(b), Mark::NONE.next());
    }

    #[test]
    fn set_copy_round_trips() {
        let mut subs = Subs::new();

        let a = subs.fresh_unnamed_flex_var();
        let b = subs.fresh_unnamed_flex_var();

        assert_eq!(subs.get_copy(a), OptVariable::NONE);

        subs.set_copy(a, OptVariable::from(b));

        assert_eq!(subs.get_copy(a).into_variable(), Some(b));

        subs.set_copy(a, OptVariable::NONE);

        assert_eq!(subs.get_copy(a), OptVariable::NONE);
    }

    // OCCURS

    #[test]
    fn occurs_accepts_a_dag() {
        let mut subs = Subs::new();

        let shared = subs.fresh_unnamed_flex_var();
        let func = subs.fresh(Descriptor::from(Content::Structure(FlatType::Func(
            shared, shared,
        ))));

        assert_eq!(subs.occurs(func), Ok(()));
    }

    #[test]
    fn occurs_detects_a_cycle() {
        let mut subs = Subs::new();

        let var = subs.fresh_unnamed_flex_var();
        let int = subs.fresh(int_descriptor());

        subs.set_content(var, Content::Structure(FlatType::Func(var, int)));

        match subs.occurs(var) {
            Err((offender, _chain)) => {
                assert_eq!(offender, subs.get_root_key(var));
            }
            Ok(()) => panic!("expected the cyclic class to fail the occurs check"),
        }
    }

    #[test]
    fn occurs_stops_at_an_error_sentinel() {
        let mut subs = Subs::new();

        let var = subs.fresh_unnamed_flex_var();
        let int = subs.fresh(int_descriptor());

        subs.set_content(var, Content::Structure(FlatType::Func(var, int)));
        subs.set_content(var, Content::Error(ErrorReason::Infinite));

        assert_eq!(subs.occurs(var), Ok(()));
    }

    // ERROR TYPES

    #[test]
    fn render_names_anonymous_vars() {
        let mut subs = Subs::new();

        let arg = subs.fresh_unnamed_flex_var();
        let ret = subs.fresh_unnamed_flex_var();
        let func = subs.fresh(Descriptor::from(Content::Structure(FlatType::Func(
            arg, ret,
        ))));

        let err_type = subs.var_to_error_type(func);

        assert_eq!(
            err_type,
            ErrorType::Function(
                Box::new(ErrorType::FlexVar("a".into())),
                Box::new(ErrorType::FlexVar("b".into())),
            )
        );
    }

    #[test]
    fn render_cuts_cycles_with_a_placeholder() {
        let mut subs = Subs::new();

        let var = subs.fresh_unnamed_flex_var();
        let int = subs.fresh(int_descriptor());

        subs.set_content(var, Content::Structure(FlatType::Func(var, int)));

        let err_type = subs.var_to_error_type(var);

        assert_eq!(
            err_type,
            ErrorType::Function(
                Box::new(ErrorType::Infinite),
                Box::new(ErrorType::Type(
                    tern_module::symbol::Symbol::INT_INT,
                    Vec::new()
                )),
            )
        );

        // rendering must not change the graph itself
        match subs.get(var).content {
            Content::Structure(FlatType::Func(_, _)) => {}
            other => panic!("rendering rewrote the cyclic class to {:?}", other),
        }
    }

    #[test]
    fn render_open_record() {
        let mut subs = Subs::new();

        let ext = subs.fresh_unnamed_flex_var();
        let int = subs.fresh(int_descriptor());

        let mut fields = tern_collections::all::SendMap::default();
        fields.insert("age".into(), int);

        let record = subs.fresh(Descriptor::from(Content::Structure(FlatType::Record(
            fields, ext,
        ))));

        let err_type = subs.var_to_error_type(record);

        let mut expected_fields = tern_collections::all::SendMap::default();
        expected_fields.insert(
            "age".into(),
            ErrorType::Type(tern_module::symbol::Symbol::INT_INT, Vec::new()),
        );

        assert_eq!(
            err_type,
            ErrorType::Record(expected_fields, TypeExt::FlexOpen("a".into()))
        );
    }
}
