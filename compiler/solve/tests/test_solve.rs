#[macro_use]
extern crate pretty_assertions;

extern crate tern_solve;

#[cfg(test)]
mod test_solve {
    use tern_collections::all::SendMap;
    use tern_module::symbol::{IdentIds, Interns, ModuleId, ModuleIds, Symbol};
    use tern_region::all::{Located, Region};
    use tern_solve::solve::{self, Env, TypeError};
    use tern_types::pretty_print::{content_to_string, name_all_type_vars};
    use tern_types::solved_types::Solved;
    use tern_types::subs::{
        Content, Descriptor, ErrorReason, FlatType, Rank, Subs, Super, Variable,
    };
    use tern_types::types::{Constraint, ErrorType, Expected, LetConstraint, Reason, Type};

    // HELPERS

    struct TestModule {
        home: ModuleId,
        module_ids: ModuleIds,
        ident_ids: IdentIds,
    }

    impl TestModule {
        fn new() -> Self {
            let mut module_ids = ModuleIds::default();
            let home = module_ids.get_or_insert(&"Test".into());

            TestModule {
                home,
                module_ids,
                ident_ids: IdentIds::default(),
            }
        }

        fn symbol(&mut self, name: &str) -> Symbol {
            let ident_id = self.ident_ids.get_or_insert(&name.into());

            Symbol::new(self.home, ident_id)
        }

        fn interns(&self) -> Interns {
            let mut all_ident_ids = IdentIds::exposed_builtins();

            all_ident_ids.insert(self.home, self.ident_ids.clone());
            self.home.register_debug_idents(&self.ident_ids);

            Interns {
                module_ids: self.module_ids.clone(),
                all_ident_ids,
            }
        }
    }

    fn infer(subs: Subs, constraint: &Constraint) -> (Vec<TypeError>, Solved<Subs>, Env) {
        let env = Env::default();
        let mut problems = Vec::new();

        let (solved, env) = solve::run(&env, &mut problems, subs, constraint)
            .expect("solver invariant violated");

        (problems, solved, env)
    }

    fn print_var(var: Variable, subs: &mut Subs, module: &TestModule) -> String {
        name_all_type_vars(var, subs);

        let content = subs.get(var).content;
        let interns = module.interns();

        content_to_string(&content, subs, module.home, &interns)
    }

    fn def_types(defs: Vec<(Symbol, Type)>) -> SendMap<Symbol, Located<Type>> {
        let mut map = SendMap::default();

        for (symbol, typ) in defs {
            map.insert(symbol, Located::at_zero(typ));
        }

        map
    }

    fn let_constraint(
        rigid_vars: Vec<Variable>,
        flex_vars: Vec<Variable>,
        defs: Vec<(Symbol, Type)>,
        defs_constraint: Constraint,
        ret_constraint: Constraint,
    ) -> Constraint {
        Constraint::Let(Box::new(LetConstraint {
            rigid_vars,
            flex_vars,
            def_types: def_types(defs),
            defs_constraint,
            ret_constraint,
        }))
    }

    fn lookup(symbol: Symbol, typ: Type) -> Constraint {
        Constraint::Lookup(symbol, Expected::NoExpectation(typ), Region::zero())
    }

    fn eq(typ: Type, expected: Type) -> Constraint {
        Constraint::Eq(typ, Expected::NoExpectation(expected), Region::zero())
    }

    /// Walk a type from this variable and check that ranks never increase as
    /// you go deeper, generalized classes excepted.
    fn assert_ranks_monotonic(subs: &Subs, var: Variable) {
        fn walk(subs: &Subs, var: Variable, parent_rank: Option<Rank>, seen: &mut Vec<Variable>) {
            let root = subs.get_root_key_without_compacting(var);

            if seen.contains(&root) {
                return;
            }
            seen.push(root);

            let rank = subs.get_rank(root);

            if let Some(parent_rank) = parent_rank {
                if parent_rank != Rank::NONE && rank != Rank::NONE {
                    assert!(
                        rank <= parent_rank,
                        "rank increased from {:?} to {:?} at {:?}",
                        parent_rank,
                        rank,
                        root
                    );
                }
            }

            match subs.get_content_without_compacting(root).clone() {
                Content::Structure(FlatType::Apply(_, args)) => {
                    for arg in args {
                        walk(subs, arg, Some(rank), seen);
                    }
                }
                Content::Structure(FlatType::Func(arg, ret)) => {
                    walk(subs, arg, Some(rank), seen);
                    walk(subs, ret, Some(rank), seen);
                }
                Content::Structure(FlatType::Record(fields, ext)) => {
                    for (_, field_var) in fields {
                        walk(subs, field_var, Some(rank), seen);
                    }
                    walk(subs, ext, Some(rank), seen);
                }
                Content::Alias(_, args, real_var) => {
                    for (_, arg_var) in args {
                        walk(subs, arg_var, Some(rank), seen);
                    }
                    walk(subs, real_var, Some(rank), seen);
                }
                _ => {}
            }
        }

        walk(subs, var, None, &mut Vec::new());
    }

    // SCENARIOS

    #[test]
    fn identity_scheme_is_generalized() {
        let mut module = TestModule::new();
        let id_symbol = module.symbol("id");

        let mut subs = Subs::new();
        let a = subs.fresh_unnamed_flex_var();

        let id_type = Type::function(Type::Variable(a), Type::Variable(a));

        let constraint = let_constraint(
            vec![],
            vec![a],
            vec![(id_symbol, id_type)],
            Constraint::True,
            Constraint::And(vec![
                lookup(id_symbol, Type::function(Type::int(), Type::int())),
                Constraint::SaveTheEnvironment,
            ]),
        );

        let (problems, mut solved, env) = infer(subs, &constraint);

        assert_eq!(problems, Vec::new());

        let var = env.get_var(id_symbol).expect("id is not in the env");
        let subs = solved.inner_mut();

        // the scheme itself stays generalized; the lookup got its own copy
        assert_eq!(subs.get_rank(var), Rank::NONE);
        assert_ranks_monotonic(subs, var);
        assert_eq!(print_var(var, subs, &module), "a -> a");
    }

    #[test]
    fn polymorphic_let_instantiates_fresh_copies() {
        let mut module = TestModule::new();
        let id_symbol = module.symbol("id");

        let mut subs = Subs::new();
        let a = subs.fresh_unnamed_flex_var();

        let id_type = Type::function(Type::Variable(a), Type::Variable(a));

        // id is used at Int and at Str; neither use constrains the other
        let constraint = let_constraint(
            vec![],
            vec![a],
            vec![(id_symbol, id_type)],
            Constraint::True,
            Constraint::And(vec![
                lookup(id_symbol, Type::function(Type::int(), Type::int())),
                lookup(id_symbol, Type::function(Type::string(), Type::string())),
                Constraint::SaveTheEnvironment,
            ]),
        );

        let (problems, mut solved, env) = infer(subs, &constraint);

        assert_eq!(problems, Vec::new());

        // instantiation must not have bent the original scheme
        let var = env.get_var(id_symbol).expect("id is not in the env");
        let subs = solved.inner_mut();

        assert_eq!(subs.get_rank(var), Rank::NONE);
        assert_eq!(print_var(var, subs, &module), "a -> a");
    }

    #[test]
    fn occurs_check_reports_infinite_type() {
        let mut module = TestModule::new();
        let x_symbol = module.symbol("x");

        let mut subs = Subs::new();
        let a = subs.fresh_unnamed_flex_var();

        // a ~ (a -> Int) can only be satisfied by an infinite type
        let constraint = let_constraint(
            vec![],
            vec![a],
            vec![(x_symbol, Type::Variable(a))],
            eq(
                Type::Variable(a),
                Type::function(Type::Variable(a), Type::int()),
            ),
            Constraint::SaveTheEnvironment,
        );

        let (problems, mut solved, _env) = infer(subs, &constraint);

        assert_eq!(
            problems,
            vec![TypeError::CircularType(
                x_symbol,
                ErrorType::Function(
                    Box::new(ErrorType::Infinite),
                    Box::new(ErrorType::Type(Symbol::INT_INT, Vec::new())),
                ),
                Region::zero(),
            )]
        );

        // the knot itself is poisoned so nothing walks into it again
        assert_eq!(
            solved.inner_mut().get(a).content,
            Content::Error(ErrorReason::Infinite)
        );
    }

    #[test]
    fn open_record_takes_the_missing_fields() {
        let mut module = TestModule::new();

        let mut subs = Subs::new();
        let r = subs.fresh_unnamed_flex_var();

        let mut left_fields = SendMap::default();
        left_fields.insert("name".into(), Type::string());

        let mut right_fields = SendMap::default();
        right_fields.insert("name".into(), Type::string());
        right_fields.insert("age".into(), Type::int());

        let constraint = let_constraint(
            vec![],
            vec![r],
            vec![],
            eq(
                Type::Record(left_fields, Box::new(Type::Variable(r))),
                Type::Record(right_fields, Box::new(Type::EmptyRec)),
            ),
            Constraint::SaveTheEnvironment,
        );

        let (problems, mut solved, _env) = infer(subs, &constraint);

        assert_eq!(problems, Vec::new());
        assert_eq!(print_var(r, solved.inner_mut(), &module), "{ age : Int }");
    }

    #[test]
    fn record_field_clash_is_one_mismatch() {
        let subs = Subs::new();

        let mut left_fields = SendMap::default();
        left_fields.insert("x".into(), Type::int());

        let mut right_fields = SendMap::default();
        right_fields.insert("x".into(), Type::string());

        let constraint = eq(
            Type::Record(left_fields, Box::new(Type::EmptyRec)),
            Type::Record(right_fields, Box::new(Type::EmptyRec)),
        );

        let (problems, _solved, _env) = infer(subs, &constraint);

        match problems.as_slice() {
            [TypeError::BadExpr(_, actual, _)] => {
                // the conflicting field is visible in the rendering
                match actual {
                    ErrorType::Record(fields, _) => {
                        assert!(fields.contains_key(&"x".into()));
                    }
                    other => panic!("expected a record rendering, got {:?}", other),
                }
            }
            other => panic!("expected exactly one mismatch, got {:?}", other),
        }
    }

    #[test]
    fn number_variable_takes_float() {
        let mut subs = Subs::new();
        let n = subs.fresh(Descriptor::from(Content::FlexSuper(Super::Number, None)));

        let constraint = let_constraint(
            vec![],
            vec![n],
            vec![],
            eq(Type::Variable(n), Type::float()),
            Constraint::SaveTheEnvironment,
        );

        let (problems, mut solved, _env) = infer(subs, &constraint);

        assert_eq!(problems, Vec::new());
        assert_eq!(
            solved.inner_mut().get(n).content,
            Content::Structure(FlatType::Apply(Symbol::FLOAT_FLOAT, Vec::new()))
        );
    }

    #[test]
    fn comparable_takes_a_pair_of_atoms() {
        let mut subs = Subs::new();
        let c = subs.fresh(Descriptor::from(Content::FlexSuper(
            Super::Comparable,
            None,
        )));

        let constraint = let_constraint(
            vec![],
            vec![c],
            vec![],
            eq(
                Type::Variable(c),
                Type::pair(Type::int(), Type::character()),
            ),
            Constraint::SaveTheEnvironment,
        );

        let (problems, _solved, _env) = infer(subs, &constraint);

        assert_eq!(problems, Vec::new());
    }

    #[test]
    fn list_elements_unify_argwise() {
        let subs = Subs::new();

        let constraint = eq(Type::list(Type::int()), Type::list(Type::string()));

        let (problems, _solved, _env) = infer(subs, &constraint);

        assert_eq!(problems.len(), 1, "unexpected problems: {:?}", problems);
        assert!(matches!(problems[0], TypeError::BadExpr(_, _, _)));
    }

    #[test]
    fn if_condition_must_be_bool() {
        let subs = Subs::new();

        // the condition of an `if` turned out to be an Int
        let constraint = Constraint::Eq(
            Type::int(),
            Expected::ForReason(Reason::IfCondition, Type::bool(), Region::zero()),
            Region::zero(),
        );

        let (problems, _solved, _env) = infer(subs, &constraint);

        match problems.as_slice() {
            [TypeError::BadExpr(_, _, Expected::ForReason(Reason::IfCondition, _, _))] => {}
            other => panic!("expected an if-condition mismatch, got {:?}", other),
        }
    }

    #[test]
    fn number_variable_rejects_str() {
        let mut subs = Subs::new();
        let n = subs.fresh(Descriptor::from(Content::FlexSuper(Super::Number, None)));

        let constraint = let_constraint(
            vec![],
            vec![n],
            vec![],
            eq(Type::Variable(n), Type::string()),
            Constraint::SaveTheEnvironment,
        );

        let (problems, _solved, _env) = infer(subs, &constraint);

        match problems.as_slice() {
            [TypeError::BadSuperKind(_, sup, _, _)] => {
                assert_eq!(*sup, Super::Number);
            }
            other => panic!("expected a super kind problem, got {:?}", other),
        }
    }

    // LET SHAPES

    #[test]
    fn monomorphic_binding_is_not_generalized() {
        let mut module = TestModule::new();
        let x_symbol = module.symbol("x");

        let subs = Subs::new();

        let constraint = let_constraint(
            vec![],
            vec![],
            vec![(x_symbol, Type::int())],
            Constraint::True,
            Constraint::And(vec![
                lookup(x_symbol, Type::int()),
                Constraint::SaveTheEnvironment,
            ]),
        );

        let (problems, mut solved, env) = infer(subs, &constraint);

        assert_eq!(problems, Vec::new());

        let var = env.get_var(x_symbol).expect("x is not in the env");
        let subs = solved.inner_mut();

        assert_eq!(subs.get_rank(var), Rank::toplevel());
        assert_eq!(print_var(var, subs, &module), "Int");
    }

    #[test]
    fn shortcut_let_solves_defs_in_place() {
        let mut subs = Subs::new();
        let a = subs.fresh_unnamed_flex_var();

        let constraint = let_constraint(
            vec![],
            vec![a],
            vec![],
            eq(Type::Variable(a), Type::int()),
            Constraint::True,
        );

        let (problems, mut solved, _env) = infer(subs, &constraint);

        assert_eq!(problems, Vec::new());
        assert_eq!(
            solved.inner_mut().get(a).content,
            Content::Structure(FlatType::Apply(Symbol::INT_INT, Vec::new()))
        );
    }

    #[test]
    fn only_the_inner_quantifier_is_generalized() {
        let mut module = TestModule::new();
        let f_symbol = module.symbol("f");

        let mut subs = Subs::new();
        let outer = subs.fresh_unnamed_flex_var();
        let inner = subs.fresh_unnamed_flex_var();

        // f : inner -> outer, where only `inner` belongs to f's own let.
        // Every use of f gets a fresh copy of `inner` but shares `outer`.
        let f_type = Type::function(Type::Variable(inner), Type::Variable(outer));

        let inner_let = let_constraint(
            vec![],
            vec![inner],
            vec![(f_symbol, f_type)],
            Constraint::True,
            Constraint::And(vec![
                lookup(f_symbol, Type::function(Type::int(), Type::string())),
                lookup(f_symbol, Type::function(Type::string(), Type::string())),
                lookup(f_symbol, Type::function(Type::int(), Type::int())),
                Constraint::SaveTheEnvironment,
            ]),
        );

        // the outer let introduces `outer` one binder further out
        let constraint = let_constraint(vec![], vec![outer], vec![], inner_let, Constraint::True);

        let (problems, mut solved, _env) = infer(subs, &constraint);

        // the first two lookups agree on outer ~ Str; the third one clashes
        assert_eq!(problems.len(), 1, "unexpected problems: {:?}", problems);
        assert!(matches!(problems[0], TypeError::BadExpr(_, _, _)));

        // outer was pinned by the uses, not generalized away
        assert_eq!(
            solved.inner_mut().get(outer).content,
            Content::Structure(FlatType::Apply(Symbol::STR_STR, Vec::new()))
        );
    }

    // RIGID VARIABLES

    #[test]
    fn annotated_scheme_keeps_its_rigid_quantifier() {
        let mut module = TestModule::new();
        let id_symbol = module.symbol("id");

        let mut subs = Subs::new();
        let a = subs.fresh_unnamed_flex_var();
        subs.rigid_var(a, "a".into());

        let id_type = Type::function(Type::Variable(a), Type::Variable(a));

        let constraint = let_constraint(
            vec![a],
            vec![],
            vec![(id_symbol, id_type)],
            Constraint::True,
            Constraint::And(vec![
                // instantiation turns the rigid into a fresh flexible copy,
                // so using it at Int is fine
                lookup(id_symbol, Type::function(Type::int(), Type::int())),
                Constraint::SaveTheEnvironment,
            ]),
        );

        let (problems, mut solved, env) = infer(subs, &constraint);

        assert_eq!(problems, Vec::new());

        let subs = solved.inner_mut();

        // the quantifier itself is generalized and still rigid
        assert_eq!(subs.get_rank(a), Rank::NONE);
        assert_eq!(subs.get(a).content, Content::RigidVar("a".into()));

        let var = env.get_var(id_symbol).expect("id is not in the env");
        assert_eq!(print_var(var, subs, &module), "a -> a");
    }

    #[test]
    fn annotated_number_scheme_enforces_its_super_kind() {
        let mut module = TestModule::new();
        let neg_symbol = module.symbol("neg");

        let mut subs = Subs::new();
        let n = subs.fresh_unnamed_flex_var();
        subs.rigid_super_var(n, Super::Number, "number".into());

        let neg_type = Type::function(Type::Variable(n), Type::Variable(n));

        let constraint = let_constraint(
            vec![n],
            vec![],
            vec![(neg_symbol, neg_type)],
            Constraint::True,
            Constraint::And(vec![
                lookup(neg_symbol, Type::function(Type::int(), Type::int())),
                lookup(neg_symbol, Type::function(Type::float(), Type::float())),
                lookup(neg_symbol, Type::function(Type::string(), Type::string())),
                Constraint::SaveTheEnvironment,
            ]),
        );

        let (problems, _solved, _env) = infer(subs, &constraint);

        // Int and Float satisfy `number`; Str does not
        assert_eq!(problems.len(), 1, "unexpected problems: {:?}", problems);
        assert!(matches!(
            problems[0],
            TypeError::BadSuperKind(_, Super::Number, _, _)
        ));
    }

    #[test]
    fn rigid_variable_will_not_become_int() {
        let mut module = TestModule::new();
        let x_symbol = module.symbol("x");

        let mut subs = Subs::new();
        let a = subs.fresh_unnamed_flex_var();
        subs.rigid_var(a, "a".into());

        let constraint = let_constraint(
            vec![a],
            vec![],
            vec![(x_symbol, Type::Variable(a))],
            eq(Type::Variable(a), Type::int()),
            Constraint::SaveTheEnvironment,
        );

        let (problems, _solved, _env) = infer(subs, &constraint);

        assert_eq!(problems.len(), 1, "unexpected problems: {:?}", problems);
        assert!(matches!(problems[0], TypeError::BadExpr(_, _, _)));
    }

    // LOOKUPS

    #[test]
    fn unknown_user_symbol_is_reported() {
        let mut module = TestModule::new();
        let ghost = module.symbol("ghost");

        let subs = Subs::new();
        let constraint = lookup(ghost, Type::int());

        let (problems, _solved, _env) = infer(subs, &constraint);

        assert_eq!(problems, vec![TypeError::UnexposedLookup(ghost)]);
    }

    #[test]
    fn kernel_symbol_falls_back_to_a_fresh_var() {
        let subs = Subs::new();

        // Num.add is a kernel value; without a seeded env the solver lets
        // the use site pick the type.
        let constraint = lookup(
            Symbol::NUM_ADD,
            Type::function(Type::int(), Type::function(Type::int(), Type::int())),
        );

        let (problems, _solved, _env) = infer(subs, &constraint);

        assert_eq!(problems, Vec::new());
    }

    // ENVIRONMENT SNAPSHOTS

    #[test]
    fn save_the_environment_sees_let_bindings() {
        let mut module = TestModule::new();
        let x_symbol = module.symbol("x");

        let subs = Subs::new();

        let with_snapshot = let_constraint(
            vec![],
            vec![],
            vec![(x_symbol, Type::int())],
            Constraint::True,
            Constraint::SaveTheEnvironment,
        );

        let (problems, _solved, env) = infer(subs, &with_snapshot);

        assert_eq!(problems, Vec::new());
        assert!(env.get_var(x_symbol).is_some());
    }

    #[test]
    fn without_a_snapshot_the_env_stays_empty() {
        let mut module = TestModule::new();
        let x_symbol = module.symbol("x");

        let subs = Subs::new();

        let no_snapshot = let_constraint(
            vec![],
            vec![],
            vec![(x_symbol, Type::int())],
            Constraint::True,
            Constraint::True,
        );

        let (problems, _solved, env) = infer(subs, &no_snapshot);

        assert_eq!(problems, Vec::new());
        assert!(env.get_var(x_symbol).is_none());
    }

    // ALIASES

    #[test]
    fn alias_survives_solving_and_printing() {
        let mut module = TestModule::new();
        let username_alias = module.symbol("Username");
        let x_symbol = module.symbol("x");

        let subs = Subs::new();

        let username_type = Type::Alias(username_alias, vec![], Box::new(Type::string()));

        let constraint = let_constraint(
            vec![],
            vec![],
            vec![(x_symbol, username_type)],
            Constraint::True,
            Constraint::And(vec![
                // an alias unifies transparently with its expansion
                lookup(x_symbol, Type::string()),
                Constraint::SaveTheEnvironment,
            ]),
        );

        let (problems, mut solved, env) = infer(subs, &constraint);

        assert_eq!(problems, Vec::new());

        let var = env.get_var(x_symbol).expect("x is not in the env");
        assert_eq!(print_var(var, solved.inner_mut(), &module), "Username");
    }
}
