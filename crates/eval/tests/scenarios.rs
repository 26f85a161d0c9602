//! End-to-end scenarios: discovery, normalization, and evaluation
//! against small record sets.

use sift_core::{
    ErrorPolicy, FieldPath, FilterConfig, GenericOperation, GroupOp, LooseFilter, LooseRule,
    OperationError, OperationRegistry, OperationRole, RuleNode, SequentialIds, Signature,
    SortItem, SortRule, StandardOperation, StrictFilter, StrictRule, TypeDesc, Value,
};
use sift_eval::{
    builtins, compile_filter, count_valid_leaves, filter_data, instantiate, normalize,
    sort_data, EvalError, FilterMap, Resolver,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("sift_eval=debug")
        .try_init();
}

fn user_schema() -> TypeDesc {
    TypeDesc::record([
        ("id", TypeDesc::Text),
        ("name", TypeDesc::Text),
        ("age", TypeDesc::Int),
    ])
}

fn user(id: &str, name: &str, age: i64) -> Value {
    Value::record([
        ("id", Value::text(id)),
        ("name", Value::text(name)),
        ("age", Value::Int(age)),
    ])
}

fn users() -> Vec<Value> {
    vec![
        user("u1", "Alice", 19),
        user("u2", "Alice", 18),
        user("u3", "Bob", 19),
        user("u4", "Carol", 20),
    ]
}

fn record_ids(records: &[Value]) -> Vec<&str> {
    records
        .iter()
        .filter_map(|r| r.at_path(&FieldPath::fields(["id"])).as_str())
        .collect()
}

fn loose(ids: &mut SequentialIds, path: &[&str], op: &str, args: Vec<Value>) -> LooseRule {
    let mut rule = LooseRule::empty_filter(ids);
    if let RuleNode::Leaf(f) = &mut rule {
        f.set_path(FieldPath::fields(path.iter().copied()));
        f.set_operation(op);
        f.set_arguments(args);
    }
    rule
}

fn group(ids: &mut SequentialIds, op: GroupOp, conditions: Vec<LooseRule>) -> LooseRule {
    let mut rule = LooseRule::empty_group(ids, op);
    if let RuleNode::Group(g) = &mut rule {
        g.conditions = conditions;
    }
    rule
}

// ──────────────────────────────────────────────
// Discovery and a root-level filter
// ──────────────────────────────────────────────

fn admin_registry(schema: &TypeDesc) -> OperationRegistry {
    let mut registry = OperationRegistry::for_filters();
    registry
        .register(StandardOperation::new(
            "is admin",
            Signature::new(vec![schema.clone()], TypeDesc::Bool),
            |args| {
                let id = args[0].at_path(&FieldPath::fields(["id"]));
                Ok(Value::Bool(id.as_str() == Some("admin")))
            },
        ))
        .unwrap();
    registry
        .register(StandardOperation::new(
            "number equal",
            Signature::new(vec![TypeDesc::Int, TypeDesc::Int], TypeDesc::Bool),
            |args| Ok(Value::Bool(args[0] == args[1])),
        ))
        .unwrap();
    registry
}

#[test]
fn discovery_finds_root_and_age() {
    let schema = user_schema();
    let registry = admin_registry(&schema);
    let resolver = Resolver::new(&registry, &schema);

    let fields = resolver.discover(1);
    let paths: Vec<_> = fields.iter().map(|f| f.path.clone()).collect();
    assert_eq!(paths, vec![FieldPath::root(), FieldPath::fields(["age"])]);
    assert_eq!(fields[0].operation_names(), vec!["is admin"]);
    assert_eq!(fields[1].operation_names(), vec!["number equal"]);
}

#[test]
fn root_filter_selects_the_admin() {
    let schema = user_schema();
    let registry = admin_registry(&schema);
    let resolver = Resolver::new(&registry, &schema);
    let records = vec![user("admin", "Root", 40), user("other", "Eve", 22)];

    let mut ids = SequentialIds::new("r");
    let rule = normalize(&loose(&mut ids, &[], "is admin", vec![]), &resolver).unwrap();
    let out = filter_data(&records, Some(&rule), &resolver, &FilterConfig::default()).unwrap();
    assert_eq!(record_ids(&out), vec!["admin"]);
}

// ──────────────────────────────────────────────
// Groups
// ──────────────────────────────────────────────

#[test]
fn and_group_requires_every_condition() {
    init_tracing();
    let registry = builtins::filter_registry().unwrap();
    let schema = user_schema();
    let resolver = Resolver::new(&registry, &schema);
    let mut ids = SequentialIds::new("r");

    let name = loose(&mut ids, &["name"], "equals", vec![Value::text("Alice")]);
    let age = loose(&mut ids, &["age"], "equals", vec![Value::Int(19)]);
    let rule = group(&mut ids, GroupOp::And, vec![name, age]);

    let strict = normalize(&rule, &resolver).unwrap();
    let out = filter_data(&users(), Some(&strict), &resolver, &FilterConfig::default()).unwrap();
    assert_eq!(record_ids(&out), vec!["u1"]);
}

#[test]
fn or_group_accepts_any_condition() {
    let registry = builtins::filter_registry().unwrap();
    let schema = user_schema();
    let resolver = Resolver::new(&registry, &schema);
    let mut ids = SequentialIds::new("r");

    let name = loose(&mut ids, &["name"], "equals", vec![Value::text("Bob")]);
    let age = loose(&mut ids, &["age"], "equals", vec![Value::Int(18)]);
    let rule = group(&mut ids, GroupOp::Or, vec![name, age]);

    let strict = normalize(&rule, &resolver).unwrap();
    let out = filter_data(&users(), Some(&strict), &resolver, &FilterConfig::default()).unwrap();
    assert_eq!(record_ids(&out), vec!["u2", "u3"]);
}

#[test]
fn invalid_conditions_are_dropped_before_evaluation() {
    init_tracing();
    let registry = builtins::filter_registry().unwrap();
    let schema = user_schema();
    let resolver = Resolver::new(&registry, &schema);
    let mut ids = SequentialIds::new("r");

    let good = loose(&mut ids, &["name"], "equals", vec![Value::text("Carol")]);
    let stale = loose(&mut ids, &["height"], "equals", vec![Value::Int(180)]);
    let unfinished = LooseRule::empty_filter(&mut ids);
    let rule = group(&mut ids, GroupOp::And, vec![good, stale, unfinished]);

    assert_eq!(count_valid_leaves(&rule, &resolver), 1);
    let strict = normalize(&rule, &resolver).unwrap();
    let out = filter_data(&users(), Some(&strict), &resolver, &FilterConfig::default()).unwrap();
    assert_eq!(record_ids(&out), vec!["u4"]);
}

#[test]
fn no_rule_keeps_every_record() {
    let registry = builtins::filter_registry().unwrap();
    let schema = user_schema();
    let resolver = Resolver::new(&registry, &schema);
    let out = filter_data(&users(), None, &resolver, &FilterConfig::default()).unwrap();
    assert_eq!(out, users());
}

#[test]
fn failing_operation_follows_the_error_policy() {
    init_tracing();
    let mut registry = OperationRegistry::for_filters();
    registry
        .register(StandardOperation::new(
            "picky",
            Signature::new(vec![TypeDesc::Int], TypeDesc::Bool),
            |args| match args[0] {
                Value::Int(n) if *n >= 19 => Ok(Value::Bool(true)),
                Value::Int(_) => Err(OperationError::failed("too young to judge")),
                other => Err(OperationError::bad_argument("Int", other)),
            },
        ))
        .unwrap();
    let schema = user_schema();
    let resolver = Resolver::new(&registry, &schema);
    let rule: StrictRule =
        RuleNode::Leaf(StrictFilter::new("p", FieldPath::fields(["age"]), "picky", vec![]));

    let err = filter_data(&users(), Some(&rule), &resolver, &FilterConfig::default());
    assert!(matches!(err, Err(EvalError::Operation { .. })));

    let exclude = FilterConfig {
        on_error: ErrorPolicy::Fallback,
        fallback: false,
    };
    let out = filter_data(&users(), Some(&rule), &resolver, &exclude).unwrap();
    assert_eq!(record_ids(&out), vec!["u1", "u3", "u4"]);

    let include = FilterConfig {
        on_error: ErrorPolicy::Fallback,
        fallback: true,
    };
    let out = filter_data(&users(), Some(&rule), &resolver, &include).unwrap();
    assert_eq!(out.len(), 4);
}

// ──────────────────────────────────────────────
// Sorting
// ──────────────────────────────────────────────

fn sort_resolver_parts() -> (OperationRegistry, TypeDesc) {
    (
        builtins::sort_registry().unwrap(),
        TypeDesc::record([
            ("k", TypeDesc::Int),
            ("v", TypeDesc::Text),
            ("c", TypeDesc::Text),
            ("s", TypeDesc::Int),
        ]),
    )
}

#[test]
fn equal_keys_keep_input_order() {
    let (registry, schema) = sort_resolver_parts();
    let resolver = Resolver::new(&registry, &schema);
    let records = vec![
        Value::record([("k", Value::Int(1)), ("v", Value::text("a"))]),
        Value::record([("k", Value::Int(1)), ("v", Value::text("b"))]),
    ];
    let rule = SortRule::new(vec![SortItem::asc(FieldPath::fields(["k"]), "compare")]);
    let out = sort_data(&records, &rule, &resolver).unwrap();
    assert_eq!(out, records);
}

#[test]
fn multi_key_sort_breaks_ties_in_order() {
    let (registry, schema) = sort_resolver_parts();
    let resolver = Resolver::new(&registry, &schema);
    let rec = |c: &str, s: i64| Value::record([("c", Value::text(c)), ("s", Value::Int(s))]);
    let records = vec![rec("B", 10), rec("A", 20), rec("A", 10), rec("B", 20)];
    let snapshot = records.clone();

    let rule = SortRule::new(vec![
        SortItem::asc(FieldPath::fields(["c"]), "compare"),
        SortItem::desc(FieldPath::fields(["s"]), "compare"),
    ]);
    let out = sort_data(&records, &rule, &resolver).unwrap();
    assert_eq!(
        out,
        vec![rec("A", 20), rec("A", 10), rec("B", 20), rec("B", 10)]
    );
    assert_eq!(records, snapshot);
}

#[test]
fn empty_sort_rule_is_identity() {
    let (registry, schema) = sort_resolver_parts();
    let resolver = Resolver::new(&registry, &schema);
    let records = vec![Value::Int(3), Value::Int(1), Value::Int(2)];
    let out = sort_data(&records, &SortRule::default(), &resolver).unwrap();
    assert_eq!(out, records);
}

#[test]
fn stale_sort_key_is_a_hard_failure() {
    let (registry, schema) = sort_resolver_parts();
    let resolver = Resolver::new(&registry, &schema);
    let rule = SortRule::new(vec![SortItem::asc(FieldPath::fields(["missing"]), "compare")]);
    assert!(matches!(
        sort_data(&[Value::Int(1)], &rule, &resolver),
        Err(EvalError::Resolution(_))
    ));
}

// ──────────────────────────────────────────────
// Generics and editing
// ──────────────────────────────────────────────

#[test]
fn generic_with_rejecting_guard_never_applies() {
    let never = GenericOperation::new(
        "never",
        |_| false,
        |t| Signature::new(vec![t.clone(), t.clone()], TypeDesc::Bool),
        |_| Ok(Value::Bool(true)),
    );
    for t in [
        TypeDesc::Int,
        TypeDesc::Decimal,
        TypeDesc::Text,
        TypeDesc::Date,
        user_schema(),
    ] {
        assert!(instantiate(&never, &t, OperationRole::Filter).is_none());
    }

    let registry = OperationRegistry::with_operations(OperationRole::Filter, [never]).unwrap();
    let schema = user_schema();
    let resolver = Resolver::new(&registry, &schema);
    assert!(resolver.discover(3).is_empty());
}

#[test]
fn edits_through_the_filter_map_feed_normalization() {
    let registry = builtins::filter_registry().unwrap();
    let schema = user_schema();
    let resolver = Resolver::new(&registry, &schema);
    let mut ids = SequentialIds::new("r");

    let name = loose(&mut ids, &["name"], "equals", vec![Value::text("Alice")]);
    let name_id = name.id().clone();
    let rule = group(&mut ids, GroupOp::And, vec![name]);
    let root_id = rule.id().clone();

    let mut map = FilterMap::from_tree(&rule).unwrap();
    map.append_child(
        &root_id,
        loose(&mut ids, &["age"], "equals", vec![Value::Int(18)]),
    )
    .unwrap();
    map.toggle_op(&root_id).unwrap();
    map.update_filter(&name_id, |f: &mut LooseFilter| {
        f.set_arguments(vec![Value::text("Carol")])
    })
    .unwrap();

    let strict = normalize(&map.to_tree().unwrap(), &resolver).unwrap();
    let out = filter_data(&users(), Some(&strict), &resolver, &FilterConfig::default()).unwrap();
    assert_eq!(record_ids(&out), vec!["u2", "u4"]);
}

#[test]
fn strict_rules_survive_json_with_tagged_arguments() {
    let schema = TypeDesc::record([("born", TypeDesc::Date)]);
    let registry = builtins::filter_registry().unwrap();
    let resolver = Resolver::new(&registry, &schema);
    let cutoff = Value::Date(time::macros::date!(2000 - 01 - 01));
    let rule: StrictRule = RuleNode::Leaf(StrictFilter::new(
        "b",
        FieldPath::fields(["born"]),
        "less than",
        vec![cutoff],
    ));

    let json = serde_json::to_string(&rule).unwrap();
    assert!(json.contains("\"__type\":\"Date\""));
    let back: StrictRule = serde_json::from_str(&json).unwrap();
    assert_eq!(back, rule);

    let compiled = compile_filter(&back, &resolver).unwrap();
    let old = Value::record([("born", Value::Date(time::macros::date!(1990 - 05 - 17)))]);
    let young = Value::record([("born", Value::Date(time::macros::date!(2005 - 11 - 02)))]);
    assert_eq!(compiled.test(&old), Ok(true));
    assert_eq!(compiled.test(&young), Ok(false));
}
