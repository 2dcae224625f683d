use chained::{sym, Chain, Link, Table, Value};

/// Strings, symbols, vectors and tables, with a string key and a symbol key
/// that are spelled the same.
fn datum() -> Value {
    Table::new()
        .with("A", "a string")
        .with("B", sym("a_symbol"))
        .with("a", vec!["an", "array"])
        .with(
            sym("a"),
            Table::new()
                .with("h1", "hv1")
                .with(sym("h2"), vec!["h", "v", "2"])
                .with(
                    "H3",
                    vec![
                        Value::from(vec!["deep", "array"]),
                        Value::from(Table::new().with(sym("deeper"), sym("hash"))),
                    ],
                ),
        )
        .into_value()
}

/// Plain lookups on the raw data, for comparison.
fn raw(path: &[Value]) -> Value {
    let mut value = datum();
    for key in path {
        let next = match &value {
            Value::Table(table) => chained::Key::try_from(key)
                .ok()
                .and_then(|k| table.get(&k).map(|v| v.read().clone())),
            Value::Vector(vec) => match key {
                Value::Integer(i) => vec.get(*i as usize).map(|v| v.read().clone()),
                _ => None,
            },
            _ => None,
        };
        value = next.unwrap_or(Value::Empty);
    }
    value
}

fn k(key: &str) -> Value {
    Value::from(key)
}

fn s(key: &str) -> Value {
    Value::from(sym(key))
}

fn i(index: i64) -> Value {
    Value::from(index)
}

fn init() -> Chain {
    let _ = env_logger::builder().is_test(true).try_init();
    color_backtrace::install();

    Chain::new(datum()).unwrap()
}

#[test]
fn top_level() {
    let chain = init();
    assert!(chain.is_chained());

    assert_eq!(chain.get("A").unwrap(), raw(&[k("A")]));
    assert_eq!(chain.index("A").unwrap(), raw(&[k("A")]));
    assert_eq!(chain.get("B").unwrap(), raw(&[k("B")]));
    assert_eq!(chain.index("B").unwrap(), raw(&[k("B")]));

    // The symbol key wins over the string key of the same name.
    assert_eq!(chain.get("a").unwrap(), raw(&[s("a")]));
    assert_eq!(chain.index(sym("a")).unwrap(), raw(&[s("a")]));
    assert_eq!(chain.index("a").unwrap(), raw(&[k("a")]));
}

#[test]
fn string_keyed_array() {
    let chain = init();
    let array = chain.index("a").unwrap();
    assert!(array.is_chained());

    assert_eq!(array.get("first").unwrap(), raw(&[k("a"), i(0)]));
    assert_eq!(array.index(0).unwrap(), raw(&[k("a"), i(0)]));
    assert_eq!(array.index(1).unwrap(), raw(&[k("a"), i(1)]));
    assert_eq!(array.get("last").unwrap(), raw(&[k("a"), i(1)]));
}

#[test]
fn nested_table() {
    let chain = init();
    let a = chain.get("a").unwrap();

    assert_eq!(a.index("h1").unwrap(), raw(&[s("a"), k("h1")]));
    let h1 = a.get("h1").unwrap();
    assert!(!h1.is_chained());
    assert_eq!(h1, raw(&[s("a"), k("h1")]));

    for h2 in [a.index(sym("h2")).unwrap(), a.get("h2").unwrap()] {
        assert!(h2.is_chained());
        assert_eq!(h2, raw(&[s("a"), s("h2")]));
        for n in 0..3 {
            assert_eq!(h2.index(n).unwrap(), raw(&[s("a"), s("h2"), i(n)]));
        }
    }
}

#[test]
fn deep_mixture() {
    let chain = init();
    let a = chain.get("a").unwrap();

    let h3s: [Link; 2] = [a.index("H3").unwrap(), a.get("H3").unwrap()];
    for h3 in h3s {
        let base = [s("a"), k("H3")];
        assert_eq!(h3, raw(&base));

        let first = h3.index(0).unwrap();
        assert_eq!(first, raw(&[s("a"), k("H3"), i(0)]));
        for n in 0..3 {
            assert_eq!(
                first.index(n).unwrap(),
                raw(&[s("a"), k("H3"), i(0), i(n)])
            );
        }

        let second = h3.index(1).unwrap();
        assert_eq!(second, raw(&[s("a"), k("H3"), i(1)]));
        assert_eq!(second.get("keys").unwrap(), Value::from(vec![sym("deeper")]));

        let deeper = raw(&[s("a"), k("H3"), i(1), s("deeper")]);
        assert_eq!(second.index(sym("deeper")).unwrap(), deeper);
        assert_eq!(second.get("deeper").unwrap(), deeper);
        assert_eq!(deeper, Value::from(sym("hash")));
    }
}

#[test]
fn chains_compare_like_their_contents() {
    let chain = init();
    let a = chain.get("a").unwrap();

    let Some(a) = a.chain() else {
        panic!("expected a chain");
    };
    assert!(*a == raw(&[s("a")]));
    assert!(*a != raw(&[k("a")]));
}
