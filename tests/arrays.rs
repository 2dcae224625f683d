use std::sync::Arc;

use chained::{new_ref, s_read, Chain, ChainError, Value};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
    color_backtrace::install();
}

#[test]
fn empty_array() {
    init();

    let chain = Chain::new(Vec::<Value>::new()).unwrap();
    assert!(chain.is_chained());
    assert_eq!(chain.get("empty?").unwrap(), Value::from(true));
}

#[test]
fn append_to_empty_array() {
    init();

    let chain = Chain::new(Vec::<Value>::new()).unwrap();
    assert_eq!(chain.get("empty?").unwrap(), Value::from(true));

    let appended = chain.call("<<", [17]).unwrap();
    assert!(appended.is_chained());
    assert_eq!(chain.index(0).unwrap(), Value::from(17));
    assert_eq!(chain.get("first").unwrap(), Value::from(17));
    assert_eq!(chain.get("size").unwrap(), Value::from(1));

    let chain = chain
        .call("+", [Value::from(vec!["a", "b", "c"])])
        .unwrap();
    assert!(chain.is_chained());
    assert_eq!(chain.get("size").unwrap(), Value::from(4));
}

#[test]
fn array_slice() {
    init();

    let data = Value::from(vec![1, 2, 3, 4, 5]);
    let chain = Chain::new(data).unwrap();

    let expected = Value::from(vec![2, 3, 4]);
    let slice = chain.call("[]", [1, 3]).unwrap();
    assert!(slice.is_chained());
    assert_eq!(slice.get("size").unwrap(), Value::from(3));
    assert_eq!(*s_read!(slice.unchained()), expected);
    assert_eq!(slice.inspect(), expected.inspect());
}

#[test]
fn empty_to_sparse() {
    init();

    let chain = Chain::new(Vec::<Value>::new()).unwrap();
    let result = chain.assign(9, 10).unwrap();
    assert!(chain.is_chained());
    assert!(!result.is_chained());

    let mut expected = vec![Value::Empty; 9];
    expected.push(Value::from(10));
    let expected = Value::from(expected);

    assert_eq!(chain.get("size").unwrap(), Value::from(10));
    assert_eq!(*s_read!(chain.unchained()), expected);
    assert_eq!(chain.inspect(), expected.inspect());
}

#[test]
fn index_too_big_for_sparse_assignment() {
    init();

    let chain = Chain::new(Vec::<Value>::new()).unwrap();
    assert!(matches!(
        chain.assign(i64::MAX, 1),
        Err(ChainError::IndexOutOfBounds { .. })
    ));
    assert_eq!(chain.get("size").unwrap(), Value::from(0));

    let last = chain.call("<<", [i64::MAX]).unwrap().get("first").unwrap();
    assert!(matches!(
        last.call("+", [1]),
        Err(ChainError::Overflow { .. })
    ));
}

#[test]
fn elements_are_shared_with_the_container() {
    init();

    let inner = new_ref!(Value, Value::from(vec![1]));
    let outer = new_ref!(Value, Value::Vector(vec![inner.clone()]));
    let chain = Chain::wrap(outer, true).unwrap();

    let first = chain.get("0").unwrap();
    assert!(first.is_chained());
    assert!(Arc::ptr_eq(&first.unchained(), &inner));

    first.call("push", [2]).unwrap();
    assert_eq!(*s_read!(inner), Value::from(vec![1, 2]));
}
