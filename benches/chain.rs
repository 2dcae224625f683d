use criterion::{black_box, criterion_group, criterion_main, Criterion};

use chained::{path, sym, Chain, Link, Table, Value};

fn datum() -> Value {
    Table::new()
        .with(
            sym("a"),
            Table::new().with(
                "H3",
                vec![
                    Value::from(vec!["deep", "array"]),
                    Value::from(Table::new().with(sym("deeper"), sym("hash"))),
                ],
            ),
        )
        .into_value()
}

fn member_chain(c: &mut Criterion) {
    let chain = Chain::new(datum()).unwrap();

    c.bench_function("a.H3.1.deeper", |b| {
        b.iter(|| {
            chain
                .get(black_box("a"))
                .and_then(|a| a.get("H3"))
                .and_then(|h3| h3.get("1"))
                .and_then(|h| h.get("deeper"))
                .unwrap()
        })
    });
}

fn path_chain(c: &mut Criterion) {
    let link = Link::from(Chain::new(datum()).unwrap());

    c.bench_function("path a.H3[1].deeper", |b| {
        b.iter(|| path::evaluate(&link, black_box("a.H3[1].deeper")).unwrap())
    });
}

fn wrap(c: &mut Criterion) {
    c.bench_function("wrap table", |b| b.iter(|| Chain::new(datum()).unwrap()));
}

criterion_group!(benches, member_chain, path_chain, wrap);
criterion_main!(benches);
