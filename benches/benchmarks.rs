use abscm::{Environment, Object, create_global_environment, eval, parse, write};
use criterion::{Criterion, black_box, criterion_group, criterion_main};

// ============================================================================
// Reading Benchmarks
// ============================================================================

fn bench_parse_small(c: &mut Criterion) {
    c.bench_function("parse small expr", |b| {
        b.iter(|| black_box(parse("(+ 1 2)").unwrap()))
    });
}

fn bench_parse_large_list(c: &mut Criterion) {
    let mut elements = vec!["(quote (".to_string()];
    for i in 0..1000 {
        elements.push(i.to_string());
    }
    elements.push("))".to_string());
    let expr = elements.join(" ");

    c.bench_function("parse large list (1000 elements)", |b| {
        b.iter(|| black_box(parse(&expr).unwrap()))
    });
}

fn bench_parse_deep_nesting(c: &mut Criterion) {
    let mut expr = String::from("1");
    for _ in 0..100 {
        expr = format!("(+ {expr} 1)");
    }

    c.bench_function("parse deep nesting (100 levels)", |b| {
        b.iter(|| black_box(parse(&expr).unwrap()))
    });
}

// ============================================================================
// Evaluation Benchmarks
// ============================================================================

fn define_all(env: &Environment, source: &[&str]) {
    for text in source {
        eval(&parse(text).unwrap(), env).unwrap();
    }
}

fn bench_eval_arithmetic(c: &mut Criterion) {
    let env = create_global_environment();
    let expr = parse("(+ 1 2 3 4 5 6 7 8 9 10 (* 11 12) (- 13 14) (/ 15 16))").unwrap();
    c.bench_function("eval arithmetic", |b| {
        b.iter(|| black_box(eval(&expr, &env).unwrap()))
    });
}

fn bench_eval_fib(c: &mut Criterion) {
    let env = create_global_environment();
    define_all(
        &env,
        &["(define fib (lambda (n) (if (< n 2) n (+ (fib (- n 1)) (fib (- n 2))))))"],
    );
    let expr = parse("(fib 15)").unwrap();
    c.bench_function("eval fib 15", |b| {
        b.iter(|| black_box(eval(&expr, &env).unwrap()))
    });
}

fn bench_eval_closure_creation(c: &mut Criterion) {
    let env = create_global_environment();
    define_all(&env, &["(define make-adder (lambda (n) (lambda (x) (+ x n))))"]);
    let expr = parse("((make-adder 5) 10)").unwrap();
    c.bench_function("eval closure creation and call", |b| {
        b.iter(|| black_box(eval(&expr, &env).unwrap()))
    });
}

fn bench_global_lookup_with_many_definitions(c: &mut Criterion) {
    let env = create_global_environment();
    for i in 0..1000 {
        eval(&parse(&format!("(define var{i} {i})")).unwrap(), &env).unwrap();
    }
    // The oldest user binding sits behind every later one.
    let expr = Object::symbol("var0");
    c.bench_function("lookup behind 1000 global definitions", |b| {
        b.iter(|| black_box(eval(&expr, &env).unwrap()))
    });
}

// ============================================================================
// Printing Benchmarks
// ============================================================================

fn bench_write_nested(c: &mut Criterion) {
    let obj = parse("(a (b (c (d (e 1 2 3) #t) #f) ()) 42)").unwrap();
    c.bench_function("write nested list", |b| b.iter(|| black_box(write(&obj))));
}

criterion_group!(
    benches,
    bench_parse_small,
    bench_parse_large_list,
    bench_parse_deep_nesting,
    bench_eval_arithmetic,
    bench_eval_fib,
    bench_eval_closure_creation,
    bench_global_lookup_with_many_definitions,
    bench_write_nested,
);
criterion_main!(benches);
