use criterion::{Criterion, black_box, criterion_group, criterion_main};
use kestrel_core::bytecode::BytecodeCompiler;
use kestrel_core::lexer::Lexer;
use kestrel_core::parser::Parser;
use kestrel_core::pipeline::Pipeline;
use kestrel_core::trace::{MemorySink, Tracer};
use kestrel_core::vm::Interpreter;
use std::io;

const LOOP: &str = r#"
    total = 0
    i = 0
    while i < 1000 {
        if i % 3 == 0 or i % 5 == 0 {
            total += i
        }
        i += 1
    }
    print(total)
"#;

fn bench_lex(c: &mut Criterion) {
    c.bench_function("lex loop program", |b| {
        b.iter(|| Lexer.tokenize(black_box(LOOP)))
    });
}

fn bench_parse(c: &mut Criterion) {
    let tokens = Lexer.tokenize(LOOP);
    c.bench_function("parse loop program", |b| {
        b.iter(|| Parser.parse(black_box(&tokens)))
    });
}

fn bench_compile(c: &mut Criterion) {
    let program = Parser.parse(&Lexer.tokenize(LOOP)).unwrap();
    c.bench_function("compile loop program", |b| {
        b.iter(|| BytecodeCompiler.compile(black_box(&program)))
    });
}

fn bench_interpret(c: &mut Criterion) {
    let program = Parser.parse(&Lexer.tokenize(LOOP)).unwrap();
    let code = BytecodeCompiler.compile(&program).unwrap();
    let mut interpreter = Interpreter::with_output(io::sink());

    c.bench_function("interpret loop program", |b| {
        b.iter(|| black_box(interpreter.interpret(&code)))
    });
}

fn bench_pipeline(c: &mut Criterion) {
    let mut pipeline = Pipeline::with_output(io::sink());
    c.bench_function("pipeline quiet", |b| {
        b.iter(|| black_box(pipeline.execute(LOOP, &mut Tracer::disabled())))
    });

    c.bench_function("pipeline traced to memory", |b| {
        b.iter(|| {
            let mut sink = MemorySink::new();
            let mut tracer = Tracer::new(true, &mut sink);
            let result = pipeline.execute(LOOP, &mut tracer);
            black_box((result, sink))
        })
    });
}

criterion_group!(
    benches,
    bench_lex,
    bench_parse,
    bench_compile,
    bench_interpret,
    bench_pipeline
);
criterion_main!(benches);
