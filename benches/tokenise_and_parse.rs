use criterion::{Criterion, criterion_group, criterion_main};
use pdflex::source::Direction;
use pdflex::source::bytes::InMemoryByteSource;
use pdflex::{Lexer, LexerTokenSource, Parser, ParserConfig};

fn synthetic_object_stream(object_count: usize) -> Vec<u8> {
    let mut buffer = Vec::new();
    for n in 0..object_count {
        buffer.extend_from_slice(
            format!(
                "{n} 0 obj\n<< /Type /Page /Parent {parent} 0 R /Kids [{n} 1 R {n} 2 R] /Count 2 /MediaBox [0 0 612 792] >>\nendobj\n",
                n = n,
                parent = object_count + 1,
            )
            .as_bytes(),
        );
    }
    buffer
}

fn bench_tokenise(c: &mut Criterion) {
    let input = synthetic_object_stream(200);
    c.bench_function("tokenise_200_objects", |b| {
        b.iter(|| {
            let source = InMemoryByteSource::new(input.clone(), Direction::Forward, 0);
            let count = Lexer::new(source).filter(|r| r.is_ok()).count();
            std::hint::black_box(count);
        })
    });
}

fn bench_parse(c: &mut Criterion) {
    let input = synthetic_object_stream(200);
    c.bench_function("parse_200_objects", |b| {
        b.iter(|| {
            let source = InMemoryByteSource::new(input.clone(), Direction::Forward, 0);
            let tokens = LexerTokenSource::new(Lexer::new(source));
            let mut parser = Parser::new(tokens, ParserConfig::default());
            let mut parsed = 0;
            while parser.parse_object().is_ok() {
                parsed += 1;
            }
            std::hint::black_box(parsed);
        })
    });
}

criterion_group!(benches, bench_tokenise, bench_parse);
criterion_main!(benches);
