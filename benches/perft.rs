use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use minimax_chess::{Board, MoveGenerator, Search};

struct BenchCase {
    name: &'static str,
    fen: &'static str,
    depth: u32,
    expected_nodes: u64,
}

const CASES: &[BenchCase] = &[
    BenchCase {
        name: "startpos",
        fen: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        depth: 3,
        expected_nodes: 8902,
    },
    BenchCase {
        name: "kiwipete",
        fen: "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        depth: 2,
        expected_nodes: 2039,
    },
    BenchCase {
        name: "rook_endgame",
        fen: "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        depth: 3,
        expected_nodes: 2812,
    },
];

fn bench_perft(c: &mut Criterion) {
    let generator = MoveGenerator::new();
    let mut group = c.benchmark_group("perft");

    for case in CASES {
        let mut board = Board::from_fen(case.fen).expect("benchmark FEN parses");
        assert_eq!(generator.perft(&mut board, case.depth), case.expected_nodes);

        group.bench_with_input(BenchmarkId::new(case.name, case.depth), &case.depth, |b, &depth| {
            b.iter(|| generator.perft(black_box(&mut board), depth))
        });
    }

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    group.sample_size(10);

    for depth in [2, 3] {
        group.bench_with_input(BenchmarkId::new("startpos", depth), &depth, |b, &depth| {
            let mut board = Board::new();
            let mut search = Search::new();
            b.iter(|| search.search(black_box(&mut board), depth).expect("search succeeds"))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_perft, bench_search);
criterion_main!(benches);
