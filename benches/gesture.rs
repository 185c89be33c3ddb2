use criterion::{black_box, criterion_group, criterion_main, Criterion};
use trackball_scroll::scroll::{
    process, AuxButton, ConfigSnapshot, GestureState, Point, RawPointerEvent,
};

fn bench_scroll_moves(c: &mut Criterion) {
    let config = ConfigSnapshot::default();
    let events: Vec<RawPointerEvent> = (0..10_000)
        .map(|i| RawPointerEvent::moved(i, (i * 3) % 17))
        .collect();
    let start = GestureState::Scrolling {
        trigger: AuxButton::X1,
        origin: Point::new(0, 0),
        origin_display: Point::new(0, 0),
        x_accum: 0,
        y_accum: 0,
    };

    c.bench_function("process_10k_moves", |b| {
        b.iter(|| {
            let mut state = start;
            let mut ticks = 0usize;
            for event in &events {
                let t = process(state, black_box(event), &config, || Point::new(0, 0));
                ticks += t.emit.map(|e| e.len()).unwrap_or(0);
                state = t.next;
            }
            black_box(ticks)
        })
    });
}

criterion_group!(benches, bench_scroll_moves);
criterion_main!(benches);
