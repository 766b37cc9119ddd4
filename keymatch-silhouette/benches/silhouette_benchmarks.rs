use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use keymatch_core::IntensityGrid;
use keymatch_silhouette::{
    Binarizer, EdgeExtractor, SilhouetteBuilder, SilhouetteCleaner, SilhouetteConfig,
};

/// Dark key-like shape on a light, slightly noisy background
fn create_key_image(width: usize, height: usize) -> IntensityGrid {
    let mut grid = IntensityGrid::filled(width, height, 225).unwrap();
    for y in 0..height {
        for x in 0..width {
            let noise = ((x * 7 + y * 13) % 11) as u8;
            grid.set(x, y, 220 + noise);
        }
    }

    let head_x = width / 3..2 * width / 3;
    let blade_x = width / 3..width / 2;
    for y in height / 10..height / 3 {
        for x in head_x.clone() {
            grid.set(x, y, 25);
        }
    }
    for y in height / 3..9 * height / 10 {
        for x in blade_x.clone() {
            grid.set(x, y, 25);
        }
        // Teeth cut into the left side of the blade
        if (y / 8) % 2 == 0 {
            for x in blade_x.start..blade_x.start + width / 20 {
                grid.set(x, y, 225);
            }
        }
    }
    grid
}

/// Benchmark the full silhouette pipeline
fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract");
    let extractor = SilhouetteBuilder::new().threads(1).build().unwrap();

    for &(width, height) in &[(160, 480), (320, 960), (640, 1920)] {
        let img = create_key_image(width, height);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", width, height)),
            &img,
            |b, img| b.iter(|| black_box(extractor.extract(black_box(img)).unwrap())),
        );
    }

    group.finish();
}

/// Benchmark individual stages
fn bench_stages(c: &mut Criterion) {
    let img = create_key_image(320, 960);
    let config = SilhouetteConfig::default();
    let cleaner = SilhouetteCleaner::new(&config);
    let (binary, _) = Binarizer::binarize(&img, config.bin_width).unwrap();
    let mut cleaned = binary.clone();
    cleaner.clean(&mut cleaned);

    let mut group = c.benchmark_group("stages");

    group.bench_function("binarize", |b| {
        b.iter(|| black_box(Binarizer::binarize(black_box(&img), 5).unwrap()))
    });

    group.bench_function("clean", |b| {
        b.iter(|| {
            let mut grid = binary.clone();
            cleaner.clean(&mut grid);
            black_box(grid)
        })
    });

    group.bench_function("find_edges", |b| {
        b.iter(|| black_box(EdgeExtractor::find_edges(black_box(&cleaned))))
    });

    group.finish();
}

criterion_group!(benches, bench_extract, bench_stages);
criterion_main!(benches);
