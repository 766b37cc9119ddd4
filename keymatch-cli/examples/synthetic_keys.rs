use keymatch_cli::{DebugImageWriter, KeyMatcher, ReferenceDatabase};
use keymatch_core::IntensityGrid;
use keymatch_silhouette::SilhouetteBuilder;
use std::time::Instant;

/// Dark key on a light background with a row of teeth cut into the blade
fn synthetic_key(head_w: usize, head_h: usize, blade_w: usize, blade_h: usize, tooth: usize) -> IntensityGrid {
    let mut grid = IntensityGrid::filled(200, 400, 225).expect("demo image dimensions are valid");
    for y in 30..30 + head_h {
        for x in 60..60 + head_w {
            grid.set(x, y, 30);
        }
    }
    for y in 30 + head_h..30 + head_h + blade_h {
        for x in 60..60 + blade_w {
            grid.set(x, y, 30);
        }
        if (y / tooth) % 2 == 0 {
            for x in 60..70 {
                grid.set(x, y, 225);
            }
        }
    }
    grid
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    println!("Key matching demo");
    println!("=================\n");

    let keys = vec![
        synthetic_key(70, 90, 35, 200, 12),
        synthetic_key(90, 70, 30, 220, 16),
        synthetic_key(60, 110, 40, 180, 10),
        synthetic_key(80, 80, 32, 210, 20),
    ];

    for (name, builder) in [
        ("reference", SilhouetteBuilder::new().preset_reference()),
        ("row clipped", SilhouetteBuilder::new().preset_row_clipped()),
    ] {
        println!("Configuration: {}", name);
        println!("  {}", builder.summary());
        let matcher = KeyMatcher::from_builder(builder)?;

        let t0 = Instant::now();
        let mut database = ReferenceDatabase::new();
        for key in &keys {
            database.push(matcher.describe(key)?);
        }
        println!("  described {} keys in {:.2?}", database.len(), t0.elapsed());

        for (expected, key) in keys.iter().enumerate() {
            let outcome = matcher.match_grid(key, database.descriptors())?;
            println!(
                "  key {} -> best {} (cost {:.3}), costs {:?}",
                expected,
                outcome.best_index,
                outcome.best_cost(),
                outcome.costs.iter().map(|c| format!("{:.1}", c)).collect::<Vec<_>>()
            );
        }
        println!();
    }

    let out_dir = std::env::temp_dir().join("keymatch_demo");
    let matcher = KeyMatcher::from_builder(SilhouetteBuilder::new())?;
    let mut writer = DebugImageWriter::new(&out_dir)?;
    let description = matcher.describe_with_observer(&keys[0], &mut writer)?;
    if let Some(geometry) = description.silhouette.geometry {
        println!("Key 0 blade begins at {}, center {}", geometry.blade_beginning, geometry.center);
    }
    println!("Stage images written to {}", out_dir.display());

    let db_path = out_dir.join("keys.csv");
    let mut database = ReferenceDatabase::new();
    database.push(description.descriptor);
    database.save(&db_path)?;
    println!("Descriptor database written to {}", db_path.display());

    Ok(())
}
