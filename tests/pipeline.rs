//! End-to-end runs over a temporary project: config → CSV folder → images → rotation.
//!
//! Uses a block-drawing face so nothing depends on installed fonts.

use image::{GenericImageView, Rgb, RgbImage};
use quote_paper::canvas::CanvasSpec;
use quote_paper::config::{self, CONFIG_FILE};
use quote_paper::fonts::{Face, FontCatalog};
use quote_paper::generate::QuoteGenerator;
use quote_paper::record::Quote;
use quote_paper::rotate;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

struct BlockFace;

impl Face for BlockFace {
    fn name(&self) -> &str {
        "block"
    }

    fn text_width(&self, text: &str, size: f32) -> f32 {
        text.chars().count() as f32 * size * 0.6
    }

    fn line_height(&self, size: f32) -> f32 {
        size
    }

    fn draw(&self, canvas: &mut RgbImage, text: &str, size: f32, origin: (i32, i32), color: Rgb<u8>) {
        let advance = size * 0.6;
        for (i, c) in text.chars().enumerate() {
            if c.is_whitespace() {
                continue;
            }
            let x0 = origin.0 + (i as f32 * advance) as i32;
            let x1 = origin.0 + ((i as f32 + 0.8) * advance) as i32;
            for y in origin.1.max(0)..(origin.1 + size as i32).min(canvas.height() as i32) {
                for x in x0.max(0)..x1.min(canvas.width() as i32) {
                    canvas.put_pixel(x as u32, y as u32, color);
                }
            }
        }
    }
}

fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(CONFIG_FILE),
        "[canvas]\nwidth = 400\nheight = 300\n",
    )
    .unwrap();
    fs::create_dir_all(tmp.path().join("data")).unwrap();
    fs::write(
        tmp.path().join("data/stoics.csv"),
        "quote,speaker\n\
         \"The obstacle is the way.\", Marcus Aurelius\n\
         \"\", Nobody\n\
         \"Waste no more time arguing what a good man should be. Be one.\", Marcus Aurelius\n",
    )
    .unwrap();
    tmp
}

fn generator(root: &Path, seed: u64) -> (QuoteGenerator<StdRng>, config::QuoteConfig) {
    let config = config::load_config(root).unwrap();
    let canvas = CanvasSpec::from_config(&config.canvas).unwrap();
    let fonts = FontCatalog::from_faces(vec![Arc::new(BlockFace) as Arc<dyn Face>], None).unwrap();
    let generator = QuoteGenerator::new(
        canvas,
        config.fit.clone(),
        fonts,
        StdRng::seed_from_u64(seed),
    );
    (generator, config)
}

#[test]
fn folder_run_writes_one_image_per_valid_row() {
    let tmp = project();
    let (mut generator, config) = generator(tmp.path(), 1);
    let output = tmp.path().join(&config.paths.output_dir);

    let summary = generator
        .generate_from_folder(
            &tmp.path().join(&config.paths.data_dir),
            &output,
            config.csv.has_header,
        )
        .unwrap();

    assert_eq!(summary.generated(), 2);
    assert_eq!(summary.skipped(), 1);
    for name in ["stoics_quote_001.png", "stoics_quote_002.png"] {
        let img = image::open(output.join(name)).unwrap();
        assert_eq!(img.dimensions(), (400, 300));
    }
    assert!(!output.join("stoics_quote_003.png").exists());
}

#[test]
fn rotation_turns_generated_images_upside_down() {
    let tmp = project();
    let (mut generator, config) = generator(tmp.path(), 2);
    let output = tmp.path().join(&config.paths.output_dir);
    generator
        .generate_from_folder(&tmp.path().join("data"), &output, true)
        .unwrap();

    let path = output.join("stoics_quote_001.png");
    let before = image::open(&path).unwrap().to_rgb8();
    let report = rotate::rotate_all(&output).unwrap();
    let after = image::open(&path).unwrap().to_rgb8();

    assert_eq!(report.rotated(), 2);
    assert_eq!(report.failed(), 0);
    let (w, h) = before.dimensions();
    for (x, y, pixel) in before.enumerate_pixels() {
        assert_eq!(after.get_pixel(w - 1 - x, h - 1 - y), pixel);
    }
}

#[test]
fn adhoc_quotes_never_overwrite() {
    let tmp = project();
    let (mut generator, config) = generator(tmp.path(), 3);
    let output = tmp.path().join(&config.paths.output_dir);
    let quote = Quote::new("Carpe diem", Some("")).unwrap();

    let first = generator.generate_adhoc(&quote, &output).unwrap();
    let second = generator.generate_adhoc(&quote, &output).unwrap();

    assert_eq!(first.path, output.join("adhoc_Carpe_diem.png"));
    assert_eq!(second.path, output.join("adhoc_Carpe_diem_2.png"));
    assert!(first.layout.speaker_line.is_none());
}

#[test]
fn invalid_config_is_rejected() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(CONFIG_FILE),
        "[fit]\nmin_size = 200\nmax_size = 100\n",
    )
    .unwrap();
    assert!(config::load_config(tmp.path()).is_err());
}
