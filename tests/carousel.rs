//! End-to-end carousel behavior against a file standing in for the display.

use dialframe::source::encode_event;
use dialframe::{
    CarouselController, CatalogOrder, Config, DEFAULT_SETTLE, Decision, Error, EventFilter,
    FrameGeometry, FramebufferWriter, ImageCatalog, ImageErrorPolicy, RawEventReader, RawSample,
    Result, SampleSource,
};
use std::collections::VecDeque;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const FRAME: usize = 4 * 2 * 3;

/// Hands out pre-scripted batches, then fails like an unplugged device.
struct Script(VecDeque<Vec<RawSample>>);

impl Script {
    fn new(batches: &[&[i32]]) -> Self {
        Self(
            batches
                .iter()
                .map(|b| b.iter().map(|&v| RawSample::new(v)).collect())
                .collect(),
        )
    }
}

impl SampleSource for Script {
    fn read_batch(&mut self, batch: &mut Vec<RawSample>) -> Result<()> {
        let next = self
            .0
            .pop_front()
            .ok_or_else(|| Error::InputRead("device went away".into()))?;
        batch.extend(next);
        Ok(())
    }
}

struct Rig {
    _tmp: tempfile::TempDir,
    images: PathBuf,
    fb: PathBuf,
}

impl Rig {
    /// `a.bmp`, `b.bmp`, `c.bmp` filled with 0xA0, 0xB0, 0xC0.
    fn new() -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let images = tmp.path().join("images");
        fs::create_dir(&images).unwrap();
        for (name, byte) in [("a.bmp", 0xA0u8), ("b.bmp", 0xB0), ("c.bmp", 0xC0)] {
            fs::write(images.join(name), [byte; FRAME]).unwrap();
        }
        let fb = tmp.path().join("fb0");
        fs::write(&fb, [0u8; FRAME]).unwrap();
        Self {
            _tmp: tmp,
            images,
            fb,
        }
    }

    fn controller<S: SampleSource>(&self, source: S) -> CarouselController<S> {
        let catalog = ImageCatalog::build(&self.images, CatalogOrder::Sorted).unwrap();
        CarouselController::new(catalog, source, EventFilter::default(), self.writer())
            .with_settle(Duration::ZERO)
    }

    fn writer(&self) -> FramebufferWriter {
        FramebufferWriter::with_device(&self.fb, FrameGeometry::new(4, 2, 24).unwrap()).unwrap()
    }

    fn displayed(&self) -> Vec<u8> {
        fs::read(&self.fb).unwrap()
    }
}

fn name(controller: &CarouselController<impl SampleSource>) -> String {
    controller
        .current_name()
        .unwrap()
        .to_string_lossy()
        .into_owned()
}

#[test]
fn test_advance_blits_then_moves_and_wraps() {
    let rig = Rig::new();
    let mut carousel = rig.controller(Script::new(&[&[-80, -80], &[-80, -80], &[-80, -80]]));
    assert_eq!(name(&carousel), "a.bmp");

    for (shown_name, byte, next) in [
        ("a.bmp", 0xA0u8, "b.bmp"),
        ("b.bmp", 0xB0, "c.bmp"),
        ("c.bmp", 0xC0, "a.bmp"),
    ] {
        let shown = carousel.step().unwrap();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].decision, Decision::Advance);
        assert_eq!(shown[0].name, shown_name);
        assert!(shown[0].displayed);
        assert_eq!(rig.displayed(), [byte; FRAME]);
        assert_eq!(name(&carousel), next);
    }
}

#[test]
fn test_retreat_wraps_to_last() {
    let rig = Rig::new();
    let mut carousel = rig.controller(Script::new(&[&[80, 80], &[80]]));

    let shown = carousel.step().unwrap();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].decision, Decision::Retreat);
    assert_eq!(shown[0].name, "a.bmp");
    assert_eq!(carousel.cursor().index(), 2);

    let shown = carousel.step().unwrap();
    assert_eq!(shown[0].name, "c.bmp");
    assert_eq!(rig.displayed(), [0xC0u8; FRAME]);
    assert_eq!(carousel.cursor().index(), 1);
}

#[test]
fn test_noise_inside_a_detent_gives_one_decision() {
    let rig = Rig::new();
    let mut carousel = rig.controller(Script::new(&[&[-80, 30, -80]]));

    let shown = carousel.step().unwrap();
    assert_eq!(shown.len(), 1);
    assert_eq!(carousel.cursor().index(), 1);
}

#[test]
fn test_noise_only_batch_does_nothing() {
    let rig = Rig::new();
    let mut carousel = rig.controller(Script::new(&[&[0, 12, -50, 50]]));

    assert!(carousel.step().unwrap().is_empty());
    assert_eq!(carousel.cursor().index(), 0);
    assert_eq!(rig.displayed(), [0u8; FRAME]);
}

#[test]
fn test_short_image_is_fatal_and_not_written() {
    let rig = Rig::new();
    fs::write(rig.images.join("a.bmp"), [0xA0u8; FRAME - 1]).unwrap();
    let mut carousel = rig.controller(Script::new(&[&[-80]]));

    assert!(matches!(carousel.step(), Err(Error::ImageRead { .. })));
    assert_eq!(rig.displayed(), [0u8; FRAME]);
    assert_eq!(carousel.cursor().index(), 0);
}

#[test]
fn test_skip_policy_steps_over_bad_image() {
    let rig = Rig::new();
    fs::remove_file(rig.images.join("b.bmp")).unwrap();
    let catalog =
        ImageCatalog::from_names(&rig.images, ["a.bmp", "b.bmp", "c.bmp"], CatalogOrder::Sorted)
            .unwrap();
    let mut carousel = CarouselController::new(
        catalog,
        Script::new(&[&[-80, -80, -80, -80, -80, -80]]),
        EventFilter::default(),
        rig.writer(),
    )
    .with_settle(Duration::ZERO)
    .with_image_error_policy(ImageErrorPolicy::Skip);

    let shown = carousel.step().unwrap();
    let outcome: Vec<_> = shown
        .iter()
        .map(|s| (s.name.to_string_lossy().into_owned(), s.displayed))
        .collect();
    assert_eq!(
        outcome,
        [
            ("a.bmp".to_string(), true),
            ("b.bmp".to_string(), false),
            ("c.bmp".to_string(), true),
        ]
    );
    assert_eq!(rig.displayed(), [0xC0u8; FRAME]);
    assert_eq!(carousel.cursor().index(), 0);
}

#[test]
fn test_abort_policy_stops_on_missing_image() {
    let rig = Rig::new();
    let catalog =
        ImageCatalog::from_names(&rig.images, ["gone.bmp"], CatalogOrder::Sorted).unwrap();
    let mut carousel = CarouselController::new(
        catalog,
        Script::new(&[&[-80]]),
        EventFilter::default(),
        rig.writer(),
    )
    .with_settle(Duration::ZERO);

    assert!(matches!(carousel.step(), Err(Error::ImageOpen { .. })));
}

#[test]
fn test_run_stops_on_input_failure() {
    let rig = Rig::new();
    let carousel = rig.controller(Script::new(&[&[-80, -80]]));

    match carousel.run() {
        Ok(never) => match never {},
        Err(err) => assert!(matches!(err, Error::InputRead(_))),
    }
    assert_eq!(rig.displayed(), [0xA0u8; FRAME]);
}

#[test]
fn test_missing_display_is_fatal() {
    let rig = Rig::new();
    fs::remove_file(&rig.fb).unwrap();
    let mut carousel = rig.controller(Script::new(&[&[-80]]));

    assert!(matches!(carousel.step(), Err(Error::DeviceOpen { .. })));
}

#[test]
fn test_raw_records_drive_the_carousel() {
    let rig = Rig::new();
    let bytes: Vec<u8> = [
        RawSample::with_kind(2, 7, -80),
        RawSample::with_kind(0, 0, 0),
        RawSample::with_kind(2, 7, -80),
        RawSample::with_kind(0, 0, 0),
    ]
    .iter()
    .flat_map(encode_event)
    .collect();
    let mut carousel = rig.controller(RawEventReader::new(Cursor::new(bytes)));

    let shown = carousel.step().unwrap();
    assert_eq!(shown.len(), 1);
    assert_eq!(rig.displayed(), [0xA0u8; FRAME]);
    assert!(matches!(carousel.step(), Err(Error::InputRead(_))));
}

#[test]
fn test_from_config_applies_policy_and_filter() {
    let rig = Rig::new();
    let config = Config::new()
        .with_settle(Duration::ZERO)
        .with_threshold(100)
        .with_image_error_policy(ImageErrorPolicy::Skip);
    let catalog = ImageCatalog::build(&rig.images, config.order).unwrap();
    let mut carousel = CarouselController::from_config(
        catalog,
        Script::new(&[&[-80], &[-120]]),
        rig.writer(),
        &config,
    );

    assert!(carousel.step().unwrap().is_empty());
    assert_eq!(carousel.step().unwrap().len(), 1);
    assert_eq!(carousel.catalog().dir(), Path::new(&rig.images));
}

#[test]
fn test_default_controller_settles() {
    let rig = Rig::new();
    let catalog = ImageCatalog::build(&rig.images, CatalogOrder::Sorted).unwrap();
    let carousel = CarouselController::new(
        catalog,
        Script::new(&[]),
        EventFilter::default(),
        rig.writer(),
    );
    let config = Config::new();
    let catalog = ImageCatalog::build(&rig.images, config.order).unwrap();
    let configured =
        CarouselController::from_config(catalog, Script::new(&[]), rig.writer(), &config);

    assert_eq!(carousel.settle(), DEFAULT_SETTLE);
    assert_eq!(configured.settle(), config.settle);
}

#[test]
fn test_settle_holds_displayed_image() {
    let rig = Rig::new();
    let settle = Duration::from_millis(150);
    let mut carousel = rig.controller(Script::new(&[&[-80]])).with_settle(settle);

    let started = Instant::now();
    let shown = carousel.step().unwrap();
    assert!(shown[0].displayed);
    assert!(started.elapsed() >= settle);
}

#[test]
fn test_skipped_image_is_not_held() {
    let rig = Rig::new();
    let catalog =
        ImageCatalog::from_names(&rig.images, ["gone.bmp"], CatalogOrder::Sorted).unwrap();
    let settle = Duration::from_secs(5);
    let mut carousel = CarouselController::new(
        catalog,
        Script::new(&[&[-80]]),
        EventFilter::default(),
        rig.writer(),
    )
    .with_settle(settle)
    .with_image_error_policy(ImageErrorPolicy::Skip);

    let started = Instant::now();
    let shown = carousel.step().unwrap();
    assert!(!shown[0].displayed);
    assert!(started.elapsed() < settle);
}
