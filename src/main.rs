//! `dialframe` appliance binary.
//!
//! Run with: dialframe /path/to/frames
//!
//! Needs read access to the dial's input device and write access to
//! `/dev/fb0` and `/dev/tty0`. Press Ctrl+C to exit.

use clap::{Parser, ValueEnum};
use dialframe::{
    CONSOLE_DEVICE, CarouselController, CatalogOrder, Config, ConsoleMode, DEFAULT_THRESHOLD,
    DirectionMap, Error, FB_SYSFS_DIR, FrameGeometry, FramebufferWriter, INPUT_DEVICE,
    ImageCatalog, ImageErrorPolicy, InputDevice, Result, SampleSource, is_root, probe_geometry,
    set_console_mode,
};
use log::LevelFilter;
use std::convert::Infallible;
use std::io;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OrderArg {
    /// Lexicographic by file name
    Sorted,
    /// Directory listing order
    Filesystem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BadImageArg {
    /// Stop on a missing or wrongly sized image
    Abort,
    /// Log it and move on
    Skip,
}

/// Show raw framebuffer images selected with a rotary dial.
#[derive(Debug, Parser)]
#[command(name = "dialframe", version, about)]
struct Args {
    /// Directory holding one raw frame per file
    image_dir: Option<PathBuf>,

    /// Order in which images are cycled
    #[arg(long, value_enum, default_value_t = OrderArg::Sorted)]
    order: OrderArg,

    /// What to do when the selected image cannot be shown
    #[arg(long, value_enum, default_value_t = BadImageArg::Abort)]
    on_bad_image: BadImageArg,

    /// Swap the clockwise / anti-clockwise directions
    #[arg(long)]
    invert: bool,

    /// Magnitude a dial sample must exceed to count
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: i32,

    /// Pause after each image, in milliseconds
    #[arg(long, default_value_t = 1000)]
    settle_ms: u64,

    /// Frame width in pixels
    #[arg(long, default_value_t = 380)]
    width: u32,

    /// Frame height in pixels
    #[arg(long, default_value_t = 380)]
    height: u32,

    /// Frame depth in bits per pixel
    #[arg(long, default_value_t = 24)]
    bpp: u32,

    /// Leave the console in text mode
    #[arg(long)]
    no_console: bool,

    /// Put the console back into text mode on Ctrl+C
    #[arg(long, conflicts_with = "no_console")]
    restore_console: bool,

    /// More logging (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Append every dial sample to this JSON-lines file
    #[cfg(feature = "recorder")]
    #[arg(long, value_name = "FILE")]
    record: Option<PathBuf>,

    /// Replay a recorded session instead of reading the dial
    #[cfg(feature = "recorder")]
    #[arg(long, value_name = "FILE", conflicts_with = "record")]
    replay: Option<PathBuf>,
}

impl Args {
    fn config(&self) -> Result<Config> {
        let geometry = FrameGeometry::new(self.width, self.height, self.bpp)?;
        let order = match self.order {
            OrderArg::Sorted => CatalogOrder::Sorted,
            OrderArg::Filesystem => CatalogOrder::Filesystem,
        };
        let policy = match self.on_bad_image {
            BadImageArg::Abort => ImageErrorPolicy::Abort,
            BadImageArg::Skip => ImageErrorPolicy::Skip,
        };
        let direction = if self.invert {
            DirectionMap::Inverted
        } else {
            DirectionMap::Standard
        };

        Ok(Config::new()
            .with_geometry(geometry)
            .with_threshold(self.threshold)
            .with_direction(direction)
            .with_order(order)
            .with_settle(Duration::from_millis(self.settle_ms))
            .with_image_error_policy(policy)
            .with_console(!self.no_console, self.restore_console))
    }
}

fn main() {
    let args = Args::parse();
    init_logger(args.verbose);

    match run(&args) {
        Ok(never) => match never {},
        Err(e) => {
            log::error!("{}", e);
            eprintln!("dialframe: {}", e);
            process::exit(1);
        }
    }
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(args: &Args) -> Result<Infallible> {
    setup_check(args);
    let config = args.config()?;

    let catalog = match &args.image_dir {
        Some(dir) => {
            let catalog = ImageCatalog::build(dir, config.order)?;
            log::info!("{} images in {}", catalog.count(), dir.display());
            Some(catalog)
        }
        None => None,
    };

    let source = open_source(args)?;
    let catalog = catalog.ok_or_else(|| Error::Directory {
        path: PathBuf::new(),
        source: io::Error::new(io::ErrorKind::NotFound, "no image directory given"),
    })?;

    if let Some(actual) = probe_geometry(FB_SYSFS_DIR)
        && actual != config.geometry
    {
        log::warn!(
            "framebuffer reports {}, images are expected to be {}",
            actual,
            config.geometry
        );
    }
    let writer = FramebufferWriter::new(config.geometry)?;

    if config.switch_console {
        set_console_mode(CONSOLE_DEVICE, ConsoleMode::Graphics)?;
    }
    install_signal_handler(config.restore_console);

    CarouselController::from_config(catalog, source, writer, &config).run()
}

/// Usage and privilege warnings. Neither stops the program.
fn setup_check(args: &Args) {
    if args.image_dir.is_none() {
        let program = std::env::args()
            .next()
            .unwrap_or_else(|| "dialframe".to_string());
        eprintln!("Usage: {} [IMAGE_DIR]", program);
        eprintln!("Please specify the path to the directory where images are stored.");
    }

    if !is_root() {
        log::warn!("You are not root! This may not work...");
    }
}

/// The dial is only selected once an image directory was given.
fn open_source(args: &Args) -> Result<Box<dyn SampleSource>> {
    #[cfg(feature = "recorder")]
    {
        if let Some(path) = &args.replay {
            let recording = dialframe::Recording::load(path)?;
            log::info!(
                "replaying {} samples from {}",
                recording.sample_count(),
                path.display()
            );
            return Ok(Box::new(dialframe::ReplaySource::new(recording)));
        }
    }

    let device = if args.image_dir.is_some() {
        InputDevice::open(INPUT_DEVICE)?
    } else {
        return Err(Error::DeviceOpen {
            path: PathBuf::from(INPUT_DEVICE),
            source: io::Error::new(io::ErrorKind::NotFound, "no input device selected"),
        });
    };

    #[cfg(feature = "recorder")]
    {
        if let Some(path) = &args.record {
            log::info!("recording dial samples to {}", path.display());
            return Ok(Box::new(
                dialframe::RecordingSource::new(device).with_autosave(path)?,
            ));
        }
    }

    Ok(Box::new(device))
}

fn install_signal_handler(restore_console: bool) {
    let result = ctrlc::set_handler(move || {
        eprintln!("\nexiting...");
        log::info!("interrupted");
        if restore_console
            && let Err(e) = set_console_mode(CONSOLE_DEVICE, ConsoleMode::Text)
        {
            log::warn!("{}", e);
        }
        process::exit(130);
    });

    if let Err(e) = result {
        log::warn!("Failed to install Ctrl+C handler: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    #[test]
    fn test_bad_directory_reported_before_device() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("frames");
        let args = Args::try_parse_from([
            OsStr::new("dialframe"),
            missing.as_os_str(),
            OsStr::new("--no-console"),
        ])
        .unwrap();

        match run(&args) {
            Ok(never) => match never {},
            Err(err) => assert!(matches!(err, Error::Directory { .. }), "{:?}", err),
        }
    }

    #[test]
    fn test_no_directory_fails_at_device_selection() {
        let args = Args::try_parse_from(["dialframe", "--no-console"]).unwrap();

        match run(&args) {
            Ok(never) => match never {},
            Err(err) => assert!(matches!(err, Error::DeviceOpen { .. }), "{:?}", err),
        }
    }
}
