//! One-shot pip count for a still image.
//!
//! Usage: `count_image <image> [annotated-out]`

use std::env;

use anyhow::{bail, Context, Result};
use opencv::{core::Vector, imgcodecs, imgproc, prelude::*};

use domino_vision::{FrameAnalyzer, PipelineConfig};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let mut args = env::args().skip(1);
    let Some(image_path) = args.next() else {
        bail!("usage: count_image <image> [annotated-out]");
    };
    let out_path = args.next();

    let bgr = imgcodecs::imread(&image_path, imgcodecs::IMREAD_COLOR)
        .with_context(|| format!("Failed to read {image_path}"))?;
    if bgr.rows() == 0 {
        bail!("{image_path} decoded to an empty image");
    }

    let mut rgb = Mat::default();
    imgproc::cvt_color(&bgr, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;

    let mut analyzer = FrameAnalyzer::new(PipelineConfig::default());
    let result = analyzer.analyze_rgb(&rgb)?;
    println!("{}", result.pip_count);

    if let Some(path) = out_path {
        imgcodecs::imwrite(&path, result.frame, &Vector::<i32>::new())
            .with_context(|| format!("Failed to write {path}"))?;
    }

    Ok(())
}
