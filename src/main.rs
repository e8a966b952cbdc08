use std::fs::File;

use anyhow::{Context, Result};
use opencv::{prelude::*, videoio};
use tracing::info;

use domino_vision::{AnalysisSession, Error, NativeFrame, PipelineConfig};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config: PipelineConfig = match File::open("config.json") {
        Ok(file) => serde_json::from_reader(file).context("Failed to parse config.json")?,
        Err(_) => PipelineConfig::default(),
    };

    let mut capture = videoio::VideoCapture::new(config.camera_index, videoio::CAP_ANY)
        .context("Failed to create capture device")?;
    if !capture.is_opened()? {
        return Err(Error::Upstream(format!(
            "capture device {} failed to open",
            config.camera_index
        ))
        .into());
    }

    let session = AnalysisSession::start(config, |result| {
        info!(pips = result.pip_count, "frame analyzed");
    });

    let mut bgr = Mat::default();
    loop {
        let grabbed = capture
            .read(&mut bgr)
            .context("Failed to read frame from capture device")?;
        if !grabbed || bgr.rows() == 0 {
            break;
        }

        let frame = NativeFrame::from_bgr_mat(&bgr, 0)?;
        session.submit(frame);
    }

    let committed = session.stop();
    println!("{committed}");

    Ok(())
}
