use std::{path::Path, time::Duration};

use snafu::{ResultExt, Snafu};

use crate::{config::models::Settings, process::{self, ProcessError}};

use super::layout::{TestPage, CANVAS_HEIGHT, CANVAS_WIDTH, LABEL_HEIGHT, LABEL_POINT_SIZE, PATTERN_HEIGHT, PATTERN_WIDTH, STRIPE_COLORS};

/// Turns a [`TestPage`] into a raster image on disk.
pub trait PageRenderer {
    fn render(&self, page: &TestPage, output: &Path) -> Result<(), RenderError>;
}

/// [`PageRenderer`] that composites the page with ImageMagick.
pub struct ImageMagickRenderer {
    program: String,
    timeout: Duration,
}

impl ImageMagickRenderer {
    pub fn new(settings: &Settings) -> Self {
        Self {
            program: settings.tools.convert.clone(),
            timeout: settings.tools.timeout,
        }
    }
}

impl PageRenderer for ImageMagickRenderer {
    fn render(&self, page: &TestPage, output: &Path) -> Result<(), RenderError> {
        let result = process::run(&self.program, &convert_args(page, output), self.timeout);
        let output = match result {
            Ok(output) => output,
            Err(source) if source.is_missing_program() => return MissingSnafu { program: &self.program }.fail(),
            Err(source) => return Err(source).context(ProcessSnafu),
        };

        if !output.success() {
            return FailedSnafu {
                program: &self.program,
                status: output.status.to_string(),
                stderr: output.stderr.trim().to_string(),
            }.fail();
        }
        Ok(())
    }
}

/// Arguments for `convert`: a white canvas with the stripe block (bars stacked over a
/// fixed-size label line) composited at the page position.
pub fn convert_args(page: &TestPage, output: &Path) -> Vec<String> {
    let mut args = vec![
        "-size".to_string(),
        format!("{}x{}", CANVAS_WIDTH, CANVAS_HEIGHT),
        "xc:white".to_string(),
        "(".to_string(),
        "-size".to_string(),
        format!("{}x{}", TestPage::stripe_width(), PATTERN_HEIGHT),
    ];
    args.extend(STRIPE_COLORS.iter().map(|color| format!("xc:{color}")));
    args.extend([
        "+append".to_string(),
        "-size".to_string(),
        format!("{}x{}", PATTERN_WIDTH, LABEL_HEIGHT),
        "-background".to_string(),
        "white".to_string(),
        "-fill".to_string(),
        "black".to_string(),
        "-gravity".to_string(),
        "center".to_string(),
        "-pointsize".to_string(),
        LABEL_POINT_SIZE.to_string(),
        format!("label:{}", page.label),
        "-append".to_string(),
        ")".to_string(),
        "-gravity".to_string(),
        "northwest".to_string(),
        "-geometry".to_string(),
        format!("+{}+{}", page.x, page.y),
        "-composite".to_string(),
        output.display().to_string(),
    ]);
    args
}

// ////// //
// Errors //
// ////// //

#[derive(Debug, Snafu)]
pub enum RenderError {
    #[snafu(display("'{program}' command (ImageMagick) not found"))]
    Missing { program: String },

    #[snafu(display("Could not run the image renderer"))]
    Process { source: ProcessError },

    #[snafu(display("'{program}' exited with {status}: {stderr}"))]
    Failed { program: String, status: String, stderr: String },
}
