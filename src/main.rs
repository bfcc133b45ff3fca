use anyhow::Context;
use chromagram::errors::HistogramError;
use chromagram::logging;
use chromagram::pipeline::{self, Invocation};
use chromagram::style::{ChartStyle, StyleOverrides};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

/// Plot the red, green and blue intensity histograms of an image.
#[derive(Parser, Debug)]
#[command(name = "chromagram", version, about, long_about = None)]
struct Cli {
    /// Image to analyze (must be RGB)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Chart file to write; the extension picks the format
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Upper limit of the pixel-count axis
    #[arg(value_name = "Y_LIMIT", allow_negative_numbers = true)]
    y_limit: f64,

    #[arg(long, value_name = "TEXT")]
    title: Option<String>,

    #[arg(long, value_name = "TEXT")]
    x_label: Option<String>,

    #[arg(long, value_name = "TEXT")]
    y_label: Option<String>,

    /// Canvas width in pixels before cropping
    #[arg(long, value_name = "PX")]
    width: Option<u32>,

    /// Canvas height in pixels before cropping
    #[arg(long, value_name = "PX")]
    height: Option<u32>,

    #[arg(long, value_name = "PX")]
    line_width: Option<u32>,

    /// JSON file with chart title, labels and size
    #[arg(long, value_name = "FILE")]
    style: Option<PathBuf>,

    /// Also write the raw counts as JSON
    #[arg(long, value_name = "FILE")]
    counts: Option<PathBuf>,

    /// Log every stage to stderr
    #[arg(long)]
    debug: bool,
}

impl Cli {
    fn into_invocation(self) -> anyhow::Result<Invocation> {
        let style = match &self.style {
            Some(path) => ChartStyle::from_file(path)?,
            None => ChartStyle::default(),
        };
        let style = style.apply(StyleOverrides {
            title: self.title,
            x_label: self.x_label,
            y_label: self.y_label,
            width: self.width,
            height: self.height,
            line_width: self.line_width,
        });

        Ok(Invocation {
            input: self.input,
            output: self.output,
            y_limit: self.y_limit,
            style,
            counts_output: self.counts,
        })
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let invocation = cli.into_invocation()?;
    let artifact = pipeline::run(&invocation).with_context(|| {
        format!(
            "could not chart '{}' into '{}'",
            invocation.input.display(),
            invocation.output.display()
        )
    })?;

    log::info!(
        "{} chart {}x{} written to {}",
        artifact.format(),
        artifact.width(),
        artifact.height(),
        invocation.output.display()
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.debug);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<HistogramError>() {
                Some(e) => eprintln!("error [{}]: {:#}\n\n{}", e.error_code(), err, e.suggestion()),
                None => eprintln!("error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}
