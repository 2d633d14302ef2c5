use std::path::PathBuf;

use anyhow::{Context, Result};
use palletviz::{
    style::{FigureStyle, DEFAULT_STYLE, LIGHT_STYLE},
    viewer, Figure, Report, SizeMetric,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(clap::Parser, Debug)]
#[command(
    version,
    about = "Render a pallet storage size report as a pie chart with a text breakdown."
)]
pub struct Args {
    /// Input JSON file.
    #[arg()]
    input: PathBuf,

    /// Write the figure to this file (.svg, or .png when built with the `png` feature) instead
    /// of opening the viewer.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the text breakdown to stdout.
    #[arg(long)]
    dump_text: bool,

    /// Do not open the viewer; useful with --dump-text.
    #[arg(long)]
    no_serve: bool,

    /// Port of the local viewer.
    #[arg(long, default_value_t = viewer::DEFAULT_PORT)]
    port: u16,

    /// Colour theme of the figure.
    #[arg(long, value_enum, default_value_t = Theme::Dark)]
    theme: Theme,

    /// Chart compressed sizes instead of raw ones.
    #[arg(long)]
    compressed: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum Theme {
    Dark,
    Light,
}

impl Theme {
    fn style(self) -> &'static FigureStyle {
        match self {
            Theme::Dark => &*DEFAULT_STYLE,
            Theme::Light => &*LIGHT_STYLE,
        }
    }
}

fn main() -> Result<()> {
    let args = <Args as clap::Parser>::parse();
    init_logging()?;

    let report = Report::load(&args.input)
        .with_context(|| format!("failed to load {}", args.input.display()))?;
    let metric = if args.compressed {
        SizeMetric::Compressed
    } else {
        SizeMetric::Raw
    };
    let figure = Figure::from_report(&report, metric)
        .with_context(|| format!("failed to chart {}", args.input.display()))?;
    tracing::info!(
        network = %report.network,
        pallets = report.pallets.len(),
        slices = figure.pie.len(),
        "figure ready"
    );

    if args.dump_text {
        print!("{}", figure.summary);
    }

    let style = args.theme.style();
    if let Some(output) = &args.output {
        figure.to_file(output, Some(style))?;
        tracing::info!(path = %output.display(), "figure written");
    } else if !args.no_serve {
        viewer::serve(&figure, style, args.port)?;
    }

    Ok(())
}

fn init_logging() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))?;
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;
    Ok(())
}
