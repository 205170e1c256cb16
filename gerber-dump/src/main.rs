use std::fs::{read_to_string, File};
use std::io::{self, Write as _};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gerber::render::RenderOptions;
use gerber::{parse_gerber_file, render_gerber_to_svg};

#[derive(Parser)]
#[command(about = "Inspect and render Gerber (RS-274X/X2) files")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a file and pretty-print its node sequence.
    Dump { filename: PathBuf },

    /// Parse a file and render it to SVG.
    Render {
        filename: PathBuf,

        /// Where to write the SVG. Defaults to stdout.
        #[arg(long)]
        out: Option<PathBuf>,

        #[arg(long, default_value_t = 1.0)]
        scale: f64,

        #[arg(long, default_value = "#000")]
        stroke_color: String,

        #[arg(long, default_value = "#000")]
        fill_color: String,

        #[arg(long, default_value = "none")]
        background_color: String,

        #[arg(long, default_value_t = 0.1)]
        padding: f64,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Dump { filename } => {
            let src = read_to_string(&filename)?;
            let doc = parse_gerber_file(&src);
            println!("{doc:#?}");
        }
        Command::Render {
            filename,
            out,
            scale,
            stroke_color,
            fill_color,
            background_color,
            padding,
        } => {
            let src = read_to_string(&filename)?;
            let doc = parse_gerber_file(&src);
            let options = RenderOptions {
                scale,
                stroke_color,
                fill_color,
                background_color,
                padding,
            };
            let svg = render_gerber_to_svg(&doc, &options);

            match out {
                Some(path) => File::create(path)?.write_all(svg.as_bytes())?,
                None => io::stdout().write_all(svg.as_bytes())?,
            }
        }
    }

    Ok(())
}
