use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use catalog_report::{generate_catalog_report, JsonDirStore, ReportRequest, SystemClock};

#[derive(Parser)]
#[command(name = "catalog_report")]
#[command(about = "Render the school catalog workbook for a class-division")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a catalog from a local data directory
    Render {
        /// Class number, e.g. 10
        #[arg(short, long = "class")]
        class_no: u32,
        /// Division code, e.g. A
        #[arg(short, long)]
        division: String,
        /// Month of a stored roster snapshot (needs --year)
        #[arg(short, long)]
        month: Option<i64>,
        /// Year of a stored roster snapshot (needs --month)
        #[arg(short, long)]
        year: Option<i64>,
        /// Data directory with catalog/ and roster_records/
        #[arg(long, default_value = "data")]
        data: PathBuf,
        /// Directory holding the logo and font
        #[arg(long, default_value = "assets")]
        assets: PathBuf,
        /// Output workbook path
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            class_no,
            division,
            month,
            year,
            data,
            assets,
            output,
        } => {
            let store = JsonDirStore::new(&data);
            let req = ReportRequest {
                class_no,
                division,
                selected_month: month,
                selected_year: year,
                assets_dir: Some(assets),
                save_path: Some(output.clone()),
                return_bytes: false,
            };
            generate_catalog_report(&store, &SystemClock, &req)
                .with_context(|| format!("rendering catalog from {}", data.display()))?;
            println!("Wrote {}", output.display());
        }
    }

    Ok(())
}
