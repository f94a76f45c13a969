//! Consolidate miRNA, RPPA and copy-number tables into one sample-keyed CSV.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crc_qvae::consolidate::{collect_sources, merge_sources, JoinPolicy, SampleTable, SourceKind};

#[derive(Parser)]
#[command(name = "consolidate")]
#[command(about = "Consolidate CRC omics tables into one sample-keyed CSV")]
#[command(version)]
struct Cli {
    /// miRNA expression table (explicit-table mode)
    #[arg(long, conflicts_with = "scan")]
    mirna: Option<PathBuf>,

    /// RPPA protein table (explicit-table mode)
    #[arg(long, conflicts_with = "scan")]
    rppa: Option<PathBuf>,

    /// Copy-number table (explicit-table mode)
    #[arg(long, conflicts_with = "scan")]
    cnv: Option<PathBuf>,

    /// Sample identifier column name in explicit tables
    #[arg(long, default_value = "sample_id")]
    id_column: String,

    /// GDC download directory to scan instead of explicit tables
    #[arg(long)]
    scan: Option<PathBuf>,

    /// File-name glob applied in scan mode
    #[arg(long, default_value = "*")]
    pattern: String,

    /// Join policy across the three sources (no default on purpose)
    #[arg(long, value_enum)]
    join: JoinPolicy,

    /// Output CSV path
    #[arg(long, default_value = "crc_consolidated.csv")]
    out: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> crc_qvae::Result<()> {
    let (mut mirna, mut rppa, mut cnv) = if let Some(dir) = &cli.scan {
        let outcome = collect_sources(dir, &cli.pattern)?;
        (outcome.mirna, outcome.rppa, outcome.cnv)
    } else {
        match (&cli.mirna, &cli.rppa, &cli.cnv) {
            (Some(mirna), Some(rppa), Some(cnv)) => (
                SampleTable::read_csv(mirna, &cli.id_column)?,
                SampleTable::read_csv(rppa, &cli.id_column)?,
                SampleTable::read_csv(cnv, &cli.id_column)?,
            ),
            _ => {
                eprintln!("Error: provide --scan <dir> or all of --mirna, --rppa and --cnv");
                process::exit(2);
            }
        }
    };

    for table in [&mut mirna, &mut rppa, &mut cnv] {
        table.normalize_sample_ids();
    }
    info!(
        mirna = mirna.n_samples(),
        rppa = rppa.n_samples(),
        cnv = cnv.n_samples(),
        "source tables loaded"
    );

    let merged = merge_sources(
        &[
            (SourceKind::Mirna.label(), &mirna),
            (SourceKind::Rppa.label(), &rppa),
            (SourceKind::Cnv.label(), &cnv),
        ],
        cli.join,
    )?;
    merged.write_csv(&cli.out, "sample_id")?;

    println!(
        "Final shape: {} samples x {} columns",
        merged.n_samples(),
        merged.n_columns()
    );
    println!("Consolidated data written to {}", cli.out.display());
    Ok(())
}
