use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for the dtsz binary.
#[derive(Parser, Debug)]
#[command(
    name = "dtsz",
    version,
    about = "Bundle TypeScript declaration files into a single .d.ts"
)]
pub struct CliArgs {
    /// Entry declaration files to bundle.
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Path to a JSON config file listing entries.
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Output file for a single entry. Without it the bundle goes to stdout.
    #[arg(short = 'o', long = "out-file")]
    pub out_file: Option<PathBuf>,

    // ==================== Output Options ====================
    /// Omit the generated-by banner.
    #[arg(long)]
    pub no_banner: bool,

    /// Sort declarations by name.
    #[arg(long)]
    pub sort: bool,

    /// Export every referenced declaration that kept its name.
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub export_referenced_types: Option<bool>,

    /// Keep `declare global {}` blocks of bundled files.
    #[arg(long)]
    pub inline_declare_global: bool,

    /// Keep `declare module "m" {}` blocks of bundled files.
    #[arg(long)]
    pub inline_declare_externals: bool,

    // ==================== Reporting ====================
    /// Do not print diagnostics.
    #[arg(long, conflicts_with = "verbose")]
    pub silent: bool,

    /// Log progress and renamed declarations.
    #[arg(long)]
    pub verbose: bool,

    /// Colorize diagnostics. Defaults to on when stderr is a terminal.
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub pretty: Option<bool>,
}
