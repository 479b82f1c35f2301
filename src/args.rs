use clap::Parser;

const CMD_NAME: &str = "docsmith";
const DEFAULT_DOXYFILE: &str = "Doxyfile";
const DEFAULT_OUTPUT: &str = "output";

/// Stores our command-line args format.
#[derive(Parser)]
#[command(name = CMD_NAME, version, about = None, long_about = None)]
pub struct Args {
    /// Generator config document
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_DOXYFILE)]
    #[arg(env = "DOCSMITH_DOXYFILE")]
    pub doxyfile: String,

    /// Output directory
    #[arg(short, long, value_name = "DIR", default_value = DEFAULT_OUTPUT)]
    #[arg(env = "DOCSMITH_OUTPUT")]
    pub output: String,

    /// Also pack the generated docs into this archive
    #[arg(short, long, value_name = "NAME")]
    pub tar: Option<String>,

    /// Override a config key (may be repeated)
    #[arg(short = 'D', long = "define", value_name = "KEY=VALUE")]
    pub defines: Vec<String>,

    /// Generator program
    #[arg(long, value_name = "PROG", default_value = "doxygen")]
    #[arg(env = "DOXYGEN")]
    pub generator: String,

    /// Extra generator arguments (may be repeated)
    #[arg(short = 'f', long = "flag", value_name = "ARG")]
    pub flags: Vec<String>,

    /// Archiver program
    #[arg(long, value_name = "PROG", default_value = "tar")]
    #[arg(env = "TAR")]
    pub tar_cmd: String,

    /// Print additional debugging info (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Dry run; print info but don't run anything.
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}
