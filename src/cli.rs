use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "stowzip")]
#[command(version)]
#[command(about = "A Rust zip utility that stores files without compression", long_about = None)]
#[command(after_help = "Examples:\n  \
  stowzip a.txt b.txt             pack a.txt and b.txt into output.zip\n  \
  stowzip -o docs.zip -j docs/*   pack files from docs/ without their directory\n  \
  stowzip -T -q notes.md          pack notes.md quietly, then test the archive\n  \
  stowzip                         prompt for the files to pack")]
pub struct Cli {
    /// Files to add (prompted for when omitted)
    #[arg(value_name = "FILES")]
    pub files: Vec<String>,

    /// Write the archive to ZIPFILE
    #[arg(short = 'o', long = "output", value_name = "ZIPFILE", default_value = "output.zip")]
    pub output: String,

    /// Junk paths (store just the file names)
    #[arg(short = 'j')]
    pub junk_paths: bool,

    /// Test the archive after writing it
    #[arg(short = 'T')]
    pub test: bool,

    /// List the archive verbosely after writing it
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    pub fn is_quiet(&self) -> bool {
        self.quiet > 0
    }

    pub fn is_very_quiet(&self) -> bool {
        self.quiet > 1
    }

    /// Default log filter for the chosen verbosity
    pub fn log_level(&self) -> &'static str {
        match self.quiet {
            0 => "info",
            1 => "warn",
            _ => "error",
        }
    }
}

/// Split a line typed at the prompt into input names.
pub fn parse_file_list(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["stowzip", "a.txt", "b.txt"]);
        assert_eq!(cli.files, ["a.txt", "b.txt"]);
        assert_eq!(cli.output, "output.zip");
        assert!(!cli.junk_paths && !cli.test && !cli.verbose);
        assert_eq!(cli.log_level(), "info");
    }

    #[test]
    fn flags() {
        let cli = Cli::parse_from(["stowzip", "-qq", "-jT", "-o", "out.zip", "x"]);
        assert!(cli.is_very_quiet());
        assert!(cli.junk_paths && cli.test);
        assert_eq!(cli.output, "out.zip");
        assert_eq!(cli.log_level(), "error");
    }

    #[test]
    fn no_files_is_allowed() {
        let cli = Cli::parse_from(["stowzip"]);
        assert!(cli.files.is_empty());
    }

    #[test]
    fn prompt_line_splitting() {
        assert_eq!(parse_file_list("  a.txt\tb.txt  c\r\n"), ["a.txt", "b.txt", "c"]);
        assert!(parse_file_list("   \n").is_empty());
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
