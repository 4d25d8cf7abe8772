use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "zimcat")]
#[command(version)]
#[command(about = "A random-access ZIM archive reader with HTTP URL support", long_about = None)]
#[command(after_help = "Examples:\n  \
  zimcat -l wiki.zim                      list all entry URLs\n  \
  zimcat -p wiki.zim A/Ray_Charles.html   print one article to stdout\n  \
  zimcat wiki.zimaa -d out A/Foo.html     extract from a split archive\n  \
  zimcat -m https://example.com/wiki.zim  show metadata of a remote archive")]
pub struct Cli {
    /// ZIM archive path (plain or first split volume) or HTTP URL
    #[arg(value_name = "ARCHIVE")]
    pub archive: String,

    /// Entry URLs to read, as namespace/path (e.g. A/Foo.html)
    #[arg(value_name = "URLS")]
    pub urls: Vec<String>,

    /// List entry URLs
    #[arg(short = 'l')]
    pub list: bool,

    /// List entries verbosely (namespace, location, title)
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Show archive metadata (counts, uuid, main page, mime types)
    #[arg(short = 'm')]
    pub metadata: bool,

    /// Write entry content to stdout, no messages
    #[arg(short = 'p')]
    pub pipe: bool,

    /// Extract entries into exdir
    #[arg(short = 'd', value_name = "DIR")]
    pub extract_dir: Option<String>,

    /// Never overwrite existing files
    #[arg(short = 'n')]
    pub never_overwrite: bool,

    /// Overwrite files WITHOUT prompting
    #[arg(short = 'o')]
    pub overwrite: bool,

    /// Quiet mode
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    pub fn is_http_url(&self) -> bool {
        self.archive.starts_with("http://") || self.archive.starts_with("https://")
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet > 0 || self.pipe
    }
}
