//! Main entry point for the zimcat CLI application.
//!
//! This binary provides a command-line interface for listing and reading
//! ZIM archives from the local filesystem (plain or split volumes) and
//! from remote HTTP URLs.

use anyhow::{Result, bail};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

use zimcat::{Cli, EntryKind, HttpVolume, LocalVolume, ReadAt, SegmentedSource, ZimArchive};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.is_http_url() {
        // Remote archive via HTTP Range requests
        let volume = Arc::new(HttpVolume::open(cli.archive.clone()).await?);
        let archive = ZimArchive::open(SegmentedSource::single(volume.clone())).await?;

        run(&archive, &cli).await?;

        // Display network transfer statistics for HTTP sources
        if !cli.is_quiet() {
            eprintln!(
                "\nTotal bytes transferred: {}",
                format_size(volume.transferred_bytes())
            );
        }
    } else {
        // Local archive: a plain file, or one volume of a split set
        let paths = volume_paths(Path::new(&cli.archive))?;
        let mut volumes = Vec::with_capacity(paths.len());
        for path in &paths {
            let name = path
                .file_name()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            volumes.push((name, LocalVolume::open(path)?));
        }
        let archive = ZimArchive::open(SegmentedSource::from_volumes(volumes)).await?;
        run(&archive, &cli).await?;
    }

    Ok(())
}

/// Process an open archive based on CLI options.
///
/// This function handles the three modes:
/// - Metadata mode (`-m`): display header-derived information
/// - List mode (`-l`, `-v`, or no entry URLs given): display the entry index
/// - Read mode: resolve each requested entry and write its content
///
/// # Arguments
///
/// * `archive` - An open archive over any `ReadAt` byte source
/// * `cli` - Parsed command-line arguments
///
/// # Returns
///
/// Returns `Ok(())` on success, or an error if processing fails.
async fn run<R: ReadAt + 'static>(archive: &ZimArchive<R>, cli: &Cli) -> Result<()> {
    if cli.metadata {
        return show_metadata(archive).await;
    }

    if cli.list || cli.verbose || cli.urls.is_empty() {
        return list_entries(archive, cli.verbose).await;
    }

    for url in &cli.urls {
        read_entry(archive, url, cli).await?;
    }

    Ok(())
}

/// Print archive metadata: header fields, main page and mime types.
async fn show_metadata<R: ReadAt + 'static>(archive: &ZimArchive<R>) -> Result<()> {
    let header = archive.header();
    println!("ZIM version:   {}.{}", header.major_version, header.minor_version);
    println!("UUID:          {}", hex_string(&archive.uuid()));
    println!("Entries:       {}", archive.article_count());
    println!("Clusters:      {}", archive.cluster_count());

    match archive.main_page_entry().await? {
        Some(entry) => println!("Main page:     {}/{}", entry.namespace, entry.url),
        None => println!("Main page:     (none)"),
    }

    let mimes = archive.mime_table().await?;
    println!("Mime types:    {}", mimes.join(", "));

    Ok(())
}

/// List entries in URL order.
///
/// Simple format prints one `namespace/url` per line; verbose format adds
/// mime type, location and title columns.
async fn list_entries<R: ReadAt + 'static>(archive: &ZimArchive<R>, verbose: bool) -> Result<()> {
    let mimes = if verbose {
        archive.mime_table().await?
    } else {
        Vec::new()
    };

    if verbose {
        println!("{:<24}  {:>13}  Name", "Mime", "Location");
        println!("{}", "-".repeat(70));
    }

    let count = archive.article_count();
    for index in 0..count {
        let entry = archive.entry_by_url_index(index).await?;

        if verbose {
            let mime = if entry.is_redirect() {
                "(redirect)"
            } else {
                mimes
                    .get(entry.mimetype as usize)
                    .map(String::as_str)
                    .unwrap_or("?")
            };
            let location = match entry.kind {
                EntryKind::Content { cluster, blob } => format!("{cluster}:{blob}"),
                EntryKind::Redirect { target } => format!("-> {target}"),
            };
            println!(
                "{:<24}  {:>13}  {}/{}  ({})",
                mime, location, entry.namespace, entry.url, entry.title
            );
        } else {
            println!("{}/{}", entry.namespace, entry.url);
        }
    }

    if verbose {
        println!("{}", "-".repeat(70));
        println!("{:>41}  {} entries", "", count);
    }

    Ok(())
}

/// Look up one `namespace/url` argument, resolve redirects, and write its
/// content to stdout or to a file.
async fn read_entry<R: ReadAt + 'static>(
    archive: &ZimArchive<R>,
    url: &str,
    cli: &Cli,
) -> Result<()> {
    let Some((namespace, path)) = split_entry_url(url) else {
        bail!("invalid entry URL {url:?} (expected namespace/path, e.g. A/Foo.html)");
    };

    let Some(entry) = archive.entry_by_url(namespace, path).await? else {
        if !cli.is_quiet() {
            eprintln!("Not found: {url}");
        }
        return Ok(());
    };

    let entry = archive.resolve_redirect(entry).await?;
    let content = archive.read_blob(&entry).await?;

    if cli.pipe {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(&content).await?;
        return Ok(());
    }

    // Extract to a file, preserving the namespace/url path layout
    let base = cli.extract_dir.as_deref().unwrap_or(".");
    let output_path = PathBuf::from(base)
        .join(entry.namespace.to_string())
        .join(&entry.url);

    if output_path.exists() {
        if cli.never_overwrite {
            if !cli.is_quiet() {
                eprintln!("Skipping: {url} (file exists)");
            }
            return Ok(());
        }
        if !cli.overwrite {
            if !cli.is_quiet() {
                eprintln!("Skipping: {url} (use -o to overwrite)");
            }
            return Ok(());
        }
    }

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    if !cli.is_quiet() {
        println!("  extracting: {url}");
    }

    let mut file = tokio::fs::File::create(&output_path).await?;
    file.write_all(&content).await?;

    Ok(())
}

/// Split an entry argument into namespace and path: "A/Foo.html" -> ('A', "Foo.html")
fn split_entry_url(url: &str) -> Option<(char, &str)> {
    let (ns, path) = url.split_once('/')?;
    let mut chars = ns.chars();
    let namespace = chars.next()?;
    chars.next().is_none().then_some((namespace, path))
}

/// Expand one volume path into the full split set it belongs to.
///
/// Split archives follow the `name.zimaa`, `name.zimab`, … convention:
/// given any one volume, every sibling sharing the `name.zim` prefix plus
/// two letters is part of the same logical archive. A plain `.zim` path is
/// returned as-is.
fn volume_paths(path: &Path) -> Result<Vec<PathBuf>> {
    let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
        return Ok(vec![path.to_path_buf()]);
    };

    let Some(idx) = name.to_ascii_lowercase().rfind(".zim") else {
        return Ok(vec![path.to_path_buf()]);
    };
    let tail = &name[idx + 4..];
    if tail.len() != 2 || !tail.chars().all(|c| c.is_ascii_alphabetic()) {
        return Ok(vec![path.to_path_buf()]);
    }

    let prefix = &name[..idx + 4];
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let dir = dir.unwrap_or(Path::new("."));

    let mut found = Vec::new();
    for dirent in std::fs::read_dir(dir)? {
        let dirent = dirent?;
        let file_name = dirent.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        let Some(rest) = file_name.strip_prefix(prefix) else {
            continue;
        };
        if rest.len() == 2 && rest.chars().all(|c| c.is_ascii_alphabetic()) {
            found.push(dir.join(file_name));
        }
    }

    if found.is_empty() {
        return Ok(vec![path.to_path_buf()]);
    }
    Ok(found)
}

/// Render a UUID as lowercase hex.
fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Format a byte size into a human-readable string.
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
