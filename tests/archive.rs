//! End-to-end tests over synthetic in-memory archives.

use std::io::Read;

use zimcat::{
    EntryKind, LocalVolume, MemoryVolume, SegmentedSource, ZimArchive, ZimError,
};

const MAGIC: u32 = 0x044D_495A;

enum Kind {
    Content { cluster: u32, blob: u32 },
    Redirect { target: u32 },
}

struct EntrySpec {
    ns: u8,
    url: &'static str,
    /// Empty means "record carries no title" (reader falls back to URL)
    title: &'static str,
    mimetype: u16,
    kind: Kind,
}

struct ClusterSpec {
    tag: u8,
    blobs: Vec<Vec<u8>>,
}

fn xz_compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = xz2::read::XzEncoder::new(data, 6);
    let mut out = Vec::new();
    encoder.read_to_end(&mut out).unwrap();
    out
}

/// Serialize a complete archive: header, mime table, directory entries,
/// URL/title pointer lists, clusters, cluster pointer list (+ sentinel).
/// `entries` must already be in URL-sorted order; the title pointer list
/// is derived by sorting on (namespace, effective title).
fn build_archive(
    entries: &[EntrySpec],
    clusters: &[ClusterSpec],
    mime: &[&str],
    main_page: Option<u32>,
) -> Vec<u8> {
    let n = entries.len();

    let mut mime_bytes = Vec::new();
    for m in mime {
        mime_bytes.extend_from_slice(m.as_bytes());
        mime_bytes.push(0);
    }
    mime_bytes.push(0);

    let mut entry_bytes = Vec::new();
    let mut entry_rel = Vec::with_capacity(n);
    for e in entries {
        entry_rel.push(entry_bytes.len() as u64);
        match e.kind {
            Kind::Content { cluster, blob } => {
                entry_bytes.extend_from_slice(&e.mimetype.to_le_bytes());
                entry_bytes.push(0); // parameter len
                entry_bytes.push(e.ns);
                entry_bytes.extend_from_slice(&0u32.to_le_bytes()); // revision
                entry_bytes.extend_from_slice(&cluster.to_le_bytes());
                entry_bytes.extend_from_slice(&blob.to_le_bytes());
            }
            Kind::Redirect { target } => {
                entry_bytes.extend_from_slice(&0xFFFFu16.to_le_bytes());
                entry_bytes.push(0);
                entry_bytes.push(e.ns);
                entry_bytes.extend_from_slice(&0u32.to_le_bytes());
                entry_bytes.extend_from_slice(&target.to_le_bytes());
            }
        }
        entry_bytes.extend_from_slice(e.url.as_bytes());
        entry_bytes.push(0);
        entry_bytes.extend_from_slice(e.title.as_bytes());
        entry_bytes.push(0);
    }

    let mime_list_pos = 80u64;
    let entries_base = mime_list_pos + mime_bytes.len() as u64;
    let url_ptr_pos = entries_base + entry_bytes.len() as u64;
    let title_ptr_pos = url_ptr_pos + 8 * n as u64;
    let clusters_base = title_ptr_pos + 4 * n as u64;

    let mut cluster_bytes = Vec::new();
    let mut cluster_starts = Vec::with_capacity(clusters.len() + 1);
    for c in clusters {
        cluster_starts.push(clusters_base + cluster_bytes.len() as u64);
        cluster_bytes.push(c.tag);

        let mut payload = Vec::new();
        let mut boundary = ((c.blobs.len() + 1) * 4) as u32;
        payload.extend_from_slice(&boundary.to_le_bytes());
        for b in &c.blobs {
            boundary += b.len() as u32;
            payload.extend_from_slice(&boundary.to_le_bytes());
        }
        for b in &c.blobs {
            payload.extend_from_slice(b);
        }

        if c.tag == 4 {
            payload = xz_compress(&payload);
        }
        cluster_bytes.extend_from_slice(&payload);
    }
    let cluster_ptr_pos = clusters_base + cluster_bytes.len() as u64;
    cluster_starts.push(cluster_ptr_pos); // sentinel: end of the last cluster

    // Title order: indices into the URL list, sorted by (ns, title).
    let mut title_order: Vec<u32> = (0..n as u32).collect();
    title_order.sort_by_key(|&i| {
        let e = &entries[i as usize];
        let title = if e.title.is_empty() { e.url } else { e.title };
        (e.ns, title)
    });

    let mut out = Vec::new();
    out.extend_from_slice(&MAGIC.to_le_bytes());
    out.extend_from_slice(&5u16.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&[0x42; 16]);
    out.extend_from_slice(&(n as u32).to_le_bytes());
    out.extend_from_slice(&(clusters.len() as u32).to_le_bytes());
    out.extend_from_slice(&url_ptr_pos.to_le_bytes());
    out.extend_from_slice(&title_ptr_pos.to_le_bytes());
    out.extend_from_slice(&cluster_ptr_pos.to_le_bytes());
    out.extend_from_slice(&mime_list_pos.to_le_bytes());
    out.extend_from_slice(&main_page.unwrap_or(0xFFFF_FFFF).to_le_bytes());
    out.extend_from_slice(&0xFFFF_FFFFu32.to_le_bytes()); // no layout page
    out.extend_from_slice(&0u64.to_le_bytes()); // checksum pos (fills header to 80 bytes)
    assert_eq!(out.len(), 80);

    out.extend_from_slice(&mime_bytes);
    out.extend_from_slice(&entry_bytes);
    for rel in &entry_rel {
        out.extend_from_slice(&(entries_base + rel).to_le_bytes());
    }
    for idx in &title_order {
        out.extend_from_slice(&idx.to_le_bytes());
    }
    out.extend_from_slice(&cluster_bytes);
    for start in &cluster_starts {
        out.extend_from_slice(&start.to_le_bytes());
    }

    out
}

fn apple_html() -> Vec<u8> {
    b"<html><body>apple</body></html>".to_vec()
}

fn banana_html() -> Vec<u8> {
    b"banana article body".to_vec()
}

fn zima_html() -> Vec<u8> {
    (0u32..2000).flat_map(|i| (i % 253).to_le_bytes()).collect()
}

fn pic_png() -> Vec<u8> {
    let mut png = vec![0x89, b'P', b'N', b'G'];
    png.extend((0u8..=255).cycle().take(300));
    png
}

/// One archive exercising every entry/cluster shape the reader supports:
/// stored and LZMA clusters, an unsupported compression tag, plain and
/// chained redirects, a self-redirect, and a second namespace.
fn wiki_bytes() -> Vec<u8> {
    let entries = [
        EntrySpec { ns: b'A', url: "Apple.html", title: "Zebra", mimetype: 0,
            kind: Kind::Content { cluster: 0, blob: 0 } },
        EntrySpec { ns: b'A', url: "Banana.html", title: "", mimetype: 0,
            kind: Kind::Content { cluster: 0, blob: 1 } },
        EntrySpec { ns: b'A', url: "Cherry.html", title: "Cherry", mimetype: 0,
            kind: Kind::Redirect { target: 0 } },
        EntrySpec { ns: b'A', url: "Date.html", title: "Date", mimetype: 0,
            kind: Kind::Redirect { target: 2 } },
        EntrySpec { ns: b'A', url: "Elder.html", title: "Elder", mimetype: 0,
            kind: Kind::Redirect { target: 4 } },
        EntrySpec { ns: b'A', url: "Weird.html", title: "Weird", mimetype: 0,
            kind: Kind::Content { cluster: 2, blob: 0 } },
        EntrySpec { ns: b'A', url: "Zima.html", title: "Zima", mimetype: 0,
            kind: Kind::Content { cluster: 1, blob: 0 } },
        EntrySpec { ns: b'I', url: "pic.png", title: "pic", mimetype: 1,
            kind: Kind::Content { cluster: 1, blob: 1 } },
    ];
    let clusters = [
        ClusterSpec { tag: 1, blobs: vec![apple_html(), banana_html()] },
        ClusterSpec { tag: 4, blobs: vec![zima_html(), pic_png()] },
        ClusterSpec { tag: 9, blobs: vec![b"never decoded".to_vec()] },
    ];
    build_archive(&entries, &clusters, &["text/html", "image/png"], Some(0))
}

async fn open_wiki() -> ZimArchive<MemoryVolume> {
    ZimArchive::open(SegmentedSource::single(MemoryVolume::new(wiki_bytes())))
        .await
        .unwrap()
}

#[tokio::test]
async fn header_fields_and_metadata() {
    let archive = open_wiki().await;
    assert_eq!(archive.article_count(), 8);
    assert_eq!(archive.cluster_count(), 3);
    assert_eq!(archive.uuid(), [0x42; 16]);
    assert_eq!(archive.main_page(), Some(0));
    assert_eq!(archive.layout_page(), None);

    let main = archive.main_page_entry().await.unwrap().unwrap();
    assert_eq!(main.url, "Apple.html");

    let mimes = archive.mime_table().await.unwrap();
    assert_eq!(mimes, vec!["text/html", "image/png"]);
}

#[tokio::test]
async fn absent_main_page_reads_as_none() {
    let bytes = build_archive(&[], &[], &["text/html"], None);
    let archive = ZimArchive::open(SegmentedSource::single(MemoryVolume::new(bytes)))
        .await
        .unwrap();
    assert_eq!(archive.main_page(), None);
    assert!(archive.main_page_entry().await.unwrap().is_none());
}

#[tokio::test]
async fn url_index_lookup_is_deterministic() {
    let archive = open_wiki().await;
    let first = archive.entry_by_url_index(0).await.unwrap();
    let second = archive.entry_by_url_index(0).await.unwrap();
    assert_eq!(first.offset, second.offset);
    assert_eq!(first.url, second.url);
    assert_eq!(first.title, second.title);
    assert_eq!(first.kind, second.kind);
}

#[tokio::test]
async fn title_index_iterates_in_title_order() {
    let archive = open_wiki().await;

    let mut previous: Option<(char, String)> = None;
    for i in 0..archive.article_count() {
        let entry = archive.entry_by_title_index(i).await.unwrap();
        let key = (entry.namespace, entry.title.clone());
        if let Some(prev) = &previous {
            assert!(*prev <= key, "titles out of order: {prev:?} > {key:?}");
        }
        previous = Some(key);
    }

    // The URL-order head ("Apple.html", titled "Zebra") sorts late by title.
    let first = archive.entry_by_title_index(0).await.unwrap();
    assert_eq!(first.url, "Banana.html");
}

#[tokio::test]
async fn entry_titles_default_to_url() {
    let archive = open_wiki().await;
    let banana = archive.entry_by_url('A', "Banana.html").await.unwrap().unwrap();
    assert_eq!(banana.title, "Banana.html");

    let apple = archive.entry_by_url('A', "Apple.html").await.unwrap().unwrap();
    assert_eq!(apple.title, "Zebra");
}

#[tokio::test]
async fn url_binary_search_finds_entries_in_both_namespaces() {
    let archive = open_wiki().await;

    for (ns, url) in [
        ('A', "Apple.html"),
        ('A', "Date.html"),
        ('A', "Zima.html"),
        ('I', "pic.png"),
    ] {
        let entry = archive.entry_by_url(ns, url).await.unwrap().unwrap();
        assert_eq!(entry.namespace, ns);
        assert_eq!(entry.url, url);
    }

    assert!(archive.entry_by_url('A', "Nope.html").await.unwrap().is_none());
    assert!(archive.entry_by_url('X', "Apple.html").await.unwrap().is_none());
}

#[tokio::test]
async fn stored_cluster_blobs_round_trip() {
    let archive = open_wiki().await;

    let apple = archive.entry_by_url('A', "Apple.html").await.unwrap().unwrap();
    assert_eq!(archive.read_blob(&apple).await.unwrap(), apple_html());

    let banana = archive.entry_by_url('A', "Banana.html").await.unwrap().unwrap();
    let content = archive.read_blob(&banana).await.unwrap();
    assert_eq!(content, banana_html());
    assert_eq!(content.len(), banana_html().len());
}

#[tokio::test]
async fn lzma_cluster_blobs_round_trip() {
    let archive = open_wiki().await;

    let zima = archive.entry_by_url('A', "Zima.html").await.unwrap().unwrap();
    assert_eq!(archive.read_blob(&zima).await.unwrap(), zima_html());

    let pic = archive.entry_by_url('I', "pic.png").await.unwrap().unwrap();
    assert_eq!(archive.read_blob(&pic).await.unwrap(), pic_png());
}

#[tokio::test]
async fn unsupported_compression_degrades_to_empty() {
    let archive = open_wiki().await;
    let weird = archive.entry_by_url('A', "Weird.html").await.unwrap().unwrap();
    assert!(archive.read_blob(&weird).await.unwrap().is_empty());
}

#[tokio::test]
async fn redirects_resolve_to_content() {
    let archive = open_wiki().await;

    // One hop
    let cherry = archive.entry_by_url('A', "Cherry.html").await.unwrap().unwrap();
    assert!(cherry.is_redirect());
    let resolved = archive.resolve_redirect(cherry.clone()).await.unwrap();
    assert_eq!(resolved.url, "Apple.html");
    assert_eq!(resolved.kind, EntryKind::Content { cluster: 0, blob: 0 });

    // Chain: Date -> Cherry -> Apple
    let date = archive.entry_by_url('A', "Date.html").await.unwrap().unwrap();
    let resolved = archive.resolve_redirect(date).await.unwrap();
    assert_eq!(resolved.url, "Apple.html");

    // read_entry resolves and reads in one step
    assert_eq!(archive.read_entry(cherry).await.unwrap(), apple_html());
}

#[tokio::test]
async fn self_redirect_raises_cycle_error() {
    let archive = open_wiki().await;
    let elder = archive.entry_by_url('A', "Elder.html").await.unwrap().unwrap();
    assert!(matches!(
        archive.resolve_redirect(elder).await,
        Err(ZimError::RedirectCycle { .. })
    ));
}

#[tokio::test]
async fn blob_read_on_redirect_is_rejected() {
    let archive = open_wiki().await;
    let cherry = archive.entry_by_url('A', "Cherry.html").await.unwrap().unwrap();
    assert!(matches!(
        archive.read_blob(&cherry).await,
        Err(ZimError::NotContent)
    ));
}

#[tokio::test]
async fn split_volumes_read_like_one_archive() {
    let bytes = wiki_bytes();

    // Slice the archive into three unequal volumes, handed over unsorted;
    // case-insensitive name order must reassemble them.
    let a = bytes[..137].to_vec();
    let b = bytes[137..311].to_vec();
    let c = bytes[311..].to_vec();
    let source = SegmentedSource::from_volumes(vec![
        ("wiki.zimab".to_string(), MemoryVolume::new(b)),
        ("wiki.ZIMAC".to_string(), MemoryVolume::new(c)),
        ("wiki.zimaa".to_string(), MemoryVolume::new(a)),
    ]);

    let archive = ZimArchive::open(source).await.unwrap();
    assert_eq!(archive.article_count(), 8);

    let zima = archive.entry_by_url('A', "Zima.html").await.unwrap().unwrap();
    assert_eq!(archive.read_blob(&zima).await.unwrap(), zima_html());
}

#[tokio::test]
async fn local_volume_reads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wiki.zim");
    std::fs::write(&path, wiki_bytes()).unwrap();

    let volume = LocalVolume::open(&path).unwrap();
    let archive = ZimArchive::open(SegmentedSource::single(volume)).await.unwrap();

    let apple = archive.entry_by_url('A', "Apple.html").await.unwrap().unwrap();
    assert_eq!(archive.read_blob(&apple).await.unwrap(), apple_html());
}

#[tokio::test]
async fn truncated_source_is_a_malformed_header() {
    let source = SegmentedSource::single(MemoryVolume::new(vec![0u8; 10]));
    assert!(matches!(
        ZimArchive::open(source).await,
        Err(ZimError::MalformedHeader)
    ));
}
