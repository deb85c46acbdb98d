use std::path::Path;
use tracing::{error, info};

use vaultport_engine::io::{self, IoError};
use vaultport_engine::store::{
    BlobStore, PageId, PageStore, TitleCache, TitleFetcher, UploadCache, upload_references,
};
use vaultport_engine::{
    BlockBuilder, NoteParser, Resolver, Segmenter, UnresolvedRef, UploadReport,
};

const NOTE_ICON: &str = "📄";
const DEFAULT_FOLDER_ICON: &str = "📁";

/// Counters printed in the end-of-run summary.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Stats {
    pub directories: usize,
    pub notes: usize,
    pub files: usize,
    pub errors: usize,
}

/// Walks a vault tree and mirrors it into the page store: directories
/// become icon-tagged pages, notes become child pages with their block
/// content. One note failing never stops the run.
pub struct Migrator<'a> {
    pages: &'a mut dyn PageStore,
    blobs: &'a mut dyn BlobStore,
    fetcher: &'a dyn TitleFetcher,
    parser: NoteParser,
    titles: TitleCache,
    uploads: UploadCache,
    report: UploadReport,
    stats: Stats,
}

impl<'a> Migrator<'a> {
    pub fn new(
        pages: &'a mut dyn PageStore,
        blobs: &'a mut dyn BlobStore,
        fetcher: &'a dyn TitleFetcher,
        resolver: Resolver,
    ) -> Self {
        Self {
            pages,
            blobs,
            fetcher,
            parser: NoteParser::new(resolver),
            titles: TitleCache::new(),
            uploads: UploadCache::new(),
            report: UploadReport::default(),
            stats: Stats::default(),
        }
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Upload outcomes and unresolved references accumulated over the run,
    /// for the report writers.
    pub fn into_outcome(mut self) -> (UploadReport, Vec<UnresolvedRef>) {
        (self.report, self.parser.take_unresolved())
    }

    /// Migrates the contents of `root` directly under `destination`.
    pub fn run(&mut self, root: &Path, destination: &PageId) -> Result<(), IoError> {
        self.migrate_contents(root, destination, 0)
    }

    fn migrate_contents(&mut self, dir: &Path, parent: &PageId, depth: usize) -> Result<(), IoError> {
        let listing = io::list_dir(dir)?;

        // subdirectories first so they sit above the notes in the page
        for subdir in &listing.subdirs {
            self.migrate_directory(subdir, parent, depth);
        }
        for note in &listing.notes {
            self.migrate_note(note, parent, depth);
        }
        Ok(())
    }

    fn migrate_directory(&mut self, dir: &Path, parent: &PageId, depth: usize) {
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!("{}📁 {name}/", "  ".repeat(depth));

        let page = match self.pages.create_page(parent, &name, Some(folder_icon(&name))) {
            Ok(page) => page,
            Err(err) => {
                error!("{}❌ Failed: {err}", "  ".repeat(depth));
                self.stats.errors += 1;
                return;
            }
        };
        self.stats.directories += 1;

        if let Err(err) = self.migrate_contents(dir, &page, depth + 1) {
            error!("{}❌ Failed: {err}", "  ".repeat(depth));
            self.stats.errors += 1;
        }
    }

    fn migrate_note(&mut self, path: &Path, parent: &PageId, depth: usize) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!("{}📄 {name}", "  ".repeat(depth));

        if let Err(err) = self.try_migrate_note(path, parent) {
            error!("{}❌ Failed: {err}", "  ".repeat(depth));
            self.stats.errors += 1;
        }
    }

    fn try_migrate_note(&mut self, path: &Path, parent: &PageId) -> anyhow::Result<()> {
        let ir = self.parser.parse_file(path)?;

        let page = self
            .pages
            .create_page(parent, &ir.page_title(), Some(NOTE_ICON))?;

        let attachments = upload_references(
            &ir.references,
            &page,
            &mut *self.blobs,
            &mut self.uploads,
            &mut self.report,
        );
        self.stats.files += ir.references.iter().filter(|r| r.is_resolved()).count();

        let segmenter = Segmenter::new(self.fetcher, &mut self.titles);
        let blocks = BlockBuilder::new(segmenter).build(&ir, &attachments);

        if !blocks.is_empty() {
            self.pages.append_blocks(&page, &blocks)?;
        }
        self.stats.notes += 1;
        Ok(())
    }
}

fn folder_icon(name: &str) -> &'static str {
    match name.to_lowercase().as_str() {
        "journal" | "journals" => "📓",
        "area" | "areas" | "templates" => "📋",
        "notes" | "note" => "📝",
        "resources" | "resource" => "📚",
        "archive" | "archives" => "🗄️",
        "reference" | "references" => "📖",
        "projects" | "project" => "📂",
        "inbox" => "📥",
        "daily" | "daily notes" => "📅",
        "weekly" => "📆",
        _ => DEFAULT_FOLDER_ICON,
    }
}
