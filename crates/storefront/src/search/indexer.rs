//! Search index builder.
//!
//! The index is rebuilt from scratch whenever a new catalog snapshot is
//! loaded. Catalogs are small, so the build is synchronous and in memory.

use modshelf_core::Catalog;
use tantivy::tokenizer::{LowerCaser, RemoveLongFilter, SimpleTokenizer, TextAnalyzer};
use tantivy::{Index, IndexWriter, TantivyDocument};
use tracing::{debug, info, instrument};

use super::{SearchError, SearchFields, SearchIndex, TOKENIZER};

/// Build an in-memory index over every item in `catalog`.
///
/// # Errors
///
/// Returns an error if the writer cannot be created or the commit fails.
#[instrument(skip_all, fields(items = catalog.len()))]
pub fn build_index(catalog: &Catalog) -> Result<(Index, SearchFields), SearchError> {
    let (schema, fields) = SearchIndex::build_schema();
    let index = Index::create_in_ram(schema);

    index.tokenizers().register(
        TOKENIZER,
        TextAnalyzer::builder(SimpleTokenizer::default())
            .filter(RemoveLongFilter::limit(40))
            .filter(LowerCaser)
            .build(),
    );

    let mut writer: IndexWriter<TantivyDocument> = index
        .writer_with_num_threads(1, 50_000_000)
        .map_err(|e| SearchError::Build(format!("Failed to create writer: {e}")))?;

    for (position, item) in catalog.items().iter().enumerate() {
        let mut doc = TantivyDocument::default();
        doc.add_u64(fields.position, position as u64);
        doc.add_text(fields.name, &item.name);
        for keyword in &item.keywords {
            doc.add_text(fields.keywords, keyword);
        }
        for tag in &item.tags {
            doc.add_text(fields.tags, tag);
        }
        if let Some(description) = &item.description {
            doc.add_text(fields.description, description);
        }
        if let Some(long_description) = &item.long_description {
            doc.add_text(fields.long_description, long_description);
        }
        doc.add_text(fields.kind, &item.kind);

        writer
            .add_document(doc)
            .map_err(|e| SearchError::Build(format!("Failed to add document: {e}")))?;
        debug!(name = %item.name, position, "Indexed item");
    }

    writer
        .commit()
        .map_err(|e| SearchError::Build(format!("Failed to commit index: {e}")))?;

    info!(docs = catalog.len(), "Search index built");
    Ok((index, fields))
}
