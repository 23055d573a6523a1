use std::path::{Path, PathBuf};
use thiserror::Error;

mod kit;
mod migrate;
mod pipeline;
mod presets;
mod rewrite;
mod variation;

pub use kit::{Document, Indent, Node};
pub use migrate::{migrate, needs_migration, CURRENT_VERSION, LEGACY_VERSION};
pub use pipeline::{
    find_kit_files, run_generate, run_migrate, run_substitute, BatchReport, PipelineOptions,
    KIT_EXTENSION,
};
pub use presets::{LOADOUTS_ROOT, PROCESSING_ROOT};
pub use rewrite::{rewrite, rewrite_document, Rewrite, SubstitutionTable};
pub use variation::{
    instantiate, instantiate_all, template_path, variant_path, GenerationPlan, TemplateJob,
    Variation, VariationEntry,
};

#[derive(Debug, Error)]
pub enum KitError {
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("configuration error: {0}")]
    Config(String),
}

impl KitError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        KitError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn json(path: &Path, source: serde_json::Error) -> Self {
        KitError::Json {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, KitError>;
