use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::kit::{Document, Node};
use crate::presets::{PresetVariation, BUILTIN_JOBS, LOADOUTS_ROOT, PRESET_SETS};
use crate::{KitError, Result};

const OUTFIT_KIND: &str = "Outfit";
const SKIN_KEY: &str = "Skin";

/// One `(Type, Item, Skin)` override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariationEntry {
    pub kind: String,
    pub item: String,
    pub skin: String,
}

impl VariationEntry {
    pub fn new(kind: impl Into<String>, item: impl Into<String>, skin: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            item: item.into(),
            skin: skin.into(),
        }
    }
}

/// Ordered overrides producing one derived kit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Variation {
    entries: Vec<VariationEntry>,
}

impl Variation {
    pub fn new(entries: Vec<VariationEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[VariationEntry] {
        &self.entries
    }

    fn from_preset(preset: PresetVariation) -> Self {
        Self::new(
            preset
                .iter()
                .map(|(kind, item, skin)| VariationEntry::new(*kind, *item, *skin))
                .collect(),
        )
    }
}

/// Applies `variation` to a copy of `template`.
///
/// Only direct children of top-level `Outfit` nodes are considered. Each
/// match gets its `Item` and `Skin` overwritten; nothing else changes. An
/// entry matching nothing is not an error.
pub fn instantiate(template: &Document, variation: &Variation) -> Document {
    let mut doc = template.clone();

    for entry in variation.entries() {
        let mut hits = 0usize;
        for outfit in doc
            .nodes_mut()
            .iter_mut()
            .filter(|node| node.kind() == OUTFIT_KIND)
        {
            for piece in outfit
                .children_mut()
                .iter_mut()
                .filter(|node| node.kind() == entry.kind)
            {
                apply_entry(piece, entry);
                hits += 1;
            }
        }
        if hits == 0 {
            debug!(kind = %entry.kind, "no outfit piece matched");
        }
    }

    doc
}

fn apply_entry(piece: &mut Node, entry: &VariationEntry) {
    piece.set_item(entry.item.as_str());
    piece.set_attribute(SKIN_KEY, entry.skin.as_str());
}

/// One document per variation, in list order.
pub fn instantiate_all(template: &Document, variations: &[Variation]) -> Vec<Document> {
    variations
        .iter()
        .map(|variation| instantiate(template, variation))
        .collect()
}

fn with_suffix(prefix: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(prefix.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// `<prefix>-template.json`
pub fn template_path(prefix: &Path) -> PathBuf {
    with_suffix(prefix, "-template.json")
}

/// `<prefix><index>.kit`, `index` being 1-based.
pub fn variant_path(prefix: &Path, index: usize) -> PathBuf {
    with_suffix(prefix, &format!("{index}.kit"))
}

/// A template to expand and the name of the variation set to expand it with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateJob {
    pub prefix: String,
    pub variations: String,
}

/// Which templates get expanded, and with what.
///
/// A job may name a set defined in `variation_sets` or one of the stock
/// sets (`standard`, `hvt`, `dark_pants`); plan-defined sets win.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationPlan {
    #[serde(default)]
    pub root: Option<PathBuf>,
    #[serde(default)]
    pub variation_sets: BTreeMap<String, Vec<Variation>>,
    pub templates: Vec<TemplateJob>,
}

#[derive(Debug, Clone)]
pub(crate) struct ResolvedJob {
    pub prefix: PathBuf,
    pub variations: Vec<Variation>,
}

impl GenerationPlan {
    /// The stock Narcos plan.
    pub fn builtin() -> Self {
        Self {
            root: Some(PathBuf::from(LOADOUTS_ROOT)),
            variation_sets: BTreeMap::new(),
            templates: BUILTIN_JOBS
                .iter()
                .map(|(prefix, set)| TemplateJob {
                    prefix: prefix.to_string(),
                    variations: set.to_string(),
                })
                .collect(),
        }
    }

    pub fn from_json_str(src: &str) -> serde_json::Result<Self> {
        serde_json::from_str(src)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| KitError::io(path, e))?;
        serde_json::from_slice(&bytes).map_err(|e| KitError::json(path, e))
    }

    pub fn variation_set(&self, name: &str) -> Option<Vec<Variation>> {
        if let Some(set) = self.variation_sets.get(name) {
            return Some(set.clone());
        }
        PRESET_SETS
            .iter()
            .find(|(preset_name, _)| *preset_name == name)
            .map(|(_, preset)| preset.iter().copied().map(Variation::from_preset).collect())
    }

    /// Resolves every job up front so a bad set name fails before anything
    /// is written. `root_override` takes precedence over `root`.
    pub(crate) fn resolve(&self, root_override: Option<&Path>) -> Result<Vec<ResolvedJob>> {
        let root = root_override
            .or(self.root.as_deref())
            .unwrap_or(Path::new("."));

        self.templates
            .iter()
            .map(|job| {
                let variations = self.variation_set(&job.variations).ok_or_else(|| {
                    KitError::Config(format!(
                        "template {} names unknown variation set '{}'",
                        job.prefix, job.variations
                    ))
                })?;
                Ok(ResolvedJob {
                    prefix: root.join(&job.prefix),
                    variations,
                })
            })
            .collect()
    }
}
