use crate::kit::Document;

pub const LEGACY_VERSION: u32 = 10;
pub const CURRENT_VERSION: u32 = 11;

/// Whether [`migrate`] would change `doc`.
pub fn needs_migration(doc: &Document) -> bool {
    doc.version() == LEGACY_VERSION
}

/// Upgrades a version 10 kit to version 11, dropping top-level entries
/// without children. Any other version is returned as is.
pub fn migrate(doc: &Document) -> Document {
    if !needs_migration(doc) {
        return doc.clone();
    }

    let nodes = doc
        .nodes()
        .iter()
        .filter(|node| node.has_children())
        .cloned()
        .collect();

    doc.with_nodes(CURRENT_VERSION, nodes)
}
