//! Catalog assembly from classified constructor records

use tracing::debug;

use crate::classify::ConstructorRecord;
use crate::{Catalog, SourceMap};

/// Emit one catalog entry per record name
///
/// Records without members or without names are skipped. When several
/// records share a name their member lists are merged; the earlier record's
/// provenance wins.
pub fn assemble(records: &[ConstructorRecord]) -> (Catalog, SourceMap) {
    let mut catalog = Catalog::new();
    let mut sources = SourceMap::new();
    let mut unnamed = 0usize;

    for record in records {
        if record.members.is_empty() {
            continue;
        }
        if record.names.is_empty() {
            unnamed += 1;
            continue;
        }
        for name in &record.names {
            catalog.add_members(name, record.member_names());
            for (api, source) in &record.members {
                sources.record(name, api, *source);
            }
        }
    }

    debug!(
        interfaces = catalog.len(),
        apis = catalog.api_count(),
        unnamed,
        "assembled catalog"
    );
    (catalog, sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use confluence_graph::NodeId;
    use indexmap::IndexMap;

    fn record(id: u32, names: &[&str], members: &[(&str, u32)]) -> ConstructorRecord {
        ConstructorRecord {
            id: NodeId(id),
            names: names.iter().map(|n| n.to_string()).collect(),
            members: members
                .iter()
                .map(|(api, source)| (api.to_string(), NodeId(*source)))
                .collect::<IndexMap<_, _>>(),
            is_library: false,
        }
    }

    #[test]
    fn test_aliases_share_members() {
        let (catalog, sources) = assemble(&[record(2, &["Image", "HTMLImageElement"], &[("src", 3)])]);
        assert_eq!(catalog.get("Image").unwrap(), ["src"]);
        assert_eq!(catalog.get("HTMLImageElement").unwrap(), ["src"]);
        assert_eq!(sources.get("HTMLImageElement", "src"), Some(NodeId(3)));
    }

    #[test]
    fn test_empty_and_unnamed_records_skipped() {
        let (catalog, sources) = assemble(&[
            record(2, &["Empty"], &[]),
            record(3, &[], &[("orphan", 3)]),
        ]);
        assert!(catalog.is_empty());
        assert!(sources.is_empty());
    }

    #[test]
    fn test_name_collision_merges() {
        let (catalog, sources) = assemble(&[
            record(2, &["Foo"], &[("a", 2), ("b", 2)]),
            record(7, &["Foo"], &[("b", 7), ("c", 7)]),
        ]);
        assert_eq!(catalog.get("Foo").unwrap(), ["a", "b", "c"]);
        assert_eq!(sources.get("Foo", "b"), Some(NodeId(2)));
        assert_eq!(sources.get("Foo", "c"), Some(NodeId(7)));
    }
}
