//! confluence-extract: Web API catalog extraction
//!
//! Turns one browser object graph snapshot into a catalog of
//! `interface -> [member]`:
//!
//! 1. [`ApiClassifier`] registers constructors, prototypes and library
//!    globals and attributes members to them
//! 2. [`assemble`] emits one catalog entry per constructor name
//! 3. the [`postprocess`] pipeline applies configured corrections
//! 4. the catalog is normalized (sorted, deduplicated, no empty interfaces)
//!
//! Extraction is a pure function of the graph and the configuration. Batch
//! runs over many snapshots live in [`batch`].
//!
//! # Example
//!
//! ```
//! use confluence_extract::{extract_catalog, ExtractionConfig};
//! use confluence_graph::GraphBuilder;
//!
//! let graph = GraphBuilder::new(1)
//!     .function(2, "Foo")
//!     .object(3)
//!     .function(4, "bar")
//!     .primitive(9, "null")
//!     .property(1, "Foo", 2)
//!     .property(2, "prototype", 3)
//!     .reserved(3, "constructor", 2)
//!     .property(3, "bar", 4)
//!     .prototype(3, 9)
//!     .build()
//!     .unwrap();
//!
//! let catalog = extract_catalog(&graph, &ExtractionConfig::default()).unwrap();
//! assert_eq!(catalog.get("Foo").unwrap(), ["bar"]);
//! ```

mod assemble;
pub mod batch;
mod catalog;
mod chain;
mod classify;
mod config;
mod error;
mod locate;
mod members;
mod names;
pub mod postprocess;
mod provenance;

pub use assemble::assemble;
pub use catalog::Catalog;
pub use chain::PrototypeChain;
pub use classify::{ApiClassifier, ConstructorRecord};
pub use config::{ConstantType, ExtractionConfig};
pub use error::{ExtractError, Result};
pub use locate::{locate_api, ApiLocation, NodeHit};
pub use members::MemberFilter;
pub use names::NameResolver;
pub use postprocess::{Directive, Pipeline, PostProcessContext};
pub use provenance::{Api, SourceMap};

use confluence_graph::ObjectGraph;
use serde::Serialize;
use tracing::debug;

/// A catalog together with the provenance of every member
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Extraction {
    pub catalog: Catalog,
    /// `interface -> member -> source node`, restricted to the catalog
    pub sources: SourceMap,
}

impl Extraction {
    /// Every catalog member as an [`Api`] record, ascending
    ///
    /// Members inserted by add directives have no source node.
    pub fn apis(&self) -> Vec<Api> {
        self.catalog
            .iter()
            .flat_map(|(interface, members)| {
                members
                    .iter()
                    .map(move |api| Api::new(interface, api, self.sources.get(interface, api)))
            })
            .collect()
    }
}

/// Extract the API catalog of `graph`
pub fn extract_catalog(graph: &dyn ObjectGraph, config: &ExtractionConfig) -> Result<Catalog> {
    Ok(extract_catalog_with_provenance(graph, config)?.catalog)
}

/// Extract the API catalog of `graph` along with member provenance
///
/// Fails before classification on a malformed graph or an invalid
/// post-processing configuration; never returns a partial catalog.
pub fn extract_catalog_with_provenance(
    graph: &dyn ObjectGraph,
    config: &ExtractionConfig,
) -> Result<Extraction> {
    validate_graph(graph)?;
    let pipeline = Pipeline::from_config(config)?;
    let ctx = PostProcessContext::new(graph, config);
    pipeline.check_routes(&ctx)?;

    let records = ApiClassifier::new(graph, config).classify()?;
    let (mut catalog, mut sources) = assemble(&records);

    let result = pipeline.run(&mut catalog, &mut sources, &ctx);

    catalog.normalize();
    sources.retain_catalog(&catalog);
    debug!(
        interfaces = catalog.len(),
        apis = catalog.api_count(),
        post_processing_changes = result.changes,
        "extracted catalog"
    );

    Ok(Extraction { catalog, sources })
}

fn validate_graph(graph: &dyn ObjectGraph) -> Result<()> {
    let root = graph.root();
    if graph.is_type(root) {
        return Err(ExtractError::MalformedGraph(format!(
            "root node {} is not an object",
            root
        )));
    }
    Ok(())
}
