//! Post-processing: corrective passes over the interim catalog
//!
//! Directives are plain configuration ([`Directive`]); [`Pipeline`] turns them
//! into [`PostProcessor`]s, orders them by [`Stage`] and runs each once. The
//! configured blacklist runs as an extra remove-interfaces pass at the start
//! of the remove stage, so copies can still read blacklisted interfaces.
//!
//! Every pipeline accepted by [`Pipeline::from_directives`] and
//! [`Pipeline::check_routes`] is idempotent: running it on its own output
//! changes nothing.

mod directive;
mod passes;

use std::collections::HashSet;

use confluence_graph::ObjectGraph;
use tracing::debug;

use crate::{Catalog, ExtractError, ExtractionConfig, Result, SourceMap};

pub use directive::{
    default_directives, AddDirective, Citation, CopyDirective, Directive, RemoveApisDirective,
    RemoveInterfacesDirective, Stage,
};
pub use passes::{AddApis, CopyToPrototype, RemoveApis, RemoveInterfaces};

/// Read-only context available to every pass
pub struct PostProcessContext<'a> {
    /// The graph the catalog was extracted from, when available
    pub graph: Option<&'a dyn ObjectGraph>,
    pub config: &'a ExtractionConfig,
}

impl<'a> PostProcessContext<'a> {
    pub fn new(graph: &'a dyn ObjectGraph, config: &'a ExtractionConfig) -> Self {
        Self {
            graph: Some(graph),
            config,
        }
    }

    /// A context without a graph; copies without explicit targets are no-ops
    pub fn detached(config: &'a ExtractionConfig) -> Self {
        Self {
            graph: None,
            config,
        }
    }
}

/// Outcome of one pass, or of a whole pipeline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassResult {
    /// Whether the catalog changed
    pub modified: bool,
    /// Members (or interfaces) added or removed
    pub changes: usize,
}

impl PassResult {
    pub fn changed(changes: usize) -> Self {
        Self {
            modified: changes > 0,
            changes,
        }
    }

    fn merge(&mut self, other: PassResult) {
        self.modified |= other.modified;
        self.changes += other.changes;
    }
}

/// A single corrective transform over the catalog
pub trait PostProcessor: Send + Sync {
    /// Pass name for logging
    fn name(&self) -> &'static str;

    fn stage(&self) -> Stage;

    /// `(source, target)` interfaces of a copy pass, once resolved
    fn copy_route(&self, _ctx: &PostProcessContext<'_>) -> Option<(String, String)> {
        None
    }

    fn run(
        &self,
        catalog: &mut Catalog,
        sources: &mut SourceMap,
        ctx: &PostProcessContext<'_>,
    ) -> PassResult;
}

/// An ordered list of post-processors
pub struct Pipeline {
    processors: Vec<Box<dyn PostProcessor>>,
}

impl Pipeline {
    /// Build the pipeline described by `config`
    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        Self::from_directives(&config.post_processors, &config.blacklist_interfaces)
    }

    /// Build a pipeline from directives plus an optional blacklist
    ///
    /// Fails on invalid API patterns and on directive combinations that would
    /// not be idempotent.
    pub fn from_directives(directives: &[Directive], blacklist: &[String]) -> Result<Self> {
        check_idempotent(directives)?;

        let mut processors: Vec<Box<dyn PostProcessor>> = Vec::with_capacity(directives.len() + 1);
        if !blacklist.is_empty() {
            processors.push(Box::new(RemoveInterfaces::new(blacklist.to_vec())));
        }
        for directive in directives {
            processors.push(build_processor(directive)?);
        }
        // Stable: directives keep their relative order within a stage
        processors.sort_by_key(|p| p.stage());

        Ok(Self { processors })
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    /// Pass names in execution order
    pub fn pass_names(&self) -> Vec<&'static str> {
        self.processors.iter().map(|p| p.name()).collect()
    }

    /// Reject copies whose graph-resolved target is another copy's source
    ///
    /// Explicit targets are checked at construction; targets resolved from
    /// the graph can only be checked once a graph is available.
    pub fn check_routes(&self, ctx: &PostProcessContext<'_>) -> Result<()> {
        let routes: Vec<(String, String)> = self
            .processors
            .iter()
            .filter_map(|p| p.copy_route(ctx))
            .collect();
        let sources: HashSet<&str> = routes.iter().map(|(from, _)| from.as_str()).collect();
        for (from, to) in &routes {
            if to != from && sources.contains(to.as_str()) {
                return Err(ExtractError::NonIdempotentPipeline(format!(
                    "copy {} -> {} feeds another copy out of {}",
                    from, to, to
                )));
            }
        }
        Ok(())
    }

    pub fn run(
        &self,
        catalog: &mut Catalog,
        sources: &mut SourceMap,
        ctx: &PostProcessContext<'_>,
    ) -> PassResult {
        let mut total = PassResult::default();
        for processor in &self.processors {
            let result = processor.run(catalog, sources, ctx);
            debug!(
                pass = processor.name(),
                changes = result.changes,
                "post-processor finished"
            );
            total.merge(result);
        }
        total
    }
}

/// Run the pipeline configured in `config` over an already assembled catalog
pub fn post_process(
    catalog: &mut Catalog,
    sources: &mut SourceMap,
    graph: Option<&dyn ObjectGraph>,
    config: &ExtractionConfig,
) -> Result<PassResult> {
    let pipeline = Pipeline::from_config(config)?;
    let ctx = PostProcessContext { graph, config };
    pipeline.check_routes(&ctx)?;
    Ok(pipeline.run(catalog, sources, &ctx))
}

fn build_processor(directive: &Directive) -> Result<Box<dyn PostProcessor>> {
    Ok(match directive {
        Directive::Copy(d) => Box::new(CopyToPrototype::new(
            d.from_interface.clone(),
            d.to_interface.clone(),
        )),
        Directive::RemoveInterfaces(d) => Box::new(RemoveInterfaces::new(d.interfaces.clone())),
        Directive::RemoveApis(d) => {
            Box::new(RemoveApis::new(d.interfaces.clone(), &d.api_pattern)?)
        }
        Directive::Add(d) => Box::new(AddApis::new(d.interface.clone(), d.apis.clone())),
    })
}

/// Reject copy chains and copies fed by adds
///
/// A copy into an interface that another copy reads, or a copy out of an
/// interface an add fills, sees different input on a second run.
fn check_idempotent(directives: &[Directive]) -> Result<()> {
    let copy_sources: HashSet<&str> = directives
        .iter()
        .filter_map(|d| match d {
            Directive::Copy(c) => Some(c.from_interface.as_str()),
            _ => None,
        })
        .collect();
    let add_targets: HashSet<&str> = directives
        .iter()
        .filter_map(|d| match d {
            Directive::Add(a) => Some(a.interface.as_str()),
            _ => None,
        })
        .collect();

    for directive in directives {
        let Directive::Copy(copy) = directive else {
            continue;
        };
        if let Some(to) = copy.to_interface.as_deref() {
            if to != copy.from_interface && copy_sources.contains(to) {
                return Err(ExtractError::NonIdempotentPipeline(format!(
                    "copy {} -> {} feeds another copy out of {}",
                    copy.from_interface, to, to
                )));
            }
        }
        if add_targets.contains(copy.from_interface.as_str()) {
            return Err(ExtractError::NonIdempotentPipeline(format!(
                "copy out of {} reads members added after it runs",
                copy.from_interface
            )));
        }
    }
    Ok(())
}
