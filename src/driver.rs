// ABOUTME: Pipeline driver for the slide-report application
// ABOUTME: Walks the records in order, dispatches each to its renderer and persists the result

use crate::config::{Config, FailurePolicy};
use crate::errors::Result;
use crate::fetch::HttpFetcher;
use crate::record::{self, Record};
use crate::resolver::RendererTable;
use crate::session::{Diagnostic, DocumentSession};
use log::{debug, info};
use std::path::PathBuf;

/// Outcome of a completed run
#[derive(Debug)]
pub struct RunReport {
    pub output_path: PathBuf,
    pub records: usize,
    pub slides: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// Render `records` in source order into `session`.
///
/// Unknown types are reported and skipped. Renderer failures follow `policy`;
/// failures to persist the document always end the run.
pub fn run(
    records: &[Record],
    table: &RendererTable,
    session: &mut DocumentSession,
    policy: FailurePolicy,
) -> Result<()> {
    for record in records {
        let Some(renderer) = table.resolve(record.type_tag()) else {
            session.report(Diagnostic::UnknownType {
                index: record.index(),
                value: record.raw_type(),
            });
            continue;
        };

        debug!(
            "Processing record {}, Type: '{}'",
            record.index(),
            renderer.name()
        );
        match renderer.build(record, session) {
            Ok(slide) => session.append(slide)?,
            Err(e) => match policy {
                FailurePolicy::Abort => return Err(e),
                FailurePolicy::Skip => session.report(Diagnostic::SlideSkipped {
                    index: record.index(),
                    cause: e.to_string(),
                }),
            },
        }
    }
    Ok(())
}

/// Generate the report described by `config`, end to end
pub fn generate_report(config: &Config) -> Result<RunReport> {
    config.validate()?;
    let records = record::load_records(&config.config_path)?;

    let base_dir = config.config_path.parent().filter(|p| !p.as_os_str().is_empty());
    let fetcher = HttpFetcher::new(config.fetch_timeout())?;
    let table = RendererTable::new(Box::new(fetcher), &config.picture_url, base_dir);

    let mut session = DocumentSession::create(&config.output_path)?;
    run(&records, &table, &mut session, config.failure_policy)?;

    let slides = session.slide_count();
    info!(
        "Report written to {:?}: {} slides from {} records",
        session.path(),
        slides,
        records.len()
    );
    Ok(RunReport {
        output_path: session.path().to_path_buf(),
        records: records.len(),
        slides,
        diagnostics: session.into_diagnostics(),
    })
}
