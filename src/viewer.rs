use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use voter_tally::*;

use std::fs;
use std::io;

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::viewer::config_reader::*;
use crate::viewer::render::ViewLabels;
use crate::viewer::store::*;

pub mod config_reader;
pub mod console;
pub mod render;
pub mod store;

#[derive(Debug, Snafu)]
pub enum ViewerError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson { source: std::io::Error, path: String },
    #[snafu(display("Error parsing the JSON content of {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Expected a non-negative integer for {field}"))]
    ParsingJsonNumber { field: String },
    #[snafu(display("Error writing the summary to {path}"))]
    WritingSummary { source: std::io::Error, path: String },
    #[snafu(display("Invalid election: {source}"))]
    Election { source: TallyErrors },
    #[snafu(display("Error accessing the voter database {path}"))]
    Database {
        source: rusqlite::Error,
        path: String,
    },
    #[snafu(display("Voter {id} in the database is invalid: {reason}"))]
    CorruptRecord { id: i64, reason: String },
    #[snafu(display("Error reading commands"))]
    ReadingInput { source: std::io::Error },
    #[snafu(display("Error writing to the console"))]
    WritingOutput { source: std::io::Error },
    #[snafu(display("Difference detected between computed summary and reference summary"))]
    ReferenceMismatch {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

impl ViewerError {
    /// True when the election described by the configuration cannot be
    /// generated, as opposed to a failure reading or writing data.
    pub fn is_configuration(&self) -> bool {
        match self {
            ViewerError::Election { source } => source.is_configuration(),
            ViewerError::ParsingJsonNumber { .. } | ViewerError::Whatever { .. } => true,
            _ => false,
        }
    }
}

pub type ViewerResult<T> = Result<T, ViewerError>;

/// What the result view shows at one point in time.
///
/// It is read again from the store every time the view is refreshed.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub election: Election,
    pub result: AggregateResult,
    pub seniors: Vec<VoterRecord>,
}

/// Reads the voter roll from a store and derives the views from it.
pub struct Viewer<'a> {
    pub labels: ViewLabels,
    candidates: Vec<Candidate>,
    store: &'a dyn RecordStore,
}

impl<'a> Viewer<'a> {
    pub fn new(labels: ViewLabels, candidates: Vec<Candidate>, store: &'a dyn RecordStore) -> Self {
        Viewer {
            labels,
            candidates,
            store,
        }
    }

    pub fn snapshot(&self) -> ViewerResult<Snapshot> {
        let records = self.store.fetch_all()?;
        let seniors = self.store.fetch_filtered(&|r: &VoterRecord| r.senior)?;
        let election = Election::new(self.candidates.clone(), records).context(ElectionSnafu {})?;
        let result = election.aggregate().context(ElectionSnafu {})?;
        debug!(
            "snapshot: {} voters, {} seniors",
            election.records().len(),
            seniors.len()
        );
        Ok(Snapshot {
            election,
            result,
            seniors,
        })
    }
}

/// Generates the roll and writes it to the store, unless the store already
/// holds one. Returns the number of voters written.
///
/// A populated store is reused as is: the generation settings of the
/// configuration are then neither used nor checked.
pub fn seed_store(config: &ElectionConfig, store: &mut dyn RecordStore) -> ViewerResult<usize> {
    store.ensure_schema()?;
    if store.is_populated()? {
        info!("The voter store is already populated, keeping the stored roll");
        return Ok(0);
    }
    let rules = config.roll_rules()?;
    let generated = match config.random_seed()? {
        Some(seed) => {
            info!("Generating the voter roll with seed {}", seed);
            generate_records(
                &rules,
                &config.area_list(),
                &config.candidate_list(),
                &mut seeded_source(seed),
            )
        }
        None => generate_records(
            &rules,
            &config.area_list(),
            &config.candidate_list(),
            &mut entropy_source(),
        ),
    }
    .context(ElectionSnafu {})?;

    let inserted = store.seed_if_empty(&generated)?;
    info!("Seeded the voter store with {} voters", inserted);
    Ok(inserted)
}

pub fn build_summary_js(labels: &ViewLabels, snapshot: &Snapshot) -> JSValue {
    let election = &snapshot.election;
    let res = &snapshot.result;
    let name_of = |cid: CandidateId| election.candidate_name(cid).unwrap_or("Unknown");
    let tally: Vec<JSValue> = res
        .tally
        .iter()
        .map(|(cid, count)| {
            json!({
                "candidate": name_of(*cid),
                "votes": count,
                "share": format!("{:.1}", res.vote_share(*cid)),
            })
        })
        .collect();
    json!({
        "config": {
            "title": labels.title,
            "voters": res.total_records,
        },
        "results": {
            "tally": tally,
            "winner": name_of(res.winner),
            "winnerVotes": res.winner_votes,
            "winningAreas": res.winning_areas,
            "eligible": res.eligible,
            "votesCast": res.votes_cast,
            "turnout": format!("{:.1}", res.turnout()),
            "seniors": res.seniors,
            "seniorVoted": res.senior_voted,
            "seniorTurnout": format!("{:.1}", res.senior_turnout()),
        }
    })
}

fn write_summary(out: &str, pretty_js: &str) -> ViewerResult<()> {
    if out.is_empty() || out == "stdout" {
        println!("{}", pretty_js);
        return Ok(());
    }
    fs::write(out, pretty_js).context(WritingSummarySnafu { path: out })?;
    info!("Summary written to {}", out);
    Ok(())
}

fn check_reference(reference_path: &str, pretty_js: &str) -> ViewerResult<()> {
    let summary_ref = read_summary(reference_path)?;
    let pretty_js_ref = serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {
        path: reference_path,
    })?;
    if pretty_js_ref != pretty_js {
        warn!("Found differences with the reference summary");
        print_diff(pretty_js_ref.as_str(), pretty_js, "\n");
        return ReferenceMismatchSnafu {}.fail();
    }
    info!("The summary matches the reference {}", reference_path);
    Ok(())
}

pub fn run_viewer(args: &Args) -> ViewerResult<()> {
    let config = match &args.config {
        Some(path) => read_config(path)?,
        None => ElectionConfig::default(),
    }
    .with_args(args);
    info!("config: {:?}", config);

    // Stored rows are checked against the same thresholds the labels show.
    let rules = config.roll_rules()?;
    let mut store: Box<dyn RecordStore> = match &config.database {
        Some(path) => Box::new(SqliteStore::open(path, &rules)?),
        None => Box::new(MemoryStore::new()),
    };
    seed_store(&config, store.as_mut())?;

    let labels = ViewLabels::new(&config.title, &rules);
    let viewer = Viewer::new(labels, config.candidate_list(), store.as_ref());

    if args.out.is_some() || args.reference.is_some() {
        let snapshot = viewer.snapshot()?;
        let summary = build_summary_js(&viewer.labels, &snapshot);
        let pretty_js = serde_json::to_string_pretty(&summary).context(ParsingJsonSnafu {
            path: "summary",
        })?;
        if let Some(out) = &args.out {
            write_summary(out, &pretty_js)?;
        }
        if let Some(reference) = &args.reference {
            check_reference(reference, &pretty_js)?;
        }
    }

    if args.batch {
        return Ok(());
    }
    let stdin = io::stdin();
    let stdout = io::stdout();
    console::run_console(&viewer, stdin.lock(), &mut stdout.lock())
}
