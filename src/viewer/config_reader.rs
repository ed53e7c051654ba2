use crate::args::Args;
use crate::viewer::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

pub const DEFAULT_TITLE: &str = "Election Commission of India - Andhra Pradesh Voting Results";

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ConfigCandidate {
    /// Defaults to the position in the list, starting at 1.
    pub id: Option<u32>,
    pub name: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWeighting {
    /// `favored` or `uniform`
    pub mode: String,
    #[serde(rename = "favoredCandidate")]
    pub favored_candidate: Option<u32>,
    #[serde(rename = "favoredShare")]
    pub favored_share: Option<u32>,
}

/// The election description, as read from the JSON configuration file.
/// Every field is optional and falls back to the built-in election.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ElectionConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(rename = "voterCount")]
    pub voter_count: Option<u32>,
    #[serde(rename = "minAge")]
    pub min_age: Option<u32>,
    #[serde(rename = "maxAge")]
    pub max_age: Option<u32>,
    #[serde(rename = "eligibilityAge")]
    pub eligibility_age: Option<u32>,
    #[serde(rename = "seniorAge")]
    pub senior_age: Option<u32>,
    #[serde(rename = "defaultPassword")]
    pub default_password: Option<String>,
    pub areas: Option<Vec<String>>,
    pub candidates: Option<Vec<ConfigCandidate>>,
    pub weighting: Option<ConfigWeighting>,
    #[serde(rename = "randomSeed")]
    _random_seed: Option<JSValue>,
    /// Path of the SQLite database, or `:memory:`.
    pub database: Option<String>,
}

impl Default for ElectionConfig {
    fn default() -> Self {
        ElectionConfig {
            title: default_title(),
            voter_count: None,
            min_age: None,
            max_age: None,
            eligibility_age: None,
            senior_age: None,
            default_password: None,
            areas: None,
            candidates: None,
            weighting: None,
            _random_seed: None,
            database: None,
        }
    }
}

impl ElectionConfig {
    /// Command line values take precedence over the file.
    pub fn with_args(mut self, args: &Args) -> ElectionConfig {
        if let Some(count) = args.count {
            self.voter_count = Some(count);
        }
        if let Some(seed) = args.seed {
            self._random_seed = Some(JSValue::from(seed));
        }
        if let Some(db) = args.db.clone() {
            self.database = Some(db);
        }
        self
    }

    pub fn random_seed(&self) -> ViewerResult<Option<u64>> {
        match &self._random_seed {
            None => Ok(None),
            Some(JSValue::Number(n)) => n.as_u64().map(Some).context(ParsingJsonNumberSnafu {
                field: "randomSeed",
            }),
            Some(JSValue::String(s)) => s.parse::<u64>().ok().map(Some).context(
                ParsingJsonNumberSnafu {
                    field: "randomSeed",
                },
            ),
            Some(_) => None.context(ParsingJsonNumberSnafu {
                field: "randomSeed",
            }),
        }
    }

    pub fn weighting(&self) -> ViewerResult<VoteWeighting> {
        let w = match &self.weighting {
            None => return Ok(RollRules::DEFAULT_WEIGHTING),
            Some(w) => w,
        };
        match w.mode.as_str() {
            "uniform" => Ok(VoteWeighting::Uniform),
            "favored" => Ok(VoteWeighting::Favored {
                candidate: CandidateId(w.favored_candidate.unwrap_or(1)),
                share_percent: w.favored_share.unwrap_or(60),
            }),
            x => whatever!("unknown weighting mode: {}", x),
        }
    }

    pub fn roll_rules(&self) -> ViewerResult<RollRules> {
        let defaults = RollRules::default();
        Ok(RollRules {
            voter_count: self.voter_count.unwrap_or(defaults.voter_count),
            min_age: self.min_age.unwrap_or(defaults.min_age),
            max_age: self.max_age.unwrap_or(defaults.max_age),
            eligibility_age: self.eligibility_age.unwrap_or(defaults.eligibility_age),
            senior_age: self.senior_age.unwrap_or(defaults.senior_age),
            weighting: self.weighting()?,
            default_secret: self
                .default_password
                .clone()
                .unwrap_or(defaults.default_secret),
        })
    }

    pub fn area_list(&self) -> Vec<String> {
        self.areas.clone().unwrap_or_else(default_areas)
    }

    pub fn candidate_list(&self) -> Vec<Candidate> {
        match &self.candidates {
            None => default_candidates(),
            Some(cands) => cands
                .iter()
                .enumerate()
                .map(|(idx, c)| Candidate {
                    id: CandidateId(c.id.unwrap_or((idx + 1) as u32)),
                    name: c.name.clone(),
                })
                .collect(),
        }
    }
}

pub fn read_config(path: &str) -> ViewerResult<ElectionConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: ElectionConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: &str) -> ViewerResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    Ok(js)
}
