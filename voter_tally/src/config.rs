// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The identifier of a voter. Identifiers are assigned from 1 upwards.
pub type VoterId = u32;

/// The identifier of a candidate.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct CandidateId(pub u32);

impl Display for CandidateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
}

impl Candidate {
    pub fn new(id: u32, name: &str) -> Candidate {
        Candidate {
            id: CandidateId(id),
            name: name.to_string(),
        }
    }
}

/// One synthetic voter.
///
/// Records are created once by the generator and never modified afterwards.
/// `voted_for` is set if and only if the voter is eligible.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VoterRecord {
    pub id: VoterId,
    pub name: String,
    pub secret: String,
    pub age: u32,
    pub area: String,
    pub eligible: bool,
    pub senior: bool,
    pub voted_for: Option<CandidateId>,
}

impl VoterRecord {
    /// The display name shown for a voter: `User<id>`.
    pub fn display_name(id: VoterId) -> String {
        format!("{}{}", crate::gate::USER_PREFIX, id)
    }

    pub fn has_voted(&self) -> bool {
        self.voted_for.is_some()
    }
}

// ******** Output data structures *********

/// The statistics derived from a voter roll.
///
/// It is recomputed every time a result view is requested.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AggregateResult {
    /// The vote count of every registered candidate, in increasing candidate order.
    pub tally: Vec<(CandidateId, u64)>,
    pub winner: CandidateId,
    pub winner_votes: u64,
    pub total_records: u64,
    pub eligible: u64,
    pub votes_cast: u64,
    pub seniors: u64,
    pub senior_voted: u64,
    /// The distinct areas where at least one voter chose the winner, sorted.
    pub winning_areas: Vec<String>,
}

impl AggregateResult {
    /// Votes cast over eligible voters, as a percentage.
    pub fn turnout(&self) -> f64 {
        percentage(self.votes_cast, self.eligible)
    }

    /// Votes cast by seniors over the number of seniors, as a percentage.
    pub fn senior_turnout(&self) -> f64 {
        percentage(self.senior_voted, self.seniors)
    }

    pub fn count_for(&self, cid: CandidateId) -> u64 {
        self.tally
            .iter()
            .find(|(c, _)| *c == cid)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    /// The share of the votes cast that went to this candidate, as a percentage.
    /// This is the slice size in the pie chart.
    pub fn vote_share(&self, cid: CandidateId) -> f64 {
        percentage(self.count_for(cid), self.votes_cast)
    }
}

fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        (100.0 * part as f64 / whole as f64).clamp(0.0, 100.0)
    }
}

/// Errors that prevent generating or aggregating a voter roll.
///
/// All the variants except `UnknownCandidate` are configuration errors: they
/// describe generation parameters that cannot produce a valid roll.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum TallyErrors {
    EmptyRoll,
    NoAreas,
    EmptyAreaName,
    DuplicateArea(String),
    NoCandidates,
    DuplicateCandidate(CandidateId),
    InvalidAgeRange { min: u32, max: u32 },
    UnknownFavoredCandidate(CandidateId),
    InvalidShare(u32),
    /// A record voted for a candidate that is not registered.
    UnknownCandidate {
        voter: VoterId,
        candidate: CandidateId,
    },
}

impl TallyErrors {
    pub fn is_configuration(&self) -> bool {
        !matches!(self, TallyErrors::UnknownCandidate { .. })
    }
}

impl Error for TallyErrors {}

impl Display for TallyErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TallyErrors::EmptyRoll => write!(f, "the number of voters must be positive"),
            TallyErrors::NoAreas => write!(f, "at least one area is required"),
            TallyErrors::EmptyAreaName => write!(f, "area names may not be empty"),
            TallyErrors::DuplicateArea(name) => write!(f, "area {:?} is listed twice", name),
            TallyErrors::NoCandidates => write!(f, "at least one candidate is required"),
            TallyErrors::DuplicateCandidate(cid) => {
                write!(f, "candidate id {} is registered twice", cid)
            }
            TallyErrors::InvalidAgeRange { min, max } => {
                write!(f, "invalid age range: {} is greater than {}", min, max)
            }
            TallyErrors::UnknownFavoredCandidate(cid) => {
                write!(f, "favored candidate {} is not registered", cid)
            }
            TallyErrors::InvalidShare(share) => {
                write!(f, "favored share must be between 0 and 100, got {}", share)
            }
            TallyErrors::UnknownCandidate { voter, candidate } => write!(
                f,
                "voter {} voted for unregistered candidate {}",
                voter, candidate
            ),
        }
    }
}

// ********* Configuration **********

/// How an eligible voter picks a candidate.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum VoteWeighting {
    /// Every candidate is equally likely.
    Uniform,
    /// The given candidate receives `share_percent` percent of the weight, the
    /// rest is split evenly between the other candidates.
    Favored {
        candidate: CandidateId,
        share_percent: u32,
    },
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RollRules {
    pub voter_count: u32,
    /// Inclusive bounds of the age distribution.
    pub min_age: u32,
    pub max_age: u32,
    pub eligibility_age: u32,
    pub senior_age: u32,
    pub weighting: VoteWeighting,
    pub default_secret: String,
}

impl RollRules {
    pub const DEFAULT_VOTER_COUNT: u32 = 100;
    pub const DEFAULT_MIN_AGE: u32 = 10;
    pub const DEFAULT_MAX_AGE: u32 = 100;
    pub const DEFAULT_ELIGIBILITY_AGE: u32 = 18;
    pub const DEFAULT_SENIOR_AGE: u32 = 60;
    pub const DEFAULT_SECRET: &'static str = "1234";
    pub const DEFAULT_WEIGHTING: VoteWeighting = VoteWeighting::Favored {
        candidate: CandidateId(1),
        share_percent: 60,
    };

    pub fn is_eligible(&self, age: u32) -> bool {
        age >= self.eligibility_age
    }

    pub fn is_senior(&self, age: u32) -> bool {
        age >= self.senior_age
    }

    /// Returns the first record invariant that `record` breaks under these
    /// thresholds, if any. Useful for records that were not generated in
    /// this run.
    pub fn record_violation(&self, record: &VoterRecord) -> Option<&'static str> {
        if record.id == 0 {
            return Some("the id is not a positive integer");
        }
        if record.eligible != self.is_eligible(record.age) {
            return Some("the eligibility flag does not match the age");
        }
        if record.senior != self.is_senior(record.age) {
            return Some("the senior flag does not match the age");
        }
        if record.voted_for.is_some() != record.eligible {
            return Some("only eligible voters have a vote");
        }
        None
    }
}

impl Default for RollRules {
    fn default() -> Self {
        RollRules {
            voter_count: RollRules::DEFAULT_VOTER_COUNT,
            min_age: RollRules::DEFAULT_MIN_AGE,
            max_age: RollRules::DEFAULT_MAX_AGE,
            eligibility_age: RollRules::DEFAULT_ELIGIBILITY_AGE,
            senior_age: RollRules::DEFAULT_SENIOR_AGE,
            weighting: RollRules::DEFAULT_WEIGHTING,
            default_secret: RollRules::DEFAULT_SECRET.to_string(),
        }
    }
}

pub const DEFAULT_AREAS: [&str; 17] = [
    "Kadapa",
    "PDTR",
    "Madanapalle",
    "Nellore",
    "Kurnool",
    "Srikakulam",
    "Vizag",
    "Guntur",
    "Vijayawada",
    "Anantapur",
    "Tirupati",
    "Chittoor",
    "Rajahmundry",
    "Eluru",
    "Ongole",
    "Machilipatnam",
    "Kakinada",
];

pub fn default_areas() -> Vec<String> {
    DEFAULT_AREAS.iter().map(|s| s.to_string()).collect()
}

pub fn default_candidates() -> Vec<Candidate> {
    vec![
        Candidate::new(1, "Jagan"),
        Candidate::new(2, "Pavan"),
        Candidate::new(3, "CBN"),
    ]
}
