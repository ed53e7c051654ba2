/*!
Synthetic voter rolls for election result demos.

The crate generates a roll of voters with random ages, areas and votes,
aggregates the roll into vote tallies and turnout figures, and signs a
viewer in against the roll.

```
use voter_tally::*;

let election = Election::generate(
    &RollRules::default(),
    &default_areas(),
    &default_candidates(),
    &mut seeded_source(42),
)?;
let result = election.aggregate()?;
assert!(result.votes_cast <= result.eligible);
assert_eq!(election.authenticate("User5", "1234").map(|r| r.id), Ok(5));
# Ok::<(), TallyErrors>(())
```

See the [manual] for the generation rules.
*/
mod config;
mod random;

pub mod builder;
pub mod gate;
pub mod manual;

use log::{debug, info};

use std::collections::{BTreeMap, BTreeSet, HashSet};

pub use crate::config::*;
pub use crate::gate::{authenticate, AuthError, Session};
pub use crate::random::*;

/// Generates `rules.voter_count` voters with identifiers `1..=voter_count`.
///
/// For every voter, the age is drawn uniformly from the age range of the
/// rules and the area uniformly from `areas`. Eligible voters always vote,
/// following the weighting of the rules.
pub fn generate_records<R: RandomSource>(
    rules: &RollRules,
    areas: &[String],
    candidates: &[Candidate],
    rng: &mut R,
) -> Result<Vec<VoterRecord>, TallyErrors> {
    check_rules(rules, areas, candidates)?;
    info!(
        "Generating {} voters over {} areas and {} candidates, rules: {:?}",
        rules.voter_count,
        areas.len(),
        candidates.len(),
        rules
    );

    let mut records: Vec<VoterRecord> = Vec::with_capacity(rules.voter_count as usize);
    for id in 1..=rules.voter_count {
        let age = rng.int_in_range(rules.min_age, rules.max_age);
        let area = areas[rng.index(areas.len())].clone();
        let eligible = rules.is_eligible(age);
        let voted_for = if eligible {
            Some(pick_candidate(rules.weighting, candidates, rng))
        } else {
            None
        };
        records.push(VoterRecord {
            id,
            name: VoterRecord::display_name(id),
            secret: rules.default_secret.clone(),
            age,
            area,
            eligible,
            senior: rules.is_senior(age),
            voted_for,
        });
    }
    debug!(
        "generate_records: {} eligible voters",
        records.iter().filter(|r| r.eligible).count()
    );
    Ok(records)
}

fn pick_candidate<R: RandomSource>(
    weighting: VoteWeighting,
    candidates: &[Candidate],
    rng: &mut R,
) -> CandidateId {
    match weighting {
        VoteWeighting::Uniform => candidates[rng.index(candidates.len())].id,
        VoteWeighting::Favored {
            candidate,
            share_percent,
        } => {
            let others: Vec<CandidateId> = candidates
                .iter()
                .map(|c| c.id)
                .filter(|cid| *cid != candidate)
                .collect();
            if others.is_empty() || rng.unit() < share_percent as f64 / 100.0 {
                candidate
            } else {
                others[rng.index(others.len())]
            }
        }
    }
}

pub(crate) fn check_candidates(candidates: &[Candidate]) -> Result<(), TallyErrors> {
    if candidates.is_empty() {
        return Err(TallyErrors::NoCandidates);
    }
    let mut seen: HashSet<CandidateId> = HashSet::new();
    for c in candidates {
        if !seen.insert(c.id) {
            return Err(TallyErrors::DuplicateCandidate(c.id));
        }
    }
    Ok(())
}

pub(crate) fn check_areas(areas: &[String]) -> Result<(), TallyErrors> {
    if areas.is_empty() {
        return Err(TallyErrors::NoAreas);
    }
    let mut seen: HashSet<&str> = HashSet::new();
    for a in areas {
        if a.trim().is_empty() {
            return Err(TallyErrors::EmptyAreaName);
        }
        if !seen.insert(a.as_str()) {
            return Err(TallyErrors::DuplicateArea(a.clone()));
        }
    }
    Ok(())
}

fn check_rules(
    rules: &RollRules,
    areas: &[String],
    candidates: &[Candidate],
) -> Result<(), TallyErrors> {
    if rules.voter_count == 0 {
        return Err(TallyErrors::EmptyRoll);
    }
    if rules.min_age > rules.max_age {
        return Err(TallyErrors::InvalidAgeRange {
            min: rules.min_age,
            max: rules.max_age,
        });
    }
    check_areas(areas)?;
    check_candidates(candidates)?;
    if let VoteWeighting::Favored {
        candidate,
        share_percent,
    } = rules.weighting
    {
        if !candidates.iter().any(|c| c.id == candidate) {
            return Err(TallyErrors::UnknownFavoredCandidate(candidate));
        }
        if share_percent > 100 {
            return Err(TallyErrors::InvalidShare(share_percent));
        }
    }
    Ok(())
}

/// Computes the tallies and turnout figures of a roll.
///
/// Every candidate appears in the tally, with zero votes if nobody chose
/// them. The winner is the candidate with the most votes; ties go to the
/// lowest candidate id.
pub fn aggregate(
    records: &[VoterRecord],
    candidates: &[Candidate],
) -> Result<AggregateResult, TallyErrors> {
    check_candidates(candidates)?;
    let mut tally: BTreeMap<CandidateId, u64> = candidates.iter().map(|c| (c.id, 0)).collect();

    let mut total_records: u64 = 0;
    let mut eligible: u64 = 0;
    let mut votes_cast: u64 = 0;
    let mut seniors: u64 = 0;
    let mut senior_voted: u64 = 0;
    for r in records.iter() {
        total_records += 1;
        if r.eligible {
            eligible += 1;
        }
        if r.senior {
            seniors += 1;
        }
        if let Some(cid) = r.voted_for {
            let count = tally
                .get_mut(&cid)
                .ok_or(TallyErrors::UnknownCandidate {
                    voter: r.id,
                    candidate: cid,
                })?;
            *count += 1;
            votes_cast += 1;
            if r.senior {
                senior_voted += 1;
            }
        }
    }
    debug!("aggregate: tally: {:?}", tally);

    // The tally iterates in increasing candidate order: only a strictly
    // larger count replaces the current leader.
    let mut leader: Option<(CandidateId, u64)> = None;
    for (&cid, &count) in tally.iter() {
        match leader {
            Some((_, best)) if best >= count => {}
            _ => leader = Some((cid, count)),
        }
    }
    let (winner, winner_votes) = leader.ok_or(TallyErrors::NoCandidates)?;

    let winning_areas: BTreeSet<&str> = records
        .iter()
        .filter(|r| r.voted_for == Some(winner))
        .map(|r| r.area.as_str())
        .collect();

    info!(
        "Aggregated {} voters: winner {} with {} votes, {} of {} eligible voted",
        total_records, winner, winner_votes, votes_cast, eligible
    );
    Ok(AggregateResult {
        tally: tally.into_iter().collect(),
        winner,
        winner_votes,
        total_records,
        eligible,
        votes_cast,
        seniors,
        senior_voted,
        winning_areas: winning_areas.into_iter().map(|s| s.to_string()).collect(),
    })
}

/// The voters aged at or above the senior threshold, in roll order.
pub fn seniors(records: &[VoterRecord]) -> Vec<&VoterRecord> {
    records.iter().filter(|r| r.senior).collect()
}

/// A voter roll together with its registered candidates.
///
/// The roll does not change once the election is built.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Election {
    candidates: Vec<Candidate>,
    records: Vec<VoterRecord>,
}

impl Election {
    /// Wraps an existing roll, for instance one read back from storage.
    pub fn new(
        candidates: Vec<Candidate>,
        records: Vec<VoterRecord>,
    ) -> Result<Election, TallyErrors> {
        check_candidates(&candidates)?;
        Ok(Election {
            candidates,
            records,
        })
    }

    pub fn generate<R: RandomSource>(
        rules: &RollRules,
        areas: &[String],
        candidates: &[Candidate],
        rng: &mut R,
    ) -> Result<Election, TallyErrors> {
        let records = generate_records(rules, areas, candidates, rng)?;
        Election::new(candidates.to_vec(), records)
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn records(&self) -> &[VoterRecord] {
        &self.records
    }

    pub fn candidate_name(&self, cid: CandidateId) -> Option<&str> {
        self.candidates
            .iter()
            .find(|c| c.id == cid)
            .map(|c| c.name.as_str())
    }

    pub fn aggregate(&self) -> Result<AggregateResult, TallyErrors> {
        aggregate(&self.records, &self.candidates)
    }

    pub fn seniors(&self) -> Vec<&VoterRecord> {
        seniors(&self.records)
    }

    pub fn authenticate(
        &self,
        identifier_text: &str,
        secret: &str,
    ) -> Result<&VoterRecord, AuthError> {
        authenticate(identifier_text, secret, &self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn voter(id: VoterId, age: u32, area: &str, voted_for: Option<u32>) -> VoterRecord {
        VoterRecord {
            id,
            name: VoterRecord::display_name(id),
            secret: "1234".to_string(),
            age,
            area: area.to_string(),
            eligible: age >= 18,
            senior: age >= 60,
            voted_for: voted_for.map(CandidateId),
        }
    }

    // Replays a fixed list of draws.
    struct Scripted {
        ints: VecDeque<u32>,
        indexes: VecDeque<usize>,
        units: VecDeque<f64>,
    }

    impl RandomSource for Scripted {
        fn int_in_range(&mut self, low: u32, high: u32) -> u32 {
            let x = self.ints.pop_front().unwrap();
            assert!(low <= x && x <= high);
            x
        }
        fn index(&mut self, len: usize) -> usize {
            let x = self.indexes.pop_front().unwrap();
            assert!(x < len);
            x
        }
        fn unit(&mut self) -> f64 {
            self.units.pop_front().unwrap()
        }
    }

    #[test]
    fn generated_records_respect_thresholds() {
        init();
        let records = generate_records(
            &RollRules::default(),
            &default_areas(),
            &default_candidates(),
            &mut seeded_source(3),
        )
        .unwrap();
        assert_eq!(records.len(), 100);
        for (idx, r) in records.iter().enumerate() {
            assert_eq!(r.id as usize, idx + 1);
            assert_eq!(r.name, format!("User{}", r.id));
            assert_eq!(r.secret, "1234");
            assert!((10..=100).contains(&r.age));
            assert!(DEFAULT_AREAS.contains(&r.area.as_str()));
            assert_eq!(r.eligible, r.age >= 18);
            assert_eq!(r.senior, r.age >= 60);
            assert_eq!(r.voted_for.is_some(), r.eligible);
        }
    }

    #[test]
    fn same_seed_same_roll() {
        let gen = |seed| {
            generate_records(
                &RollRules::default(),
                &default_areas(),
                &default_candidates(),
                &mut seeded_source(seed),
            )
            .unwrap()
        };
        assert_eq!(gen(11), gen(11));
    }

    #[test]
    fn weighted_choice_follows_the_draws() {
        let rules = RollRules {
            voter_count: 3,
            ..RollRules::default()
        };
        let mut rng = Scripted {
            ints: VecDeque::from(vec![30, 12, 70]),
            indexes: VecDeque::from(vec![0, 1, 1, 0]),
            units: VecDeque::from(vec![0.59, 0.61]),
        };
        let areas = vec!["A".to_string(), "B".to_string()];
        let records =
            generate_records(&rules, &areas, &default_candidates(), &mut rng).unwrap();
        // Voter 1: favored draw under 60%.
        assert_eq!(records[0].voted_for, Some(CandidateId(1)));
        assert_eq!(records[0].area, "A");
        // Voter 2: too young, no vote drawn.
        assert_eq!(records[1].voted_for, None);
        assert_eq!(records[1].area, "B");
        // Voter 3: above 60%, first of the other candidates.
        assert_eq!(records[2].voted_for, Some(CandidateId(2)));
        assert!(records[2].senior);
    }

    #[test]
    fn single_candidate_gets_every_vote() {
        let candidates = vec![Candidate::new(1, "Only")];
        let records = generate_records(
            &RollRules::default(),
            &default_areas(),
            &candidates,
            &mut seeded_source(5),
        )
        .unwrap();
        assert!(records
            .iter()
            .filter_map(|r| r.voted_for)
            .all(|cid| cid == CandidateId(1)));
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        let areas = default_areas();
        let candidates = default_candidates();
        let mut rng = seeded_source(1);
        let zero = RollRules {
            voter_count: 0,
            ..RollRules::default()
        };
        assert_eq!(
            generate_records(&zero, &areas, &candidates, &mut rng),
            Err(TallyErrors::EmptyRoll)
        );
        assert_eq!(
            generate_records(&RollRules::default(), &[], &candidates, &mut rng),
            Err(TallyErrors::NoAreas)
        );
        assert_eq!(
            generate_records(&RollRules::default(), &areas, &[], &mut rng),
            Err(TallyErrors::NoCandidates)
        );
        let ages = RollRules {
            min_age: 50,
            max_age: 20,
            ..RollRules::default()
        };
        assert_eq!(
            generate_records(&ages, &areas, &candidates, &mut rng),
            Err(TallyErrors::InvalidAgeRange { min: 50, max: 20 })
        );
        let favored = RollRules {
            weighting: VoteWeighting::Favored {
                candidate: CandidateId(9),
                share_percent: 60,
            },
            ..RollRules::default()
        };
        assert_eq!(
            generate_records(&favored, &areas, &candidates, &mut rng),
            Err(TallyErrors::UnknownFavoredCandidate(CandidateId(9)))
        );
        let dup = vec![Candidate::new(1, "A"), Candidate::new(1, "B")];
        assert_eq!(
            generate_records(&RollRules::default(), &areas, &dup, &mut rng),
            Err(TallyErrors::DuplicateCandidate(CandidateId(1)))
        );
        assert!(TallyErrors::EmptyRoll.is_configuration());
    }

    #[test]
    fn tally_sums_to_votes_cast() {
        let records = vec![
            voter(1, 20, "Vizag", Some(1)),
            voter(2, 65, "Guntur", Some(2)),
            voter(3, 12, "Guntur", None),
            voter(4, 70, "Eluru", Some(1)),
            voter(5, 40, "Vizag", Some(1)),
        ];
        let res = aggregate(&records, &default_candidates()).unwrap();
        assert_eq!(
            res.tally,
            vec![(CandidateId(1), 3), (CandidateId(2), 1), (CandidateId(3), 0)]
        );
        let sum: u64 = res.tally.iter().map(|(_, c)| c).sum();
        assert_eq!(sum, res.votes_cast);
        assert_eq!(res.total_records, 5);
        assert_eq!(res.eligible, 4);
        assert_eq!(res.seniors, 2);
        assert_eq!(res.senior_voted, 2);
        assert_eq!(res.winner, CandidateId(1));
        assert_eq!(res.winner_votes, 3);
        assert_eq!(res.winning_areas, vec!["Eluru", "Vizag"]);
        assert_eq!(res.turnout(), 100.0);
        assert_eq!(res.vote_share(CandidateId(2)), 25.0);
    }

    #[test]
    fn ties_go_to_lowest_id() {
        let mut records: Vec<VoterRecord> = Vec::new();
        let mut id = 0;
        for (cid, n) in [(2, 10), (1, 10), (3, 5)] {
            for _ in 0..n {
                id += 1;
                records.push(voter(id, 30, &format!("Area{}", cid), Some(cid)));
            }
        }
        for _ in 0..5 {
            let res = aggregate(&records, &default_candidates()).unwrap();
            assert_eq!(res.winner, CandidateId(1));
            assert_eq!(res.winning_areas, vec!["Area1"]);
        }
    }

    #[test]
    fn empty_roll_has_zero_turnout() {
        let res = aggregate(&[], &default_candidates()).unwrap();
        assert_eq!(res.turnout(), 0.0);
        assert_eq!(res.senior_turnout(), 0.0);
        assert_eq!(res.vote_share(CandidateId(1)), 0.0);
        assert_eq!(res.winner, CandidateId(1));
        assert!(res.winning_areas.is_empty());

        let minors = vec![voter(1, 12, "Vizag", None)];
        let res = aggregate(&minors, &default_candidates()).unwrap();
        assert_eq!(res.eligible, 0);
        assert_eq!(res.turnout(), 0.0);
    }

    #[test]
    fn partial_turnout() {
        // Records read back from storage do not have to follow the generator.
        let mut abstained = voter(2, 65, "Vizag", None);
        abstained.eligible = true;
        let records = vec![voter(1, 70, "Vizag", Some(3)), abstained];
        let res = aggregate(&records, &default_candidates()).unwrap();
        assert_eq!(res.turnout(), 50.0);
        assert_eq!(res.senior_turnout(), 50.0);
        assert_eq!(res.winner, CandidateId(3));
    }

    #[test]
    fn unknown_candidate_vote_is_an_error() {
        let records = vec![voter(1, 30, "Vizag", Some(7))];
        assert_eq!(
            aggregate(&records, &default_candidates()),
            Err(TallyErrors::UnknownCandidate {
                voter: 1,
                candidate: CandidateId(7)
            })
        );
    }

    #[test]
    fn record_violations() {
        let rules = RollRules::default();
        assert_eq!(rules.record_violation(&voter(1, 30, "Vizag", Some(1))), None);
        assert_eq!(rules.record_violation(&voter(2, 12, "Vizag", None)), None);

        let mut young_senior = voter(3, 12, "Vizag", None);
        young_senior.senior = true;
        assert!(rules.record_violation(&young_senior).is_some());

        let mut minor_voter = voter(4, 12, "Vizag", Some(2));
        minor_voter.eligible = true;
        assert_eq!(
            rules.record_violation(&minor_voter),
            Some("the eligibility flag does not match the age")
        );

        let abstained = voter(5, 40, "Vizag", None);
        assert_eq!(
            rules.record_violation(&abstained),
            Some("only eligible voters have a vote")
        );

        // A roll seeded with a senior age of 65 does not fit a senior age of 60.
        let mut stored = voter(6, 62, "Vizag", Some(1));
        stored.senior = false;
        assert!(rules.record_violation(&stored).is_some());
        let rules_65 = RollRules {
            senior_age: 65,
            ..RollRules::default()
        };
        assert_eq!(rules_65.record_violation(&stored), None);
    }

    #[test]
    fn generated_records_have_no_violation() {
        let rules = RollRules::default();
        let records = generate_records(
            &rules,
            &default_areas(),
            &default_candidates(),
            &mut seeded_source(30),
        )
        .unwrap();
        assert!(records.iter().all(|r| rules.record_violation(r).is_none()));
    }

    #[test]
    fn election_context() {
        let election = Election::generate(
            &RollRules::default(),
            &default_areas(),
            &default_candidates(),
            &mut seeded_source(8),
        )
        .unwrap();
        assert_eq!(election.candidate_name(CandidateId(3)), Some("CBN"));
        assert_eq!(election.candidate_name(CandidateId(4)), None);
        assert!(election.seniors().iter().all(|r| r.age >= 60));
        let res = election.aggregate().unwrap();
        assert_eq!(res.seniors as usize, election.seniors().len());
        assert_eq!(election.authenticate("User100", "1234").unwrap().id, 100);
        assert!(Election::new(vec![], vec![]).is_err());
    }
}
