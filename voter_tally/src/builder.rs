pub use crate::config::*;
use crate::random::RandomSource;
use crate::{check_areas, check_candidates, Election};

/// A builder for assembling the parameters of a voter roll.
///
/// The areas and candidates are checked as they are added, so that the
/// errors point at the offending input.
///
/// ```
/// pub use voter_tally::builder::RollBuilder;
/// pub use voter_tally::{seeded_source, RollRules};
/// # use voter_tally::TallyErrors;
///
/// let mut builder = RollBuilder::new(&RollRules::default())?
///     .areas(&["Guntur".to_string(), "Vizag".to_string()])?
///     .candidates(&["Anna".to_string(), "Bob".to_string()])?;
///
/// builder.voter_count(20)?;
/// let election = builder.build(&mut seeded_source(7))?;
/// assert_eq!(election.records().len(), 20);
///
/// # Ok::<(), TallyErrors>(())
/// ```
pub struct RollBuilder {
    pub(crate) _rules: RollRules,
    pub(crate) _areas: Vec<String>,
    pub(crate) _candidates: Vec<Candidate>,
}

impl RollBuilder {
    pub fn new(rules: &RollRules) -> Result<RollBuilder, TallyErrors> {
        if rules.min_age > rules.max_age {
            return Err(TallyErrors::InvalidAgeRange {
                min: rules.min_age,
                max: rules.max_age,
            });
        }
        Ok(RollBuilder {
            _rules: rules.clone(),
            _areas: Vec::new(),
            _candidates: Vec::new(),
        })
    }

    pub fn areas(self, areas: &[String]) -> Result<RollBuilder, TallyErrors> {
        check_areas(areas)?;
        Ok(RollBuilder {
            _rules: self._rules,
            _areas: areas.to_vec(),
            _candidates: self._candidates,
        })
    }

    /// Registers the candidates by name. They receive the ids 1, 2, ... in
    /// the given order.
    pub fn candidates(self, names: &[String]) -> Result<RollBuilder, TallyErrors> {
        let cands: Vec<Candidate> = names
            .iter()
            .enumerate()
            .map(|(idx, name)| Candidate {
                id: CandidateId((idx + 1) as u32),
                name: name.clone(),
            })
            .collect();
        self.candidate_set(&cands)
    }

    /// Registers candidates that already carry their ids.
    pub fn candidate_set(self, cands: &[Candidate]) -> Result<RollBuilder, TallyErrors> {
        check_candidates(cands)?;
        Ok(RollBuilder {
            _rules: self._rules,
            _areas: self._areas,
            _candidates: cands.to_vec(),
        })
    }

    /// Adds one more candidate to the ones already registered.
    pub fn add_candidate(&mut self, candidate: Candidate) -> Result<(), TallyErrors> {
        if self._candidates.iter().any(|c| c.id == candidate.id) {
            return Err(TallyErrors::DuplicateCandidate(candidate.id));
        }
        self._candidates.push(candidate);
        Ok(())
    }

    pub fn voter_count(&mut self, count: u32) -> Result<(), TallyErrors> {
        if count == 0 {
            return Err(TallyErrors::EmptyRoll);
        }
        self._rules.voter_count = count;
        Ok(())
    }

    pub fn weighting(&mut self, weighting: VoteWeighting) -> Result<(), TallyErrors> {
        if let VoteWeighting::Favored { share_percent, .. } = weighting {
            if share_percent > 100 {
                return Err(TallyErrors::InvalidShare(share_percent));
            }
        }
        self._rules.weighting = weighting;
        Ok(())
    }

    pub fn rules(&self) -> &RollRules {
        &self._rules
    }

    /// Generates the roll. The remaining checks (favored candidate, missing
    /// areas or candidates) happen here.
    pub fn build<R: RandomSource>(&self, rng: &mut R) -> Result<Election, TallyErrors> {
        Election::generate(&self._rules, &self._areas, &self._candidates, rng)
    }
}
