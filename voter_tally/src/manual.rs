/*!

This is the long-form manual for `voter_tally` and `tallyview`.

## The voter roll

A roll is a list of voters numbered from 1. Every voter has:
* a display name, `User<id>`
* a secret, the same for everybody (`1234` unless configured otherwise)
* an age, drawn uniformly between the minimum and maximum ages (10 and 100 by default, both included)
* an area, drawn uniformly from the list of areas
* an eligibility flag: the voter is at least 18
* a senior flag: the voter is at least 60
* a vote, present exactly when the voter is eligible

### Weighting

With the default `Favored` weighting, a vote goes to the favored candidate
(candidate 1) with probability 60%. Otherwise it goes to one of the
other candidates, each equally likely. With a single candidate, every
vote goes to it. The `Uniform` weighting draws from all the candidates
with the same probability.

Generation is reproducible: use `seeded_source` with a fixed seed and
the same configuration to obtain the same roll.

## The results

The aggregate of a roll contains:
* the number of votes of every candidate, including those with none
* the winner, the candidate with the most votes. When several candidates
  share the highest count, the one with the lowest id wins.
* the turnout, votes cast over eligible voters (0 if nobody is eligible)
* the senior turnout, votes cast by seniors over seniors (0 if there are no seniors)
* the winning areas: all the areas where at least one voter chose the winner,
  sorted alphabetically

## Signing in

A viewer signs in with a display name and the secret of that voter.
`User5` is accepted; `user5`, `User05`, `User0` and `Admin5` are rejected as
malformed. A well formed name without a voter and a wrong secret get the
same message, so that a viewer cannot tell which voters exist.

## The viewer

`tallyview` generates the roll (or reads it from an SQLite file with `--db`),
then reads commands from the standard input:

```text
login User5 1234
seniors
voters
refresh
logout
quit
```

The aggregate can be written as JSON with `--out`, and checked against a
previous summary with `--reference`.

*/
