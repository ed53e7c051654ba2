// Text rendering of the result view.

use crate::viewer::*;

use std::fmt::Write as _;

const CHART_WIDTH: usize = 40;

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ViewLabels {
    pub title: String,
    pub senior_age: u32,
}

impl ViewLabels {
    /// The senior age must be the one the store checks its rows against, so
    /// that the senior table heading matches its rows.
    pub fn new(title: &str, rules: &RollRules) -> ViewLabels {
        ViewLabels {
            title: title.to_string(),
            senior_age: rules.senior_age,
        }
    }
}

/// The two tables of the result view. Only one is shown at a time.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum TableView {
    Voters,
    Seniors,
}

pub fn render_login(labels: &ViewLabels) -> String {
    format!(
        "{}\nLogin to View Results\nType: login <username> <password>   (help for all commands)",
        labels.title
    )
}

pub fn render_results(
    labels: &ViewLabels,
    viewer_name: &str,
    snapshot: &Snapshot,
    table: TableView,
) -> String {
    let rule = "=".repeat(labels.title.chars().count());
    let mut s = String::new();
    let _ = writeln!(s, "{}\n{}\n{}", rule, labels.title, rule);
    let _ = writeln!(s, "Welcome, {}\n", viewer_name);
    s.push_str(&render_summary(snapshot));
    s.push('\n');
    s.push_str(&render_chart(snapshot));
    s.push('\n');
    s.push_str(&render_table(labels, snapshot, table));
    s
}

pub fn render_summary(snapshot: &Snapshot) -> String {
    let res = &snapshot.result;
    let winner = candidate_label(&snapshot.election, res.winner);
    let mut s = String::new();
    let _ = writeln!(s, "Winner: {} with {} votes", winner, res.winner_votes);
    let _ = writeln!(s, "{} won in the following area(s):", winner);
    for area in res.winning_areas.iter() {
        let _ = writeln!(s, "  \u{2022} {}", area);
    }
    let _ = writeln!(
        s,
        "Turnout: {:.1}% ({} of {} eligible voters)",
        res.turnout(),
        res.votes_cast,
        res.eligible
    );
    let _ = writeln!(
        s,
        "Senior turnout: {:.1}% ({} of {} senior citizens)",
        res.senior_turnout(),
        res.senior_voted,
        res.seniors
    );
    s
}

/// The vote shares, one bar per candidate.
pub fn render_chart(snapshot: &Snapshot) -> String {
    let res = &snapshot.result;
    let names: Vec<String> = res
        .tally
        .iter()
        .map(|(cid, _)| candidate_label(&snapshot.election, *cid))
        .collect();
    let width = names.iter().map(|n| n.chars().count()).max().unwrap_or(0);
    let mut s = String::from("Vote share\n");
    for ((cid, count), name) in res.tally.iter().zip(names.iter()) {
        let share = res.vote_share(*cid);
        let bar_len = ((share / 100.0) * CHART_WIDTH as f64).round() as usize;
        let _ = writeln!(
            s,
            "  {:<width$} |{:<chart$}| {:>5.1}% ({})",
            name,
            "#".repeat(bar_len),
            share,
            count,
            width = width,
            chart = CHART_WIDTH
        );
    }
    s
}

pub fn render_table(labels: &ViewLabels, snapshot: &Snapshot, table: TableView) -> String {
    let election = &snapshot.election;
    match table {
        TableView::Voters => {
            let rows: Vec<Vec<String>> = election
                .records()
                .iter()
                .map(|r| {
                    vec![
                        r.name.clone(),
                        r.age.to_string(),
                        r.area.clone(),
                        yes_no(r.eligible),
                        match r.voted_for {
                            Some(cid) => candidate_label(election, cid),
                            None => "No".to_string(),
                        },
                    ]
                })
                .collect();
            format!(
                "Voter Summary\n{}",
                format_table(&["Name", "Age", "Address", "Eligible", "Voted For"], &rows)
            )
        }
        TableView::Seniors => {
            let rows: Vec<Vec<String>> = snapshot
                .seniors
                .iter()
                .map(|r| vec![r.name.clone(), r.age.to_string(), r.area.clone()])
                .collect();
            format!(
                "Senior Citizens (Age {}+)\n{}",
                labels.senior_age,
                format_table(&["Name", "Age", "Address"], &rows)
            )
        }
    }
}

fn candidate_label(election: &Election, cid: CandidateId) -> String {
    election
        .candidate_name(cid)
        .map(|n| n.to_string())
        .unwrap_or_else(|| format!("Candidate {}", cid))
}

fn yes_no(b: bool) -> String {
    let s = if b { "Yes" } else { "No" };
    s.to_string()
}

fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows.iter() {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }
    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(c, w)| format!("{:<w$}", c, w = *w))
            .collect::<Vec<String>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };
    let mut s = String::new();
    let _ = writeln!(s, "{}", line(headers.to_vec()));
    let _ = writeln!(
        s,
        "{}",
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<String>>()
            .join("-+-")
    );
    for row in rows.iter() {
        let _ = writeln!(s, "{}", line(row.iter().map(|c| c.as_str()).collect()));
    }
    s
}
