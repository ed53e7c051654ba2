//! The console front end: reads one command per line and prints the views.

use std::io::{BufRead, Write};

use crate::viewer::render::*;
use crate::viewer::*;

const HELP: &str = "Commands:
  login <username> <password>   sign in, for example: login User1 1234
  voters                        show the voter summary table
  seniors                       show the senior citizens table
  refresh                       recompute and show the results again
  logout                        sign out
  quit                          exit";

/// The events the console sends to the viewer.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Event {
    LoginSubmitted { identifier: String, secret: String },
    LogoutRequested,
    RefreshRequested,
    ShowTable(TableView),
    Help,
    Quit,
    Unknown(String),
    Empty,
}

pub fn parse_event(line: &str) -> Event {
    let mut words = line.split_whitespace();
    let command = match words.next() {
        None => return Event::Empty,
        Some(c) => c,
    };
    match command.to_lowercase().as_str() {
        "login" => Event::LoginSubmitted {
            identifier: words.next().unwrap_or("").to_string(),
            secret: words.collect::<Vec<&str>>().join(" "),
        },
        "logout" => Event::LogoutRequested,
        "refresh" => Event::RefreshRequested,
        "voters" => Event::ShowTable(TableView::Voters),
        "seniors" => Event::ShowTable(TableView::Seniors),
        "help" | "?" => Event::Help,
        "quit" | "exit" => Event::Quit,
        _ => Event::Unknown(line.trim().to_string()),
    }
}

/// What the console currently shows. The table choice belongs to the
/// result screen and is reset at every sign-in.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Screen {
    Login,
    Results { table: TableView },
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Console<'v, 'a> {
    viewer: &'v Viewer<'a>,
    session: Session,
    screen: Screen,
}

impl<'v, 'a> Console<'v, 'a> {
    pub fn new(viewer: &'v Viewer<'a>) -> Self {
        Console {
            viewer,
            session: Session::default(),
            screen: Screen::Login,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn session(&self) -> Session {
        self.session
    }

    /// Applies one event and returns the text to print.
    pub fn handle(&mut self, event: Event) -> ViewerResult<(Flow, String)> {
        let labels = &self.viewer.labels;
        let text = match (event, self.screen) {
            (Event::Empty, _) => String::new(),
            (Event::Quit, _) => return Ok((Flow::Quit, "Goodbye.".to_string())),
            (Event::Help, _) => HELP.to_string(),
            (Event::Unknown(line), _) => {
                format!("Unknown command {:?}. Type help for the commands.", line)
            }
            (Event::LoginSubmitted { identifier, secret }, _) => {
                let snapshot = self.viewer.snapshot()?;
                match self
                    .session
                    .login(&identifier, &secret, snapshot.election.records())
                {
                    Ok(record) => {
                        let table = TableView::Voters;
                        self.screen = Screen::Results { table };
                        render_results(labels, &record.name, &snapshot, table)
                    }
                    Err(e) => {
                        debug!("Console: sign-in refused: {}", e);
                        format!("Error: {}", e.user_message())
                    }
                }
            }
            (Event::LogoutRequested, Screen::Results { .. }) => {
                self.session.logout();
                self.screen = Screen::Login;
                format!("Logged out.\n\n{}", render_login(labels))
            }
            (Event::RefreshRequested, Screen::Results { table }) => {
                let snapshot = self.viewer.snapshot()?;
                let name = self.viewer_name(&snapshot);
                render_results(labels, &name, &snapshot, table)
            }
            (Event::ShowTable(table), Screen::Results { .. }) => {
                self.screen = Screen::Results { table };
                let snapshot = self.viewer.snapshot()?;
                render_table(labels, &snapshot, table)
            }
            (Event::RefreshRequested, Screen::Login) => render_login(labels),
            (Event::LogoutRequested, Screen::Login) | (Event::ShowTable(_), Screen::Login) => {
                format!("Not signed in.\n\n{}", render_login(labels))
            }
        };
        Ok((Flow::Continue, text))
    }

    fn viewer_name(&self, snapshot: &Snapshot) -> String {
        match self.session.current() {
            Some(id) => snapshot
                .election
                .records()
                .iter()
                .find(|r| r.id == id)
                .map(|r| r.name.clone())
                .unwrap_or_else(|| VoterRecord::display_name(id)),
            None => String::new(),
        }
    }
}

/// Runs the console until `quit` or the end of the input.
pub fn run_console<R: BufRead, W: Write>(
    viewer: &Viewer<'_>,
    input: R,
    out: &mut W,
) -> ViewerResult<()> {
    let mut console = Console::new(viewer);
    writeln!(out, "{}", render_login(&viewer.labels)).context(WritingOutputSnafu {})?;
    for line in input.lines() {
        let line = line.context(ReadingInputSnafu {})?;
        let (flow, text) = console.handle(parse_event(&line))?;
        if !text.is_empty() {
            writeln!(out, "{}", text).context(WritingOutputSnafu {})?;
        }
        if flow == Flow::Quit {
            return Ok(());
        }
    }
    info!("End of input, leaving the viewer");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::store::MemoryStore;

    fn seeded_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.ensure_schema().unwrap();
        let records = generate_records(
            &RollRules::default(),
            &default_areas(),
            &default_candidates(),
            &mut seeded_source(12),
        )
        .unwrap();
        store.seed_if_empty(&records).unwrap();
        store
    }

    fn labels() -> ViewLabels {
        ViewLabels {
            title: "Results".to_string(),
            senior_age: 60,
        }
    }

    #[test]
    fn parses_commands() {
        assert_eq!(
            parse_event("  login User5 1234 "),
            Event::LoginSubmitted {
                identifier: "User5".to_string(),
                secret: "1234".to_string()
            }
        );
        assert_eq!(
            parse_event("login"),
            Event::LoginSubmitted {
                identifier: "".to_string(),
                secret: "".to_string()
            }
        );
        assert_eq!(parse_event("SENIORS"), Event::ShowTable(TableView::Seniors));
        assert_eq!(parse_event(""), Event::Empty);
        assert_eq!(parse_event("dance"), Event::Unknown("dance".to_string()));
    }

    #[test]
    fn login_logout_cycle() {
        let store = seeded_store();
        let viewer = Viewer::new(labels(), default_candidates(), &store);
        let mut console = Console::new(&viewer);

        let (_, text) = console.handle(parse_event("voters")).unwrap();
        assert!(text.starts_with("Not signed in."));

        let (_, text) = console.handle(parse_event("login Admin5 1234")).unwrap();
        assert!(text.contains("Username must be in format"));
        let (_, text) = console.handle(parse_event("login User5 wrong")).unwrap();
        assert_eq!(text, "Error: Incorrect username or password.");
        let (_, text) = console.handle(parse_event("login User9999 1234")).unwrap();
        assert_eq!(text, "Error: Incorrect username or password.");
        assert_eq!(console.screen(), Screen::Login);

        let (_, text) = console.handle(parse_event("login User5 1234")).unwrap();
        assert!(text.contains("Welcome, User5"));
        assert!(text.contains("Voter Summary"));
        assert_eq!(console.session(), Session::LoggedIn(5));

        let (_, text) = console.handle(parse_event("seniors")).unwrap();
        assert!(text.starts_with("Senior Citizens (Age 60+)"));
        assert_eq!(
            console.screen(),
            Screen::Results {
                table: TableView::Seniors
            }
        );

        // Refresh keeps the chosen table.
        let (_, text) = console.handle(parse_event("refresh")).unwrap();
        assert!(text.contains("Welcome, User5"));
        assert!(text.contains("Senior Citizens"));

        let (_, text) = console.handle(parse_event("login User6 1234")).unwrap();
        assert_eq!(text, "Error: Log out before signing in again.");

        let (_, text) = console.handle(parse_event("logout")).unwrap();
        assert!(text.starts_with("Logged out."));
        assert_eq!(console.session(), Session::LoggedOut);
        assert_eq!(console.screen(), Screen::Login);
    }

    #[test]
    fn runs_until_quit() {
        let store = seeded_store();
        let viewer = Viewer::new(labels(), default_candidates(), &store);
        let input = "login User1 1234\nquit\nlogin User2 1234\n".as_bytes();
        let mut out: Vec<u8> = Vec::new();
        run_console(&viewer, input, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Results\nLogin to View Results"));
        assert!(text.contains("Welcome, User1"));
        assert!(text.trim_end().ends_with("Goodbye."));
        assert!(!text.contains("Welcome, User2"));
    }

    #[test]
    fn end_of_input_stops() {
        let store = seeded_store();
        let viewer = Viewer::new(labels(), default_candidates(), &store);
        let mut out: Vec<u8> = Vec::new();
        run_console(&viewer, "help\n".as_bytes(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Commands:"));
    }
}
