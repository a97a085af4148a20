//! The line protocol spoken by `fetchland serve`.
//!
//! Each input line is one command; each command is answered with one JSON
//! object, either `{"ok":true,"result":...}` or `{"ok":false,"error":"..."}`.

use std::time::Duration;

use fl_app::AppResult;
use fl_simulation::{DogId, JoinOutcome, TickReport};
use fl_store::MAX_PAGE;
use serde::Serialize;
use serde_json::{Value, json};

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// `join <map> <name>`
    Join { map: String, name: String },
    /// `move <dog> <L|R|U|D|->`
    Move { dog: DogId, code: String },
    /// `tick <ms>`
    Tick(Duration),
    /// `state <map>`
    State(String),
    /// `maps`
    Maps,
    /// `records [offset] [limit]`
    Records { offset: usize, limit: usize },
    /// `save`
    Save,
    /// `quit`
    Quit,
}

/// Parse one input line. Blank lines are `Ok(None)`.
pub fn parse(line: &str) -> Result<Option<Request>, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };

    let request = match verb {
        "join" => {
            let map = words.next().ok_or("usage: join <map> <name>")?;
            let name = words.collect::<Vec<_>>().join(" ");
            if name.is_empty() {
                return Err("usage: join <map> <name>".into());
            }
            return Ok(Some(Request::Join {
                map: map.to_string(),
                name,
            }));
        }
        "move" => {
            let dog = words.next().ok_or("usage: move <dog> <L|R|U|D|->")?;
            let dog = dog
                .parse()
                .map(DogId)
                .map_err(|_| format!("invalid dog id '{dog}'"))?;
            let code = match words.next().ok_or("usage: move <dog> <L|R|U|D|->")? {
                "-" => String::new(),
                code => code.to_string(),
            };
            Request::Move { dog, code }
        }
        "tick" => {
            let ms = words.next().ok_or("usage: tick <ms>")?;
            let ms: u64 = ms
                .parse()
                .map_err(|_| format!("invalid tick length '{ms}'"))?;
            Request::Tick(Duration::from_millis(ms))
        }
        "state" => Request::State(words.next().ok_or("usage: state <map>")?.to_string()),
        "maps" => Request::Maps,
        "records" => {
            let offset = number(words.next(), 0)?;
            let limit = number(words.next(), MAX_PAGE)?;
            Request::Records { offset, limit }
        }
        "save" => Request::Save,
        "quit" => Request::Quit,
        other => return Err(format!("unknown command '{other}'")),
    };

    match words.next() {
        Some(extra) => Err(format!("unexpected argument '{extra}'")),
        None => Ok(Some(request)),
    }
}

fn number(word: Option<&str>, default: usize) -> Result<usize, String> {
    match word {
        Some(w) => w.parse().map_err(|_| format!("invalid number '{w}'")),
        None => Ok(default),
    }
}

/// The answer to a successful `join`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Joined {
    session_id: String,
    dog_id: DogId,
}

impl From<JoinOutcome> for Joined {
    fn from(outcome: JoinOutcome) -> Self {
        Self {
            session_id: outcome.session_id.to_string(),
            dog_id: outcome.dog_id,
        }
    }
}

/// What one tick changed, in counts.
#[derive(Debug, Serialize)]
pub struct TickSummary {
    spawned: usize,
    collected: usize,
    delivered: u64,
    retired: Vec<String>,
}

impl From<TickReport> for TickSummary {
    fn from(report: TickReport) -> Self {
        Self {
            spawned: report.spawned.len(),
            collected: report.collected.len(),
            delivered: report.delivered.iter().map(|d| d.value).sum(),
            retired: report.retired.into_iter().map(|r| r.name).collect(),
        }
    }
}

/// Turn a command result into its response object.
pub fn respond<T: Serialize>(result: AppResult<T>) -> Value {
    match result.map_err(|e| e.to_string()) {
        Ok(value) => match serde_json::to_value(value) {
            Ok(value) => json!({ "ok": true, "result": value }),
            Err(e) => failure(&e.to_string()),
        },
        Err(e) => failure(&e),
    }
}

/// An error response carrying `message`.
pub fn failure(message: &str) -> Value {
    json!({ "ok": false, "error": message })
}
