//! Minimal success replies for the commands the harness answers.

use crate::constants::OK_FIELD;
use crate::doc;
use crate::Document;
use crate::Value;

/// `{ ok: 1 }`
pub fn ok_reply() -> Document {
    doc! { OK_FIELD => 1 }
}

/// `{ ok: 1, cursor: { id: 0, ns, firstBatch } }`, an exhausted cursor.
pub fn cursor_reply(
    ns: &str,
    first_batch: Vec<Document>,
) -> Document {
    doc! {
        OK_FIELD => 1,
        "cursor" => doc! {
            "id" => 0i64,
            "ns" => ns,
            "firstBatch" => first_batch,
        },
    }
}

/// `{ ok: 1, result }`, as returned by modify-style commands.
pub fn result_reply(result: impl Into<Value>) -> Document {
    doc! { OK_FIELD => 1, "result" => result }
}

/// The reply a real server would give to a successful `command`.
///
/// `mapreduce` names its output collection and `findandmodify` returns the
/// (here empty) document it touched; everything else is a bare `{ ok: 1 }`.
pub fn default_reply(command: &str) -> Document {
    match command {
        "mapreduce" => result_reply("tempCollection"),
        "findandmodify" => result_reply(Document::new()),
        _ => ok_reply(),
    }
}
