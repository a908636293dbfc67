//! First-match-wins routing of inbound commands to reply producers.
//!
//! Evaluation order for every request:
//! 1. Handshake: if a handshake reply is installed and the request carries a
//!    truthy `ismaster`/`isMaster`/`hello`, that reply is returned. No rule
//!    can shadow it.
//! 2. Rules, in registration order. The first predicate that accepts the
//!    document produces the reply; capturing rules also store the document
//!    in the [`CaptureSlot`].
//! 3. Otherwise nothing: the request stays unanswered.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use super::default_reply;
use super::cursor_reply;
use super::CaptureSlot;
use crate::constants::HANDSHAKE_FIELDS;
use crate::constants::LIST_COLLECTIONS_COMMAND;
use crate::constants::WRITE_CONCERN_COMMANDS;
use crate::Document;

pub type Predicate = Arc<dyn Fn(&Document) -> bool + Send + Sync>;
pub type Responder = Arc<dyn Fn(&Document) -> Document + Send + Sync>;

/// Accepts documents whose `key` field is present and truthy.
pub fn has_command(key: &str) -> impl Fn(&Document) -> bool + Send + Sync + 'static {
    let key = key.to_string();
    move |document: &Document| document.is_truthy(&key)
}

pub fn is_handshake(document: &Document) -> bool {
    HANDSHAKE_FIELDS.iter().any(|field| document.is_truthy(field))
}

struct Rule {
    predicate: Predicate,
    responder: Responder,
    capture: bool,
}

/// Per-node rule table. Clones share the same rules and capture slot.
#[derive(Clone)]
pub struct Dispatcher {
    handshake: Arc<RwLock<Option<Document>>>,
    rules: Arc<RwLock<Vec<Rule>>>,
    capture: CaptureSlot,
}

impl Dispatcher {
    pub fn new(capture: CaptureSlot) -> Self {
        Self {
            handshake: Arc::new(RwLock::new(None)),
            rules: Arc::new(RwLock::new(Vec::new())),
            capture,
        }
    }

    pub fn capture(&self) -> &CaptureSlot {
        &self.capture
    }

    /// Installs the reply given to every handshake request.
    pub fn install_handshake(
        &self,
        reply: Document,
    ) {
        *self.handshake.write() = Some(reply);
    }

    pub fn handshake_reply(&self) -> Option<Document> {
        self.handshake.read().clone()
    }

    /// Registers a rule whose matches are recorded in the capture slot.
    pub fn on_command<P, R>(
        &self,
        predicate: P,
        responder: R,
    ) -> &Self
    where
        P: Fn(&Document) -> bool + Send + Sync + 'static,
        R: Fn(&Document) -> Document + Send + Sync + 'static,
    {
        self.push(Arc::new(predicate), Arc::new(responder), true)
    }

    /// Registers a rule that answers without touching the capture slot.
    pub fn on_command_silent<P, R>(
        &self,
        predicate: P,
        responder: R,
    ) -> &Self
    where
        P: Fn(&Document) -> bool + Send + Sync + 'static,
        R: Fn(&Document) -> Document + Send + Sync + 'static,
    {
        self.push(Arc::new(predicate), Arc::new(responder), false)
    }

    /// Answers `listCollections` with an empty cursor and every
    /// write-concern command with its default success reply, capturing the
    /// latter.
    pub fn on_write_concern_commands(&self) -> &Self {
        self.on_command_silent(has_command(LIST_COLLECTIONS_COMMAND), |document| {
            let db = document.get_str("$db").unwrap_or("test");
            cursor_reply(&format!("{db}.$cmd.listCollections"), vec![])
        });
        for command in WRITE_CONCERN_COMMANDS {
            self.on_command(has_command(command), move |_| default_reply(command));
        }
        self
    }

    pub fn rule_count(&self) -> usize {
        self.rules.read().len()
    }

    /// Produces the reply for `document`, or `None` to leave it unanswered.
    pub fn dispatch(
        &self,
        document: &Document,
    ) -> Option<Document> {
        if is_handshake(document) {
            if let Some(reply) = self.handshake_reply() {
                trace!("handshake request answered");
                return Some(reply);
            }
        }

        let (responder, capture) = {
            let rules = self.rules.read();
            let rule = rules.iter().find(|rule| (rule.predicate)(document))?;
            (rule.responder.clone(), rule.capture)
        };

        if capture {
            self.capture.set(document.clone());
        }
        Some(responder(document))
    }

    fn push(
        &self,
        predicate: Predicate,
        responder: Responder,
        capture: bool,
    ) -> &Self {
        self.rules.write().push(Rule {
            predicate,
            responder,
            capture,
        });
        self
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("handshake_installed", &self.handshake.read().is_some())
            .field("rules", &self.rule_count())
            .field("capture", &self.capture)
            .finish()
    }
}
