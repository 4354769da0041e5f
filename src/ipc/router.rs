//! `(service, command)` routing table

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::protocol::{Message, ParamValue, Response};
use crate::model::{AnomalyAnalysis, Snapshot};

/// A command handler. Handlers only read the request context.
pub type Handler = fn(&RequestContext<'_>) -> Response;

/// Everything a handler may look at while serving one request
///
/// The snapshot and analysis references are loaded once per request, so
/// a handler never mixes data from two publications.
pub struct RequestContext<'a> {
    pub snapshot: Option<&'a Snapshot>,
    pub analysis: Option<&'a AnomalyAnalysis>,
    pub params: &'a BTreeMap<String, ParamValue>,
    pub control: &'a ServerControl,
}

/// Shutdown control handed to handlers
///
/// `system/exit` only records the request; the server acts on it once the
/// response has been written.
#[derive(Debug)]
pub struct ServerControl {
    token: CancellationToken,
    grace: Duration,
    shutdown_requested: AtomicBool,
}

impl ServerControl {
    pub fn new(token: CancellationToken, grace: Duration) -> Self {
        Self {
            token,
            grace,
            shutdown_requested: AtomicBool::new(false),
        }
    }

    /// Ask the server to stop after the current response
    pub fn request_shutdown(&self) {
        self.shutdown_requested.store(true, Ordering::SeqCst);
    }

    /// Whether shutdown was requested; clears the request
    pub fn take_shutdown_request(&self) -> bool {
        self.shutdown_requested.swap(false, Ordering::SeqCst)
    }

    /// Delay between the exit response and cancelling the server
    pub const fn grace(&self) -> Duration {
        self.grace
    }

    /// Token cancelled when the server stops
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

/// Two-level routing table
#[derive(Default)]
pub struct Router {
    routes: HashMap<&'static str, HashMap<&'static str, Handler>>,
}

impl Router {
    /// Empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `(service, command)`, replacing any previous one
    pub fn register(&mut self, service: &'static str, command: &'static str, handler: Handler) -> &mut Self {
        self.routes.entry(service).or_default().insert(command, handler);
        self
    }

    /// Look up the handler for `msg` and run it
    ///
    /// Unknown services and commands produce an error response rather than
    /// an `Err`, so the client always gets an answer.
    pub fn dispatch(&self, msg: &Message, ctx: &RequestContext<'_>) -> Response {
        let Some(commands) = self.routes.get(msg.service.as_str()) else {
            return Response::error(format!("Unknown service: {}", msg.service));
        };
        let Some(handler) = commands.get(msg.command.as_str()) else {
            return Response::error(format!("Unknown command: {}", msg.command));
        };
        handler(ctx)
    }

    /// All registered `(service, command)` pairs, sorted
    pub fn routes(&self) -> Vec<(&'static str, &'static str)> {
        let mut pairs: Vec<_> = self
            .routes
            .iter()
            .flat_map(|(service, commands)| commands.keys().map(move |command| (*service, *command)))
            .collect();
        pairs.sort_unstable();
        pairs
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes().len())
            .finish()
    }
}
