// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Amredit-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Amredit and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Round trips against the remote annotation session.
//!
//! Every operation is exactly one request over a [`Transport`], with no retries. The client owns
//! the [`SessionState`]: it is replaced wholesale from each applied payload and left untouched on
//! failure. Render-producing requests share a single in-flight slot; under
//! [`DispatchPolicy::LatestWins`] a response that was overtaken by a newer request is dropped.

pub mod http;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use crate::command::{EditCommand, EditOp};
use crate::model::payload::ErrorBody;
use crate::model::{RenderPayload, ServerInfo, SessionState, VersionInfo};

pub use http::{ClientConfig, HttpTransport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Info,
    Version,
    Read,
    Next,
    Edit,
    Save,
    History,
    Search,
    SetPreferred,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Version => "version",
            Self::Read => "read",
            Self::Next => "next",
            Self::Edit => "edit",
            Self::Save => "save",
            Self::History => "history",
            Self::Search => "search",
            Self::SetPreferred => "setpreferred",
        }
    }

    /// Edits are posted as a form; everything else is a query string.
    pub fn method(self) -> Method {
        match self {
            Self::Edit => Method::Post,
            _ => Method::Get,
        }
    }

    fn accepts_compare(self) -> bool {
        matches!(self, Self::Read | Self::Next | Self::Search | Self::SetPreferred)
    }

    /// `reverse_of` and `withalignments` only shape rendered graphs.
    fn accepts_view_flags(self) -> bool {
        !matches!(self, Self::Info | Self::Version)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub endpoint: Endpoint,
    pub params: Vec<(&'static str, String)>,
}

impl Request {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            params: Vec::new(),
        }
    }

    pub fn param(mut self, key: &'static str, value: impl ToString) -> Self {
        self.params.push((key, value.to_string()));
        self
    }

    pub fn method(&self) -> Method {
        self.endpoint.method()
    }

    /// First value sent for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.iter().find(|(name, _)| *name == key).map(|(_, value)| value.as_str())
    }
}

/// Raw response as seen by the transport: status code and body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("cannot build http client: {0}")]
    Setup(String),
    #[error("http error: {0}")]
    Other(String),
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request) -> Result<TransportResponse, TransportError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no content")]
    NoContent,
    #[error("server not responding: {0}")]
    ServerUnavailable(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    StaleEdit(String),
    #[error("cannot decode response: {0}")]
    Decode(String),
    #[error("response superseded by a newer request")]
    Superseded,
}

/// Display variant of the session: comparison pair, inverse-role rendering and alignments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewOptions {
    pub compare: Option<(u32, u32)>,
    pub reverse_of: bool,
    pub with_alignments: bool,
}

impl ViewOptions {
    fn apply(&self, mut request: Request) -> Request {
        let compare = self.compare.filter(|_| request.endpoint.accepts_compare());
        if let Some((first, second)) = compare {
            request = request.param("compare", format!("{first},{second}"));
        }
        if !request.endpoint.accepts_view_flags() {
            return request;
        }
        if self.reverse_of {
            request = request.param("reverse_of", true);
        }
        if self.with_alignments {
            request = request.param("withalignments", true);
        }
        request
    }
}

/// What to do with a response that arrives after a newer request was issued.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DispatchPolicy {
    /// Only the most recently issued request may update the session.
    #[default]
    LatestWins,
    /// Every response is applied in arrival order.
    Unordered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextDirection {
    Next,
    Preceding,
    First,
    Last,
}

impl NextDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Next => "next",
            Self::Preceding => "preceding",
            Self::First => "first",
            Self::Last => "last",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Text,
    Id,
    Amr,
    Comment,
}

impl SearchKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Id => "id",
            Self::Amr => "amr",
            Self::Comment => "comment",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        [Self::Text, Self::Id, Self::Amr, Self::Comment]
            .into_iter()
            .find(|kind| kind.as_str() == input)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchDirection {
    Next,
    Preceding,
}

impl SearchDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Next => "next",
            Self::Preceding => "prec",
        }
    }
}

/// The `what` parameter of `search`, e.g. `findtextnext`.
pub fn search_what(kind: SearchKind, direction: SearchDirection) -> String {
    format!("find{}{}", kind.as_str(), direction.as_str())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryAction {
    Undo,
    Redo,
}

impl HistoryAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Undo => "undo",
            Self::Redo => "redo",
        }
    }
}

pub struct SessionClient {
    transport: Arc<dyn Transport>,
    view: ViewOptions,
    policy: DispatchPolicy,
    state: watch::Sender<SessionState>,
    issued: AtomicU64,
}

impl SessionClient {
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self::from_arc(Arc::new(transport))
    }

    pub fn from_arc(transport: Arc<dyn Transport>) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            transport,
            view: ViewOptions::default(),
            policy: DispatchPolicy::default(),
            state,
            issued: AtomicU64::new(0),
        }
    }

    pub fn with_view(mut self, view: ViewOptions) -> Self {
        self.view = view;
        self
    }

    pub fn with_policy(mut self, policy: DispatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn view(&self) -> ViewOptions {
        self.view
    }

    pub fn policy(&self) -> DispatchPolicy {
        self.policy
    }

    /// Snapshot of the current session state.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Bootstraps the session. `with_data` also fetches relation and concept lists and the
    /// sentence index.
    #[instrument(skip(self))]
    pub async fn info(&self, with_data: bool) -> Result<ServerInfo, SessionError> {
        let mut request = Request::new(Endpoint::Info);
        if with_data {
            request = request.param("withdata", true);
        }
        let info: ServerInfo = self.fetch(request).await?;
        self.state.send_replace(SessionState::bootstrap(&info));
        debug!(numsent = info.numsent, readonly = info.readonly, "session bootstrapped");
        Ok(info)
    }

    #[instrument(skip(self))]
    pub async fn version(&self) -> Result<VersionInfo, SessionError> {
        self.fetch(Request::new(Endpoint::Version)).await
    }

    #[instrument(skip(self))]
    pub async fn read(&self, num: u32) -> Result<RenderPayload, SessionError> {
        self.dispatch(Request::new(Endpoint::Read).param("num", num)).await
    }

    #[instrument(skip(self))]
    pub async fn next(
        &self,
        direction: NextDirection,
        num: u32,
    ) -> Result<RenderPayload, SessionError> {
        let request =
            Request::new(Endpoint::Next).param("num", num).param("direction", direction.as_str());
        self.dispatch(request).await
    }

    #[instrument(
        skip(self, command),
        fields(op = command.op.name(), num = command.sentence_number)
    )]
    pub async fn edit(&self, command: &EditCommand) -> Result<RenderPayload, SessionError> {
        let mut request = Request::new(Endpoint::Edit);
        request.params = command.to_params();
        self.dispatch(request).await
    }

    #[instrument(skip(self))]
    pub async fn save(&self, num: u32) -> Result<RenderPayload, SessionError> {
        self.dispatch(Request::new(Endpoint::Save).param("num", num)).await
    }

    #[instrument(skip(self))]
    pub async fn history(
        &self,
        action: HistoryAction,
        num: u32,
        token: u64,
    ) -> Result<RenderPayload, SessionError> {
        let request = Request::new(Endpoint::History)
            .param("history", action.as_str())
            .param("num", num)
            .param("prevmod", token);
        self.dispatch(request).await
    }

    /// Searches from sentence `num` and moves the session to the first match.
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        kind: SearchKind,
        direction: SearchDirection,
        regex: &str,
        num: u32,
    ) -> Result<RenderPayload, SessionError> {
        let request = Request::new(Endpoint::Search)
            .param("what", search_what(kind, direction))
            .param("regex", regex)
            .param("num", num);
        self.dispatch(request).await
    }

    /// Records which of the compared files holds the preferred graph for sentence `num`.
    #[instrument(skip(self))]
    pub async fn set_preferred(
        &self,
        num: u32,
        preferred: &str,
    ) -> Result<RenderPayload, SessionError> {
        let request =
            Request::new(Endpoint::SetPreferred).param("num", num).param("preferred", preferred);
        self.dispatch(request).await
    }

    /// Replaces the comment block of sentence `num`, against the current token.
    pub async fn modify_comment(
        &self,
        num: u32,
        comment: &str,
    ) -> Result<RenderPayload, SessionError> {
        let command = EditCommand {
            sentence_number: num,
            concurrency_token: self.state.borrow().concurrency_token(),
            op: EditOp::ModifyComment {
                text: comment.to_owned(),
            },
        };
        self.edit(&command).await
    }

    async fn fetch<T: DeserializeOwned>(&self, request: Request) -> Result<T, SessionError> {
        let response = self.send(request).await?;
        decode_response(response)
    }

    /// Sends a render-producing request and applies its payload, unless a newer request was
    /// issued in the meantime.
    async fn dispatch(&self, request: Request) -> Result<RenderPayload, SessionError> {
        let ticket = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let result = self.fetch::<RenderPayload>(request).await;

        if self.policy == DispatchPolicy::LatestWins {
            let latest = self.issued.load(Ordering::SeqCst);
            if latest != ticket {
                debug!(ticket, latest, "dropping superseded response");
                return Err(SessionError::Superseded);
            }
        }

        let payload = result?;
        self.state.send_replace(SessionState::from_payload(&payload));
        debug!(num = payload.num, prevmod = payload.prevmod, "session state replaced");
        Ok(payload)
    }

    async fn send(&self, request: Request) -> Result<TransportResponse, SessionError> {
        let request = self.view.apply(request);
        let endpoint = request.endpoint;
        self.transport.send(request).await.map_err(|err| {
            warn!(%endpoint, error = %err, "transport failure");
            SessionError::ServerUnavailable(err.to_string())
        })
    }
}

impl fmt::Debug for SessionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionClient")
            .field("view", &self.view)
            .field("policy", &self.policy)
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

/// Message fragment the server uses when the token of an edit is out of date.
const STALE_EDIT_MARKER: &str = "another user";

fn decode_response<T: DeserializeOwned>(response: TransportResponse) -> Result<T, SessionError> {
    match response.status {
        204 => Err(SessionError::NoContent),
        200..=299 if response.body.trim().is_empty() => Err(SessionError::NoContent),
        200..=299 => serde_json::from_str(&response.body)
            .map_err(|err| SessionError::Decode(err.to_string())),
        400..=499 => {
            let message = serde_json::from_str::<ErrorBody>(&response.body)
                .map(|body| body.error)
                .unwrap_or_else(|_| {
                    let body = response.body.trim();
                    if body.is_empty() {
                        format!("request rejected with status {}", response.status)
                    } else {
                        body.to_owned()
                    }
                });
            if message.contains(STALE_EDIT_MARKER) {
                warn!(%message, "edit rejected as stale");
                Err(SessionError::StaleEdit(message))
            } else {
                Err(SessionError::Validation(message))
            }
        }
        status if status >= 500 => {
            Err(SessionError::ServerUnavailable(format!("server answered with status {status}")))
        }
        status => Err(SessionError::Decode(format!("unexpected status {status}"))),
    }
}

#[cfg(test)]
pub(crate) mod tests;
