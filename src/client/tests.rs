// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Amredit-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Amredit and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::VecDeque;
use std::future::{poll_fn, Future};
use std::sync::{Arc, Mutex};
use std::task::Poll;

use async_trait::async_trait;
use rstest::rstest;
use tokio::sync::oneshot;

use super::{
    search_what, DispatchPolicy, Endpoint, HistoryAction, Method, NextDirection, Request,
    SearchDirection, SearchKind, SessionClient, SessionError, Transport, TransportError,
    TransportResponse, ViewOptions,
};
use crate::command::CommandBuilder;
use crate::model::Variable;
use crate::selection::Gesture;

enum Reply {
    Now(Result<TransportResponse, TransportError>),
    Later(oneshot::Receiver<TransportResponse>),
}

/// In-memory transport answering with scripted replies in order.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<Request>>,
}

impl ScriptedTransport {
    pub(crate) fn reply(&self, status: u16, body: &str) {
        let reply = Reply::Now(Ok(TransportResponse::new(status, body)));
        self.replies.lock().expect("replies").push_back(reply);
    }

    fn fail(&self, err: TransportError) {
        self.replies.lock().expect("replies").push_back(Reply::Now(Err(err)));
    }

    fn deferred(&self) -> oneshot::Sender<TransportResponse> {
        let (tx, rx) = oneshot::channel();
        self.replies.lock().expect("replies").push_back(Reply::Later(rx));
        tx
    }

    pub(crate) fn requests(&self) -> Vec<Request> {
        self.requests.lock().expect("requests").clone()
    }

    pub(crate) fn last_request(&self) -> Request {
        self.requests().pop().expect("a request was sent")
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: Request) -> Result<TransportResponse, TransportError> {
        self.requests.lock().expect("requests").push(request);
        let reply = self.replies.lock().expect("replies").pop_front().expect("scripted reply");
        match reply {
            Reply::Now(result) => result,
            Reply::Later(rx) => rx.await.map_err(|_| TransportError::Other("dropped".to_owned())),
        }
    }
}

pub(crate) fn payload_json(num: u32, undos: u32, redos: u32, prevmod: u64) -> String {
    serde_json::json!({
        "num": num,
        "numsent": 12,
        "penman": "(d / dog)",
        "svg": "<svg></svg>",
        "variables": ["d"],
        "warning": null,
        "undos": undos,
        "redos": redos,
        "prevmod": prevmod,
        "readonly": false,
    })
    .to_string()
}

fn client(transport: &Arc<ScriptedTransport>) -> SessionClient {
    SessionClient::from_arc(transport.clone())
}

fn params(request: &Request) -> Vec<(&str, &str)> {
    request.params.iter().map(|(key, value)| (*key, value.as_str())).collect()
}

#[tokio::test]
async fn read_replaces_state_from_payload() {
    let transport = Arc::new(ScriptedTransport::default());
    transport.reply(200, &payload_json(5, 2, 0, 7));
    let client = client(&transport);

    let payload = client.read(5).await.expect("read");

    assert_eq!(payload.num, 5);
    let state = client.state();
    assert_eq!(state.sentence_number(), 5);
    assert_eq!(state.concurrency_token(), 7);
    assert!(state.can_undo());
    assert!(!state.can_redo());

    let request = transport.last_request();
    assert_eq!(request.endpoint, Endpoint::Read);
    assert_eq!(request.method(), Method::Get);
    assert_eq!(params(&request), vec![("num", "5")]);
}

#[tokio::test]
async fn edit_posts_fields_and_adopts_new_token() {
    let transport = Arc::new(ScriptedTransport::default());
    transport.reply(200, &payload_json(5, 2, 0, 7));
    transport.reply(200, &payload_json(5, 3, 0, 8));
    let client = client(&transport);
    client.read(5).await.expect("read");

    let gesture = Gesture::AddEdge {
        start: Variable::new("x1").expect("var"),
        end: Variable::new("x2").expect("var"),
    };
    let mut command = CommandBuilder::from_gesture(gesture, &client.state()).expect("command");
    if let crate::command::EditOp::AddEdge { label, .. } = &mut command.op {
        *label = "ARG0".to_owned();
    }
    client.edit(&command).await.expect("edit");

    let request = transport.last_request();
    assert_eq!(request.endpoint, Endpoint::Edit);
    assert_eq!(request.method(), Method::Post);
    assert_eq!(
        params(&request),
        vec![("start", "x1"), ("label", "ARG0"), ("end", "x2"), ("num", "5"), ("prevmod", "7")]
    );
    assert_eq!(client.state().concurrency_token(), 8);
    assert_eq!(client.state().undos(), 3);
}

#[tokio::test]
async fn search_moves_session_to_match() {
    let transport = Arc::new(ScriptedTransport::default());
    transport.reply(200, &payload_json(7, 0, 0, 1));
    let client = client(&transport);

    let payload = client
        .search(SearchKind::Text, SearchDirection::Next, "dog", 5)
        .await
        .expect("search");

    assert_eq!(payload.num, 7);
    assert_eq!(client.state().sentence_number(), 7);
    assert_eq!(
        params(&transport.last_request()),
        vec![("what", "findtextnext"), ("regex", "dog"), ("num", "5")]
    );
}

#[rstest]
#[case(SearchKind::Text, SearchDirection::Next, "findtextnext")]
#[case(SearchKind::Id, SearchDirection::Preceding, "findidprec")]
#[case(SearchKind::Amr, SearchDirection::Next, "findamrnext")]
#[case(SearchKind::Comment, SearchDirection::Preceding, "findcommentprec")]
fn search_what_names(
    #[case] kind: SearchKind,
    #[case] direction: SearchDirection,
    #[case] expected: &str,
) {
    assert_eq!(search_what(kind, direction), expected);
}

#[tokio::test]
async fn stale_edit_is_reported_and_state_kept() {
    let transport = Arc::new(ScriptedTransport::default());
    transport.reply(200, &payload_json(5, 2, 0, 7));
    transport.reply(
        400,
        r#"{"error": "The sentence has been edit by another user. Please reload sentence"}"#,
    );
    let client = client(&transport);
    client.read(5).await.expect("read");
    let before = client.state();

    let err = client.history(HistoryAction::Undo, 5, 7).await.expect_err("stale");

    assert!(matches!(err, SessionError::StaleEdit(message) if message.contains("another user")));
    assert_eq!(client.state(), before);
}

#[rstest]
#[case::validation(400, r#"{"error": "invalid sentence number: must be between 1 and 12"}"#,
    SessionError::Validation("invalid sentence number: must be between 1 and 12".to_owned()))]
#[case::no_content(204, "", SessionError::NoContent)]
#[case::empty_ok(200, "  ", SessionError::NoContent)]
#[case::server_fault(503, "", SessionError::ServerUnavailable(
    "server answered with status 503".to_owned()))]
#[tokio::test]
async fn failed_responses_leave_state_unchanged(
    #[case] status: u16,
    #[case] body: &str,
    #[case] expected: SessionError,
) {
    let transport = Arc::new(ScriptedTransport::default());
    transport.reply(200, &payload_json(5, 2, 0, 7));
    transport.reply(status, body);
    let client = client(&transport);
    client.read(5).await.expect("read");
    let before = client.state();

    let err = client.read(99).await.expect_err("failure");

    assert_eq!(err, expected);
    assert_eq!(client.state(), before);
}

#[tokio::test]
async fn transport_failure_means_server_unavailable() {
    let transport = Arc::new(ScriptedTransport::default());
    transport.fail(TransportError::Connect("connection refused".to_owned()));
    let client = client(&transport);

    let err = client.save(1).await.expect_err("down");
    assert!(matches!(err, SessionError::ServerUnavailable(detail) if detail.contains("refused")));
    assert!(!client.state().is_loaded());
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let transport = Arc::new(ScriptedTransport::default());
    transport.reply(200, "<html>oops</html>");
    let client = client(&transport);

    let err = client.next(NextDirection::Next, 1).await.expect_err("decode");
    assert!(matches!(err, SessionError::Decode(_)));
}

#[tokio::test]
async fn info_bootstraps_state() {
    let transport = Arc::new(ScriptedTransport::default());
    transport.reply(
        200,
        r#"{"numsent": 12, "readonly": true, "filename": "x.amr", "version": "4"}"#,
    );
    let client = client(&transport);

    let info = client.info(true).await.expect("info");

    assert_eq!(info.numsent, 12);
    let state = client.state();
    assert_eq!(state.sentence_number(), 1);
    assert!(state.read_only());
    assert!(!state.is_loaded());
    assert_eq!(params(&transport.last_request()), vec![("withdata", "true")]);
}

#[tokio::test]
async fn view_options_only_go_where_accepted() {
    let transport = Arc::new(ScriptedTransport::default());
    transport.reply(200, &payload_json(2, 1, 0, 3));
    transport.reply(200, &payload_json(2, 0, 1, 4));
    let view = ViewOptions {
        compare: Some((1, 2)),
        reverse_of: true,
        with_alignments: false,
    };
    let client = client(&transport).with_view(view);

    client.read(2).await.expect("read");
    client.history(HistoryAction::Undo, 2, 3).await.expect("undo");

    let requests = transport.requests();
    assert_eq!(
        params(&requests[0]),
        vec![("num", "2"), ("compare", "1,2"), ("reverse_of", "true")]
    );
    assert_eq!(
        params(&requests[1]),
        vec![("history", "undo"), ("num", "2"), ("prevmod", "3"), ("reverse_of", "true")]
    );
}

#[tokio::test]
async fn bootstrap_requests_ignore_view_options() {
    let transport = Arc::new(ScriptedTransport::default());
    transport.reply(200, r#"{"numsent": 12, "readonly": false}"#);
    transport.reply(200, r#"{"name": "annotation-server", "version": "4.1.0"}"#);
    let view = ViewOptions {
        compare: Some((1, 2)),
        reverse_of: true,
        with_alignments: true,
    };
    let client = client(&transport).with_view(view);

    client.info(true).await.expect("info");
    client.version().await.expect("version");

    let requests = transport.requests();
    assert_eq!(params(&requests[0]), vec![("withdata", "true")]);
    assert!(params(&requests[1]).is_empty());
}

#[tokio::test]
async fn set_preferred_carries_the_compared_pair() {
    let transport = Arc::new(ScriptedTransport::default());
    transport.reply(200, &payload_json(3, 0, 0, 5));
    let view = ViewOptions {
        compare: Some((1, 2)),
        ..ViewOptions::default()
    };
    let client = client(&transport).with_view(view);

    client.set_preferred(3, "2").await.expect("preferred");

    let request = transport.last_request();
    assert_eq!(request.endpoint, Endpoint::SetPreferred);
    assert_eq!(params(&request), vec![("num", "3"), ("preferred", "2"), ("compare", "1,2")]);
    assert_eq!(client.state().sentence_number(), 3);
}

#[tokio::test]
async fn version_leaves_state_alone() {
    let transport = Arc::new(ScriptedTransport::default());
    transport.reply(200, r#"{"name": "annotation-server", "version": "4.1.0", "apiversion": 1}"#);
    let client = client(&transport);

    let version = client.version().await.expect("version");

    assert_eq!(version.name, "annotation-server");
    assert_eq!(version.version, "4.1.0");
    assert!(params(&transport.last_request()).is_empty());
    assert!(!client.state().is_loaded());
}

#[tokio::test]
async fn modify_comment_is_an_edit_against_current_token() {
    let transport = Arc::new(ScriptedTransport::default());
    transport.reply(200, &payload_json(4, 0, 0, 11));
    transport.reply(200, &payload_json(4, 1, 0, 12));
    let client = client(&transport);
    client.read(4).await.expect("read");

    client.modify_comment(4, "# ::note checked").await.expect("comment");

    assert_eq!(
        params(&transport.last_request()),
        vec![("modcomment", "# ::note checked"), ("num", "4"), ("prevmod", "11")]
    );
}

/// Polls `future` once so it reaches its first suspension point.
async fn start<F: Future + Unpin>(future: &mut F) {
    poll_fn(|cx| {
        assert!(std::pin::Pin::new(&mut *future).poll(cx).is_pending());
        Poll::Ready(())
    })
    .await;
}

#[rstest]
#[case::unordered(DispatchPolicy::Unordered, 3)]
#[case::latest_wins(DispatchPolicy::LatestWins, 4)]
#[tokio::test]
async fn racing_reads_resolve_per_policy(
    #[case] policy: DispatchPolicy,
    #[case] expected_sentence: u32,
) {
    let transport = Arc::new(ScriptedTransport::default());
    let older = transport.deferred();
    let newer = transport.deferred();
    let client = client(&transport).with_policy(policy);

    let mut first = Box::pin(client.read(3));
    let mut second = Box::pin(client.read(4));
    start(&mut first).await;
    start(&mut second).await;

    newer.send(TransportResponse::new(200, payload_json(4, 0, 0, 40))).expect("send");
    let second_result = second.await;
    older.send(TransportResponse::new(200, payload_json(3, 0, 0, 30))).expect("send");
    let first_result = first.await;

    assert!(second_result.is_ok());
    match policy {
        DispatchPolicy::Unordered => assert!(first_result.is_ok()),
        DispatchPolicy::LatestWins => assert_eq!(first_result, Err(SessionError::Superseded)),
    }
    assert_eq!(client.state().sentence_number(), expected_sentence);
}

#[tokio::test]
async fn watch_subscribers_see_applied_payloads() {
    let transport = Arc::new(ScriptedTransport::default());
    transport.reply(200, &payload_json(6, 0, 0, 2));
    let client = client(&transport);
    let mut rx = client.subscribe();

    client.read(6).await.expect("read");

    assert!(rx.has_changed().expect("sender alive"));
    assert_eq!(rx.borrow_and_update().sentence_number(), 6);
}
