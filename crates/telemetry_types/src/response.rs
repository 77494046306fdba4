use crate::{ContentArgs, InboundRequest, PlayerInfo, RequestArgs};
use serde::Serialize;
use serde_json::Value;

/// Result of an authentication request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthBody {
    pub player: PlayerInfo,
    /// Name the player is known by after authentication
    pub name: String,
    /// Identifier assigned to the authenticated session
    pub identifier: String,
}

/// Body of a handler response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    /// Authentication outcome
    Auth(AuthBody),
    /// Unmodified echo of the request body that was handled
    General(Value),
}

/// What a handler produces and what the caller receives as JSON.
///
/// `code` doubles as the HTTP status of the outbound transaction. Auth
/// responses carry no `message`; general responses always do.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    /// Whether the request errored
    pub err: bool,
    /// Status code sent to the client
    pub code: u16,
    pub body: ResponseBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Response {
    /// Builds an authentication response.
    pub fn auth(err: bool, code: u16, body: AuthBody) -> Self {
        Self {
            err,
            code,
            body: ResponseBody::Auth(body),
            message: None,
        }
    }

    /// Successful authentication, status 200.
    pub fn authenticated(body: AuthBody) -> Self {
        Self::auth(false, 200, body)
    }

    /// Builds a general-content response echoing `request`.
    pub fn general<A: ContentArgs>(
        err: bool,
        code: u16,
        request: InboundRequest<A>,
        message: impl Into<String>,
    ) -> Self {
        Self::echo(err, code, request.into_general(), message)
    }

    /// Like [`Response::general`] for handlers that work on the untyped union.
    pub fn echo(
        err: bool,
        code: u16,
        request: InboundRequest<RequestArgs>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            err,
            code,
            body: ResponseBody::General(request.into_echo_body()),
            message: Some(message.into()),
        }
    }

    /// Echoes `request` with status 200.
    pub fn ok<A: ContentArgs>(request: InboundRequest<A>, message: impl Into<String>) -> Self {
        Self::general(false, 200, request, message)
    }
}
