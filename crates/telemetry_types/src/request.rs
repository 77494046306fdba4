use crate::{ContentArgs, ContentType, RequestArgs};
use serde::Serialize;
use serde_json::Value;

/// A validated telemetry request.
///
/// Built once per HTTP transaction by the request validator and handed to
/// exactly one handler by value. `A` is [`RequestArgs`] for untyped handlers
/// or a concrete payload for typed ones.
///
/// General responses echo [`InboundRequest::into_echo_body`]: the body exactly
/// as received when the request came off the wire, including `args` fields no
/// payload type declares.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InboundRequest<A = RequestArgs> {
    /// Caller-supplied opaque identifier
    pub id: String,
    pub content_type: ContentType,
    pub args: A,
    /// Optional free-form text attached by the caller
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// The parsed request body, untouched
    #[serde(skip)]
    pub raw: Option<Value>,
}

impl<A: Serialize> InboundRequest<A> {
    /// Builds a request with no received body attached.
    pub fn new(id: impl Into<String>, content_type: ContentType, args: A) -> Self {
        Self {
            id: id.into(),
            content_type,
            args,
            content: None,
            raw: None,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Attaches the body this request was decoded from.
    pub fn with_raw(mut self, raw: Value) -> Self {
        self.raw = Some(raw);
        self
    }

    /// The JSON a general response sends back for this request.
    ///
    /// Requests built in code have no received body; they echo their own
    /// typed fields instead.
    pub fn into_echo_body(mut self) -> Value {
        match self.raw.take() {
            Some(raw) => raw,
            None => serde_json::to_value(&self).unwrap_or(Value::Null),
        }
    }
}

impl InboundRequest<RequestArgs> {
    /// Narrows the arguments to a concrete payload type.
    ///
    /// Fails, handing the request back untouched, when the arguments belong
    /// to a different content type.
    pub fn into_typed<A: ContentArgs>(self) -> Result<InboundRequest<A>, Self> {
        let InboundRequest {
            id,
            content_type,
            args,
            content,
            raw,
        } = self;

        match A::from_args(args) {
            Ok(args) => Ok(InboundRequest {
                id,
                content_type,
                args,
                content,
                raw,
            }),
            Err(args) => Err(InboundRequest {
                id,
                content_type,
                args,
                content,
                raw,
            }),
        }
    }
}

impl<A: ContentArgs> InboundRequest<A> {
    /// Widens a typed request back into the tagged union.
    pub fn into_general(self) -> InboundRequest<RequestArgs> {
        InboundRequest {
            id: self.id,
            content_type: self.content_type,
            args: self.args.into_args(),
            content: self.content,
            raw: self.raw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PlayerAuthArgs, PlayerChatArgs, PlayerInfo};
    use serde_json::json;

    fn auth_request() -> InboundRequest {
        InboundRequest::new(
            "abc",
            ContentType::Auth,
            RequestArgs::Auth(PlayerAuthArgs {
                player: PlayerInfo {
                    name: Some("Steve".to_string()),
                    uuid: "u1".to_string(),
                    ip: "1.2.3.4".to_string(),
                },
            }),
        )
    }

    #[test]
    fn test_serializes_to_wire_shape() {
        let value = serde_json::to_value(auth_request()).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "abc",
                "content_type": "Auth",
                "args": { "player": { "name": "Steve", "uuid": "u1", "ip": "1.2.3.4" } }
            })
        );
    }

    #[test]
    fn test_into_typed_and_back() {
        let typed = auth_request().into_typed::<PlayerAuthArgs>().unwrap();
        assert_eq!(typed.args.player.uuid, "u1");
        assert_eq!(typed.into_general(), auth_request());
    }

    #[test]
    fn test_echo_body_prefers_received_json() {
        let received = json!({
            "id": 7,
            "content_type": "Auth",
            "args": { "player": { "uuid": "u1", "ip": "1.2.3.4" }, "world": "nether" },
            "content": { "note": 1 }
        });
        let request = auth_request().with_raw(received.clone());

        let typed = request.into_typed::<PlayerAuthArgs>().unwrap();
        assert_eq!(typed.into_echo_body(), received);
    }

    #[test]
    fn test_echo_body_without_received_json() {
        let echoed = auth_request().with_content("hi").into_echo_body();
        assert_eq!(echoed["id"], "abc");
        assert_eq!(echoed["content"], "hi");
        assert_eq!(echoed["args"]["player"]["name"], "Steve");
    }

    #[test]
    fn test_into_typed_mismatch_returns_request() {
        let auth = auth_request();
        let returned = auth.clone().into_typed::<PlayerChatArgs>().unwrap_err();
        assert_eq!(returned, auth);
    }
}
