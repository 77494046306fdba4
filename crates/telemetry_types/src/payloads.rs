//! Argument payloads carried in the `args` field of a telemetry request.
//!
//! Field names follow the game-server plugin's camelCase JSON. Each payload is
//! bound to exactly one [`ContentType`] through [`ContentArgs`], and
//! [`RequestArgs`] is the tagged union over all of them.

use crate::ContentType;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

// ============================================================================
// Shared Structures
// ============================================================================

/// A player as reported by the game server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerInfo {
    /// Display name, when the server knows it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Player UUID in hyphenated form
    pub uuid: String,
    /// Remote address of the player
    pub ip: String,
}

/// Where and by whom an in-game event was triggered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInfo {
    pub location: String,
    pub entity: PlayerInfo,
    pub event_name: String,
}

/// Online and maximum player counts.
///
/// Plugins report counts as plain JSON numbers, so they are not assumed to be
/// integral.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServerPlayerStats {
    pub online: f64,
    pub max: f64,
}

/// Static information about the reporting server, sent with `Log` requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    pub server_name: String,
    pub server_version: String,
    pub server_motd: String,
    pub server_max_players: f64,
    #[serde(rename = "serverIP")]
    pub server_ip: String,
    /// TCP port; the only field required to be an integer
    pub server_port: u16,
    pub plugin_version: String,
}

/// Aggregate server statistics.
///
/// Not bound to a content type; plugins may embed it in free-form `content`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStats {
    pub online: f64,
    pub max: f64,
    pub tps: f64,
    pub memory: f64,
    pub cpu: f64,
    pub uptime: f64,
    pub plugin_version: String,
}

/// Periodic performance sample, sent with `Performance` requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceData {
    pub players: ServerPlayerStats,
    /// Ticks per second over the server's sampling windows
    pub tps: Vec<f64>,
    pub available_memory: f64,
    pub used_memory: f64,
    pub max_memory: f64,
    pub mem_percent: f64,
    pub cpu_percent: f64,
}

// ============================================================================
// Per-Content-Type Arguments
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerAuthArgs {
    pub player: PlayerInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerJoinArgs {
    pub player: PlayerInfo,
    pub server: ServerPlayerStats,
    pub event: EventInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerLeaveArgs {
    pub player: PlayerInfo,
    pub server: ServerPlayerStats,
    pub event: EventInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerDeathArgs {
    pub player: PlayerInfo,
    pub event: EventInfo,
    /// Death message as shown in game
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerCommandArgs {
    pub player: PlayerInfo,
    pub event: EventInfo,
    pub command: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerAdvancementArgs {
    pub player: PlayerInfo,
    pub event: EventInfo,
    pub advancement: String,
    pub advancement_criteria: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerChatArgs {
    pub player: PlayerInfo,
    pub event: EventInfo,
    pub message: String,
}

// ============================================================================
// Typed Binding
// ============================================================================

/// A payload type bound to a single content type.
///
/// Handlers registered through the typed API receive `InboundRequest<A>` for
/// some `A: ContentArgs` and never have to match on [`RequestArgs`] themselves.
pub trait ContentArgs: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// The content type whose `args` decode into this payload.
    const CONTENT_TYPE: ContentType;

    /// Extracts this payload from the union, or returns the union unchanged.
    fn from_args(args: RequestArgs) -> Result<Self, RequestArgs>;

    /// Wraps this payload back into the union.
    fn into_args(self) -> RequestArgs;
}

/// Arguments of a validated request, tagged by content type.
///
/// Serializes as the bare inner payload so echoed requests keep their wire shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RequestArgs {
    Auth(PlayerAuthArgs),
    PlayerJoin(PlayerJoinArgs),
    PlayerLeave(PlayerLeaveArgs),
    PlayerDeath(PlayerDeathArgs),
    PlayerCommand(PlayerCommandArgs),
    PlayerAdvancement(PlayerAdvancementArgs),
    Chat(PlayerChatArgs),
    Log(ServerInfo),
    Performance(PerformanceData),
}

macro_rules! bind_content_args {
    ($($variant:ident => $args:ty),* $(,)?) => {
        $(
            impl ContentArgs for $args {
                const CONTENT_TYPE: ContentType = ContentType::$variant;

                fn from_args(args: RequestArgs) -> Result<Self, RequestArgs> {
                    match args {
                        RequestArgs::$variant(inner) => Ok(inner),
                        other => Err(other),
                    }
                }

                fn into_args(self) -> RequestArgs {
                    RequestArgs::$variant(self)
                }
            }
        )*

        impl RequestArgs {
            /// The content type this payload belongs to.
            pub fn content_type(&self) -> ContentType {
                match self {
                    $(RequestArgs::$variant(_) => ContentType::$variant,)*
                }
            }

            /// Reinterprets a raw JSON `args` value as the payload for `content_type`.
            pub fn from_value(
                content_type: ContentType,
                value: serde_json::Value,
            ) -> Result<Self, serde_json::Error> {
                Ok(match content_type {
                    $(ContentType::$variant => RequestArgs::$variant(serde_json::from_value(value)?),)*
                })
            }
        }
    };
}

bind_content_args! {
    Auth => PlayerAuthArgs,
    PlayerJoin => PlayerJoinArgs,
    PlayerLeave => PlayerLeaveArgs,
    PlayerDeath => PlayerDeathArgs,
    PlayerCommand => PlayerCommandArgs,
    PlayerAdvancement => PlayerAdvancementArgs,
    Chat => PlayerChatArgs,
    Log => ServerInfo,
    Performance => PerformanceData,
}

impl RequestArgs {
    /// The player this request concerns, when the payload carries one.
    pub fn player(&self) -> Option<&PlayerInfo> {
        match self {
            RequestArgs::Auth(args) => Some(&args.player),
            RequestArgs::PlayerJoin(args) => Some(&args.player),
            RequestArgs::PlayerLeave(args) => Some(&args.player),
            RequestArgs::PlayerDeath(args) => Some(&args.player),
            RequestArgs::PlayerCommand(args) => Some(&args.player),
            RequestArgs::PlayerAdvancement(args) => Some(&args.player),
            RequestArgs::Chat(args) => Some(&args.player),
            RequestArgs::Log(_) | RequestArgs::Performance(_) => None,
        }
    }
}
