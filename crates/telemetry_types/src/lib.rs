//! Core types for the telemetry gateway.
//!
//! Game servers report joins, chat, deaths, performance samples and other
//! events as JSON requests tagged with a [`ContentType`]. This crate defines
//! that closed set, the argument payload for each type, the validated
//! [`InboundRequest`] handed to handlers, and the [`Response`] they return.

pub mod content_type;
pub mod payloads;
pub mod request;
pub mod response;

pub use content_type::{ContentType, UnknownContentType};
pub use payloads::{
    ContentArgs, EventInfo, PerformanceData, PlayerAdvancementArgs, PlayerAuthArgs,
    PlayerChatArgs, PlayerCommandArgs, PlayerDeathArgs, PlayerInfo, PlayerJoinArgs,
    PlayerLeaveArgs, RequestArgs, ServerInfo, ServerPlayerStats, ServerStats,
};
pub use request::InboundRequest;
pub use response::{AuthBody, Response, ResponseBody};
