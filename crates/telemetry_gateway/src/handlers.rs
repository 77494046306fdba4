//! Handlers the gateway registers for every content type.
//!
//! Auth decides admission against the configured deny list. Every other
//! content type is logged and acknowledged with its own request echoed back.

use crate::config::HandlerSettings;
use std::collections::HashSet;
use std::sync::Arc;
use telemetry_dispatch::Dispatcher;
use telemetry_types::{
    AuthBody, InboundRequest, PerformanceData, PlayerAdvancementArgs, PlayerAuthArgs,
    PlayerChatArgs, PlayerCommandArgs, PlayerDeathArgs, PlayerJoinArgs, PlayerLeaveArgs,
    Response, ServerInfo, ServerStats,
};
use tracing::{debug, info, warn};

/// State shared by the built-in handlers.
#[derive(Debug, Clone, Default)]
pub struct GatewayContext {
    pub server_name: String,
    pub denied_players: HashSet<String>,
}

impl GatewayContext {
    pub fn from_settings(settings: &HandlerSettings) -> Self {
        Self {
            server_name: settings.server_name.clone(),
            denied_players: settings.denied_players.iter().cloned().collect(),
        }
    }

    pub fn is_denied(&self, uuid: &str) -> bool {
        self.denied_players.contains(uuid)
    }
}

/// Binds a handler to each of the nine content types.
pub async fn register_builtin_handlers(dispatcher: &Dispatcher<GatewayContext>) {
    dispatcher.on(on_auth).await;
    dispatcher.on(on_player_join).await;
    dispatcher.on(on_player_leave).await;
    dispatcher.on(on_player_death).await;
    dispatcher.on(on_player_command).await;
    dispatcher.on(on_player_advancement).await;
    dispatcher.on(on_chat).await;
    dispatcher.on(on_log).await;
    dispatcher.on(on_performance).await;

    info!(
        "🔌 Built-in handlers ready for {} content types",
        dispatcher.registry().len().await
    );
}

async fn on_auth(ctx: Arc<GatewayContext>, req: InboundRequest<PlayerAuthArgs>) -> Response {
    let player = req.args.player;
    let name = player.name.clone().unwrap_or_else(|| player.uuid.clone());
    let denied = ctx.is_denied(&player.uuid);

    if denied {
        warn!("🚫 Refused player {} ({}) from {}", name, player.uuid, player.ip);
    } else {
        info!("🔑 Admitted player {} ({})", name, player.uuid);
    }

    let body = AuthBody {
        player,
        name,
        identifier: req.id,
    };
    if denied {
        Response::auth(true, 403, body)
    } else {
        Response::authenticated(body)
    }
}

async fn on_player_join(ctx: Arc<GatewayContext>, req: InboundRequest<PlayerJoinArgs>) -> Response {
    info!(
        "👋 {} joined {} ({}/{} online)",
        display_name(&req.args.player),
        ctx.server_name,
        req.args.server.online,
        req.args.server.max
    );
    Response::ok(req, "OK")
}

async fn on_player_leave(ctx: Arc<GatewayContext>, req: InboundRequest<PlayerLeaveArgs>) -> Response {
    info!(
        "🚪 {} left {} ({}/{} online)",
        display_name(&req.args.player),
        ctx.server_name,
        req.args.server.online,
        req.args.server.max
    );
    Response::ok(req, "OK")
}

async fn on_player_death(_ctx: Arc<GatewayContext>, req: InboundRequest<PlayerDeathArgs>) -> Response {
    info!(
        "💀 {} died at {}: {}",
        display_name(&req.args.player),
        req.args.event.location,
        req.args.message
    );
    Response::ok(req, "OK")
}

async fn on_player_command(
    _ctx: Arc<GatewayContext>,
    req: InboundRequest<PlayerCommandArgs>,
) -> Response {
    info!(
        "⌨️ {} ran /{} {}",
        display_name(&req.args.player),
        req.args.command,
        req.args.args.join(" ")
    );
    Response::ok(req, "OK")
}

async fn on_player_advancement(
    _ctx: Arc<GatewayContext>,
    req: InboundRequest<PlayerAdvancementArgs>,
) -> Response {
    info!(
        "🏆 {} earned {} ({})",
        display_name(&req.args.player),
        req.args.advancement,
        req.args.advancement_criteria
    );
    Response::ok(req, "OK")
}

async fn on_chat(_ctx: Arc<GatewayContext>, req: InboundRequest<PlayerChatArgs>) -> Response {
    info!("💬 <{}> {}", display_name(&req.args.player), req.args.message);
    Response::ok(req, "OK")
}

async fn on_log(_ctx: Arc<GatewayContext>, req: InboundRequest<ServerInfo>) -> Response {
    info!(
        "🖥️ {} {} at {}:{} (plugin {})",
        req.args.server_name,
        req.args.server_version,
        req.args.server_ip,
        req.args.server_port,
        req.args.plugin_version
    );
    if let Some(content) = &req.content {
        match serde_json::from_str::<ServerStats>(content) {
            Ok(stats) => info!(
                "📈 {} stats: {}/{} online | {:.1} TPS | uptime {}s",
                req.args.server_name, stats.online, stats.max, stats.tps, stats.uptime
            ),
            Err(_) => debug!("📄 Log content from {}: {}", req.args.server_name, content),
        }
    }
    Response::ok(req, "OK")
}

async fn on_performance(
    ctx: Arc<GatewayContext>,
    req: InboundRequest<PerformanceData>,
) -> Response {
    let data = &req.args;
    let latest_tps = data.tps.last().copied().unwrap_or_default();
    info!(
        "📊 {} performance: {} players | {:.1} TPS | {:.1}% mem | {:.1}% cpu",
        ctx.server_name, data.players.online, latest_tps, data.mem_percent, data.cpu_percent
    );
    Response::ok(req, "OK")
}

fn display_name(player: &telemetry_types::PlayerInfo) -> &str {
    player.name.as_deref().unwrap_or(&player.uuid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use telemetry_dispatch::{Outcome, Transaction};

    const DENIED: &str = "069a79f4-44e9-4726-a5be-fca90e38aaf5";

    async fn gateway() -> Dispatcher<GatewayContext> {
        let settings = HandlerSettings {
            server_name: "survival".to_string(),
            denied_players: vec![DENIED.to_string()],
        };
        let dispatcher = Dispatcher::new(GatewayContext::from_settings(&settings));
        register_builtin_handlers(&dispatcher).await;
        dispatcher
    }

    async fn respond(dispatcher: &Dispatcher<GatewayContext>, body: Value) -> Response {
        match dispatcher
            .handle(&Transaction::new(body.to_string()))
            .await
            .unwrap()
        {
            Outcome::Responded(response) => response,
            other => panic!("expected a handler response, got {:?}", other),
        }
    }

    fn event(uuid: &str) -> Value {
        json!({
            "location": "world,0,64,0",
            "entity": { "uuid": uuid, "ip": "10.0.0.2" },
            "eventName": "PlayerEvent"
        })
    }

    #[tokio::test]
    async fn test_every_content_type_is_bound() {
        let dispatcher = gateway().await;
        assert_eq!(dispatcher.registry().len().await, 9);
    }

    #[tokio::test]
    async fn test_auth_admits_with_name_fallback() {
        let dispatcher = gateway().await;
        let response = respond(
            &dispatcher,
            json!({
                "id": "req-7",
                "content_type": "Auth",
                "args": { "player": { "uuid": "u1", "ip": "1.2.3.4" } }
            }),
        )
        .await;

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "err": false,
                "code": 200,
                "body": {
                    "player": { "uuid": "u1", "ip": "1.2.3.4" },
                    "name": "u1",
                    "identifier": "req-7"
                }
            })
        );
    }

    #[tokio::test]
    async fn test_auth_refuses_denied_player() {
        let dispatcher = gateway().await;
        let response = respond(
            &dispatcher,
            json!({
                "id": "req-8",
                "content_type": "Auth",
                "args": { "player": { "name": "Notch", "uuid": DENIED, "ip": "1.2.3.4" } }
            }),
        )
        .await;

        assert!(response.err);
        assert_eq!(response.code, 403);
        let body = serde_json::to_value(&response.body).unwrap();
        assert_eq!(body["name"], "Notch");
        assert_eq!(body["identifier"], "req-8");
    }

    #[tokio::test]
    async fn test_chat_is_echoed() {
        let dispatcher = gateway().await;
        let request = json!({
            "id": "chat-1",
            "content_type": "Chat",
            "args": {
                "player": { "name": "Alex", "uuid": "u2", "ip": "10.0.0.2" },
                "event": event("u2"),
                "message": "hi all"
            }
        });

        let response = respond(&dispatcher, request.clone()).await;

        assert!(!response.err);
        assert_eq!(response.code, 200);
        assert_eq!(response.message.as_deref(), Some("OK"));
        assert_eq!(serde_json::to_value(&response.body).unwrap(), request);
    }

    #[tokio::test]
    async fn test_log_with_stats_content() {
        let dispatcher = gateway().await;
        let stats = json!({
            "online": 3, "max": 20, "tps": 19.9, "memory": 512.0,
            "cpu": 12.5, "uptime": 3600, "pluginVersion": "1.2.0"
        });
        let response = respond(
            &dispatcher,
            json!({
                "id": "log-1",
                "content_type": "Log",
                "args": {
                    "serverName": "survival",
                    "serverVersion": "1.20.4",
                    "serverMotd": "welcome",
                    "serverMaxPlayers": 20,
                    "serverIP": "10.0.0.1",
                    "serverPort": 25565,
                    "pluginVersion": "1.2.0"
                },
                "content": stats
            }),
        )
        .await;

        assert_eq!(response.code, 200);
        let body = serde_json::to_value(&response.body).unwrap();
        assert_eq!(body["args"]["serverIP"], "10.0.0.1");
        assert_eq!(body["content"], stats);
    }

    #[tokio::test]
    async fn test_performance_is_acknowledged() {
        let dispatcher = gateway().await;
        let response = respond(
            &dispatcher,
            json!({
                "id": 42,
                "content_type": "Performance",
                "args": {
                    "players": { "online": 3, "max": 20 },
                    "tps": [19.8, 20.0],
                    "availableMemory": 1024.5,
                    "usedMemory": 512,
                    "maxMemory": 2048,
                    "memPercent": 25.0,
                    "cpuPercent": 12.5
                }
            }),
        )
        .await;

        assert_eq!(response.code, 200);
        let body = serde_json::to_value(&response.body).unwrap();
        assert_eq!(body["id"], 42);
        assert_eq!(body["args"]["players"]["online"], 3);
    }
}
