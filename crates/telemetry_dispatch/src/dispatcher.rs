//! The dispatch pipeline: authorize, validate, route, invoke.

use crate::auth::{AdmitAll, AuthValidator};
use crate::handler::IntoHandlerResult;
use crate::registry::HandlerRegistry;
use crate::{validator, DispatchError, Rejection, RegistryError, Transaction};
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use telemetry_types::{ContentArgs, ContentType, InboundRequest, Response};
use tracing::{debug, error, warn};

/// Body sent when a valid request has no handler.
pub const UNROUTED_MESSAGE: &str = "No handler registered";

/// Dispatcher settings fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Status answered when no handler is registered for a valid content type
    pub unrouted_status: u16,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            unrouted_status: 501,
        }
    }
}

/// How a transaction ended, short of a fatal error.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Turned away by the auth validator or the request validator
    Rejected(Rejection),
    /// Valid, but nothing is registered for its content type
    Unrouted {
        content_type: ContentType,
        status: u16,
    },
    /// A handler produced a response
    Responded(Response),
}

impl Outcome {
    /// Status code the transport should send.
    pub fn status(&self) -> u16 {
        match self {
            Outcome::Rejected(rejection) => rejection.status(),
            Outcome::Unrouted { status, .. } => *status,
            Outcome::Responded(response) => response.code,
        }
    }
}

/// Counters over every transaction this dispatcher has seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchStats {
    pub requests_received: u64,
    pub requests_rejected: u64,
    pub requests_dispatched: u64,
    pub requests_unrouted: u64,
    pub handler_failures: u64,
}

#[derive(Debug, Default)]
struct StatsCounters {
    received: AtomicU64,
    rejected: AtomicU64,
    dispatched: AtomicU64,
    unrouted: AtomicU64,
    failures: AtomicU64,
}

impl StatsCounters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> DispatchStats {
        DispatchStats {
            requests_received: self.received.load(Ordering::Relaxed),
            requests_rejected: self.rejected.load(Ordering::Relaxed),
            requests_dispatched: self.dispatched.load(Ordering::Relaxed),
            requests_unrouted: self.unrouted.load(Ordering::Relaxed),
            handler_failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

/// Routes each transaction to the single handler bound to its content type.
///
/// The context `C` is shared with every handler and never inspected here.
/// Each call to [`Dispatcher::handle`] is independent; concurrent calls only
/// share the registry's read path and the statistics counters.
pub struct Dispatcher<C>
where
    C: Send + Sync + 'static,
{
    registry: HandlerRegistry<C>,
    context: Arc<C>,
    auth: Arc<dyn AuthValidator>,
    config: DispatcherConfig,
    stats: StatsCounters,
}

impl<C> Dispatcher<C>
where
    C: Send + Sync + 'static,
{
    /// Creates a dispatcher that admits every caller.
    ///
    /// # Arguments
    ///
    /// * `context` - State handed to every handler as `Arc<C>`
    ///
    /// # Returns
    ///
    /// A dispatcher with an empty registry, [`AdmitAll`] authentication and
    /// the default [`DispatcherConfig`].
    pub fn new(context: C) -> Self {
        Self::with_context(Arc::new(context))
    }

    /// Creates a dispatcher around an already shared context.
    pub fn with_context(context: Arc<C>) -> Self {
        Self {
            registry: HandlerRegistry::new(),
            context,
            auth: Arc::new(AdmitAll),
            config: DispatcherConfig::default(),
            stats: StatsCounters::default(),
        }
    }

    /// Replaces the auth validator consulted before anything else.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let dispatcher = Dispatcher::new(state)
    ///     .with_auth_validator(SharedSecret::with_header("x-telemetry-token", token));
    /// ```
    pub fn with_auth_validator(mut self, validator: impl AuthValidator + 'static) -> Self {
        self.auth = Arc::new(validator);
        self
    }

    pub fn with_config(mut self, config: DispatcherConfig) -> Self {
        self.config = config;
        self
    }

    pub fn registry(&self) -> &HandlerRegistry<C> {
        &self.registry
    }

    pub fn context(&self) -> &Arc<C> {
        &self.context
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// A snapshot of the counters. Each counter is read independently, so a
    /// snapshot taken under load may be off by in-flight requests.
    pub fn stats(&self) -> DispatchStats {
        self.stats.snapshot()
    }

    /// Registers a typed handler. See [`HandlerRegistry::on`].
    pub async fn on<A, F, Fut, R>(&self, handler: F)
    where
        A: ContentArgs,
        F: Fn(Arc<C>, InboundRequest<A>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoHandlerResult + Send + 'static,
    {
        self.registry.on(handler).await
    }

    /// Registers an untyped handler. See [`HandlerRegistry::register`].
    pub async fn register<F, Fut, R>(&self, content_type: ContentType, handler: F)
    where
        F: Fn(Arc<C>, InboundRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoHandlerResult + Send + 'static,
    {
        self.registry.register(content_type, handler).await
    }

    /// Registers an untyped handler, refusing duplicates.
    pub async fn register_strict<F, Fut, R>(
        &self,
        content_type: ContentType,
        handler: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(Arc<C>, InboundRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoHandlerResult + Send + 'static,
    {
        self.registry.register_strict(content_type, handler).await
    }

    /// Processes one transaction.
    ///
    /// Order of checks: auth validator, body validation, handler lookup,
    /// handler invocation. A handler that resolves without a response, or
    /// with an error, yields `Err` and nothing must be sent on its behalf.
    ///
    /// # Returns
    ///
    /// The [`Outcome`] to send back, or a [`DispatchError`] when the handler
    /// broke its contract and the transport must answer with a bare `500`.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let transaction = Transaction::new(body).with_header("authorization", token);
    /// match dispatcher.handle(&transaction).await {
    ///     Ok(outcome) => send(outcome.status(), outcome),
    ///     Err(_) => send_empty(500),
    /// }
    /// ```
    pub async fn handle(&self, transaction: &Transaction) -> Result<Outcome, DispatchError> {
        if let Some(refused) = self.authorize(transaction) {
            return Ok(refused);
        }
        self.dispatch(transaction).await
    }

    /// Runs the auth validator alone and counts the transaction as received.
    ///
    /// Only headers and the remote address are consulted, so transports may
    /// call this before reading the body. Returns the rejection to send when
    /// the caller is refused.
    pub fn authorize(&self, transaction: &Transaction) -> Option<Outcome> {
        StatsCounters::bump(&self.stats.received);

        if self.auth.admit(transaction) {
            return None;
        }
        debug!(remote = ?transaction.remote_addr(), "Refused unauthorized transaction");
        Some(self.reject(Rejection::Unauthorized))
    }

    /// Validates, routes and invokes an already authorized transaction.
    ///
    /// Must follow a call to [`Dispatcher::authorize`] that returned `None`.
    pub async fn dispatch(&self, transaction: &Transaction) -> Result<Outcome, DispatchError> {
        let request = match validator::validate(transaction.body()) {
            Ok(request) => request,
            Err(rejection) => {
                debug!(remote = ?transaction.remote_addr(), "Rejected request: {}", rejection);
                return Ok(self.reject(rejection));
            }
        };

        let content_type = request.content_type;
        let Some(handler) = self.registry.lookup(content_type).await else {
            warn!("⚠️ No handler registered for {} (request {})", content_type, request.id);
            StatsCounters::bump(&self.stats.unrouted);
            return Ok(Outcome::Unrouted {
                content_type,
                status: self.config.unrouted_status,
            });
        };

        debug!("📤 Dispatching {} request {} to {}", content_type, request.id, handler.handler_name());

        let handler_name = handler.handler_name().to_string();
        match handler.handle(Arc::clone(&self.context), request).await {
            Ok(Some(response)) => {
                StatsCounters::bump(&self.stats.dispatched);
                Ok(Outcome::Responded(response))
            }
            Ok(None) => {
                StatsCounters::bump(&self.stats.failures);
                error!("❌ Handler {} for {} did not return a response", handler_name, content_type);
                Err(DispatchError::MissingResponse {
                    content_type,
                    handler: handler_name,
                })
            }
            Err(source) => {
                StatsCounters::bump(&self.stats.failures);
                error!("❌ Handler {} for {} failed: {}", handler_name, content_type, source);
                Err(DispatchError::Handler {
                    content_type,
                    handler: handler_name,
                    source,
                })
            }
        }
    }

    fn reject(&self, rejection: Rejection) -> Outcome {
        StatsCounters::bump(&self.stats.rejected);
        Outcome::Rejected(rejection)
    }
}

impl<C> std::fmt::Debug for Dispatcher<C>
where
    C: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .field("stats", &self.stats.snapshot())
            .finish()
    }
}
