//! # Telemetry Dispatch
//!
//! Receives JSON telemetry from game servers, decides whether to admit it,
//! and routes each request to the one handler registered for its content type.
//!
//! ## Request Flow
//!
//! 1. The [`transport`] adapter turns an HTTP request into a [`Transaction`]
//! 2. The configured [`AuthValidator`] admits or refuses it (`401`)
//! 3. The [`validator`] checks the body's structure (`400` on failure)
//! 4. The [`HandlerRegistry`] is consulted for the request's content type
//! 5. The handler runs with the shared context and the validated request
//! 6. Its [`Response`](telemetry_types::Response) is sent back, exactly once
//!
//! ## Registering Handlers
//!
//! ```rust,ignore
//! let dispatcher = Dispatcher::new(state)
//!     .with_auth_validator(SharedSecret::new("s3cret"));
//!
//! dispatcher.on(|state: Arc<State>, req: InboundRequest<PlayerAuthArgs>| async move {
//!     let name = state.lookup_name(&req.args.player.uuid);
//!     Response::authenticated(AuthBody {
//!         player: req.args.player,
//!         name,
//!         identifier: req.id,
//!     })
//! }).await;
//!
//! let app = transport::router(Arc::new(dispatcher), &TransportConfig::default());
//! ```
//!
//! A handler that resolves without a response is a programming error: the
//! dispatcher returns [`DispatchError::MissingResponse`] and the transport
//! answers `500` with no body.

pub mod auth;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod registry;
pub mod transaction;
pub mod transport;
pub mod validator;

pub use auth::{AdmitAll, AuthValidator, SharedSecret};
pub use dispatcher::{DispatchStats, Dispatcher, DispatcherConfig, Outcome, UNROUTED_MESSAGE};
pub use error::{DispatchError, HandlerError, RegistryError, Rejection};
pub use handler::{HandlerResult, IntoHandlerResult, RequestHandler};
pub use registry::HandlerRegistry;
pub use transaction::Transaction;
pub use transport::TransportConfig;

pub use telemetry_types;
