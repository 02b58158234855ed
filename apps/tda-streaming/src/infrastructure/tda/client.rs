//! Streaming Client
//!
//! Owns the single WebSocket of a streaming session and everything that
//! happens on it: login, admin commands, subscriptions, response
//! correlation and handler dispatch.
//!
//! # Session Lifecycle
//!
//! ```text
//! StreamClient::new ──► login ──► quality_of_service / *_subs / *_add / *_unsubs
//!                         │                  │
//!                         │                  ▼
//!                         │      handle_message (or run) ──► handlers, feed
//!                         ▼
//!                       logout ──► socket closed
//! ```
//!
//! # Pumping
//!
//! There is exactly one reader of the socket: [`StreamClient::handle_message`].
//! The application calls it in a loop (or uses [`StreamClient::run`]). A call
//! that waits for a response calls it too, until the reply arrives, so pushed
//! data received in the meantime still reaches the handlers. Every method
//! takes `&mut self`, which rules out two pumps running at once.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::{SinkExt, StreamExt};
use serde_json::{Map, Value, json};
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{Connector, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

use super::auth::{self, AuthError};
use super::codec::{CodecError, StreamCodec};
use super::correlator::{CorrelationError, Correlator, Filed};
use super::dispatcher::{Dispatcher, Handler, HandlerId};
use super::messages::{Request, RequestEnvelope, ResponseMessage, StreamMessage};
use crate::application::ports::{PrincipalAccount, PrincipalsError, PrincipalsProvider};
use crate::domain::fields::{Field, join_field_codes};
use crate::domain::service::{Command, QosLevel, Service};
use crate::infrastructure::metrics;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

// =============================================================================
// Error Type
// =============================================================================

/// Errors that can occur in the streaming client.
#[derive(Debug, thiserror::Error)]
pub enum StreamClientError {
    /// Operation requires a logged-in session.
    #[error("socket not open; call login() first")]
    NotLoggedIn,

    /// A session is already open.
    #[error("already logged in; call logout() first")]
    AlreadyLoggedIn,

    /// Login could not be prepared.
    #[error("login failed: {0}")]
    Auth(#[from] AuthError),

    /// User principals could not be fetched.
    #[error("failed to fetch user principals: {0}")]
    Principals(#[from] PrincipalsError),

    /// Inbound frame could not be decoded or a request encoded.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Response did not match or reported failure.
    #[error(transparent)]
    Correlation(#[from] CorrelationError),

    /// More than one request in an envelope.
    #[error("only single-request envelopes are supported, got {0} requests")]
    UnsupportedBatch(usize),

    /// Field is not part of the service's registry.
    #[error("field {field} does not belong to service {service}")]
    UnknownField {
        /// Target service.
        service: Service,
        /// Rejected field name.
        field: &'static str,
    },

    /// Service does not accept the operation.
    #[error("service {service} does not support {operation}")]
    UnsupportedService {
        /// Target service.
        service: Service,
        /// Rejected operation.
        operation: &'static str,
    },

    /// No response within the configured timeout.
    #[error("no response to request {request_id} within {timeout:?}")]
    ResponseTimeout {
        /// ID of the unanswered request.
        request_id: String,
        /// Configured limit.
        timeout: Duration,
    },

    /// WebSocket transport failure.
    #[error("WebSocket error: {0}")]
    WebSocket(Box<tungstenite::Error>),

    /// Server closed the socket.
    #[error("connection closed")]
    ConnectionClosed,
}

impl From<tungstenite::Error> for StreamClientError {
    fn from(err: tungstenite::Error) -> Self {
        Self::WebSocket(Box::new(err))
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// Default capacity of the broadcast feed.
pub const DEFAULT_BROADCAST_CAPACITY: usize = 1024;

/// Configuration for the streaming client.
#[derive(Clone)]
pub struct StreamClientConfig {
    /// Account to stream for. Required when the user has several accounts.
    pub account_id: Option<String>,
    /// Limit on response waits. `None` waits indefinitely.
    pub response_timeout: Option<Duration>,
    /// Per-receiver buffer of the broadcast feed.
    pub broadcast_capacity: usize,
    /// TLS configuration for `wss://` connections. `None` uses the
    /// bundled web PKI roots.
    pub tls: Option<Arc<rustls::ClientConfig>>,
}

impl Default for StreamClientConfig {
    fn default() -> Self {
        Self {
            account_id: None,
            response_timeout: None,
            broadcast_capacity: DEFAULT_BROADCAST_CAPACITY,
            tls: None,
        }
    }
}

impl StreamClientConfig {
    /// Stream for `account_id`.
    #[must_use]
    pub fn with_account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    /// Fail response waits after `timeout`.
    #[must_use]
    pub const fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = Some(timeout);
        self
    }

    /// Set the broadcast feed capacity.
    #[must_use]
    pub const fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity;
        self
    }

    /// Use a caller-supplied TLS configuration.
    #[must_use]
    pub fn with_tls(mut self, tls: Arc<rustls::ClientConfig>) -> Self {
        self.tls = Some(tls);
        self
    }
}

impl fmt::Debug for StreamClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamClientConfig")
            .field("account_id", &self.account_id)
            .field("response_timeout", &self.response_timeout)
            .field("broadcast_capacity", &self.broadcast_capacity)
            .field("custom_tls", &self.tls.is_some())
            .finish()
    }
}

// =============================================================================
// Session
// =============================================================================

/// State of a logged-in connection.
pub struct StreamSession {
    account: PrincipalAccount,
    source: String,
    stream_key: String,
    socket: Socket,
}

impl StreamSession {
    /// Account requests are made for.
    #[must_use]
    pub fn account_id(&self) -> &str {
        &self.account.account_id
    }

    /// Resolved account record.
    #[must_use]
    pub const fn account(&self) -> &PrincipalAccount {
        &self.account
    }

    /// Application id sent as the request `source`.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Stream subscription key, used as the `ACCT_ACTIVITY` key.
    #[must_use]
    pub fn stream_key(&self) -> &str {
        &self.stream_key
    }
}

impl fmt::Debug for StreamSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamSession")
            .field("account_id", &self.account.account_id)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

enum Inbound {
    Text(String),
    Closed,
}

// =============================================================================
// Stream Client
// =============================================================================

/// Streaming API client.
pub struct StreamClient {
    principals: Arc<dyn PrincipalsProvider>,
    config: StreamClientConfig,
    codec: StreamCodec,
    session: Option<StreamSession>,
    correlator: Correlator,
    dispatcher: Dispatcher,
}

impl StreamClient {
    /// Create a client. No I/O happens until [`login`](Self::login).
    #[must_use]
    pub fn new(principals: Arc<dyn PrincipalsProvider>, config: StreamClientConfig) -> Self {
        let dispatcher = Dispatcher::new(config.broadcast_capacity);
        Self {
            principals,
            config,
            codec: StreamCodec::new(),
            session: None,
            correlator: Correlator::new(),
            dispatcher,
        }
    }

    /// The current session, if logged in.
    #[must_use]
    pub const fn session(&self) -> Option<&StreamSession> {
        self.session.as_ref()
    }

    /// Whether a session is open.
    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    // -------------------------------------------------------------------------
    // Admin
    // -------------------------------------------------------------------------

    /// Open the socket and log in.
    ///
    /// Account selection and credential checks run before the socket is
    /// opened. A rejected LOGIN closes the socket again.
    ///
    /// # Errors
    ///
    /// Returns [`StreamClientError::AlreadyLoggedIn`] while a session is open.
    /// Otherwise fails if principals cannot be fetched, the account is
    /// ambiguous or unknown, the connection fails, or the server rejects the
    /// login.
    pub async fn login(&mut self) -> Result<(), StreamClientError> {
        if self.session.is_some() {
            return Err(StreamClientError::AlreadyLoggedIn);
        }

        let principals = self.principals.user_principals().await?;
        let account =
            auth::resolve_account(&principals, self.config.account_id.as_deref())?.clone();
        let stream_key = auth::subscription_key(&principals)?.to_string();
        let parameters = auth::login_parameters(&account, &principals.streamer_info)?;
        let url = auth::socket_url(&principals.streamer_info.streamer_socket_url);

        tracing::info!(url = %url, account_id = %account.account_id, "Connecting to stream");

        let connector = self.config.tls.clone().map(Connector::Rustls);
        let (socket, _response) =
            tokio_tungstenite::connect_async_tls_with_config(url.as_str(), None, false, connector)
                .await?;

        self.correlator = Correlator::new();
        self.session = Some(StreamSession {
            account,
            source: principals.streamer_info.app_id.clone(),
            stream_key,
            socket,
        });

        let request = self.make_request(Service::Admin, Command::Login, parameters)?;
        if let Err(e) = self.send_and_await(request).await {
            tracing::warn!(error = %e, "Login rejected");
            self.session = None;
            return Err(e);
        }

        tracing::info!("Logged in to stream");
        Ok(())
    }

    /// Log out and close the socket.
    ///
    /// The session is dropped even if the server's reply is an error.
    ///
    /// # Errors
    ///
    /// Returns an error if not logged in or the reply is not a success.
    pub async fn logout(&mut self) -> Result<(), StreamClientError> {
        let request = self.make_request(Service::Admin, Command::Logout, Map::new())?;
        let result = self.send_and_await(request).await;

        if let Some(mut session) = self.session.take()
            && let Err(e) = session.socket.close(None).await
        {
            tracing::debug!(error = %e, "Error closing socket after logout");
        }

        tracing::info!("Logged out of stream");
        result.map(|_| ())
    }

    /// Set the server-side update rate.
    ///
    /// # Errors
    ///
    /// Returns an error if not logged in or the server rejects the level.
    pub async fn quality_of_service(&mut self, level: QosLevel) -> Result<(), StreamClientError> {
        let mut parameters = Map::new();
        parameters.insert("qoslevel".to_string(), json!(level.code()));

        let request = self.make_request(Service::Admin, Command::Qos, parameters)?;
        self.send_and_await(request).await?;
        tracing::info!(qos = ?level, "Quality of service updated");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Requests
    // -------------------------------------------------------------------------

    /// Build a request with the next request ID.
    ///
    /// # Errors
    ///
    /// Returns [`StreamClientError::NotLoggedIn`] without a session.
    pub fn make_request(
        &mut self,
        service: Service,
        command: Command,
        parameters: Map<String, Value>,
    ) -> Result<Request, StreamClientError> {
        let session = self.session.as_ref().ok_or(StreamClientError::NotLoggedIn)?;
        let account = session.account.account_id.clone();
        let source = session.source.clone();

        Ok(Request {
            service,
            requestid: self.correlator.next_request_id(),
            command,
            account,
            source,
            parameters,
        })
    }

    /// Send an envelope, optionally waiting for its validated response.
    ///
    /// While waiting, unrelated pushed data is dispatched as usual.
    ///
    /// # Errors
    ///
    /// - [`StreamClientError::UnsupportedBatch`] unless the envelope holds
    ///   exactly one request
    /// - [`StreamClientError::Correlation`] if the reply does not match or
    ///   reports failure
    /// - [`StreamClientError::ResponseTimeout`] if a timeout is configured
    ///   and exceeded
    pub async fn send(
        &mut self,
        envelope: RequestEnvelope,
        await_response: bool,
    ) -> Result<Option<ResponseMessage>, StreamClientError> {
        if envelope.requests.len() != 1 {
            return Err(StreamClientError::UnsupportedBatch(envelope.requests.len()));
        }
        let session = self.session.as_mut().ok_or(StreamClientError::NotLoggedIn)?;
        let text = self.codec.encode(&envelope)?;

        let mut requests = envelope.requests;
        let request = requests.remove(0);

        if await_response {
            self.correlator.expect(&request.requestid);
        }

        tracing::debug!(
            service = %request.service,
            command = %request.command,
            request_id = %request.requestid,
            "Sending request"
        );
        if let Err(e) = session.socket.send(Message::Text(text.into())).await {
            metrics::record_websocket_error();
            self.correlator.abandon(&request.requestid);
            return Err(e.into());
        }
        metrics::record_request_sent(request.service, request.command);

        if await_response {
            self.await_response(&request).await.map(Some)
        } else {
            Ok(None)
        }
    }

    async fn send_and_await(
        &mut self,
        request: Request,
    ) -> Result<ResponseMessage, StreamClientError> {
        self.send(RequestEnvelope::single(request), true)
            .await?
            .ok_or(StreamClientError::ConnectionClosed)
    }

    async fn await_response(
        &mut self,
        request: &Request,
    ) -> Result<ResponseMessage, StreamClientError> {
        let id = request.requestid.as_str();
        let started = Instant::now();

        let response = match self.pump_until(id).await {
            Ok(response) => response,
            Err(e) => {
                self.correlator.abandon(id);
                return Err(e);
            }
        };

        metrics::record_response_wait(request.command, started.elapsed());
        Ok(Correlator::validate(request, response)?)
    }

    /// Pump frames until `request_id` is answered.
    ///
    /// The response timeout bounds only the socket reads. A frame that has
    /// been read is always dispatched in full, however long handlers take.
    async fn pump_until(&mut self, request_id: &str) -> Result<Value, StreamClientError> {
        let deadline = self
            .config
            .response_timeout
            .map(|limit| (tokio::time::Instant::now() + limit, limit));

        loop {
            if let Some(response) = self.correlator.take(request_id) {
                return Ok(response);
            }

            let inbound = match deadline {
                Some((at, limit)) => tokio::time::timeout_at(at, self.next_inbound())
                    .await
                    .map_err(|_elapsed| StreamClientError::ResponseTimeout {
                        request_id: request_id.to_string(),
                        timeout: limit,
                    })??,
                None => self.next_inbound().await?,
            };

            match self.process_inbound(inbound).await {
                Err(StreamClientError::Correlation(e))
                    if self.correlator.is_fulfilled(request_id) =>
                {
                    tracing::warn!(
                        error = %e,
                        request_id = %request_id,
                        "Unsolicited response arrived with the awaited one"
                    );
                }
                result => result?,
            }
        }
    }

    // -------------------------------------------------------------------------
    // Inbound
    // -------------------------------------------------------------------------

    /// Receive and route exactly one inbound frame.
    ///
    /// Responses are filed for their waiting callers and never reach
    /// handlers. Pushed items are relabeled and delivered.
    ///
    /// # Errors
    ///
    /// - [`StreamClientError::Codec`] for a frame that is not JSON
    /// - [`StreamClientError::Correlation`] for a response nobody awaits
    /// - [`StreamClientError::ConnectionClosed`] when the server closes
    pub async fn handle_message(&mut self) -> Result<(), StreamClientError> {
        let inbound = self.next_inbound().await?;
        self.process_inbound(inbound).await
    }

    /// Route one frame that has already been read off the socket.
    ///
    /// Every entry of a `response` array is filed before the first error is
    /// returned, so one stray reply cannot hide another that is awaited.
    async fn process_inbound(&mut self, inbound: Inbound) -> Result<(), StreamClientError> {
        let text = match inbound {
            Inbound::Text(text) => text,
            Inbound::Closed => {
                tracing::info!("Stream closed by server");
                self.session = None;
                return Err(StreamClientError::ConnectionClosed);
            }
        };

        let frame = self.codec.decode(&text)?;
        let kind = frame.kind();
        metrics::record_frame_received(kind.as_str());
        tracing::trace!(kind = kind.as_str(), "Received frame");

        if frame.is_response() {
            let mut first_error = None;
            for response in frame.response {
                match self.correlator.fulfill(response) {
                    Ok(Filed::Fulfilled(id)) => {
                        tracing::trace!(request_id = %id, "Response filed");
                    }
                    Ok(Filed::Late(_)) => metrics::record_late_response(),
                    Err(e) => {
                        first_error.get_or_insert(e);
                    }
                }
            }
            return first_error.map_or(Ok(()), |e| Err(e.into()));
        }

        for item in frame.pushed_items() {
            self.dispatcher.dispatch(item).await;
        }
        Ok(())
    }

    async fn next_inbound(&mut self) -> Result<Inbound, StreamClientError> {
        let session = self.session.as_mut().ok_or(StreamClientError::NotLoggedIn)?;

        loop {
            match session.socket.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Inbound::Text(text.to_string())),
                Some(Ok(Message::Binary(data))) => {
                    return Ok(Inbound::Text(String::from_utf8_lossy(&data).into_owned()));
                }
                Some(Ok(Message::Close(frame))) => {
                    tracing::debug!(frame = ?frame, "Received close frame");
                    return Ok(Inbound::Closed);
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => {}
                Some(Err(e)) => {
                    metrics::record_websocket_error();
                    return Err(e.into());
                }
                None => return Ok(Inbound::Closed),
            }
        }
    }

    /// Pump messages until `cancel` fires or an error occurs.
    ///
    /// Cancellation is honoured between frames; a frame already read is
    /// dispatched in full first.
    ///
    /// # Errors
    ///
    /// Returns the first error from [`handle_message`](Self::handle_message).
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<(), StreamClientError> {
        loop {
            let inbound = tokio::select! {
                () = cancel.cancelled() => {
                    tracing::info!("Stream loop cancelled");
                    return Ok(());
                }
                inbound = self.next_inbound() => inbound?,
            };
            self.process_inbound(inbound).await?;
        }
    }

    // -------------------------------------------------------------------------
    // Handlers
    // -------------------------------------------------------------------------

    /// Register a handler for a service's pushed messages.
    ///
    /// # Errors
    ///
    /// Returns [`StreamClientError::UnsupportedService`] for services that are
    /// never dispatched.
    pub fn add_handler(
        &mut self,
        service: Service,
        handler: Handler,
    ) -> Result<HandlerId, StreamClientError> {
        if !service.descriptor().dispatchable {
            return Err(StreamClientError::UnsupportedService {
                service,
                operation: "handlers",
            });
        }
        Ok(self.dispatcher.handlers_mut().add(service, handler))
    }

    /// Unregister a handler. Returns whether it was registered.
    pub fn remove_handler(&mut self, id: HandlerId) -> bool {
        self.dispatcher.handlers_mut().remove(id)
    }

    /// Receiver of every relabeled pushed message.
    #[must_use]
    pub fn messages(&self) -> broadcast::Receiver<StreamMessage> {
        self.dispatcher.subscribe()
    }

    // -------------------------------------------------------------------------
    // Subscriptions
    // -------------------------------------------------------------------------

    /// Subscribe to `symbols`, replacing the service's current subscription.
    ///
    /// `fields` defaults to every field of the service.
    ///
    /// # Errors
    ///
    /// Returns an error if the service is not subscribable, a field is
    /// foreign to it, or the server rejects the request.
    pub async fn subscribe(
        &mut self,
        service: Service,
        symbols: &[&str],
        fields: Option<&[Field]>,
    ) -> Result<(), StreamClientError> {
        self.subscription_request(service, Command::Subs, symbols, fields)
            .await
    }

    /// Add `symbols` to the service's current subscription.
    ///
    /// # Errors
    ///
    /// Same as [`subscribe`](Self::subscribe).
    pub async fn append_subscription(
        &mut self,
        service: Service,
        symbols: &[&str],
        fields: Option<&[Field]>,
    ) -> Result<(), StreamClientError> {
        self.subscription_request(service, Command::Add, symbols, fields)
            .await
    }

    /// Remove `symbols` from the service's subscription.
    ///
    /// # Errors
    ///
    /// Same as [`subscribe`](Self::subscribe).
    pub async fn unsubscribe(
        &mut self,
        service: Service,
        symbols: &[&str],
        fields: Option<&[Field]>,
    ) -> Result<(), StreamClientError> {
        self.subscription_request(service, Command::Unsubs, symbols, fields)
            .await
    }

    async fn subscription_request(
        &mut self,
        service: Service,
        command: Command,
        symbols: &[&str],
        fields: Option<&[Field]>,
    ) -> Result<(), StreamClientError> {
        let descriptor = service.descriptor();
        let registry = descriptor
            .registry()
            .filter(|_| descriptor.subscribable)
            .ok_or(StreamClientError::UnsupportedService {
                service,
                operation: command.as_str(),
            })?;

        let fields = match fields {
            Some(fields) => {
                if let Some(foreign) = fields.iter().find(|f| !registry.contains(**f)) {
                    return Err(StreamClientError::UnknownField {
                        service,
                        field: foreign.name(),
                    });
                }
                fields
            }
            None => registry.all_fields(),
        };

        let session = self.session.as_ref().ok_or(StreamClientError::NotLoggedIn)?;
        let keys = if service == Service::AccountActivity {
            session.stream_key.clone()
        } else {
            symbols.join(",")
        };

        let mut parameters = Map::new();
        parameters.insert("keys".to_string(), json!(keys));
        parameters.insert("fields".to_string(), json!(join_field_codes(fields)));

        let request = self.make_request(service, command, parameters)?;
        self.send_and_await(request).await?;
        Ok(())
    }
}

/// Typed `SUBS` / `ADD` / `UNSUBS` wrappers for one service.
macro_rules! subscription_methods {
    ($($service:ident => $subs:ident, $add:ident, $unsubs:ident;)+) => {
        impl StreamClient {
            $(
                #[doc = concat!("`SUBS` on [`Service::", stringify!($service), "`].")]
                ///
                /// # Errors
                ///
                /// See [`subscribe`](Self::subscribe).
                pub async fn $subs(
                    &mut self,
                    symbols: &[&str],
                    fields: Option<&[Field]>,
                ) -> Result<(), StreamClientError> {
                    self.subscribe(Service::$service, symbols, fields).await
                }

                #[doc = concat!("`ADD` on [`Service::", stringify!($service), "`].")]
                ///
                /// # Errors
                ///
                /// See [`subscribe`](Self::subscribe).
                pub async fn $add(
                    &mut self,
                    symbols: &[&str],
                    fields: Option<&[Field]>,
                ) -> Result<(), StreamClientError> {
                    self.append_subscription(Service::$service, symbols, fields).await
                }

                #[doc = concat!("`UNSUBS` on [`Service::", stringify!($service), "`].")]
                ///
                /// # Errors
                ///
                /// See [`subscribe`](Self::subscribe).
                pub async fn $unsubs(
                    &mut self,
                    symbols: &[&str],
                    fields: Option<&[Field]>,
                ) -> Result<(), StreamClientError> {
                    self.unsubscribe(Service::$service, symbols, fields).await
                }
            )+
        }
    };
}

subscription_methods! {
    Quote => level_one_equity_subs, level_one_equity_add, level_one_equity_unsubs;
    Option => level_one_option_subs, level_one_option_add, level_one_option_unsubs;
    LevelOneFutures => level_one_futures_subs, level_one_futures_add, level_one_futures_unsubs;
    LevelOneForex => level_one_forex_subs, level_one_forex_add, level_one_forex_unsubs;
    LevelOneFuturesOptions =>
        level_one_futures_options_subs,
        level_one_futures_options_add,
        level_one_futures_options_unsubs;
    ChartEquity => chart_equity_subs, chart_equity_add, chart_equity_unsubs;
    ChartFutures => chart_futures_subs, chart_futures_add, chart_futures_unsubs;
    TimesaleEquity => timesale_equity_subs, timesale_equity_add, timesale_equity_unsubs;
    TimesaleFutures => timesale_futures_subs, timesale_futures_add, timesale_futures_unsubs;
    TimesaleOptions => timesale_options_subs, timesale_options_add, timesale_options_unsubs;
    NewsHeadline => news_headline_subs, news_headline_add, news_headline_unsubs;
    ListedBook => listed_book_subs, listed_book_add, listed_book_unsubs;
    NasdaqBook => nasdaq_book_subs, nasdaq_book_add, nasdaq_book_unsubs;
    OptionsBook => options_book_subs, options_book_add, options_book_unsubs;
}

impl StreamClient {
    /// `SUBS` on [`Service::AccountActivity`], keyed by the stream key.
    ///
    /// # Errors
    ///
    /// See [`subscribe`](Self::subscribe).
    pub async fn account_activity_subs(&mut self) -> Result<(), StreamClientError> {
        self.subscribe(Service::AccountActivity, &[], None).await
    }

    /// `ADD` on [`Service::AccountActivity`].
    ///
    /// # Errors
    ///
    /// See [`subscribe`](Self::subscribe).
    pub async fn account_activity_add(&mut self) -> Result<(), StreamClientError> {
        self.append_subscription(Service::AccountActivity, &[], None)
            .await
    }

    /// `UNSUBS` on [`Service::AccountActivity`].
    ///
    /// # Errors
    ///
    /// See [`subscribe`](Self::subscribe).
    pub async fn account_activity_unsubs(&mut self) -> Result<(), StreamClientError> {
        self.unsubscribe(Service::AccountActivity, &[], None).await
    }
}

impl fmt::Debug for StreamClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamClient")
            .field("config", &self.config)
            .field("session", &self.session)
            .field("pending", &self.correlator.pending())
            .finish_non_exhaustive()
    }
}
