//! Inbound message routing and outbound senders for both sides of the channel.
//!
//! Adapters decode one envelope, match its variant exhaustively and call the
//! single handler for it. A message that fails to decode is logged, counted
//! and dropped; it never affects the next one.

use crate::config::ChannelConfig;
use crate::error::Result;
use crate::model::gui::{GuiPage, PageType};
use crate::model::skin::{SkinIdentifier, SkinProperty};
use crate::protocol::handshake::AckTracker;
use crate::protocol::proxy_bound::{GuiAction, OpenPage, ProxyBoundPayload};
use crate::protocol::server_bound::{GiveSkull, ServerBoundPayload, SkinUpdate};
use crate::protocol::AckPayload;
use crate::transport::Transport;
use crate::utils::metrics::{self, Metrics, Timer};
use bytes::Bytes;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Whether `channel` is the plugin channel named in `config`.
pub fn is_plugin_channel(config: &ChannelConfig, channel: &str) -> bool {
    config.name == channel
}

/// Decode one envelope, counting the outcome.
fn decode_envelope<P>(
    metrics: &Metrics,
    data: Bytes,
    decode: impl FnOnce(Bytes) -> Result<P>,
) -> Result<P> {
    let len = data.len() as u64;
    match decode(data) {
        Ok(payload) => {
            metrics.message_decoded(len);
            Ok(payload)
        }
        Err(e) => {
            metrics.decode_error();
            warn!(error = %e, bytes = len, "Dropping malformed plugin message");
            Err(e)
        }
    }
}

fn send_encoded(
    transport: &dyn Transport,
    metrics: &Metrics,
    endpoint: &str,
    encoded: Result<Bytes>,
) -> Result<()> {
    let data = encoded?;
    metrics.message_encoded(data.len() as u64);
    transport.send(endpoint, data).inspect_err(|e| {
        debug!(endpoint, error = %e, "Plugin message not delivered");
    })
}

/// Backend-side effects of proxy messages.
pub trait ServerHooks: Send + Sync {
    fn open_gui(&self, connection: &str, page: GuiPage);

    fn apply_skin(&self, connection: &str, property: SkinProperty);

    fn give_skull(&self, connection: &str, skull: GiveSkull);
}

/// Handles messages arriving at a backend server from the proxy.
pub struct ServerMessageAdapter {
    config: ChannelConfig,
    hooks: Arc<dyn ServerHooks>,
    transport: Arc<dyn Transport>,
    warned_outdated_proxy: AtomicBool,
    metrics: &'static Metrics,
}

impl ServerMessageAdapter {
    pub fn new(
        config: &ChannelConfig,
        hooks: Arc<dyn ServerHooks>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            config: config.clone(),
            hooks,
            transport,
            warned_outdated_proxy: AtomicBool::new(false),
            metrics: metrics::global(),
        }
    }

    /// Handle a message on any channel, ignoring those that are not ours.
    pub fn handle_plugin_message(
        &self,
        channel: &str,
        connection: &str,
        data: impl Into<Bytes>,
    ) -> Result<()> {
        if !is_plugin_channel(&self.config, channel) {
            return Ok(());
        }
        self.handle_message(connection, data)
    }

    /// Decode and dispatch one message received on `connection`.
    ///
    /// # Errors
    /// Returns the decode error after logging it; the message is dropped.
    #[instrument(skip(self, data))]
    pub fn handle_message(&self, connection: &str, data: impl Into<Bytes>) -> Result<()> {
        let _timer = Timer::start("server_handle_message");
        let payload = decode_envelope(self.metrics, data.into(), ServerBoundPayload::decode)?;

        match payload {
            ServerBoundPayload::OpenGui(page) => self.hooks.open_gui(connection, page),
            ServerBoundPayload::SkinUpdateV2(property) => {
                if !self.warned_outdated_proxy.swap(true, Ordering::Relaxed) {
                    warn!(
                        "The proxy sent a legacy skin update; update the proxy plugin to get \
                         ack verification"
                    );
                }
                self.hooks.apply_skin(connection, property);
            }
            ServerBoundPayload::SkinUpdateV3(SkinUpdate { property, ack }) => {
                self.hooks.apply_skin(connection, property);
                if let Some(ack) = ack {
                    self.acknowledge(connection, ack);
                }
            }
            ServerBoundPayload::GiveSkull(skull) => self.hooks.give_skull(connection, skull),
            ServerBoundPayload::Unknown => {
                self.metrics.unknown_payload();
                warn!(
                    "Received an unknown payload; the proxy runs a different plugin version"
                );
            }
        }
        Ok(())
    }

    fn acknowledge(&self, connection: &str, request: AckPayload) {
        if request.version.eq_ignore_ascii_case(&self.config.local_version) {
            debug!(version = %request.version, "Proxy version matches");
        } else {
            warn!(
                proxy_version = %request.version,
                local_version = %self.config.local_version,
                "Proxy runs a different plugin version; update both sides to the same version"
            );
        }

        let reply = ProxyBoundPayload::Ack(AckPayload::new(
            request.ack_id,
            self.config.local_version.clone(),
        ));
        if let Err(e) = send_encoded(&*self.transport, self.metrics, connection, reply.encode()) {
            warn!(error = %e, ack_id = %request.ack_id, "Failed to send ack to proxy");
        }
    }
}

/// Proxy-side effects of menu actions.
pub trait GuiActionHandler: Send + Sync {
    fn open_page(&self, player: &str, page: i32, page_type: PageType);

    fn clear_skin(&self, player: &str);

    fn set_skin(&self, player: &str, skin: SkinIdentifier);

    fn add_favourite(&self, player: &str, skin: SkinIdentifier);

    fn remove_favourite(&self, player: &str, skin: SkinIdentifier);
}

/// Run one menu action against `handler`.
pub fn dispatch_gui_action(handler: &dyn GuiActionHandler, player: &str, action: GuiAction) {
    match action {
        GuiAction::OpenPage(OpenPage { page, page_type }) => {
            handler.open_page(player, page, page_type)
        }
        GuiAction::ClearSkin => handler.clear_skin(player),
        GuiAction::SetSkin(skin) => handler.set_skin(player, skin),
        GuiAction::AddFavourite(skin) => handler.add_favourite(player, skin),
        GuiAction::RemoveFavourite(skin) => handler.remove_favourite(player, skin),
        GuiAction::Unknown => {
            metrics::global().unknown_payload();
            warn!(player, "Received an unknown menu action; the backend runs a different plugin version");
        }
    }
}

/// Handles messages arriving at the proxy from backend servers.
pub struct ProxyMessageAdapter {
    config: ChannelConfig,
    tracker: Arc<AckTracker>,
    actions: Arc<dyn GuiActionHandler>,
    metrics: &'static Metrics,
}

impl ProxyMessageAdapter {
    pub fn new(
        config: &ChannelConfig,
        tracker: Arc<AckTracker>,
        actions: Arc<dyn GuiActionHandler>,
    ) -> Self {
        Self {
            config: config.clone(),
            tracker,
            actions,
            metrics: metrics::global(),
        }
    }

    pub fn handle_plugin_message(
        &self,
        channel: &str,
        endpoint: &str,
        player: &str,
        data: impl Into<Bytes>,
    ) -> Result<()> {
        if !is_plugin_channel(&self.config, channel) {
            return Ok(());
        }
        self.handle_message(endpoint, player, data)
    }

    /// Decode and dispatch one message sent by `endpoint` on behalf of `player`.
    ///
    /// # Errors
    /// Returns the decode error after logging it; the message is dropped.
    #[instrument(skip(self, data))]
    pub fn handle_message(&self, endpoint: &str, player: &str, data: impl Into<Bytes>) -> Result<()> {
        let _timer = Timer::start("proxy_handle_message");
        let payload = decode_envelope(self.metrics, data.into(), ProxyBoundPayload::decode)?;

        match payload {
            ProxyBoundPayload::GuiActionList(actions) => {
                for action in actions {
                    dispatch_gui_action(&*self.actions, player, action);
                }
            }
            ProxyBoundPayload::Ack(ack) => {
                self.tracker.received_ack(endpoint, &ack);
            }
            ProxyBoundPayload::Unknown => {
                self.metrics.unknown_payload();
                warn!("Received an unknown payload; the backend runs a different plugin version");
            }
        }
        Ok(())
    }
}

/// Sends proxy messages to backend servers.
pub struct ProxyMessenger {
    transport: Arc<dyn Transport>,
    tracker: Arc<AckTracker>,
    metrics: &'static Metrics,
}

impl ProxyMessenger {
    pub fn new(transport: Arc<dyn Transport>, tracker: Arc<AckTracker>) -> Self {
        Self {
            transport,
            tracker,
            metrics: metrics::global(),
        }
    }

    fn send(&self, endpoint: &str, payload: &ServerBoundPayload) -> Result<()> {
        send_encoded(&*self.transport, self.metrics, endpoint, payload.encode())
    }

    /// Send a skin update, requesting an ack unless `endpoint` is verified.
    #[instrument(skip(self, property))]
    pub fn send_skin_update(&self, endpoint: &str, property: SkinProperty) -> Result<()> {
        let ack = self.tracker.should_ack(endpoint);
        self.send(
            endpoint,
            &ServerBoundPayload::SkinUpdateV3(SkinUpdate { property, ack }),
        )
    }

    /// Send the pre-handshake update shape.
    pub fn send_legacy_skin_update(&self, endpoint: &str, property: SkinProperty) -> Result<()> {
        self.send(endpoint, &ServerBoundPayload::SkinUpdateV2(property))
    }

    pub fn open_gui(&self, endpoint: &str, page: GuiPage) -> Result<()> {
        self.send(endpoint, &ServerBoundPayload::OpenGui(page))
    }

    pub fn give_skull(&self, endpoint: &str, skull: GiveSkull) -> Result<()> {
        self.send(endpoint, &ServerBoundPayload::GiveSkull(skull))
    }
}

/// Sends backend messages to the proxy.
pub struct ServerMessenger {
    transport: Arc<dyn Transport>,
    metrics: &'static Metrics,
}

impl ServerMessenger {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            metrics: metrics::global(),
        }
    }

    /// Forward the actions of a clicked menu item.
    pub fn send_gui_actions(&self, connection: &str, actions: Vec<GuiAction>) -> Result<()> {
        send_encoded(
            &*self.transport,
            self.metrics,
            connection,
            ProxyBoundPayload::GuiActionList(actions).encode(),
        )
    }
}
