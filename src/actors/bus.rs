//! MessageBusActor - owns the MQTT connection
//!
//! One actor owns the one logical broker connection: the rumqttc event loop
//! runs here, connection state transitions happen here, and reconnects are
//! supervised here. Everything else talks to it through [`BusHandle`].
//!
//! ## Reconnect policy
//!
//! Any event-loop error marks the connection `Disconnected`, waits an
//! exponentially growing delay (1s initial, doubling, capped at 60s) and
//! then re-enters `Connecting`. The delay resets on a successful CONNACK.
//! There is no attempt limit; the client retries until the process ends.
//! The wait is a deadline raced inside the main select loop, so commands
//! keep being serviced while it elapses: publishes issued during the wait
//! are dropped immediately and a shutdown takes effect at once.
//!
//! ## Delivery guarantee
//!
//! Publishes are fire-and-forget at QoS 0, no retain. While the connection
//! is down, publishes are dropped with a log line rather than queued - a
//! stale alert is worthless by the time the next cycle re-evaluates.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS, TlsConfiguration, Transport};
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, error, info, instrument, warn};

use crate::config::{BrokerConfig, TlsConfig};
use crate::pipeline::{Alert, AlertSink};

use super::messages::{BusCommand, ConnectionState};

const KEEP_ALIVE: Duration = Duration::from_secs(30);

/// Exponential backoff between reconnect attempts
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            current: initial,
        }
    }

    /// Delay to wait before the next attempt; doubles up to the cap
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }

    /// Reset after a successful connect
    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(60))
    }
}

/// Actor that owns the broker connection
pub struct MessageBusActor {
    /// rumqttc client half (publishes, disconnect)
    client: AsyncClient,

    /// rumqttc event loop; polling it drives the network
    event_loop: EventLoop,

    /// Command receiver
    command_rx: mpsc::Receiver<BusCommand>,

    /// Connection state, published for anyone holding a handle
    state_tx: watch::Sender<ConnectionState>,

    /// Reconnect backoff state
    backoff: Backoff,

    /// When set, the event loop is paused until this deadline before the
    /// next connection attempt
    retry_at: Option<Instant>,
}

impl MessageBusActor {
    /// Run the actor's main loop
    ///
    /// Polls the event loop and the command channel concurrently. This task
    /// is the background receive loop of the connection; publish callers
    /// never touch the socket themselves.
    #[instrument(skip(self))]
    pub async fn run(mut self) {
        debug!("starting message bus actor");

        loop {
            tokio::select! {
                event = self.event_loop.poll(), if self.retry_at.is_none() => {
                    self.handle_event(event);
                }

                // backoff deadline reached, let the next poll() re-attempt
                // the connection
                _ = sleep_until(self.retry_at.unwrap_or_else(Instant::now)), if self.retry_at.is_some() => {
                    self.retry_at = None;
                    let _ = self.state_tx.send(ConnectionState::Connecting);
                }

                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(BusCommand::Publish { topic, payload }) => {
                            self.publish(topic, payload);
                        }

                        Some(BusCommand::Shutdown) | None => {
                            debug!("shutting down message bus actor");
                            let _ = self.client.try_disconnect();
                            break;
                        }
                    }
                }
            }
        }

        debug!("message bus actor stopped");
    }

    fn handle_event(&mut self, event: Result<Event, rumqttc::ConnectionError>) {
        match event {
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                info!("connected to MQTT broker: {:?}", ack.code);
                self.backoff.reset();
                let _ = self.state_tx.send(ConnectionState::Connected);
            }

            // Other traffic (pings, publishes on subscribed topics) needs no
            // reaction from the alerting side.
            Ok(_) => {}

            Err(e) => {
                let _ = self.state_tx.send(ConnectionState::Disconnected);
                let delay = self.backoff.next_delay();
                warn!("lost connection to MQTT broker: {e}; retrying in {delay:?}");

                // commands must not starve while the delay elapses; the run
                // loop races this deadline against the command channel
                self.retry_at = Some(Instant::now() + delay);
            }
        }
    }

    fn publish(&self, topic: String, payload: String) {
        if *self.state_tx.borrow() != ConnectionState::Connected {
            warn!("not connected, dropping alert for {topic}");
            return;
        }

        if let Err(e) = self
            .client
            .try_publish(&topic, QoS::AtMostOnce, false, payload)
        {
            error!("failed to publish to {topic}: {e}");
        }
    }
}

/// Handle for talking to the MessageBusActor
///
/// Cloneable; safe to use from the scheduler task while the actor's receive
/// loop runs concurrently.
#[derive(Debug, Clone)]
pub struct BusHandle {
    sender: mpsc::Sender<BusCommand>,
    state_rx: watch::Receiver<ConnectionState>,
}

impl BusHandle {
    /// Spawn the bus actor and connect to the configured broker
    ///
    /// Connection establishment happens asynchronously in the actor; this
    /// returns as soon as the task is running. Failures to even build the
    /// transport (unreadable CA file, bad TLS setup) surface here.
    pub fn spawn(config: &BrokerConfig) -> anyhow::Result<Self> {
        info!(
            "starting MQTT client for {}:{}",
            config.host, config.port
        );

        let options = mqtt_options(config)?;
        let (client, event_loop) = AsyncClient::new(options, 32);

        let (cmd_tx, cmd_rx) = mpsc::channel(64);
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);

        let actor = MessageBusActor {
            client,
            event_loop,
            command_rx: cmd_rx,
            state_tx,
            backoff: Backoff::default(),
            retry_at: None,
        };

        tokio::spawn(actor.run());

        Ok(Self {
            sender: cmd_tx,
            state_rx,
        })
    }

    /// Publish a message, fire-and-forget
    ///
    /// Never fails from the caller's point of view; delivery problems are
    /// logged by the actor.
    pub async fn publish(&self, topic: String, payload: String) {
        if self
            .sender
            .send(BusCommand::Publish { topic, payload })
            .await
            .is_err()
        {
            warn!("bus actor gone, dropping alert");
        }
    }

    /// Current connection state
    pub fn current_state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// Gracefully shut down the bus client
    pub async fn shutdown(&self) -> anyhow::Result<()> {
        self.sender
            .send(BusCommand::Shutdown)
            .await
            .context("failed to send Shutdown command")?;
        Ok(())
    }
}

#[async_trait]
impl AlertSink for BusHandle {
    async fn deliver(&self, alert: Alert) {
        self.publish(alert.topic, alert.message).await;
    }
}

fn mqtt_options(config: &BrokerConfig) -> anyhow::Result<MqttOptions> {
    let mut options = MqttOptions::new(&config.client_id, &config.host, config.port);
    options.set_credentials(&config.username, &config.password);
    options.set_keep_alive(KEEP_ALIVE);

    if let Some(tls) = &config.tls {
        options.set_transport(Transport::Tls(tls_configuration(tls)?));
    }

    Ok(options)
}

fn tls_configuration(tls: &TlsConfig) -> anyhow::Result<TlsConfiguration> {
    if tls.verify_certificates {
        let ca = std::fs::read(&tls.ca_path)
            .with_context(|| format!("failed to read CA certificate {:?}", tls.ca_path))?;

        return Ok(TlsConfiguration::Simple {
            ca,
            alpn: None,
            client_auth: None,
        });
    }

    // Explicitly requested insecure mode: encrypt the channel but accept any
    // broker certificate.
    warn!("TLS certificate verification is DISABLED");

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let client_config = rustls::ClientConfig::builder_with_provider(provider.clone())
        .with_protocol_versions(&[&rustls::version::TLS12, &rustls::version::TLS13])
        .context("failed to configure TLS protocol versions")?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(insecure::NoVerification(provider)))
        .with_no_client_auth();

    Ok(TlsConfiguration::Rustls(Arc::new(client_config)))
}

mod insecure {
    //! Certificate verifier that accepts any broker certificate.
    //!
    //! Only reachable when `verify_certificates = false` is set in the
    //! config; the default path never constructs this.

    use std::sync::Arc;

    use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
    use rustls::crypto::CryptoProvider;
    use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
    use rustls::{DigitallySignedStruct, SignatureScheme};

    #[derive(Debug)]
    pub struct NoVerification(pub Arc<CryptoProvider>);

    impl ServerCertVerifier for NoVerification {
        fn verify_server_cert(
            &self,
            _end_entity: &CertificateDer<'_>,
            _intermediates: &[CertificateDer<'_>],
            _server_name: &ServerName<'_>,
            _ocsp_response: &[u8],
            _now: UnixTime,
        ) -> Result<ServerCertVerified, rustls::Error> {
            Ok(ServerCertVerified::assertion())
        }

        fn verify_tls12_signature(
            &self,
            message: &[u8],
            cert: &CertificateDer<'_>,
            dss: &DigitallySignedStruct,
        ) -> Result<HandshakeSignatureValid, rustls::Error> {
            rustls::crypto::verify_tls12_signature(
                message,
                cert,
                dss,
                &self.0.signature_verification_algorithms,
            )
        }

        fn verify_tls13_signature(
            &self,
            message: &[u8],
            cert: &CertificateDer<'_>,
            dss: &DigitallySignedStruct,
        ) -> Result<HandshakeSignatureValid, rustls::Error> {
            rustls::crypto::verify_tls13_signature(
                message,
                cert,
                dss,
                &self.0.signature_verification_algorithms,
            )
        }

        fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
            self.0
                .signature_verification_algorithms
                .supported_schemes()
        }
    }
}
