//! IRC client connection state machine.
//!
//! A [`Connection`] owns exactly one socket and one background reader task
//! for its lifetime. The reader task answers PINGs and flips the registered
//! flag when the first numeric reply arrives; the main dispatch flow drives
//! registration, joins, message delivery and teardown in strict order.
//!
//! Lifecycle: `Connecting → Registering → Ready → Closing → Closed`. No
//! connection survives a dispatch run.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{ReadHalf, WriteHalf, split};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, trace, warn};

use notifirc_proto::{ClientCommand, LineCodec, ServerLine};

use crate::error::DispatchError;
use crate::router::ServerTarget;
use crate::transport::{self, BoxedStream};

type SharedWriter = Arc<Mutex<FramedWrite<WriteHalf<BoxedStream>, LineCodec>>>;

/// Lifecycle state of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnState {
    Connecting,
    Registering,
    Ready,
    Closing,
    Closed,
}

/// Tunables for connection waits.
#[derive(Debug, Clone, Copy)]
pub struct ConnectOptions {
    /// How long to wait for the server's first numeric reply.
    pub registration_timeout: Duration,
    /// How long to drain inbound lines after QUIT before dropping the socket.
    pub quit_drain: Duration,
    /// Accept invalid TLS certificates.
    pub insecure_skip_verify: bool,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            registration_timeout: Duration::from_secs(60),
            quit_drain: Duration::from_secs(5),
            insecure_skip_verify: false,
        }
    }
}

/// One live connection to an IRC server.
pub struct Connection {
    host: String,
    port: u16,
    state: ConnState,
    writer: SharedWriter,
    registered: watch::Receiver<bool>,
    reader: Option<JoinHandle<()>>,
    opts: ConnectOptions,
}

impl Connection {
    /// Open a connection and send the registration sequence
    /// (`PASS?`, `NICK`, `USER`).
    ///
    /// The reader task starts before any protocol data goes out, so a
    /// server that PINGs during registration gets its PONG.
    pub async fn open(
        target: &ServerTarget,
        nick: &str,
        opts: ConnectOptions,
    ) -> Result<Self, DispatchError> {
        let stream = transport::connect(target, opts.insecure_skip_verify).await?;
        let (read_half, write_half) = split(stream);

        let writer: SharedWriter =
            Arc::new(Mutex::new(FramedWrite::new(write_half, LineCodec::new())));
        let (registered_tx, registered_rx) = watch::channel(false);

        let reader = tokio::spawn(read_loop(
            FramedRead::new(read_half, LineCodec::new()),
            Arc::clone(&writer),
            registered_tx,
            target.host.clone(),
        ));

        let mut conn = Self {
            host: target.host.clone(),
            port: target.port,
            state: ConnState::Connecting,
            writer,
            registered: registered_rx,
            reader: Some(reader),
            opts,
        };

        if let Some(password) = &target.password {
            conn.send(ClientCommand::Pass(password.clone())).await?;
        }
        conn.send(ClientCommand::Nick(nick.to_string())).await?;
        conn.send(ClientCommand::User(nick.to_string())).await?;
        conn.state = ConnState::Registering;

        Ok(conn)
    }

    /// Wait until the server has confirmed registration with a numeric
    /// reply. `skip` presumes registration complete without waiting, for
    /// servers that never send one.
    pub async fn await_registered(&mut self, skip: bool) -> Result<(), DispatchError> {
        if self.state == ConnState::Ready {
            return Ok(());
        }
        if skip {
            self.state = ConnState::Ready;
            return Ok(());
        }

        let mut registered = self.registered.clone();
        match timeout(
            self.opts.registration_timeout,
            registered.wait_for(|seen| *seen),
        )
        .await
        {
            Ok(Ok(_)) => {
                self.state = ConnState::Ready;
                Ok(())
            }
            // Deadline hit, or the reader task is gone because the socket
            // died: either way registration was never confirmed.
            Ok(Err(_)) | Err(_) => Err(DispatchError::ProtocolTimeout {
                host: self.host.clone(),
                port: self.port,
            }),
        }
    }

    /// Whether the connection has reached the ready state.
    pub fn is_ready(&self) -> bool {
        self.state == ConnState::Ready
    }

    /// Join a channel. Valid only once registered; fire-and-forget, no
    /// acknowledgment wait.
    pub async fn join(&mut self, channel: &str, key: Option<&str>) -> Result<(), DispatchError> {
        self.ensure_ready("JOIN")?;
        self.send(ClientCommand::Join {
            channel: channel.to_string(),
            key: key.map(str::to_string),
        })
        .await
    }

    /// Send one message line to a channel. Valid only once registered.
    pub async fn say(
        &mut self,
        message: &str,
        channel: &str,
        use_notice: bool,
    ) -> Result<(), DispatchError> {
        self.ensure_ready(if use_notice { "NOTICE" } else { "PRIVMSG" })?;
        self.send(ClientCommand::message(channel, message, use_notice))
            .await
    }

    /// Part a channel.
    pub async fn leave(&mut self, channel: &str) -> Result<(), DispatchError> {
        self.send(ClientCommand::Part(channel.to_string())).await
    }

    /// Send QUIT, drain inbound until the server closes the stream, then
    /// tear down. Draining lets the server flush lines buffered by earlier
    /// commands; closing early can truncate delivery on some servers.
    pub async fn quit(mut self) -> Result<(), DispatchError> {
        self.state = ConnState::Closing;
        let result = self.send(ClientCommand::Quit).await;

        if let Some(mut reader) = self.reader.take() {
            if timeout(self.opts.quit_drain, &mut reader).await.is_err() {
                warn!(host = %self.host, "quit drain deadline reached, dropping socket");
                reader.abort();
            }
        }
        self.state = ConnState::Closed;

        result
    }

    fn ensure_ready(&self, command: &'static str) -> Result<(), DispatchError> {
        if self.state == ConnState::Ready {
            Ok(())
        } else {
            Err(DispatchError::InvalidState { command })
        }
    }

    async fn send(&self, command: ClientCommand) -> Result<(), DispatchError> {
        trace!(host = %self.host, command = command.name(), "send");
        let mut writer = self.writer.lock().await;
        writer
            .send(command.to_string())
            .await
            .map_err(|e| DispatchError::Send {
                host: self.host.clone(),
                source: e,
            })
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        // The reader task must never outlive the socket it reads from.
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

/// Background keepalive loop, one per connection.
///
/// Answers PINGs with a verbatim-echo PONG, flips the registered flag on
/// the first numeric reply, and ignores everything else. Ends when the
/// socket yields EOF or an error, or when the connection aborts it.
async fn read_loop(
    mut lines: FramedRead<ReadHalf<BoxedStream>, LineCodec>,
    writer: SharedWriter,
    registered: watch::Sender<bool>,
    host: String,
) {
    while let Some(next) = lines.next().await {
        let line = match next {
            Ok(line) => line,
            Err(e) => {
                debug!(host = %host, error = %e, "read failed, stopping keepalive");
                return;
            }
        };

        match ServerLine::parse(&line) {
            ServerLine::Ping(args) => {
                let pong = ClientCommand::Pong(args).to_string();
                if writer.lock().await.send(pong).await.is_err() {
                    debug!(host = %host, "PONG write failed, stopping keepalive");
                    return;
                }
            }
            ServerLine::Numeric(code) => {
                trace!(host = %host, code, "numeric reply");
                let _ = registered.send(true);
            }
            ServerLine::Other => trace!(host = %host, line = %line, "ignoring server line"),
        }
    }

    debug!(host = %host, "server closed the stream");
}
