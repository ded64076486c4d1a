//! Serialized event queue: feed events and fired timers funnel through one
//! unbounded channel into a single dispatcher that owns every notifier.

use std::future::Future;
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use wifinotify_core::{
    ActionEvent, BlocklistStore, DefaultNotificationBuilder, NetworkNotifier, NotificationState,
    NotifierEvent, NotifierIdentity, NotifierPorts, TimerFired, TimerScheduler,
};
use wifinotify_store::SqliteSetStore;

use crate::cli::RunOpts;
use crate::config::RuntimeConfig;
use crate::feed::{self, FeedEvent};
use crate::hosts::{
    Emitter, EmitterPicker, EmitterSink, HostConnector, OutputRecord, SharedSettings, TokioClock,
};

#[derive(Debug)]
pub enum QueuedEvent {
    Feed(FeedEvent),
    Timer { notifier: usize, fired: TimerFired },
    /// The feed is done; stop when this is reached.
    Shutdown,
}

/// Sleeps on the tokio timer and posts the firing back into the queue.
pub struct QueueScheduler {
    notifier: usize,
    tx: UnboundedSender<QueuedEvent>,
}

impl TimerScheduler for QueueScheduler {
    fn schedule(&mut self, delay: Duration, fired: TimerFired) {
        let tx = self.tx.clone();
        let notifier = self.notifier;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let timer = fired.timer;
            if tx.send(QueuedEvent::Timer { notifier, fired }).is_err() {
                debug!(?timer, "event queue closed, timer dropped");
            }
        });
    }
}

// ─── Dispatcher ──────────────────────────────────────────────────

/// Owns the notifiers and applies queued events to them, one at a time.
pub struct Dispatcher {
    notifiers: Vec<NetworkNotifier>,
    settings: SharedSettings,
    emitter: Emitter,
}

impl Dispatcher {
    /// Build one notifier per configured identity. `open_store` supplies each
    /// notifier's blocklist store.
    pub fn new<F>(
        config: &RuntimeConfig,
        mut open_store: F,
        tx: &UnboundedSender<QueuedEvent>,
        emitter: Emitter,
        clock: TokioClock,
    ) -> anyhow::Result<Self>
    where
        F: FnMut(&NotifierIdentity) -> anyhow::Result<Box<dyn BlocklistStore>>,
    {
        let settings = SharedSettings::new(config.settings.clone());
        let connector = HostConnector::new(emitter.clone());

        let mut notifiers = Vec::with_capacity(config.notifiers.len());
        for (index, identity) in config.notifiers.iter().enumerate() {
            let store = open_store(identity)
                .with_context(|| format!("failed to open blocklist store for {}", identity.tag))?;
            let ports = NotifierPorts {
                clock: Box::new(clock),
                notifications: Box::new(EmitterSink::new(emitter.clone(), &identity.tag)),
                builder: Box::new(DefaultNotificationBuilder),
                connector: Box::new(connector.clone()),
                picker: Box::new(EmitterPicker::new(emitter.clone(), &identity.tag)),
                scheduler: Box::new(QueueScheduler {
                    notifier: index,
                    tx: tx.clone(),
                }),
                store,
                settings: Box::new(settings.clone()),
                restrictions: Box::new(config.restrictions.to_restrictions()),
                supports_add_config_restriction: config
                    .restrictions
                    .supports_add_config_restriction,
            };
            let notifier = NetworkNotifier::new(identity.clone(), config.timing.clone(), ports);
            info!(
                tag = %identity.tag,
                enabled = notifier.is_setting_enabled(),
                blocklisted = notifier.blocklist().len(),
                "notifier started"
            );
            notifiers.push(notifier);
        }

        Ok(Self {
            notifiers,
            settings,
            emitter,
        })
    }

    pub fn notifiers(&self) -> &[NetworkNotifier] {
        &self.notifiers
    }

    pub fn dispatch(&mut self, event: QueuedEvent) -> ControlFlow<()> {
        match event {
            QueuedEvent::Feed(feed) => self.apply_feed(feed),
            QueuedEvent::Timer { notifier, fired } => match self.notifiers.get_mut(notifier) {
                Some(n) => n.handle_event(NotifierEvent::Timer(fired)),
                None => warn!(notifier, "timer for unknown notifier"),
            },
            QueuedEvent::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    fn apply_feed(&mut self, feed: FeedEvent) {
        match feed {
            FeedEvent::ScanResults {
                tag: Some(tag),
                candidates,
            } => self.send_to_tag(&tag, NotifierEvent::ScanResults { candidates }),
            FeedEvent::ScanResults {
                tag: None,
                candidates,
            } => self.broadcast(NotifierEvent::ScanResults { candidates }),
            FeedEvent::Screen { on } => self.broadcast(NotifierEvent::ScreenStateChanged { on }),
            FeedEvent::WifiConnected { ssid } => {
                self.broadcast(NotifierEvent::WifiConnected { ssid })
            }
            FeedEvent::ConnectionFailure => self.broadcast(NotifierEvent::ConnectionFailure),
            FeedEvent::ConnectionSendFailed {
                tag: Some(tag),
                reason,
            } => self.send_to_tag(&tag, NotifierEvent::ConnectionSendFailed { reason }),
            FeedEvent::ConnectionSendFailed { tag: None, reason } => {
                // Only a notifier with a request in flight can have sent it.
                let mut delivered = false;
                for n in &mut self.notifiers {
                    if n.state() == NotificationState::Connecting {
                        n.handle_event(NotifierEvent::ConnectionSendFailed { reason });
                        delivered = true;
                    }
                }
                if !delivered {
                    debug!(reason, "send failure with no connecting notifier ignored");
                }
            }
            FeedEvent::Action { tag, action } => {
                let tag = tag.or_else(|| self.notifiers.first().map(|n| n.identity().tag.clone()));
                match tag {
                    // Every notifier sees it; only the one with a matching tag acts.
                    Some(tag) => self.broadcast(NotifierEvent::Action(ActionEvent::new(tag, action))),
                    None => warn!(%action, "action with no notifier to address"),
                }
            }
            FeedEvent::Setting { key, enabled } => {
                self.settings.set(&key, enabled);
                for n in &mut self.notifiers {
                    if n.identity().settings_key == key {
                        n.handle_event(NotifierEvent::SettingChanged);
                    }
                }
            }
            FeedEvent::Clear { reset_repeat_time } => {
                self.broadcast(NotifierEvent::ClearPending { reset_repeat_time })
            }
            FeedEvent::Sleep { ms } => debug!(ms, "sleep reached the dispatcher, ignored"),
            FeedEvent::Dump => {
                let notifiers = self.notifiers.iter().map(NetworkNotifier::dump).collect();
                self.emitter.emit(OutputRecord::Dump { notifiers });
            }
        }
    }

    fn send_to_tag(&mut self, tag: &str, event: NotifierEvent) {
        match self.notifiers.iter_mut().find(|n| n.identity().tag == tag) {
            Some(n) => n.handle_event(event),
            None => warn!(tag, "event for unknown notifier tag"),
        }
    }

    fn broadcast(&mut self, event: NotifierEvent) {
        for n in &mut self.notifiers {
            n.handle_event(event.clone());
        }
    }
}

// ─── Feed Reader ─────────────────────────────────────────────────

/// Read feed lines into the queue. `sleep` lines pause the reader while
/// timers keep firing. After EOF, waits `linger` and then queues shutdown.
pub async fn read_feed<R>(reader: R, tx: UnboundedSender<QueuedEvent>, linger: Duration)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut line_no = 0usize;
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!(error = %e, "failed to read event feed");
                break;
            }
        };
        line_no += 1;

        match feed::parse_line(&line) {
            Ok(None) => {}
            Ok(Some(FeedEvent::Sleep { ms })) => {
                tokio::time::sleep(Duration::from_millis(ms)).await;
            }
            Ok(Some(event)) => {
                if tx.send(QueuedEvent::Feed(event)).is_err() {
                    return;
                }
            }
            Err(e) => warn!(line = line_no, error = %e, "skipping malformed feed line"),
        }
    }

    let linger_ms = u64::try_from(linger.as_millis()).unwrap_or(u64::MAX);
    debug!(lines = line_no, linger_ms, "feed ended");
    tokio::time::sleep(linger).await;
    let _ = tx.send(QueuedEvent::Shutdown);
}

/// Apply queued events until shutdown is queued, the queue closes or
/// `interrupt` completes.
pub async fn drive<S>(
    dispatcher: &mut Dispatcher,
    rx: &mut UnboundedReceiver<QueuedEvent>,
    interrupt: S,
) where
    S: Future<Output = ()>,
{
    tokio::pin!(interrupt);
    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(event) => {
                    if dispatcher.dispatch(event).is_break() {
                        info!("feed finished, shutting down");
                        break;
                    }
                }
                None => break,
            },
            () = &mut interrupt => break,
        }
    }
}

/// `wifinotify run`: notifiers backed by the SQLite store at `store_path`,
/// fed from `--events` or stdin.
pub async fn run(config: RuntimeConfig, store_path: PathBuf, opts: RunOpts) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut dispatcher = Dispatcher::new(
        &config,
        |_| {
            let store = SqliteSetStore::open(&store_path)?;
            Ok(Box::new(store) as Box<dyn BlocklistStore>)
        },
        &tx,
        Emitter::Stdout,
        TokioClock::new(),
    )?;
    info!(store = %store_path.display(), notifiers = dispatcher.notifiers().len(), "runtime started");

    let linger = Duration::from_millis(opts.linger_ms);
    let reader = match opts.events {
        Some(path) => {
            let file = tokio::fs::File::open(&path)
                .await
                .with_context(|| format!("failed to open event feed {}", path.display()))?;
            tokio::spawn(read_feed(BufReader::new(file), tx, linger))
        }
        None => tokio::spawn(read_feed(BufReader::new(tokio::io::stdin()), tx, linger)),
    };

    let interrupt = async {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received ctrl-c, shutting down");
        }
    };
    drive(&mut dispatcher, &mut rx, interrupt).await;
    reader.abort();
    info!("runtime stopped");
    Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────
