use crate::engine::{EngineEvent, EngineSink, MediaEngine};
use crate::notifier::ChangeNotifier;
use crate::tracks::{ExternalSubtitle, TrackPreferences};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::debug;

/// Everything that reaches a session from outside its owning context
#[derive(Debug, Clone, PartialEq)]
pub enum SessionMessage {
    Engine(EngineEvent),
    SettleElapsed { generation: u64 },
}

/// One-shot delay before auto-selection.
///
/// A message from an earlier generation is stale and must be ignored.
#[derive(Debug, Default)]
pub struct SettleTimer {
    handle: Option<JoinHandle<()>>,
    generation: u64,
}

impl SettleTimer {
    pub fn schedule(
        &mut self,
        runtime: &Handle,
        delay: Duration,
        alive: Arc<AtomicBool>,
        tx: UnboundedSender<SessionMessage>,
    ) -> u64 {
        self.cancel();
        let generation = self.generation;
        debug!("Settle timer {} armed for {:?}", generation, delay);

        self.handle = Some(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if alive.load(Ordering::Acquire) {
                let _ = tx.send(SessionMessage::SettleElapsed { generation });
            }
        }));
        generation
    }

    pub fn cancel(&mut self) {
        self.generation += 1;
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.handle.is_some()
    }

    /// Consume an elapsed message; false if it is stale
    pub fn take_elapsed(&mut self, generation: u64) -> bool {
        if self.handle.is_some() && self.generation == generation {
            self.handle = None;
            self.generation += 1;
            true
        } else {
            false
        }
    }
}

/// State of the single live player
pub struct PlayerSession {
    pub(crate) engine: Box<dyn MediaEngine>,
    pub(crate) notifier: ChangeNotifier,
    pub(crate) preferences: TrackPreferences,
    pub(crate) externals: Vec<ExternalSubtitle>,
    pub(crate) exit_on_end: bool,
    pub(crate) loop_on_end: bool,
    /// Auto-selection still owed for this load
    pub(crate) selection_armed: bool,
    pub(crate) playback_started: bool,
    pub(crate) tracks_ready: bool,
    pub(crate) ready_sent: bool,
    /// Subtitle index to restore when subtitles are re-enabled
    pub(crate) remembered_subtitle: Option<i32>,
    pub(crate) timer: SettleTimer,
    alive: Arc<AtomicBool>,
    tx: UnboundedSender<SessionMessage>,
    rx: UnboundedReceiver<SessionMessage>,
}

impl std::fmt::Debug for PlayerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerSession")
            .field("player_id", &self.notifier.player_id())
            .field("selection_armed", &self.selection_armed)
            .field("playback_started", &self.playback_started)
            .field("timer", &self.timer)
            .finish()
    }
}

impl PlayerSession {
    /// Wrap `engine` and hand it a sink into this session's queue
    pub fn new(
        mut engine: Box<dyn MediaEngine>,
        player_id: &str,
        preferences: TrackPreferences,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        engine.attach_sink(EngineSink::new(tx.clone()));

        Self {
            engine,
            notifier: ChangeNotifier::new(player_id),
            preferences,
            externals: Vec::new(),
            exit_on_end: true,
            loop_on_end: false,
            selection_armed: true,
            playback_started: false,
            tracks_ready: false,
            ready_sent: false,
            remembered_subtitle: None,
            timer: SettleTimer::default(),
            alive: Arc::new(AtomicBool::new(true)),
            tx,
            rx,
        }
    }

    pub fn player_id(&self) -> &str {
        self.notifier.player_id()
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Start the settle delay unless one is already running
    pub fn arm_settle_timer(&mut self, runtime: &Handle, delay: Duration) {
        if self.timer.is_pending() {
            return;
        }
        self.timer.schedule(runtime, delay, self.alive.clone(), self.tx.clone());
    }

    pub fn drain(&mut self) -> Vec<SessionMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            messages.push(msg);
        }
        messages
    }

    /// Stop everything the session started. Late messages are dropped.
    pub fn shutdown(&mut self) {
        self.alive.store(false, Ordering::Release);
        self.timer.cancel();
        self.engine.stop();
        self.rx.close();
        while self.rx.try_recv().is_ok() {}
    }
}
