use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, broadcast, mpsc, oneshot};

use crate::{
    config::GalleryConfig,
    core::session::{EditorSession, SavePayload, SessionError},
    map::{Assignment, ReverseImageMap, VariantImageMap},
    persist::{
        MetafieldKey, MetafieldRecord, MetafieldStore, MetafieldsSetPayload, PersistError,
        PersistResult, UserError, save_image_map,
    },
};

use super::events::EditorEvent;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("metafield write rejected: {}", first_message(.0))]
    Rejected(Vec<UserError>),
    #[error("editor runtime stopped")]
    ChannelClosed,
}

fn first_message(errors: &[UserError]) -> &str {
    errors.first().map(|e| e.message.as_str()).unwrap_or("unknown error")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub command_queue_bound: usize,
    pub event_queue_bound: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            command_queue_bound: 64,
            event_queue_bound: 256,
        }
    }
}

/// Point-in-time copy of the editor state for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorView {
    pub assignments: Assignment,
    pub image_map: VariantImageMap,
    pub reverse_map: ReverseImageMap,
    pub saving: bool,
    pub dirty: bool,
    pub undo_len: usize,
    pub redo_len: usize,
}

impl EditorView {
    fn of(session: &EditorSession) -> Self {
        let image_map = session.image_map();
        Self {
            assignments: session.assignments().clone(),
            reverse_map: crate::engine::grouping::invert(&image_map),
            image_map,
            saving: session.is_saving(),
            dirty: session.is_dirty(),
            undo_len: session.undo_len(),
            redo_len: session.redo_len(),
        }
    }
}

pub struct EditorHandle {
    cmd_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<EditorEvent>,
}

impl Clone for EditorHandle {
    fn clone(&self) -> Self {
        Self {
            cmd_tx: self.cmd_tx.clone(),
            events_tx: self.events_tx.clone(),
        }
    }
}

type SaveReply = oneshot::Sender<Result<Vec<MetafieldRecord>, RuntimeError>>;

enum Command {
    Assign {
        image: String,
        variant: Option<String>,
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
    Clear {
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
    Undo {
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
    Redo {
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
    View {
        resp: oneshot::Sender<EditorView>,
    },
    Save {
        resp: SaveReply,
    },
    Shutdown {
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
}

struct SaveDone {
    result: PersistResult<MetafieldsSetPayload>,
    resp: SaveReply,
}

type SharedStore = Arc<Mutex<Box<dyn MetafieldStore>>>;

pub fn spawn_editor(session: EditorSession, store: Box<dyn MetafieldStore>, config: GalleryConfig) -> EditorHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(config.runtime.command_queue_bound);
    let (events_tx, _) = broadcast::channel::<EditorEvent>(config.runtime.event_queue_bound);
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<SaveDone>();

    let store: SharedStore = Arc::new(Mutex::new(store));
    let events_tx_loop = events_tx.clone();
    let key = config.metafield;

    tokio::spawn(async move {
        let mut session = session;

        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => {
                    let Some(cmd) = cmd else { break; };
                    match cmd {
                        Command::Shutdown { resp } => {
                            if session.is_saving() {
                                if let Some(done) = done_rx.recv().await {
                                    complete_save(&mut session, &events_tx_loop, done);
                                }
                            }
                            let _ = resp.send(Ok(()));
                            break;
                        }
                        other => handle_command(other, &mut session, &events_tx_loop, &store, &key, &done_tx),
                    }
                }
                done = done_rx.recv() => {
                    if let Some(done) = done {
                        complete_save(&mut session, &events_tx_loop, done);
                    }
                }
            }
        }
    });

    EditorHandle { cmd_tx, events_tx }
}

impl EditorHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.events_tx.subscribe()
    }

    /// Sets (`Some`) or removes (`None`) the explicit variant of `image`.
    pub async fn assign(&self, image: impl Into<String>, variant: Option<&str>) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Assign {
                image: image.into(),
                variant: variant.map(str::to_string),
                resp: tx,
            })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    pub async fn clear(&self) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Clear { resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    pub async fn undo(&self) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Undo { resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    pub async fn redo(&self) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Redo { resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    pub async fn view(&self) -> Result<EditorView, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::View { resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    /// Persists the current grouped map.
    ///
    /// Fails with [`SessionError::SaveInFlight`] while another save runs.
    pub async fn save(&self) -> Result<Vec<MetafieldRecord>, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Save { resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// Stops the loop after any in-flight save completes.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Shutdown { resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }
}

fn handle_command(
    cmd: Command,
    session: &mut EditorSession,
    events_tx: &broadcast::Sender<EditorEvent>,
    store: &SharedStore,
    key: &MetafieldKey,
    done_tx: &mpsc::UnboundedSender<SaveDone>,
) {
    match cmd {
        Command::Assign { image, variant, resp } => {
            let res = session
                .assign(&image, variant.as_deref())
                .map(|_| notify_changed(session, events_tx))
                .map_err(RuntimeError::from);
            let _ = resp.send(res);
        }
        Command::Clear { resp } => {
            session.clear();
            notify_changed(session, events_tx);
            let _ = resp.send(Ok(()));
        }
        Command::Undo { resp } => {
            let res = session
                .undo()
                .map(|_| notify_changed(session, events_tx))
                .map_err(RuntimeError::from);
            let _ = resp.send(res);
        }
        Command::Redo { resp } => {
            let res = session
                .redo()
                .map(|_| notify_changed(session, events_tx))
                .map_err(RuntimeError::from);
            let _ = resp.send(res);
        }
        Command::View { resp } => {
            let _ = resp.send(EditorView::of(session));
        }
        Command::Save { resp } => match session.begin_save() {
            Ok(payload) => {
                tracing::info!(product_id = %payload.product_id, groups = payload.image_map.len(), "save started");
                let _ = events_tx.send(EditorEvent::SaveStarted);
                spawn_save(payload, Arc::clone(store), key.clone(), resp, done_tx.clone());
            }
            Err(err) => {
                tracing::debug!(error = %err, "save request refused");
                let _ = resp.send(Err(err.into()));
            }
        },
        Command::Shutdown { resp } => {
            let _ = resp.send(Ok(()));
        }
    }
}

fn notify_changed(session: &EditorSession, events_tx: &broadcast::Sender<EditorEvent>) {
    let groups = session.image_map().len();
    let _ = events_tx.send(EditorEvent::AssignmentsChanged { groups });
}

fn spawn_save(
    payload: SavePayload,
    store: SharedStore,
    key: MetafieldKey,
    resp: SaveReply,
    done_tx: mpsc::UnboundedSender<SaveDone>,
) {
    tokio::spawn(async move {
        let result = tokio::task::spawn_blocking(move || {
            let mut store = store.blocking_lock();
            save_image_map(&mut **store, &payload.product_id, &key, &payload.image_map)
        })
        .await
        .unwrap_or_else(|e| Err(PersistError::Message(format!("join error: {e}"))));
        let _ = done_tx.send(SaveDone { result, resp });
    });
}

fn complete_save(session: &mut EditorSession, events_tx: &broadcast::Sender<EditorEvent>, done: SaveDone) {
    let outcome = match done.result {
        Ok(payload) if payload.user_errors.is_empty() => Ok(payload.metafields),
        Ok(payload) => Err(RuntimeError::Rejected(payload.user_errors)),
        Err(err) => Err(RuntimeError::Persist(err)),
    };

    let _ = session.finish_save(outcome.is_ok());
    match &outcome {
        Ok(metafields) => {
            tracing::info!(product_id = session.product_id(), "save completed");
            let _ = events_tx.send(EditorEvent::Saved {
                metafields: metafields.clone(),
            });
        }
        Err(err) => {
            tracing::error!(product_id = session.product_id(), error = %err, "save failed");
            let _ = events_tx.send(EditorEvent::SaveFailed {
                message: err.to_string(),
            });
        }
    }
    let _ = done.resp.send(outcome);
}
