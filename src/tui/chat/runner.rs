// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Chat TUI runner
//!
//! Carries out the reducer's effects and gathers events for it. Provider
//! calls, tool execution and batching all run on background tasks; the
//! loop itself only waits for the next event, a batched fragment (when one
//! was asked for) or a spinner tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::Event as TermEvent;
use ratatui::prelude::*;
use tokio::sync::{mpsc, Mutex};
use tokio::time::{Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::chat::prompts::STREAM_SYSTEM_PROMPT;
use crate::chat::{start_stream, BatchedFragment, StreamOptions, TurnController};
use crate::config::ModelSelection;
use crate::error::{ErrorInfo, NyronError, Result};
use crate::llm::{ProviderSet, StreamFragment, StreamRequest};

use super::app::ChatApp;
use super::events::{event_channel, AppEvent, ChannelObserver, Effect, EventSender, RequestId};
use super::ui;

const SPINNER_INTERVAL: Duration = Duration::from_millis(100);
const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Whether the loop should keep going after applying effects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// The stream of the in-flight streaming request
struct ActiveStream {
    request_id: RequestId,
    rx: mpsc::Receiver<BatchedFragment>,
    /// The reducer asked for the next fragment
    awaiting: bool,
}

/// Owns the background work of a chat session
pub struct Runner {
    controller: Arc<Mutex<TurnController>>,
    providers: ProviderSet,
    stream_options: StreamOptions,
    tx: EventSender,
    rx: mpsc::UnboundedReceiver<AppEvent>,
    stream: Option<ActiveStream>,
    cancel: Option<(RequestId, CancellationToken)>,
    spinner: Interval,
}

impl Runner {
    pub fn new(controller: TurnController, stream_options: StreamOptions) -> Self {
        let (tx, rx) = event_channel();
        let providers = controller.providers().clone();
        let mut spinner = tokio::time::interval(SPINNER_INTERVAL);
        spinner.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self {
            controller: Arc::new(Mutex::new(controller)),
            providers,
            stream_options,
            tx,
            rx,
            stream: None,
            cancel: None,
            spinner,
        }
    }

    /// Sender for events produced outside the runner, such as terminal input.
    pub fn sender(&self) -> EventSender {
        self.tx.clone()
    }

    /// The request that can still be cancelled, if any.
    pub fn in_flight(&self) -> Option<RequestId> {
        self.cancel.as_ref().map(|(id, _)| *id)
    }

    /// Wait for the next event. Ticks are only produced while `spinning`.
    pub async fn next_event(&mut self, spinning: bool) -> Option<AppEvent> {
        enum Wake {
            Event(Option<AppEvent>),
            Fragment(Option<BatchedFragment>),
            Tick,
        }

        loop {
            let awaiting = self.stream.as_ref().is_some_and(|s| s.awaiting);
            let wake = tokio::select! {
                event = self.rx.recv() => Wake::Event(event),
                fragment = next_fragment(&mut self.stream), if awaiting => Wake::Fragment(fragment),
                _ = self.spinner.tick(), if spinning => Wake::Tick,
            };

            match wake {
                Wake::Event(event) => {
                    if let Some(AppEvent::TurnFinished { request_id, .. }) = &event {
                        self.release(*request_id);
                    }
                    return event;
                }
                Wake::Tick => return Some(AppEvent::Tick),
                Wake::Fragment(fragment) => {
                    if let Some(event) = self.on_fragment(fragment) {
                        return Some(event);
                    }
                }
            }
        }
    }

    fn on_fragment(&mut self, fragment: Option<BatchedFragment>) -> Option<AppEvent> {
        let mut stream = self.stream.take()?;
        stream.awaiting = false;
        let request_id = stream.request_id;

        // The batcher always ends with a terminal or error fragment, so a
        // closed channel here means its task died.
        let fragment = fragment.unwrap_or_else(|| StreamFragment::error(ErrorInfo::interrupted()));

        if fragment.ends_stream() {
            tracing::debug!(target: "nyron.tui.runner", request_id, error = fragment.is_error(), "stream ended");
            self.release(request_id);
        } else {
            self.stream = Some(stream);
        }
        Some(AppEvent::Batch {
            request_id,
            fragment,
        })
    }

    /// Carry out the reducer's effects in order.
    pub fn apply(&mut self, effects: Vec<Effect>) -> Control {
        for effect in effects {
            match effect {
                Effect::StartTurn {
                    request_id,
                    prompt,
                    selection,
                } => self.start_turn(request_id, prompt, selection),
                Effect::StartStream {
                    request_id,
                    prompt,
                    selection,
                } => self.start_stream(request_id, prompt, selection),
                Effect::AwaitBatch { request_id } => {
                    if let Some(stream) = self.stream.as_mut().filter(|s| s.request_id == request_id) {
                        stream.awaiting = true;
                    }
                }
                Effect::Cancel { request_id } => {
                    if let Some((_, token)) = self.cancel.as_ref().filter(|(id, _)| *id == request_id) {
                        tracing::info!(target: "nyron.tui.runner", request_id, "cancelling request");
                        token.cancel();
                    }
                }
                Effect::Quit => return Control::Quit,
            }
        }
        Control::Continue
    }

    fn start_turn(&mut self, request_id: RequestId, prompt: String, selection: ModelSelection) {
        let token = CancellationToken::new();
        self.cancel = Some((request_id, token.clone()));

        let controller = Arc::clone(&self.controller);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let mut observer = ChannelObserver::new(request_id, tx.clone());
            let outcome = controller
                .lock()
                .await
                .run(&prompt, &selection, &mut observer, &token)
                .await;
            let _ = tx.send(AppEvent::TurnFinished {
                request_id,
                outcome,
            });
        });
    }

    fn start_stream(&mut self, request_id: RequestId, prompt: String, selection: ModelSelection) {
        let provider = match self.providers.get(&selection.provider) {
            Ok(provider) => provider,
            Err(e) => {
                let _ = self.tx.send(AppEvent::Batch {
                    request_id,
                    fragment: StreamFragment::error(ErrorInfo::from(&e)),
                });
                return;
            }
        };

        let token = CancellationToken::new();
        let request = StreamRequest::new(selection.model, prompt).with_system(STREAM_SYSTEM_PROMPT);
        let rx = start_stream(provider, request, &self.stream_options, token.clone());
        self.stream = Some(ActiveStream {
            request_id,
            rx,
            awaiting: false,
        });
        self.cancel = Some((request_id, token));
    }

    fn release(&mut self, request_id: RequestId) {
        if self.cancel.as_ref().is_some_and(|(id, _)| *id == request_id) {
            self.cancel = None;
        }
    }

    /// Cancel whatever is still running.
    pub fn shutdown(&mut self) {
        if let Some((request_id, token)) = self.cancel.take() {
            tracing::debug!(target: "nyron.tui.runner", request_id, "cancelling on shutdown");
            token.cancel();
        }
        self.stream = None;
    }
}

async fn next_fragment(stream: &mut Option<ActiveStream>) -> Option<BatchedFragment> {
    match stream {
        Some(stream) => stream.rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Draw, wait for an event, reduce, apply; until the app quits.
pub async fn run_event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut ChatApp,
    runner: &mut Runner,
) -> Result<()> {
    loop {
        terminal
            .draw(|f| ui::draw(f, app))
            .map_err(|e| NyronError::Tui(e.to_string()))?;

        let Some(event) = runner.next_event(app.is_loading()).await else {
            break;
        };
        let effects = app.update(event);
        if runner.apply(effects) == Control::Quit {
            break;
        }
    }
    runner.shutdown();
    Ok(())
}

/// Read terminal input on a blocking thread until `stop` is set or the
/// loop goes away.
pub fn spawn_input_reader(tx: EventSender, stop: Arc<AtomicBool>) -> tokio::task::JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        while !stop.load(Ordering::Relaxed) {
            match crossterm::event::poll(INPUT_POLL_INTERVAL) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    tracing::error!(target: "nyron.tui.runner", error = %e, "terminal poll failed");
                    break;
                }
            }
            let event = match crossterm::event::read() {
                Ok(TermEvent::Key(key)) => AppEvent::Key(key),
                Ok(TermEvent::Mouse(mouse)) => AppEvent::Mouse(mouse),
                Ok(TermEvent::Resize(width, height)) => AppEvent::Resize(width, height),
                Ok(_) => continue,
                Err(e) => {
                    tracing::error!(target: "nyron.tui.runner", error = %e, "terminal read failed");
                    break;
                }
            };
            if tx.send(event).is_err() {
                break;
            }
        }
    })
}
