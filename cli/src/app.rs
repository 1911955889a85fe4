//! The terminal host: reads input lines, runs controller effects, prints views.
//!
//! # Design
//! Everything runs on one task. Requests go to the blocking pool and their
//! outcomes come back through an mpsc channel as `Event::Completed`, so the
//! input loop keeps accepting commands while requests are in flight. The edit
//! dialog works the same way: its future is awaited on a spawned task that
//! posts `Event::EditAnswered`. At end of input the loop keeps running until
//! every request has finished and every open dialog has reported back.

use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use todo_core::{ApiError, Controller, Effect, Event, SessionStore, TodoClient};

use crate::command::{self, Command};
use crate::dialog::Dialog;
use crate::render;
use crate::transport::Transport;

pub struct App<T, S, W> {
    controller: Controller,
    transport: Arc<T>,
    store: S,
    out: W,
    dialog: Dialog,
    /// Dialogs opened whose `EditAnswered` has not been received yet.
    unanswered: usize,
    last_frame: String,
    events_tx: mpsc::UnboundedSender<Event>,
    events_rx: mpsc::UnboundedReceiver<Event>,
}

impl<T, S, W> App<T, S, W>
where
    T: Transport,
    S: SessionStore,
    W: Write,
{
    pub fn new(client: TodoClient, transport: T, store: S, out: W) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            controller: Controller::new(client),
            transport: Arc::new(transport),
            store,
            out,
            dialog: Dialog::default(),
            unanswered: 0,
            last_frame: String::new(),
            events_tx,
            events_rx,
        }
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Runs until `quit` or end of input. On end of input, requests already
    /// in flight are allowed to finish.
    pub async fn run<R>(&mut self, input: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let stored = self.store.load().unwrap_or_else(|e| {
            warn!(error = %e, "ignoring unreadable session");
            None
        });
        self.dispatch(Event::Started(stored))?;
        self.render()?;

        let mut lines = input.lines();
        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    if !self.on_line(&line)? {
                        return Ok(());
                    }
                }
                Some(event) = self.events_rx.recv() => self.on_event(event)?,
            }
            self.render()?;
        }

        debug!("input closed, draining in-flight requests");
        self.dialog.dismiss();
        while self.controller.loading() || self.unanswered > 0 {
            let Some(event) = self.events_rx.recv().await else { break };
            match event {
                // Dismissed above; nobody is left to read the rejection.
                Event::EditAnswered { content: None, .. } => {
                    self.unanswered = self.unanswered.saturating_sub(1)
                }
                event => self.on_event(event)?,
            }
        }
        self.render()
    }

    fn on_event(&mut self, event: Event) -> Result<()> {
        if matches!(event, Event::EditAnswered { .. }) {
            self.unanswered = self.unanswered.saturating_sub(1);
        }
        self.dispatch(event)
    }

    /// Returns false when the user asked to quit.
    fn on_line(&mut self, line: &str) -> Result<bool> {
        if self.dialog.answer(line) {
            return Ok(true);
        }
        if line.trim().is_empty() {
            return Ok(true);
        }
        let authenticated = self.controller.is_authenticated();
        match command::parse(line, authenticated) {
            Command::Quit => return Ok(false),
            Command::Help => writeln!(self.out, "{}", render::help(authenticated))?,
            Command::Invalid(reason) => writeln!(self.out, "{reason} (type `help`)")?,
            Command::Switch => self.dispatch(Event::ToggleAuthMode)?,
            Command::Credentials { username, password } => {
                self.dispatch(Event::UsernameChanged(username))?;
                self.dispatch(Event::PasswordChanged(password))?;
                self.dispatch(Event::SubmitAuth)?;
            }
            Command::Add(text) => {
                self.dispatch(Event::InputChanged(text))?;
                self.dispatch(Event::SubmitCreate)?;
            }
            Command::Edit(id) => self.dispatch(Event::EditRequested(id))?,
            Command::Delete(id) => self.dispatch(Event::DeleteRequested(id))?,
            Command::Logout => self.dispatch(Event::Logout)?,
        }
        Ok(true)
    }

    fn dispatch(&mut self, event: Event) -> Result<()> {
        for effect in self.controller.handle(event) {
            self.apply(effect)?;
        }
        Ok(())
    }

    fn apply(&mut self, effect: Effect) -> Result<()> {
        match effect {
            Effect::Send {
                operation,
                generation,
                request,
            } => {
                let transport = Arc::clone(&self.transport);
                let events = self.events_tx.clone();
                tokio::spawn(async move {
                    let result = tokio::task::spawn_blocking(move || transport.execute(request))
                        .await
                        .unwrap_or_else(|e| Err(ApiError::Transport(e.to_string())));
                    let _ = events.send(Event::Completed {
                        operation,
                        generation,
                        result,
                    });
                });
            }
            Effect::SaveSession(session) => {
                if let Err(e) = self.store.save(&session) {
                    warn!(error = %e, "could not persist session");
                }
            }
            Effect::ClearSession => {
                if let Err(e) = self.store.clear() {
                    warn!(error = %e, "could not clear session");
                }
            }
            Effect::OpenEditDialog { id, current } => {
                writeln!(self.out, "New text for [{id}] (was {current:?}):")?;
                let answer = self.dialog.open();
                self.unanswered += 1;
                let events = self.events_tx.clone();
                tokio::spawn(async move {
                    let content = answer.await;
                    let _ = events.send(Event::EditAnswered { id, content });
                });
            }
            Effect::Notify(notification) => {
                writeln!(self.out, "{}", render::notification(&notification))?
            }
        }
        self.out.flush()?;
        Ok(())
    }

    /// Prints the view if it changed since the last frame.
    fn render(&mut self) -> Result<()> {
        let frame = render::view(&self.controller);
        if frame != self.last_frame {
            write!(self.out, "{frame}")?;
            self.out.flush()?;
            self.last_frame = frame;
        }
        Ok(())
    }
}
