use std::io::{self, BufRead, Write};
use std::sync::mpsc::Receiver;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::library::PlaylistStore;
use crate::notify::Notification;
use crate::player::{AttachmentPoint, Departure, PlayerError, Snapshot};
use crate::surface::{Navigation, Surface, SurfaceKind};

const BIND_TIMEOUT: Duration = Duration::from_secs(5);

/// One line of user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Play,
    Pause,
    Stop,
    Next,
    Prev,
    Select(i64),
    /// Open the map, on the given row or on what is playing.
    Map(Option<usize>),
    Marker(usize),
    Back,
    Status,
    Quit,
}

/// Parse a command line. Blank lines yield `Ok(None)`.
pub fn parse_input(line: &str) -> Result<Option<Input>, String> {
    let mut words = line.split_whitespace();
    let Some(cmd) = words.next() else {
        return Ok(None);
    };
    let arg = words.next();
    if let Some(extra) = words.next() {
        return Err(format!("unexpected argument '{extra}'"));
    }

    let input = match (cmd.to_ascii_lowercase().as_str(), arg) {
        ("play", None) => Input::Play,
        ("pause", None) => Input::Pause,
        ("stop", None) => Input::Stop,
        ("next", None) => Input::Next,
        ("prev" | "previous", None) => Input::Prev,
        ("select", Some(n)) => Input::Select(number(n)?),
        ("map", None) => Input::Map(None),
        ("map", Some(n)) => Input::Map(Some(number(n)?)),
        ("marker", Some(n)) => Input::Marker(number(n)?),
        ("back", None) => Input::Back,
        ("status", None) => Input::Status,
        ("quit" | "exit", None) => Input::Quit,
        ("select" | "marker", None) => return Err(format!("'{cmd}' needs an index")),
        (_, Some(_)) if is_known(cmd) => return Err(format!("'{cmd}' takes no argument")),
        _ => return Err(format!("unknown command '{cmd}'")),
    };
    Ok(Some(input))
}

fn number<T: std::str::FromStr>(s: &str) -> Result<T, String> {
    s.parse().map_err(|_| format!("'{s}' is not a valid index"))
}

fn is_known(cmd: &str) -> bool {
    matches!(
        cmd.to_ascii_lowercase().as_str(),
        "play" | "pause" | "stop" | "next" | "prev" | "previous" | "back" | "status" | "quit" | "exit"
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// The surface currently on screen plus what the stand-in UI remembers.
pub struct Session<'a> {
    point: &'a AttachmentPoint,
    playlist: PlaylistStore,
    active: Surface,
    /// Marker picked on the map; the map's play button plays it.
    chosen: Option<usize>,
    notifications: Receiver<Notification>,
    /// Index of the last "now playing" notification, for reopening the list.
    announced: Option<usize>,
}

impl<'a> Session<'a> {
    /// Start on the list surface and wait for it to bind.
    pub fn open(
        point: &'a AttachmentPoint,
        playlist: PlaylistStore,
        notifications: Receiver<Notification>,
    ) -> Self {
        let active = Surface::list(playlist.clone(), 0);
        let session = Self {
            point,
            playlist,
            active,
            chosen: None,
            notifications,
            announced: None,
        };
        session.bind();
        session
    }

    pub fn announced(&self) -> Option<usize> {
        self.announced
    }

    fn bind(&self) {
        let ready = self.active.start(self.point);
        if ready.recv_timeout(BIND_TIMEOUT).is_err() && !self.active.is_bound() {
            warn!(surface = %self.active.kind(), "still connecting");
        }
    }

    fn switch(&mut self, nav: Navigation, departure: Departure) -> Result<(), PlayerError> {
        self.active.finish(self.point, departure)?;
        self.active = Surface::new(nav.to, self.playlist.clone(), nav.index);
        self.chosen = None;
        self.bind();
        Ok(())
    }

    pub fn handle(&mut self, input: Input, out: &mut impl Write) -> io::Result<Flow> {
        debug!(?input, surface = %self.active.kind(), "input");
        let result = self.dispatch(input, out);
        match result {
            Ok(Some(snapshot)) => writeln!(out, "{}", self.describe(snapshot))?,
            Ok(None) => {}
            Err(e) => writeln!(out, "error: {e}")?,
        }
        self.drain_notifications(out)?;
        Ok(if input == Input::Quit {
            Flow::Quit
        } else {
            Flow::Continue
        })
    }

    fn dispatch(
        &mut self,
        input: Input,
        out: &mut impl Write,
    ) -> Result<Option<Snapshot>, SessionError> {
        let kind = self.active.kind();
        let snapshot = match input {
            Input::Play => match (kind, self.chosen) {
                (SurfaceKind::Map, Some(i)) => self.active.play_marker(i)?,
                _ => self.active.play()?,
            },
            Input::Pause => self.active.pause()?,
            Input::Stop => self.active.stop()?,
            Input::Next => self.active.next()?,
            Input::Prev => self.active.previous()?,
            Input::Select(i) => self.active.play_row(i)?,
            Input::Status => self.active.snapshot()?,

            Input::Map(row) => {
                if kind != SurfaceKind::List {
                    return Err(SessionError::WrongSurface("map", kind));
                }
                let row = match row {
                    Some(r) => r,
                    None => self.active.snapshot()?.index,
                };
                let nav = self.active.view_on_map(row)?;
                self.switch(nav, Departure::Backgrounding)?;
                if let Some(camera) = self.active.camera() {
                    writeln!(out, "map centred on {:.4}, {:.4}", camera.lat, camera.lng)?;
                }
                for m in self.active.markers() {
                    let pin = if m.position.is_some() { "*" } else { " " };
                    writeln!(out, "  {pin} [{}] {}", m.index, m.title)?;
                }
                return Ok(None);
            }
            Input::Marker(i) => {
                if kind != SurfaceKind::Map {
                    return Err(SessionError::WrongSurface("marker", kind));
                }
                let d = self.active.choose_marker(i)?;
                self.chosen = Some(i);
                let at = d
                    .position
                    .map(|p| format!("{:.4}, {:.4}", p.lat, p.lng))
                    .unwrap_or_else(|| "unknown".to_string());
                writeln!(
                    out,
                    "[{}] {} ({}) at {} [{}]",
                    d.index, d.title, d.duration_label, at, d.flag_key
                )?;
                if !d.comment.is_empty() {
                    writeln!(out, "    {}", d.comment)?;
                }
                return Ok(None);
            }
            Input::Back => {
                if kind != SurfaceKind::Map {
                    return Err(SessionError::WrongSurface("back", kind));
                }
                let nav = self.active.back()?;
                self.switch(nav, Departure::Backgrounding)?;
                self.active.snapshot()?
            }

            Input::Quit => {
                self.active.finish(self.point, Departure::Finishing)?;
                return Ok(None);
            }
        };
        Ok(Some(snapshot))
    }

    fn describe(&self, s: Snapshot) -> String {
        let title = self
            .playlist
            .get(s.index)
            .map(|t| t.title.as_str())
            .unwrap_or("?");
        format!("{}: [{}] {} ({})", self.active.kind(), s.index, title, s.status)
    }

    fn drain_notifications(&mut self, out: &mut impl Write) -> io::Result<()> {
        while let Ok(n) = self.notifications.try_recv() {
            match n {
                Notification::NowPlaying(np) => {
                    self.announced = Some(np.index);
                    writeln!(out, "now playing: {}", np.title)?;
                }
                Notification::PlaybackError { index, message } => {
                    writeln!(out, "playback error on track {index}: {message}")?;
                }
            }
        }
        Ok(())
    }
}

/// Why an input could not be carried out.
#[derive(Debug, Error)]
enum SessionError {
    #[error(transparent)]
    Player(#[from] PlayerError),
    #[error("'{0}' is not available on the {1} screen")]
    WrongSurface(&'static str, SurfaceKind),
    #[error("output failed: {0}")]
    Io(#[from] io::Error),
}

/// Read commands from `input` until `quit` or end of input.
pub fn run(session: &mut Session<'_>, input: impl BufRead, out: &mut impl Write) -> io::Result<()> {
    for line in input.lines() {
        let line = line?;
        match parse_input(&line) {
            Ok(Some(cmd)) => {
                if session.handle(cmd, out)? == Flow::Quit {
                    return Ok(());
                }
            }
            Ok(None) => {}
            Err(msg) => writeln!(out, "{msg}")?,
        }
        out.flush()?;
    }
    // End of input counts as quitting.
    session.handle(Input::Quit, out)?;
    Ok(())
}
