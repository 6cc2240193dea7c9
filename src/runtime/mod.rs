use std::io;
use std::sync::mpsc;

use tracing::{error, info};

use crate::library::PlaylistStore;
use crate::player::AttachmentPoint;

mod event_loop;
mod settings;
mod startup;


pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();
    startup::init_logging(&settings);

    let playlist = PlaylistStore::load(&settings.catalog).inspect_err(|e| {
        error!(error = %e, "cannot load the playlist");
    })?;
    info!(tracks = playlist.len(), "playlist loaded");

    let (notify_tx, notify_rx) = mpsc::channel();
    let mut point = AttachmentPoint::new(startup::launcher(&settings, playlist.clone(), notify_tx));

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let result = {
        let mut session = event_loop::Session::open(&point, playlist, notify_rx);
        let result = event_loop::run(&mut session, stdin.lock(), &mut stdout);
        info!(last_announced = ?session.announced(), "session closed");
        result
    };

    point.shutdown();
    result.map_err(Into::into)
}
