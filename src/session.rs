//! TCP sessions: the acceptor, and a reader/writer task pair per client
//!
//! The reader owns the socket's read half: it runs username negotiation,
//! then forwards each line to the dispatcher as an input. The writer owns
//! the write half and the display: it drains the session's event queue and
//! repaints. The dispatcher closing the event queue is what stops the
//! writer; EOF on the reader is what tells the dispatcher to clean up.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::sync::oneshot;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info, warn};

use crate::command::Category;
use crate::display::map::MapBuilder;
use crate::display::styles::{plural, Color, CLEAR_SCREEN};
use crate::display::MudDisplay;
use crate::event::{Event, Input, JoinError};
use crate::player::validate_name;
use crate::world::{RoomId, World};

/// Accept connections forever, one session task pair per client.
/// An accept failure is fatal and propagates to the caller.
pub async fn serve(
    listener: TcpListener,
    inputs: Sender<Input>,
    world: Arc<World>,
    map_depth: i32,
) -> Result<()> {
    loop {
        let (stream, addr) = listener
            .accept()
            .await
            .context("accepting a connection")?;
        info!(%addr, "client connected");
        let inputs = inputs.clone();
        let world = world.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, inputs, world, map_depth).await {
                debug!(%addr, error = %e, "session i/o error");
            }
            info!(%addr, "client connection closed");
        });
    }
}

/// Reader side of one connection: negotiation, then the input loop.
async fn handle_connection(
    stream: TcpStream,
    inputs: Sender<Input>,
    world: Arc<World>,
    map_depth: i32,
) -> Result<()> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    let Some((name, events)) = negotiate(&mut reader, &mut write_half, &inputs).await? else {
        return Ok(());
    };
    info!(player = %name, "player joined");

    // The writer owns the write half and the display from here on
    let writer = tokio::spawn(run_writer(events, write_half, world, name.clone(), map_depth));

    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => break,
            Ok(_) => {
                let text = line.trim_end_matches(['\r', '\n']).to_string();
                if inputs
                    .send(Input::Line {
                        name: name.clone(),
                        text,
                    })
                    .await
                    .is_err()
                {
                    break;
                }
            }
            Err(e) => {
                warn!(player = %name, error = %e, "read failed");
                break;
            }
        }
    }
    // Exactly one end-flagged input; the dispatcher treats repeats as no-ops
    let _ = inputs.send(Input::End { name }).await;
    let _ = writer.await;
    Ok(())
}

/// Prompt for a username until the dispatcher accepts one.
/// Returns `None` if the client disappears first.
async fn negotiate(
    reader: &mut BufReader<OwnedReadHalf>,
    conn: &mut OwnedWriteHalf,
    inputs: &Sender<Input>,
) -> Result<Option<(String, Receiver<Event>)>> {
    let mut line = String::new();
    loop {
        conn.write_all(b"Please enter your name: ").await?;
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        let name = line.trim();
        if let Err(reason) = validate_name(name) {
            conn.write_all(format!("{}\n", reason).as_bytes()).await?;
            continue;
        }
        let (reply_tx, reply_rx) = oneshot::channel();
        if inputs
            .send(Input::Join {
                name: name.to_string(),
                reply: reply_tx,
            })
            .await
            .is_err()
        {
            return Ok(None);
        }
        match reply_rx.await {
            Ok(Ok(events)) => return Ok(Some((name.to_string(), events))),
            Ok(Err(reason @ JoinError::NameTaken)) => {
                conn.write_all(format!("{}\n", reason).as_bytes()).await?;
            }
            Ok(Err(reason)) => {
                conn.write_all(format!("{}\n", reason).as_bytes()).await?;
                return Ok(None);
            }
            Err(_) => return Ok(None),
        }
    }
}

/// Writer side of one connection: apply events to the display, repaint,
/// and say goodbye when the dispatcher closes the queue.
async fn run_writer(
    mut events: Receiver<Event>,
    mut conn: OwnedWriteHalf,
    world: Arc<World>,
    name: String,
    map_depth: i32,
) {
    let connected_at = Utc::now();
    let mut display = match MudDisplay::new() {
        Ok(display) => display,
        Err(e) => {
            error!(player = %name, error = %e, "display setup failed");
            return;
        }
    };
    let mut map = MapBuilder::new(map_depth);
    let mut visited: HashSet<RoomId> = HashSet::new();

    while let Some(event) = events.recv().await {
        if let Some(room) = event.redraw_map {
            visited.insert(room);
            map.trace(&world, room, &visited);
            display.write_minimap(map.render());
        }
        if let Some(location) = &event.location {
            display.write_location(location);
        }
        if !event.message.is_empty() {
            display.write_chat(&event.message, tint(&event));
        }
        if conn.write_all(display.render_frame().as_bytes()).await.is_err() {
            // Socket is gone; keep draining so broadcasts never stall
            continue;
        }
        if event.delay_ms > 0 {
            sleep(Duration::from_millis(event.delay_ms)).await;
        }
    }

    // Queue closed: the dispatcher has already removed us from the world
    let elapsed = Utc::now() - connected_at;
    let hours = elapsed.num_hours();
    let minutes = elapsed.num_minutes() % 60;
    let goodbye = format!(
        "{}Goodbye {}!\nThanks for playing!\nYou were connected for {} {} and {} {}.\n",
        CLEAR_SCREEN,
        name,
        hours,
        plural(hours, "hour"),
        minutes,
        plural(minutes, "minute"),
    );
    let _ = conn.write_all(goodbye.as_bytes()).await;
    info!(player = %name, "writer stopped");
}

/// Output tint: errors are red, emotes white, navigation cyan.
fn tint(event: &Event) -> Option<Color> {
    if event.err {
        return Some(Color::Red);
    }
    match event.category {
        Some(Category::Emotes) => Some(Color::White),
        Some(Category::Navigation) => Some(Color::Cyan),
        _ => None,
    }
}
