//! Line-delimited JSON front end.
//!
//! Each input line is one [Request]; each outcome is written back as one
//! [Response]. Climb presentations stream [Response::Frame] lines until the
//! round ends.

use arcade_execution::Layer;
use arcade_types::{
    casino::ClimbFrame,
    execution::{AdminCommand, Command, Outcome, OutcomeKind, Receipt},
    AccountId,
};
use serde::{Deserialize, Serialize};
use std::{io, sync::Arc, time::Duration};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    sync::mpsc,
};
use tracing::{debug, warn};

const FRAME_BUFFER: usize = 16;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Request {
    Play { caller: AccountId, command: Command },
    Admin { command: AdminCommand },
    /// Stream the caller's open climb at the configured tick.
    WatchClimb { caller: AccountId },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Response {
    Receipt(Receipt),
    Rejected {
        kind: OutcomeKind,
        code: u8,
        message: String,
    },
    Frame(ClimbFrame),
    Malformed {
        message: String,
    },
}

impl From<Outcome> for Response {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Ok(receipt) => Response::Receipt(receipt),
            Err(rejection) => Response::Rejected {
                kind: rejection.kind(),
                code: rejection.code(),
                message: rejection.to_string(),
            },
        }
    }
}

/// Forward climb frames to `responses` until the round ends or the output closes.
async fn watch_climb(
    layer: Arc<Layer>,
    caller: AccountId,
    tick: Duration,
    responses: mpsc::Sender<Response>,
) {
    let (frames, mut received) = mpsc::channel(FRAME_BUFFER);
    let forward = {
        let responses = responses.clone();
        async move {
            while let Some(frame) = received.recv().await {
                if responses.send(Response::Frame(frame)).await.is_err() {
                    break;
                }
            }
        }
    };
    let (driven, ()) = tokio::join!(layer.drive_climb(&caller, tick, frames), forward);
    if let Err(rejection) = driven {
        let _ = responses
            .send(Response::from(Err::<Receipt, _>(rejection)))
            .await;
    }
}

/// Serve requests from `reader` until it is exhausted or `responses` closes.
pub async fn serve<R>(
    layer: Arc<Layer>,
    climb_tick: Duration,
    reader: R,
    responses: mpsc::Sender<Response>,
) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let response = match serde_json::from_str::<Request>(line) {
            Ok(Request::Play { caller, command }) => layer.execute(&caller, command).await.into(),
            Ok(Request::Admin { command }) => layer.administer(command).await.into(),
            Ok(Request::WatchClimb { caller }) => {
                debug!(%caller, "watching climb");
                tokio::spawn(watch_climb(
                    layer.clone(),
                    caller,
                    climb_tick,
                    responses.clone(),
                ));
                continue;
            }
            Err(e) => {
                warn!(error = %e, "malformed request");
                Response::Malformed {
                    message: e.to_string(),
                }
            }
        };
        if responses.send(response).await.is_err() {
            break;
        }
    }
    Ok(())
}
