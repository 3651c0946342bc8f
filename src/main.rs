mod cli_args;

use std::sync::mpsc;
use std::thread;

use anyhow::anyhow;
use clap::Parser;
use tokio::sync::{mpsc as tokio_mpsc, watch};

use tripanel::events::{ControlMessage, DebugSink, UiNotice};
use tripanel::relay::{
    PeerMessage, PeerMessageKind, PeerRelay, RelayEvent, RelayHandle, RelaySender,
};
use tripanel::tui::state::PanelStack;
use tripanel::tui::{self, TuiConfig};

use crate::cli_args::CliArgs;

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let stack: PanelStack = args.order.parse()?;
    let mut debug = match args.debug_log.as_deref() {
        Some(path) => DebugSink::to_file(path)?,
        None => DebugSink::discard(),
    };

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    // bind before the UI takes over the terminal, so bind errors are plain
    let (relay, handle) = rt.block_on(bind_relay(&args))?;
    rt.spawn(relay.run());

    let (control_tx, control_rx) = mpsc::channel::<ControlMessage>();
    let (notices_tx, notices_rx) = tokio_mpsc::unbounded_channel::<UiNotice>();
    let (cancel_tx, cancel_rx) = watch::channel(false);

    let cfg = TuiConfig {
        stack,
        ..TuiConfig::default()
    };
    let ui_thread = thread::Builder::new()
        .name("tripanel-ui".to_string())
        .spawn(move || tui::run_live(control_rx, notices_tx, cfg, cancel_tx))?;

    let pump_result = rt.block_on(pump(handle, control_tx, notices_rx, cancel_rx, &mut debug));

    let ui_result = match ui_thread.join() {
        Ok(res) => res,
        Err(_) => Err(anyhow!("ui thread panicked")),
    };
    pump_result.and(ui_result)
}

async fn bind_relay(args: &CliArgs) -> anyhow::Result<(PeerRelay, RelayHandle)> {
    match (args.tcp.as_deref(), args.unix.as_deref()) {
        (Some(addr), _) => PeerRelay::bind_tcp(addr).await,
        #[cfg(unix)]
        (None, Some(path)) => PeerRelay::bind_unix(path).await,
        _ => Err(anyhow!("either --tcp or --unix is required")),
    }
}

/// Bridges the relay and the UI: peer output lands in the panels, entered
/// commands go to the peer, UI exit tells the peer and ends the process.
async fn pump(
    handle: RelayHandle,
    control_tx: mpsc::Sender<ControlMessage>,
    mut notices_rx: tokio_mpsc::UnboundedReceiver<UiNotice>,
    mut cancel_rx: watch::Receiver<bool>,
    debug: &mut DebugSink,
) -> anyhow::Result<()> {
    let sender = handle.sender.clone();
    let mut relay_events = handle.events;

    loop {
        tokio::select! {
            Some(event) = relay_events.recv() => {
                apply_relay_event(event, &control_tx, &sender, debug);
            }
            Some(notice) = notices_rx.recv() => {
                if apply_notice(notice, &sender, debug) {
                    break;
                }
            }
            changed = cancel_rx.changed() => {
                if changed.is_err() || *cancel_rx.borrow() {
                    // the UI is gone; flush anything it said on the way out
                    while let Ok(notice) = notices_rx.try_recv() {
                        if apply_notice(notice, &sender, debug) {
                            return Ok(());
                        }
                    }
                    sender.send(PeerMessage::new(PeerMessageKind::UserExited, ""));
                    break;
                }
            }
        }
    }
    Ok(())
}

/// Returns true when the UI has exited and the pump should stop.
fn apply_notice(notice: UiNotice, sender: &RelaySender, debug: &mut DebugSink) -> bool {
    match notice {
        UiNotice::CommandEntered(cmd) => {
            debug.line(&format!("command entered: {cmd}"));
            sender.send(PeerMessage::new(PeerMessageKind::InputCommandReceived, cmd));
            false
        }
        UiNotice::UiExited => {
            debug.line("ui exited");
            sender.send(PeerMessage::new(PeerMessageKind::UserExited, ""));
            true
        }
    }
}

fn apply_relay_event(
    event: RelayEvent,
    control_tx: &mpsc::Sender<ControlMessage>,
    sender: &RelaySender,
    debug: &mut DebugSink,
) {
    match event {
        RelayEvent::PeerConnected(peer) => {
            debug.line(&format!("peer connected: {peer}"));
            let _ = control_tx.send(ControlMessage::AppendToGeneralOutput(format!(
                "Incoming connection from ({peer})"
            )));
        }
        RelayEvent::PeerClosed(peer) => {
            debug.line(&format!("peer closed: {peer}"));
            let _ = control_tx.send(ControlMessage::AppendToGeneralOutput(format!(
                "Connection closed for peer ({peer})"
            )));
        }
        RelayEvent::Error(e) => {
            debug.line(&format!("relay error: {e}"));
            let _ = control_tx.send(ControlMessage::AppendToErrorOutput(format!(
                "Peer communication error: {e}"
            )));
        }
        RelayEvent::Message(msg) => match msg.kind {
            PeerMessageKind::GeneralOutput => {
                let _ = control_tx.send(ControlMessage::AppendToGeneralOutput(msg.message));
            }
            PeerMessageKind::ErrorOutput => {
                let _ = control_tx.send(ControlMessage::AppendToErrorOutput(msg.message));
            }
            PeerMessageKind::InputCommandReplacement => {
                let _ = control_tx.send(ControlMessage::ReplaceCommandText(msg.message));
            }
            PeerMessageKind::ProtocolError => {
                let _ = control_tx.send(ControlMessage::AppendToErrorOutput(format!(
                    "Peer reports protocol error: {}",
                    msg.message
                )));
            }
            PeerMessageKind::InputCommandReceived | PeerMessageKind::UserExited => {
                sender.send(PeerMessage::new(
                    PeerMessageKind::ProtocolError,
                    format!("unexpected message kind {:?}", msg.kind),
                ));
            }
        },
    }
}
