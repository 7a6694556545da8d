//! Demonstration console program.
//!
//! Drives the hub over a scripted mock transport: a pad on slot 0 connects,
//! mashes a few buttons, wiggles the left stick and disconnects again. Every
//! routed event is printed, and the first A press fires a short rumble burst.

use std::time::Duration;

use color_eyre::Result;
use padhub::config::HubSettings;
use padhub::hub::{probe, HubHandle, PadEventKind};
use padhub::pad::Buttons;
use padhub::transport::{MockTransport, RawState};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let mock = scripted_transport();
    let mut available_check = mock.clone();
    info!(
        "input subsystem is {}available",
        if probe(&mut available_check) { "" } else { "not " }
    );

    let settings = HubSettings::default();
    let hub = HubHandle::spawn(Box::new(mock.clone()), settings)?;
    let mut events = hub.subscribe();
    let mut rumbled = false;

    info!("polling slot 0, waiting for events (3 seconds)");
    let deadline = tokio::time::sleep(Duration::from_secs(3));
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            event = events.recv() => {
                let Ok(event) = event else { break };
                match event.kind {
                    PadEventKind::ConnectionChanged { connected } => {
                        info!(slot = event.slot, connected, "connection changed");
                    }
                    PadEventKind::StateChanged { packet_number } => {
                        info!(slot = event.slot, packet_number, "state changed");
                    }
                    PadEventKind::KeyDown { buttons } => {
                        info!(slot = event.slot, ?buttons, "key down");
                        if buttons.contains(Buttons::A) && !rumbled {
                            rumbled = true;
                            info!("A pressed, firing rumble burst");
                            hub.vibrate(
                                0,
                                1.0,
                                0.5,
                                Duration::from_millis(200),
                                Duration::from_millis(200),
                            )
                            .await?;
                        }
                    }
                    PadEventKind::KeyUp { buttons } => {
                        info!(slot = event.slot, ?buttons, "key up");
                    }
                }
            }
        }
    }

    let snapshot = *hub.watch_pad(0)?.borrow();
    info!(
        connected = snapshot.connected,
        packet = snapshot.packet_number,
        left_stick = ?snapshot.left_stick,
        "final snapshot"
    );
    info!(vibration_writes = ?mock.vibration_log(), "writes that reached the transport");

    hub.stop();
    Ok(())
}

fn setup() -> Result<()> {
    color_eyre::install()?;
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();
    Ok(())
}

/// A canned input session on slot 0.
fn scripted_transport() -> MockTransport {
    let mock = MockTransport::new();

    let mut packet = 0u32;
    {
        let mut push = |buttons: Buttons, lx: i16, ly: i16| {
            packet += 1;
            mock.push_state(
                0,
                RawState {
                    packet_number: packet,
                    buttons: buttons.bits(),
                    thumb_lx: lx,
                    thumb_ly: ly,
                    ..Default::default()
                },
            );
        };

        push(Buttons::empty(), 0, 0);
        push(Buttons::A, 0, 0);
        push(Buttons::A | Buttons::B, 0, 0);
        push(Buttons::empty(), 0, 0);
        push(Buttons::empty(), 20000, -12000);
        push(Buttons::DPAD_LEFT, 20000, -12000);
        push(Buttons::empty(), 0, 0);
    }
    mock.push_disconnected(0);

    mock
}
