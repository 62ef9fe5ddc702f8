use rumqttc::{AsyncClient, Event, Incoming, MqttOptions, QoS};
use tokio::sync::broadcast;
use tracing::{debug, error, info, instrument, warn};

use crate::config::MqttConfig;
use crate::error::{AppError, Result};
use crate::handler::MessageHandler;

pub fn mqtt_options(config: &MqttConfig) -> MqttOptions {
    let mut options = MqttOptions::new(
        config.client_id.clone(),
        config.host.clone(),
        config.port,
    );
    options.set_keep_alive(config.keep_alive);
    if !config.username.is_empty() && !config.password.is_empty() {
        options.set_credentials(config.username.clone(), config.password.clone());
    }
    options
}

/// Connect, subscribe to the single configured topic and dispatch every
/// publish to the handler, one at a time. A connect failure is fatal; a
/// connection lost later is logged and the bridge idles until interrupted.
/// There is no reconnect.
#[instrument(
    name = "bridge_task",
    skip_all,
    fields(host = %config.host, port = config.port, topic = %config.topic)
)]
pub async fn run(
    config: MqttConfig,
    handler: MessageHandler,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<()> {
    let options = mqtt_options(&config);
    let (client, mut eventloop) = AsyncClient::new(options, 10);

    // Queued locally; the first poll below drives the connect handshake
    // and then the subscribe.
    client.subscribe(config.topic.clone(), QoS::AtLeastOnce).await?;

    let mut connected = false;

    loop {
        tokio::select! {
            biased;

            _ = shutdown_rx.recv() => {
                info!("shutdown signal received, disconnecting");
                if let Err(e) = client.disconnect().await {
                    debug!(error = %e, "disconnect request failed");
                }
                break;
            }

            event = eventloop.poll() => {
                match event {
                    Ok(Event::Incoming(Incoming::ConnAck(_))) => {
                        connected = true;
                        info!(host = %config.host, port = config.port, "connected to MQTT broker");
                    }
                    Ok(Event::Incoming(Incoming::SubAck(_))) => {
                        info!(topic = %config.topic, "subscribed");
                    }
                    Ok(Event::Incoming(Incoming::Publish(publish))) => {
                        debug!(
                            topic = %publish.topic,
                            payload_size = publish.payload.len(),
                            "message received"
                        );
                        handler.handle(&publish.payload).await;
                    }
                    Ok(Event::Incoming(Incoming::Disconnect)) => {
                        warn!("broker closed the connection; not reconnecting, restart the bridge to resume");
                        idle_until_shutdown(&mut shutdown_rx).await;
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        if !connected {
                            error!(error = %e, "failed to connect to MQTT broker");
                            return Err(AppError::Mqtt(e));
                        }
                        warn!(error = %e, "connection lost; not reconnecting, restart the bridge to resume");
                        idle_until_shutdown(&mut shutdown_rx).await;
                        break;
                    }
                }
            }
        }
    }

    Ok(())
}

/// Keeps the process alive after a lost connection so the operator sees
/// the warning and decides when to restart.
async fn idle_until_shutdown(shutdown_rx: &mut broadcast::Receiver<()>) {
    let _ = shutdown_rx.recv().await;
    info!("shutdown signal received");
}
