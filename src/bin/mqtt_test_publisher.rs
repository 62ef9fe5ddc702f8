use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use clap::Parser;
use rumqttc::{AsyncClient, MqttOptions, QoS};
use std::error::Error;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::time::Duration;

/// Publishes sample notification payloads for testing the bridge
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// MQTT broker host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// MQTT broker port
    #[arg(long, default_value = "1883")]
    port: u16,

    /// Topic to publish to
    #[arg(short, long, default_value = "android/notifications")]
    topic: String,

    /// Notification title
    #[arg(long, default_value = "Test notification")]
    title: String,

    /// Notification body text
    #[arg(short = 'm', long, default_value = "Hello from mqtt_test_publisher")]
    text: String,

    /// Urgency: high, normal, low or minimal
    #[arg(short, long, default_value = "normal")]
    urgency: String,

    /// Optional PNG file to embed as a base64 icon
    #[arg(short, long)]
    icon: Option<PathBuf>,

    /// Number of messages to publish
    #[arg(short = 'n', long, default_value = "1")]
    count: u32,

    /// Interval between messages in seconds
    #[arg(long, default_value = "1")]
    interval: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    println!("\n=== MQTT Publisher Configuration ===");
    println!("Broker:  {}:{}", args.host, args.port);
    println!("Topic:   {}", args.topic);
    println!("Urgency: {}", args.urgency);
    println!("Count:   {}", args.count);
    println!("====================================\n");

    let mut options = MqttOptions::new("mqtt-test-publisher", args.host.clone(), args.port);
    options.set_keep_alive(Duration::from_secs(30));
    let (client, mut eventloop) = AsyncClient::new(options, 10);

    // Drive the connection in the background; this binary only publishes.
    tokio::spawn(async move {
        loop {
            if let Err(e) = eventloop.poll().await {
                eprintln!("❌ MQTT connection error: {e}");
                break;
            }
        }
    });

    let icon = match &args.icon {
        Some(path) => Some(BASE64.encode(std::fs::read(path)?)),
        None => None,
    };

    for i in 0..args.count {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)?
            .as_millis() as i64;
        let payload = serde_json::json!({
            "package": "com.example.test",
            "app": "Test App",
            "title": format!("{} #{}", args.title, i),
            "text": args.text,
            "timestamp": timestamp,
            "priority": 0,
            "importance": 3,
            "urgency": args.urgency,
            "icon": icon,
        });

        println!("📤 Publishing message #{i}");
        match client
            .publish(args.topic.clone(), QoS::AtLeastOnce, false, payload.to_string())
            .await
        {
            Ok(_) => println!("   ✅ Message queued\n"),
            Err(e) => eprintln!("   ❌ Error publishing message: {e}\n"),
        }

        tokio::time::sleep(Duration::from_secs(args.interval)).await;
    }

    // Give the event loop a moment to flush the last publish.
    tokio::time::sleep(Duration::from_millis(500)).await;
    Ok(())
}
