use std::error::Error;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let base = "http://127.0.0.1:3000";
    let client = reqwest::Client::new();

    println!("🚀 Starting a run against {}", base);

    let started = client
        .post(format!("{}/start", base))
        .json(&serde_json::json!({
            "targetViews": 500,
            "videoLink": "https://example.com/video/7234567890123456789",
        }))
        .send()
        .await?
        .text()
        .await?;
    println!("start: {}", started);

    for _ in 0..30 {
        tokio::time::sleep(Duration::from_secs(1)).await;
        let status = client
            .get(format!("{}/status", base))
            .send()
            .await?
            .text()
            .await?;
        println!("📊 {}", status);
    }

    client.post(format!("{}/stop", base)).send().await?;
    println!("🛑 Stop requested.");

    Ok(())
}
