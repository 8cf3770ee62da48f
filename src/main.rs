#[tokio::main]
async fn main() {
    experience_booking::run().await;
}
