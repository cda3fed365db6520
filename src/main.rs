#[tokio::main]
async fn main() {
    seatmap_backend::run().await;
}
