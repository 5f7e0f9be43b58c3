use lifelink::LifelinkBuilder;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	LifelinkBuilder::default().start_server().await
}
