#[tokio::main]
async fn main() {
    if let Err(e) = pixelcalc_lib::run().await {
        eprintln!("pixelcalc: {e}");
        std::process::exit(1);
    }
}
