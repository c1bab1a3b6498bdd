use reelcat::cli::print_error;

#[tokio::main]
async fn main() {
    let result = reelcat::cli::run().await;
    match result {
        Ok(_) => std::process::exit(0),
        Err(e) => {
            print_error(&e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    }
}
