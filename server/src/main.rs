use clap::Parser;
use log::info;
use server::network::Server;

/// Main-method of the application.
/// Parses command-line arguments, then runs one match to completion.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Command line arguments
    #[derive(Parser, Debug)]
    #[clap(author, version, about)]
    struct Args {
        /// Server IP address to bind to
        #[clap(short = 'H', long, default_value = "127.0.0.1")]
        host: String,
        /// Server port to listen on
        #[clap(short, long, default_value = "7788")]
        port: u16,
        /// Number of players the match waits for
        #[clap(short = 'n', long, default_value = "2")]
        players: usize,
    }

    env_logger::init();
    let args = Args::parse();

    let address = format!("{}:{}", args.host, args.port);
    let mut server = Server::new(&address, args.players).await?;

    let winner = server.run().await?;
    info!("Closing the server, winning team: {}", winner);
    Ok(())
}
