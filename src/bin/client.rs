use std::io::Write;

use chitty_chat::observability::init_observability;
use chitty_chat::observability::LogMode;
use chitty_chat::render_line;
use chitty_chat::ChatConfig;
use chitty_chat::ClientAgent;
use chitty_chat::GrpcChatTransport;
use chitty_chat::Result;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use tokio_stream::wrappers::LinesStream;
use tracing::error;
use tracing::info;

const PROMPT: &str = "-> ";

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<()> {
    let settings = ChatConfig::new()?.validate()?;
    let client = &settings.client;

    println!("--- Welcome to Chitty Chat ---");

    let _guard = init_observability(&client.log_path(), LogMode::Append)?;

    println!("client {}: dialing {}", client.name, client.server_address);
    let transport = match GrpcChatTransport::connect(client, &settings.network).await {
        Ok(transport) => transport,
        Err(e) => {
            eprintln!("Fail to dial: {}", e);
            error!("Fail to dial {}: {:?}", client.server_address, e);
            return Err(e);
        }
    };

    let agent = ClientAgent::new(client.name.clone(), transport);
    info!("{} is joining the chat", agent.identity());

    let stdin = LinesStream::new(BufReader::new(tokio::io::stdin()).lines());
    prompt();
    let result = agent
        .run(stdin, |message, clock| {
            print!("\r{}\n", render_line(message, clock));
            prompt();
        })
        .await;

    if let Err(e) = result {
        eprintln!("\nConnection to server lost: {}", e);
        error!("client stops: {:?}", e);
        return Err(e);
    }

    println!("\nConnection to server closed");
    Ok(())
}

fn prompt() {
    print!("{}", PROMPT);
    let _ = std::io::stdout().flush();
}
