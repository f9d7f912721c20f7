use anyhow::{Context, Result};
use clap::Parser;
use inquire::{InquireError, Text};
use std::fs;
use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream};

#[derive(Parser, Debug)]
#[command(
    name = "bichrome-client",
    version,
    about = "Sends local images to a bichrome server and prints the answer"
)]
struct Cli {
    /// Address of the classification server.
    #[arg(long, default_value = "127.0.0.1:4321")]
    addr: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    loop {
        let path = match Text::new("Image path:")
            .with_help_message("leave blank to quit")
            .prompt()
        {
            Ok(path) => path,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };
        let path = path.trim();
        if path.is_empty() {
            break;
        }
        match classify(&cli.addr, path) {
            Ok(answer) if answer.is_empty() => eprintln!("server could not classify the image"),
            Ok(answer) => println!("{answer}"),
            Err(e) => eprintln!("error: {e:#}"),
        }
    }
    Ok(())
}

/// One request per connection: send the file bytes, half-close, read
/// the class identifier until the server closes.
fn classify(addr: &str, path: &str) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("could not read {path}"))?;
    let mut stream =
        TcpStream::connect(addr).with_context(|| format!("could not connect to {addr}"))?;
    stream.write_all(&bytes)?;
    // The half-close marks the request complete even when the payload
    // is an exact multiple of the server's read chunk.
    stream.shutdown(Shutdown::Write)?;

    let mut answer = String::new();
    stream.read_to_string(&mut answer)?;
    Ok(answer)
}
