use clap::Parser;
use crossbeam_channel::Receiver;
use linekv::protocol::{Message, Status};
use linekv::Client;
use std::io::{self, BufRead, Write};
use std::thread::{self, JoinHandle};
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Initial log level (switchable at runtime with `loglevel`)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Reloadable filter so `loglevel` can switch levels at runtime
    let (filter, reload_handle) =
        reload::Layer::new(EnvFilter::new(format!("linekv={}", args.log_level)));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut client: Option<Client> = None;
    let mut printer: Option<JoinHandle<()>> = None;

    print_help();
    let stdin = io::stdin();
    loop {
        print!("LineKV> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();

        match tokens.as_slice() {
            [] => {}

            ["connect", host, port] => {
                if client.is_some() {
                    println!("Error: already connected (disconnect first)");
                    continue;
                }
                let port: u16 = match port.parse() {
                    Ok(port) => port,
                    Err(_) => {
                        println!("Error: invalid port '{}'", port);
                        continue;
                    }
                };
                let mut new_client = Client::new(*host, port);
                match new_client.connect() {
                    Ok(rx) => {
                        printer = Some(spawn_printer(rx));
                        client = Some(new_client);
                        println!("Connected to {}:{}", host, port);
                    }
                    Err(e) => println!("Error: unable to connect: {}", e),
                }
            }

            ["disconnect"] => {
                match client.take() {
                    Some(mut connected) => connected.disconnect(),
                    None => println!("Error: not connected"),
                }
                if let Some(handle) = printer.take() {
                    let _ = handle.join();
                }
            }

            ["get", key] => {
                with_client(&mut client, |c| c.get(key));
            }

            ["put", key] => {
                // No value line: requests a delete
                with_client(&mut client, |c| c.put(key, None));
            }

            ["put", key, rest @ ..] => {
                let value = rest.join(" ");
                with_client(&mut client, |c| c.put(key, Some(&value)));
            }

            ["loglevel", level] => match EnvFilter::try_new(format!("linekv={}", level)) {
                Ok(new_filter) => {
                    if let Err(e) = reload_handle.reload(new_filter) {
                        println!("Error: unable to switch log level: {}", e);
                    } else {
                        println!("Log level set to {}", level);
                    }
                }
                Err(_) => println!("Error: invalid log level '{}'", level),
            },

            ["help"] => print_help(),

            ["quit"] | ["exit"] => break,

            _ => println!("Error: unknown command (try 'help')"),
        }
    }

    if let Some(mut connected) = client.take() {
        connected.disconnect();
    }
    if let Some(handle) = printer.take() {
        let _ = handle.join();
    }
    Ok(())
}

fn with_client<F>(client: &mut Option<Client>, op: F)
where
    F: FnOnce(&mut Client) -> linekv::Result<()>,
{
    match client {
        Some(connected) => {
            if let Err(e) = op(connected) {
                println!("Error: {}", e);
            }
        }
        None => println!("Error: not connected"),
    }
}

fn spawn_printer(rx: Receiver<Message>) -> JoinHandle<()> {
    thread::spawn(move || {
        for message in rx.iter() {
            print_response(&message);
        }
    })
}

fn print_response(message: &Message) {
    let key = message.key.as_deref().unwrap_or("");
    let value = message.value.as_deref().unwrap_or("");
    match message.status {
        Status::GetError | Status::PutError | Status::DeleteError => {
            println!("{}: {}", message.status, value);
        }
        _ => println!("{}: key: {}, value: {}", message.status, key, value),
    }
}

fn print_help() {
    println!("LineKV client commands:");
    println!("  connect <host> <port>   connect to a server");
    println!("  disconnect              close the current connection");
    println!("  put <key> <value>       insert or update a key");
    println!("  put <key>               delete a key");
    println!("  get <key>               look up a key");
    println!("  loglevel <level>        set the log level (trace..error)");
    println!("  help                    show this help");
    println!("  quit                    exit");
}
