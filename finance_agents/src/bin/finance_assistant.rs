use finance_agents::{AgentSettings, Coordinator};
use std::env;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1).peekable();

    let settings = if args.peek().map(String::as_str) == Some("--config") {
        args.next();
        let path = args.next().ok_or("--config needs a path")?;
        AgentSettings::from_json_file(path)?
    } else {
        AgentSettings::default()
    };

    let query = args.collect::<Vec<_>>().join(" ");
    if query.trim().is_empty() {
        return Err("usage: finance_assistant [--config settings.json] <query>".into());
    }

    let mut coordinator = Coordinator::new(settings)?;
    let response = coordinator.handle(&query)?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
