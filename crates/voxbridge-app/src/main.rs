//! Voxbridge application binary: composition root.
//!
//! 1. Parse flags and load configuration from TOML
//! 2. Initialize tracing
//! 3. Build the communicator (prediction, speech, emergency workflow)
//! 4. Run the line-oriented loop, feeding wall time into the emergency timers

use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use voxbridge_app::command::{Command, HELP};
use voxbridge_app::{CliArgs, Communicator, ConsoleRecognizer, ConsoleSynthesizer};
use voxbridge_core::config::VoxbridgeConfig;
use voxbridge_core::error::Result;
use voxbridge_core::events::DomainEvent;
use voxbridge_emergency::DispatchAction;
use voxbridge_speech::{SpeechController, TranscriptStream};

/// What the loop should do after a line is handled.
enum Flow {
    Continue,
    /// A dictation session is open and waits for the next plain line.
    Listen(TranscriptStream),
    Quit,
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = VoxbridgeConfig::load_or_default(&config_file);
    args.apply_overrides(&mut config);

    // Tracing. RUST_LOG wins over flag and config.
    let level = args.resolve_log_level(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting Voxbridge v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration resolved");

    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "Invalid configuration after overrides");
        return Err(e.into());
    }

    let recognizer = ConsoleRecognizer::new();
    let speech = SpeechController::new(config.speech.clone())
        .with_synthesizer(Arc::new(ConsoleSynthesizer::stdout()))
        .with_recognizer(Arc::new(recognizer.clone()));
    tracing::info!(
        can_speak = speech.can_speak(),
        can_listen = speech.can_listen(),
        "Speech capabilities ready"
    );
    let mut comm = Communicator::new(&config, speech);

    println!("{}", HELP);
    run(&mut comm, &recognizer).await?;

    tracing::info!("Voxbridge stopped");
    Ok(())
}

/// Read lines until EOF, `:quit` or Ctrl-C, firing emergency timers as they come due.
async fn run(comm: &mut Communicator, recognizer: &ConsoleRecognizer) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last = Instant::now();
    let mut dictation: Option<TranscriptStream> = None;

    loop {
        let wait = comm.time_until_next();
        let timer = async {
            match wait {
                Some(d) => tokio::time::sleep(d).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            line = lines.next_line() => {
                catch_up(comm, &mut last);
                let Some(line) = line? else {
                    break;
                };
                let open = if line.starts_with(':') {
                    None
                } else {
                    dictation.take()
                };
                if let Some(stream) = open {
                    recognizer.dictate(&line);
                    finish_dictation(comm, stream).await;
                } else {
                    match handle_line(comm, &line).await {
                        Flow::Continue => {}
                        Flow::Listen(stream) => {
                            println!("Listening... type what you say");
                            dictation = Some(stream);
                        }
                        Flow::Quit => break,
                    }
                }
            }
            _ = timer => {
                catch_up(comm, &mut last);
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown signal received");
                comm.speech().stop_speaking();
                break;
            }
        }

        let events = comm.drain_events();
        report_events(&events, comm);
    }

    if !comm.session().is_idle() {
        tracing::warn!(status = %comm.session().status, "Exiting with an emergency in progress");
    }
    Ok(())
}

fn catch_up(comm: &mut Communicator, last: &mut Instant) {
    let now = Instant::now();
    comm.advance(now.duration_since(*last));
    *last = now;
}

async fn handle_line(comm: &mut Communicator, line: &str) -> Flow {
    let command = match Command::parse(line) {
        Ok(c) => c,
        Err(msg) => {
            println!("{}", msg);
            return Flow::Continue;
        }
    };

    let outcome: Result<()> = match command {
        Command::Text(text) => {
            comm.on_text_changed(&text);
            print_candidates(comm);
            Ok(())
        }
        Command::Pick(n) => comm.choose(n - 1).map(|composed| {
            println!("> {}", composed);
            print_candidates(comm);
        }),
        Command::Speak => comm.speak_current().await,
        Command::Listen => match comm.speech().listen().await {
            Ok(stream) => return Flow::Listen(stream),
            Err(e) => Err(e),
        },
        Command::Add(text) => comm.add_phrase(&text, "").map(|p| {
            println!("Saved phrase {} ({})", p.id, p.category);
        }),
        Command::Remove(id) => {
            if comm.remove_phrase(id) {
                println!("Removed {}", id);
            } else {
                println!("No phrase with id {}", id);
            }
            Ok(())
        }
        Command::Phrases => {
            for p in comm.store().custom_phrases() {
                println!("{}  [{}] used {}x  {}", p.id, p.category, p.usage_count, p.text);
            }
            Ok(())
        }
        Command::Recent => {
            for (i, text) in comm.recent().enumerate() {
                println!("{:>2}. {}", i + 1, text);
            }
            Ok(())
        }
        Command::Sos(kind) => comm.request_emergency(kind),
        Command::Now => comm.activate_now(),
        Command::Cancel => comm.cancel_emergency(),
        Command::Off => comm.deactivate_emergency(),
        Command::Share => comm.share_location().map(|done| {
            if !done {
                println!("Location already shared");
            }
        }),
        Command::Notify => comm.notify_contacts().map(|done| {
            if !done {
                println!("Contacts already notified");
            }
        }),
        Command::Message(text) => comm.set_emergency_message(&text),
        Command::Status => {
            match serde_json::to_string_pretty(comm.session()) {
                Ok(json) => println!("{}", json),
                Err(e) => tracing::warn!(error = %e, "Failed to render session"),
            }
            println!(
                "speech: speaking={} listening={}",
                comm.speech().is_speaking(),
                comm.speech().is_listening()
            );
            Ok(())
        }
        Command::Help => {
            println!("{}", HELP);
            Ok(())
        }
        Command::Quit => return Flow::Quit,
    };

    if let Err(e) = outcome {
        println!("{}", e);
    }
    Flow::Continue
}

fn print_candidates(comm: &Communicator) {
    if comm.candidates().is_empty() {
        return;
    }
    for c in comm.candidates() {
        println!("{:>2}. {} ({}%)", c.rank + 1, c.text, c.confidence_score);
    }
}

/// Print a dictated utterance as it is recognized, then predict from it.
async fn finish_dictation(comm: &mut Communicator, mut stream: TranscriptStream) {
    while let Some(item) = stream.next().await {
        match item {
            Ok(t) if t.is_final => {
                println!("> {}", t.text);
                comm.on_text_changed(&t.text);
                print_candidates(comm);
            }
            Ok(t) => println!("~ {}", t.text),
            Err(e) => {
                println!("{}", e);
                break;
            }
        }
    }
}

fn report_events(events: &[DomainEvent], comm: &Communicator) {
    if events.is_empty() {
        return;
    }
    for event in events {
        let at = event.timestamp().to_datetime().format("%H:%M:%S");
        match event {
            DomainEvent::EmergencyRequested {
                emergency_type,
                countdown,
                ..
            } => println!(
                "! {} {}: {} in {} ticks, informing {}",
                at,
                event.name(),
                emergency_type.display_name(),
                countdown,
                emergency_type.contact_roles().join(", ")
            ),
            DomainEvent::CountdownTicked { remaining, .. } => {
                println!("! {} {} ({} left)", at, event.name(), remaining)
            }
            DomainEvent::EmergencyActivated { .. } => {
                let schedule: Vec<String> = DispatchAction::ALL
                    .iter()
                    .map(|a| format!("{} +{:?}", a, comm.emergency().dispatch_offset(*a)))
                    .collect();
                println!("! {} {}: {}", at, event.name(), schedule.join(", "))
            }
            DomainEvent::LocationShared { location, .. } => {
                println!("! {} {} {}", at, event.name(), location)
            }
            DomainEvent::ServicesAlerted { contact_count, .. } => {
                println!("! {} {} ({} contacts)", at, event.name(), contact_count)
            }
            DomainEvent::SessionAborted { reason, .. } => {
                println!("! {} {}: {}", at, event.name(), reason)
            }
            _ => println!("! {} {}", at, event.name()),
        }
    }
    let session = comm.session();
    println!(
        "  [{} {}] countdown={} location={} notified={} alerted={}",
        session.status,
        session.emergency_type,
        session.countdown_remaining,
        session.location_shared,
        session.contacts_notified,
        session.services_alerted,
    );
}
