//! clearpath-runner: headless runner for the ClearPath demo.
//!
//! Usage:
//!   clearpath-runner --seed 12345 --seconds 120
//!   clearpath-runner --seed 12345 --seconds 120 --realtime --speed fast_forward
//!   clearpath-runner --seed 12345 --config demo.json --backend http://localhost:5000/api
//!   clearpath-runner --seed 12345 --online --ipc-mode

use anyhow::Result;
use chrono::Utc;
use clearpath_core::{
    backend::{Backend, ContactForm, HttpBackend, OfflineBackend},
    clock::SimSpeed,
    command::OperatorCommand,
    config::DemoConfig,
    dashboard::{self, StatusPanel},
    engine::DemoEngine,
    event::ChannelEvent,
    snapshot::SystemStatus,
    types::{EntityId, Millis},
};
use std::env;
use std::io::{self, BufRead, Write};
use std::time::Duration;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Advance { ms: Millis },
    Pause,
    Resume,
    SetSpeed { speed: SimSpeed },
    Trigger,
    Toggle,
    Reset,
    Acknowledge { alert_id: EntityId },
    Contact { form: ContactForm },
    /// Feed an event in as if it arrived on the live-update channel.
    Publish { event: ChannelEvent },
    Quit,
}

#[derive(serde::Serialize)]
struct IpcResponse {
    events:  Vec<ChannelEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    state:   UiState,
}

#[derive(serde::Serialize)]
struct UiState {
    now_ms:     Millis,
    clock:      String,
    paused:     bool,
    speed:      SimSpeed,
    panel:      StatusPanel,
    status:     SystemStatus,
    pending_sequence_steps: usize,
    log_len:    usize,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let seconds = parse_arg(&args, "--seconds", 60u64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let realtime = args.iter().any(|a| a == "--realtime");
    let online = args.iter().any(|a| a == "--online");
    let config_path = string_arg(&args, "--config");
    let backend_url = string_arg(&args, "--backend");
    let speed = match string_arg(&args, "--speed") {
        Some(s) => s.parse::<SimSpeed>()?,
        None => SimSpeed::Normal,
    };

    let config = match config_path {
        Some(path) => DemoConfig::load(path)?,
        None => DemoConfig::default(),
    };

    // --backend wins; --online falls back to the configured base URL.
    let backend_url = backend_url
        .map(str::to_string)
        .or_else(|| online.then(|| config.backend.base_url.clone()));

    let backend: Box<dyn Backend> = match &backend_url {
        Some(url) => Box::new(HttpBackend::new(url.as_str())?),
        None => Box::new(OfflineBackend),
    };

    let run_id = format!("run-{seed}-{}", uuid::Uuid::new_v4());

    if !ipc_mode {
        println!("ClearPath - runner");
        println!("  run_id:    {run_id}");
        println!("  seed:      {seed}");
        println!("  seconds:   {seconds}");
        println!("  speed:     {speed:?}");
        println!("  config:    {}", config_path.unwrap_or("(defaults)"));
        println!("  backend:   {}", backend_url.as_deref().unwrap_or("(offline)"));
        println!();
    }

    let mut engine = DemoEngine::new(run_id, seed, Utc::now(), config, backend);
    engine.connect()?;
    engine.execute(OperatorCommand::SetSpeed { speed })?;

    if ipc_mode {
        run_ipc_loop(&mut engine)?;
    } else {
        engine.trigger()?;
        run_headless(&mut engine, seconds * 1000, realtime)?;
        print_summary(&engine, seconds);
    }

    Ok(())
}

fn run_headless(engine: &mut DemoEngine, total_ms: Millis, realtime: bool) -> Result<()> {
    let step = engine.config().timers.clock_refresh_ms.max(1);
    let mut elapsed = 0;
    while elapsed < total_ms {
        let ms = step.min(total_ms - elapsed);
        for event in engine.advance(ms)? {
            if let ChannelEvent::SimulationTick(_) | ChannelEvent::ClockTick { .. } = event {
                continue;
            }
            println!("  [{}] {}", engine.clock.live_clock(), event.name());
        }
        elapsed += ms;
        if realtime {
            std::thread::sleep(Duration::from_millis(ms / engine.clock.time_scale()));
        }
    }
    Ok(())
}

fn run_ipc_loop(engine: &mut DemoEngine) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        let result = match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => Ok((Vec::new(), None)),
            IpcCommand::Advance { ms } => engine.advance(ms).map(|events| (events, None)),
            IpcCommand::Pause => execute(engine, OperatorCommand::Pause),
            IpcCommand::Resume => execute(engine, OperatorCommand::Resume),
            IpcCommand::SetSpeed { speed } => execute(engine, OperatorCommand::SetSpeed { speed }),
            IpcCommand::Trigger => execute(engine, OperatorCommand::Trigger),
            IpcCommand::Toggle => execute(engine, OperatorCommand::Toggle),
            IpcCommand::Reset => execute(engine, OperatorCommand::Reset),
            IpcCommand::Acknowledge { alert_id } => {
                execute(engine, OperatorCommand::AcknowledgeAlert { alert_id })
            }
            IpcCommand::Contact { form } => execute(engine, OperatorCommand::SubmitContact { form }),
            IpcCommand::Publish { event } => engine.apply_remote(&event).map(|()| (Vec::new(), None)),
        };

        match result {
            Ok((events, message)) => {
                let response = IpcResponse { events, message, state: build_ui_state(engine) };
                writeln!(stdout, "{}", serde_json::to_string(&response)?)?;
            }
            Err(e) => {
                log::warn!("ipc: command failed: {e}");
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn execute(
    engine: &mut DemoEngine,
    command: OperatorCommand,
) -> clearpath_core::error::SimResult<(Vec<ChannelEvent>, Option<String>)> {
    let outcome = engine.execute(command)?;
    Ok((outcome.events, outcome.message))
}

fn build_ui_state(engine: &DemoEngine) -> UiState {
    UiState {
        now_ms: engine.clock.now_ms,
        clock: engine.clock.live_clock(),
        paused: engine.clock.paused,
        speed: engine.clock.speed,
        panel: engine.panel(),
        status: engine.status(),
        pending_sequence_steps: engine.pending_sequence_steps(),
        log_len: engine.event_log().len(),
    }
}

fn print_summary(engine: &DemoEngine, seconds: u64) {
    let log = engine.event_log();

    println!();
    println!("=== RUN SUMMARY ===");
    println!("  run_id:         {}", engine.run_id);
    println!("  seconds run:    {seconds}");
    println!("  clock:          {}", engine.clock.live_clock());
    println!("  events logged:  {}", log.len());
    println!("  sim ticks:      {}", log.count_of("simulation_tick"));
    println!("  alerts:         {}", engine.alerts().alerts().len());
    println!("  pending alerts: {}", engine.alerts().pending_count());
    println!("  notifications:  {}", engine.alerts().notifications().len());
    println!("  signals:        {}/3 preempted", engine.signals().preempted_count());

    println!();
    println!("=== DASHBOARD ===");
    println!("{}", engine.panel());
    println!();
    for line in dashboard::signal_lines(engine.signals()) {
        println!("  {line}");
    }
    for line in dashboard::alert_lines(engine.alerts()) {
        println!("  {line}");
    }
    for line in dashboard::notification_lines(engine.alerts()) {
        println!("  {line}");
    }
    for line in dashboard::analytics_lines(engine.analytics()) {
        println!("  {line}");
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
