// Pcc-hbtn Pure Rust CLI
// Feeds acpid notifications for the Panasonic tablet buttons through the driver

#![cfg_attr(feature = "pure-rust", allow(dead_code))]

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "pure-rust")]
use clap::Parser;

#[cfg(feature = "pure-rust")]
use hbtn_core::{
    AcpiCallQuery, AcpiDriverOps, AcpiEvent, InputBackend, NotifyOutcome, RecordingBackend,
    Settings, TabletButtonDriver, UInputBackend,
};

/// How often the event loop wakes up to check for shutdown
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Panasonic tablet button translator
#[derive(Parser, Debug)]
#[command(name = "pcc-hbtn")]
#[command(author = "pcc-hbtn contributors")]
#[command(version)]
#[command(
    about = "Translate Panasonic tablet button notifications into key events",
    long_about = None
)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// acpid event socket
    #[arg(short, long, value_name = "SOCKET")]
    socket: Option<PathBuf>,

    /// acpi_call control file
    #[arg(long, value_name = "PATH")]
    call_path: Option<PathBuf>,

    /// Status method evaluated under the device handle
    #[arg(long, value_name = "METHOD")]
    method: Option<String>,

    /// Print key events instead of creating a uinput device
    #[arg(long)]
    dry_run: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Validate config and exit
    #[arg(long)]
    check_config: bool,

    /// Print the active keymap and exit
    #[arg(long)]
    list_keymap: bool,
}

/// Main application state
#[cfg(feature = "pure-rust")]
struct Application {
    settings: Settings,
    args: Args,
    /// Flag to signal event loop to stop
    running: Arc<AtomicBool>,
}

#[cfg(feature = "pure-rust")]
impl Application {
    /// Create a new application from CLI arguments
    fn new(args: Args) -> Result<Self, Box<dyn std::error::Error>> {
        let mut settings = match args.config {
            Some(ref path) => Settings::from_file(path)?,
            None => Settings::load_default()?,
        };

        // CLI flags take precedence over the config file
        if let Some(ref socket) = args.socket {
            settings.set_socket(socket.clone());
        }
        if let Some(ref call_path) = args.call_path {
            settings.set_call_path(call_path.clone());
        }
        if let Some(ref method) = args.method {
            settings.set_method(method.clone());
        }

        Ok(Self {
            settings,
            args,
            running: Arc::new(AtomicBool::new(true)),
        })
    }

    /// Validate configuration
    fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(path) = self.settings.source_path() {
            println!("Config: {}", path.display());
        }
        println!(
            "Device: {} {} at {} ({})",
            self.settings.identity().class,
            self.settings.identity().name,
            self.settings.device().handle.path(),
            self.settings.device().bus_id
        );
        println!("Keymap entries: {}", self.settings.keymap().len());
        println!("Configuration is valid");
        Ok(())
    }

    /// Print the active keymap
    fn list_keymap(&self) {
        println!("Scancode  Key");
        for entry in self.settings.keymap().entries() {
            println!("  {:#04x}    {} ({})", entry.scancode, entry.key, entry.key.code());
        }
    }

    fn build_driver(&self, backend: Box<dyn InputBackend>) -> TabletButtonDriver {
        let query =
            AcpiCallQuery::new(self.settings.call_path()).with_method(self.settings.method());
        TabletButtonDriver::new(Box::new(query), backend)
            .with_keymap(self.settings.keymap().clone())
            .with_input_config(self.settings.input().clone())
            .with_identity(self.settings.identity().clone())
            .with_notify_code(self.settings.notify_code())
    }

    /// Run the main event loop
    fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        use std::io::{BufRead, BufReader, ErrorKind};
        use std::os::unix::net::UnixStream;

        // Set up signal handler for graceful shutdown
        {
            use signal_hook::iterator::Signals;
            let running = self.running.clone();

            // Spawn a thread to handle signals
            std::thread::spawn(move || {
                if let Ok(mut signals) =
                    Signals::new(&[signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM])
                {
                    if signals.forever().next().is_some() {
                        log::info!("Received signal, shutting down gracefully...");
                        running.store(false, Ordering::SeqCst);
                    }
                }
            });
        }

        let recorder = self.args.dry_run.then(RecordingBackend::new);
        let backend: Box<dyn InputBackend> = match recorder {
            Some(ref recorder) => Box::new(recorder.clone()),
            None => Box::new(UInputBackend::new()),
        };
        let driver = self.build_driver(backend);
        let device = self.settings.device().clone();
        let bus_id = device.bus_id.clone();
        let mut context = driver.add(Some(device))?;

        let stream = UnixStream::connect(self.settings.socket()).map_err(|e| {
            format!(
                "Failed to connect to {}: {}",
                self.settings.socket().display(),
                e
            )
        })?;
        stream.set_read_timeout(Some(POLL_INTERVAL))?;
        let mut reader = BufReader::new(stream);

        log::info!(
            "Listening for {} events on {}",
            bus_id,
            self.settings.socket().display()
        );

        let mut line = String::new();
        let result = loop {
            if !self.running.load(Ordering::SeqCst) {
                break Ok(());
            }

            match reader.read_line(&mut line) {
                Ok(0) => break Err("acpid closed the event socket".into()),
                Ok(_) if !line.ends_with('\n') => continue,
                Ok(_) => {}
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    continue
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => break Err(e.into()),
            }

            match line.parse::<AcpiEvent>() {
                Ok(event) if event.is_for(&bus_id) => {
                    log::debug!("acpid: {}", event);
                    let outcome = driver.handle_notify(&mut context, event.event_type);
                    if let Some(ref recorder) = recorder {
                        for recorded in recorder.drain() {
                            println!("{} {}", recorded.key, recorded.action);
                        }
                    } else if let NotifyOutcome::Reported { key, action } = outcome {
                        log::debug!("Reported {} {}", key, action);
                    }
                }
                Ok(_) => {}
                Err(e) => log::warn!("Skipping acpid line {:?}: {}", line.trim_end(), e),
            }
            line.clear();
        };

        driver.remove(&mut context)?;
        result
    }
}

#[cfg(feature = "pure-rust")]
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

#[cfg(feature = "pure-rust")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.verbose);

    let app = Application::new(args)?;

    if app.args.list_keymap {
        app.list_keymap();
        return Ok(());
    }

    // Handle check-config flag
    if app.args.check_config {
        return app.validate();
    }

    app.run()
}

// Stub for when pure-rust feature is not enabled
#[cfg(not(feature = "pure-rust"))]
fn main() {
    eprintln!("Error: pcc-hbtn binary requires the 'pure-rust' feature to be enabled.");
    eprintln!("Please build with: cargo build --release --features pure-rust --bin pcc-hbtn");
    std::process::exit(1);
}
