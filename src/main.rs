//! focusdeck - dashboard timer daemon and CLI
//!
//! One daemon owns the shared timer:
//! - Stopwatch and countdown sessions
//! - Pomodoro cycling (25 min work, 5/15 min breaks)
//! - Independent multi-timers with completion notifications

use anyhow::Result;
use clap::{CommandFactory, Parser};

use focusdeck::cli::{
    Cli, Commands, DaemonArgs, Display, IpcClient, MultiCommand, PresetCommand,
};
use focusdeck::config::ServiceConfig;
use focusdeck::daemon::run_daemon;

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Daemon(args) => {
            let config = daemon_config(&args, cli.socket)?;
            run_daemon(config).await?;
        }
        Commands::Completions { shell } => {
            generate_completions(shell);
        }
        Commands::Start(args) => {
            args.validate().map_err(anyhow::Error::msg)?;
            let client = IpcClient::from_option(cli.socket)?;
            let response = client.start(&args).await?;
            Display::show_timer_result(&response);
        }
        Commands::Pause => {
            let response = IpcClient::from_option(cli.socket)?.pause().await?;
            Display::show_timer_result(&response);
        }
        Commands::Resume => {
            let response = IpcClient::from_option(cli.socket)?.resume().await?;
            Display::show_timer_result(&response);
        }
        Commands::Stop => {
            let response = IpcClient::from_option(cli.socket)?.stop().await?;
            Display::show_message(&response);
        }
        Commands::Reset => {
            let response = IpcClient::from_option(cli.socket)?.reset().await?;
            Display::show_timer_result(&response);
        }
        Commands::Status => {
            let response = IpcClient::from_option(cli.socket)?.status().await?;
            Display::show_status(&response);
        }
        Commands::Lap => {
            let response = IpcClient::from_option(cli.socket)?.lap().await?;
            Display::show_status(&response);
        }
        Commands::Show => {
            let response = IpcClient::from_option(cli.socket)?.set_visible(true).await?;
            Display::show_message(&response);
        }
        Commands::Hide => {
            let response = IpcClient::from_option(cli.socket)?.set_visible(false).await?;
            Display::show_message(&response);
        }
        Commands::Watch => {
            let client = IpcClient::from_option(cli.socket)?;
            client.watch(Display::show_watch_line).await?;
            println!();
        }
        Commands::Multi { action } => {
            let client = IpcClient::from_option(cli.socket)?;
            let response = match action {
                MultiCommand::Add { name, time } => client.multi_add(name.as_deref(), time).await?,
                MultiCommand::List => client.multi_list().await?,
                MultiCommand::Toggle { id } => client.multi_toggle(&id).await?,
                MultiCommand::Reset { id } => client.multi_reset(&id).await?,
                MultiCommand::Remove { id } => client.multi_remove(&id).await?,
            };
            Display::show_timers(&response);
        }
        Commands::Preset { action } => {
            let client = IpcClient::from_option(cli.socket)?;
            match action {
                PresetCommand::List => Display::show_presets(&client.preset_list().await?),
                PresetCommand::Add { name, time, sound } => {
                    Display::show_presets(&client.preset_add(&name, time, sound).await?)
                }
                PresetCommand::Remove { id } => {
                    Display::show_presets(&client.preset_remove(&id).await?)
                }
                PresetCommand::Use { id } => {
                    Display::show_timer_result(&client.preset_apply(&id).await?)
                }
            }
        }
        Commands::Sound(args) => {
            let response = IpcClient::from_option(cli.socket)?.set_sound(&args).await?;
            Display::show_sound(&response);
        }
    }

    Ok(())
}

/// Loads the daemon configuration and applies command-line overrides.
fn daemon_config(args: &DaemonArgs, socket: Option<std::path::PathBuf>) -> Result<ServiceConfig> {
    let mut config = ServiceConfig::load(args.config.as_deref())?;

    if socket.is_some() {
        config.socket_path = socket;
    }
    if args.no_sound {
        config.sound_enabled = false;
    }
    if args.no_notifications {
        config.notifications = false;
    }
    if let Some(sound_type) = args.sound {
        config.sound.sound_type = sound_type;
    }
    if let Some(volume) = args.volume {
        config.sound.volume = volume;
    }

    config.validate().map_err(anyhow::Error::msg)?;
    Ok(config)
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use focusdeck::types::SoundType;

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::parse_from(["focusdeck"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_daemon_config_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        std::fs::write(&config_path, r#"{"sound": {"soundType": "bell"}}"#).unwrap();

        let args = DaemonArgs {
            config: Some(config_path),
            no_sound: true,
            no_notifications: true,
            sound: None,
            volume: Some(0.2),
        };
        let socket = dir.path().join("d.sock");
        let config = daemon_config(&args, Some(socket.clone())).unwrap();

        assert_eq!(config.sound.sound_type, SoundType::Bell);
        assert_eq!(config.sound.volume, 0.2);
        assert!(!config.sound_enabled);
        assert!(!config.notifications);
        assert_eq!(config.socket_path, Some(socket));
    }

    #[test]
    fn test_daemon_config_sound_flag_wins() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        std::fs::write(&config_path, r#"{"sound": {"soundType": "bell"}}"#).unwrap();

        let args = DaemonArgs {
            config: Some(config_path),
            sound: Some(SoundType::Chime),
            ..DaemonArgs::default()
        };
        let config = daemon_config(&args, None).unwrap();
        assert_eq!(config.sound.sound_type, SoundType::Chime);
    }
}
