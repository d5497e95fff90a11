//! TT Downloader Bot - CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use tt_downloader_bot::{
    bot::Bot,
    cli::Args,
    config::{validate_config, Config, ProfileStore, ServerProfile},
    error::{exit_codes, Error, Result},
    fs::ensure_dir,
    output::{print_banner, print_config_summary, print_error, print_info, print_success, print_warning},
    session::LocalSession,
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            match e {
                Error::Config(_)
                | Error::ConfigValidation { .. }
                | Error::MissingConfig(_)
                | Error::Profile(_)
                | Error::TomlParse(_) => ExitCode::from(exit_codes::CONFIG_ERROR as u8),
                e if e.is_session_error() => ExitCode::from(exit_codes::SESSION_ERROR as u8),
                _ => ExitCode::from(exit_codes::UNEXPECTED_ERROR as u8),
            }
        }
    }
}

async fn run() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt().with_env_filter(filter).with_target(false).init();

    let store = ProfileStore::new(
        args.profiles_dir
            .clone()
            .unwrap_or_else(ProfileStore::default_location),
    );

    // Profile housekeeping commands exit right away
    if args.list_profiles {
        let names = store.list()?;
        if names.is_empty() {
            print_info(&format!("No saved profiles in {}", store.root().display()));
        }
        for name in names {
            println!("{}", name);
        }
        return Ok(());
    }

    if let Some(name) = &args.delete_profile {
        if store.delete_server(name)? {
            print_success(&format!("Deleted profile: {}", name));
        } else {
            print_warning(&format!("Profile not found: {}", name));
        }
        return Ok(());
    }

    // Print banner
    print_banner();

    // Load configuration
    let config_path = args.config.clone();
    let mut config = if config_path.exists() {
        Config::load(&config_path)?
    } else {
        print_warning(&format!(
            "Configuration file not found: {}",
            config_path.display()
        ));
        print_info("Using default configuration with CLI arguments");
        Config::default()
    };

    // Apply a saved profile before CLI overrides
    if let Some(name) = &args.profile {
        let profile = store
            .load_server(name)?
            .ok_or_else(|| Error::Profile(format!("Server profile not found: {}", name)))?;
        let channels = store.load_channels(name)?;
        profile.apply_to(&mut config, channels);
        print_info(&format!("Loaded profile: {}", profile.name));
    }

    let save_profile = args.save_profile.clone();
    let mirror = args.mirror.clone();
    let write_config = args.write_config.clone();

    // Merge CLI arguments into config
    args.merge_into_config(&mut config);

    if mirror.is_some() && config.server.host.trim().is_empty() {
        config.server.host = "localhost".to_string();
    }

    // Validate configuration
    validate_config(&config)?;

    if let Some(name) = save_profile {
        store.save_server(&ServerProfile::from_config(&name, &config))?;
        store.save_channels(&name, &config.channels)?;
        print_success(&format!("Saved profile: {}", name));
    }

    if let Some(path) = write_config {
        config.save(&path)?;
        print_success(&format!("Wrote configuration to {}", path.display()));
        return Ok(());
    }

    // Print configuration summary
    print_config_summary(
        &format!("{}:{}", config.server.host, config.server.tcp_port),
        &config.base_channel.path,
        &config.options.channel_mode.to_string(),
        &config.output_dir().display().to_string(),
    );

    let Some(mirror) = mirror else {
        return Err(Error::Config(
            "No server backend is built in; use --mirror <DIR> to serve a local directory"
                .to_string(),
        ));
    };

    print_info(&format!("Serving {} as the server", mirror.display()));
    let (session, events) = LocalSession::new(mirror);
    ensure_dir(&config.output_dir())?;
    session.check_output_dir(&config.output_dir())?;
    let mut bot = Bot::new(session, events, &config);
    bot.run().await
}
