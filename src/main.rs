use std::process;

use clap::Parser;

use mazegaki::core::{
    format_output_path, print_error_message, print_info_message, translate_target, write_output,
    TranslateOptions,
};
use mazegaki::env::init_tracing;
use mazegaki::translation::{
    constants, generate_example_config, load_translation_config, ConfigManager, RunOutcome,
    TranslationConfig,
};

/// Sprinkle English translations into a Japanese web page
#[derive(Parser, Debug)]
#[command(name = "mazegaki", author, version, about, long_about = None)]
struct Cli {
    /// URL or path of the page to translate
    #[arg(required_unless_present_any = ["init_config", "save_settings"])]
    target: Option<String>,

    /// Gemini API key (overrides MAZEGAKI_API_KEY and the config file)
    #[arg(short = 'k', long)]
    api_key: Option<String>,

    /// Percentage of eligible Japanese text to translate
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=100))]
    ratio: Option<u8>,

    /// Write output to <FILE>, use - for STDOUT (supports %title% and %timestamp%)
    #[arg(short, long, default_value = "-")]
    output: String,

    /// Seed for the node sampler
    #[arg(long)]
    seed: Option<u64>,

    /// Exclude timestamp and source information
    #[arg(short = 'M', long)]
    no_metadata: bool,

    /// Force document charset
    #[arg(short, long)]
    encoding: Option<String>,

    /// Suppress verbosity
    #[arg(short, long)]
    silent: bool,

    /// Read configuration from <FILE>
    #[arg(short, long)]
    config: Option<String>,

    /// Allow invalid X.509 (TLS) certificates
    #[arg(short = 'I', long)]
    insecure: bool,

    /// Page download timeout in seconds, 0 uses the configured value
    #[arg(short, long, default_value_t = 0)]
    timeout: u64,

    /// Set custom User-Agent string
    #[arg(short, long)]
    user_agent: Option<String>,

    /// Save the API key and ratio as user settings
    #[arg(long)]
    save_settings: bool,

    /// Write an example configuration file to <PATH> and exit
    #[arg(long, value_name = "PATH")]
    init_config: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.silent);

    if let Some(path) = &cli.init_config {
        if let Err(e) = generate_example_config(path) {
            print_error_message(&e.to_string());
            process::exit(1);
        }
        if !cli.silent {
            print_info_message(&format!("Example configuration written to {}", path));
        }
        return;
    }

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(message) => {
            print_error_message(&message);
            process::exit(1);
        }
    };

    let options = TranslateOptions {
        api_key: cli.api_key.clone(),
        ratio: cli.ratio,
        seed: cli.seed,
        encoding: cli.encoding.clone(),
        insecure: cli.insecure,
        no_metadata: cli.no_metadata,
        silent: cli.silent,
        timeout: cli.timeout,
        user_agent: cli.user_agent.clone(),
    };
    let settings = options.run_settings(&config);

    let Some(credential) = settings.credential() else {
        if let Some(message) = RunOutcome::MissingCredential.user_message() {
            print_error_message(message);
        }
        print_error_message("Provide --api-key or set MAZEGAKI_API_KEY");
        process::exit(1);
    };

    if cli.save_settings {
        if let Err(e) =
            ConfigManager::save_settings(constants::USER_CONFIG_PATH, credential, settings.ratio)
        {
            print_error_message(&e.to_string());
            process::exit(1);
        }
        if !cli.silent {
            print_info_message(&format!("Settings saved to {}", constants::USER_CONFIG_PATH));
        }
    }

    let Some(target) = cli.target.as_deref() else {
        return;
    };

    let document = match translate_target(target, &config, &options).await {
        Ok(document) => document,
        Err(e) => {
            print_error_message(&e.to_string());
            process::exit(1);
        }
    };

    if !cli.silent {
        if let Some(message) = document.outcome.user_message() {
            print_info_message(message);
        }
    }

    let destination = format_output_path(&cli.output, document.title.as_deref());
    if let Err(e) = write_output(&destination, &document.data) {
        print_error_message(&e.to_string());
        process::exit(1);
    }
}

fn load_config(path: Option<&str>) -> Result<TranslationConfig, String> {
    match path {
        Some(path) => ConfigManager::from_file(path)
            .map(ConfigManager::into_config)
            .map_err(|e| e.to_string()),
        None => Ok(load_translation_config()),
    }
}
