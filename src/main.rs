use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use nowplaying_proxy::{cli, config, error, warning};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP proxy
    Serve(ServeOptions),

    /// Manage the Spotify refresh token on record
    #[command(subcommand)]
    RefreshToken(RefreshTokenSubcommand),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct ServeOptions {
    /// Address to bind, overrides SERVER_ADDRESS (e.g. 0.0.0.0:8787)
    #[clap(long)]
    pub addr: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum RefreshTokenSubcommand {
    /// Store a refresh token in the configured KV backend
    Set(RefreshTokenSetOpts),

    /// Exchange the stored refresh token once to verify it
    Check,
}

#[derive(Parser, Debug, Clone)]
pub struct RefreshTokenSetOpts {
    /// The refresh token obtained from Spotify's authorization flow
    pub token: String,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Command::Completions(opt) = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }

    if let Err(e) = config::load_env().await {
        warning!("Cannot load .env file, using process environment only. Err: {}", e);
    }

    let mut config = match config::Config::from_env() {
        Ok(config) => config,
        Err(e) => error!("Invalid configuration: {}", e),
    };

    let result = match cli.command {
        Command::Serve(opt) => {
            if let Some(addr) = opt.addr {
                config.server_addr = addr;
            }
            cli::serve(config).await
        }
        Command::RefreshToken(RefreshTokenSubcommand::Set(opt)) => {
            cli::set_refresh_token(config, opt.token).await
        }
        Command::RefreshToken(RefreshTokenSubcommand::Check) => {
            cli::check_refresh_token(config).await
        }
        Command::Completions(_) => Ok(()),
    };

    if let Err(e) = result {
        error!("{}", e);
    }
}
