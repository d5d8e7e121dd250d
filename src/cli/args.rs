use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use sora_admin::core::models::{ConfigUpdate, KeyDraft, KeyPatch};

#[derive(Parser, Debug)]
#[command(author, version, about = "Admin console for a Sora API gateway", long_about = None)]
pub struct Args {
    /// Backend address; saved for later runs
    #[arg(long, env = "SORA_ADMIN_URL", global = true)]
    pub base_url: Option<String>,

    #[arg(short, long, env = "SORA_ADMIN_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Exchange the admin key for a session token
    Login {
        /// Prompted for when omitted
        #[arg(long, env = "SORA_ADMIN_KEY", hide_env_values = true)]
        admin_key: Option<String>,
    },
    Logout,
    /// Show the local session
    Status,
    /// Key counts, usage and recently added keys
    Dashboard,
    #[command(subcommand)]
    Keys(KeysCmd),
    #[command(subcommand)]
    Config(ConfigCmd),
    /// Usage statistics
    Stats,
}

#[derive(Subcommand, Debug)]
pub enum KeysCmd {
    List {
        /// Filter by name or key, case-insensitive
        #[arg(short, long, default_value = "")]
        search: String,
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },
    Show {
        id: String,
    },
    Add(AddKeyArgs),
    Update(UpdateKeyArgs),
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Check a key against the upstream service
    Test {
        key: String,
        #[arg(long, default_value = "")]
        name: String,
    },
    Enable {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    Disable {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    RemoveMany {
        #[arg(required = true)]
        ids: Vec<String>,
        #[arg(short, long)]
        yes: bool,
    },
    /// Import keys, one per line: `key` or `name,key[,weight[,rate_limit]]`
    Import {
        /// Read from stdin when omitted
        file: Option<PathBuf>,
        /// Import the keys disabled
        #[arg(long)]
        disabled: bool,
        /// Only show what would be imported
        #[arg(long)]
        preview: bool,
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(ClapArgs, Debug)]
pub struct AddKeyArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub key: String,
    #[arg(long, default_value_t = 1)]
    pub weight: i64,
    #[arg(long, default_value_t = 60)]
    pub rate_limit: i64,
    #[arg(long)]
    pub disabled: bool,
    #[arg(long)]
    pub notes: Option<String>,
}

impl From<AddKeyArgs> for KeyDraft {
    fn from(args: AddKeyArgs) -> Self {
        Self {
            name: args.name,
            key_value: args.key,
            weight: args.weight,
            rate_limit: args.rate_limit,
            is_enabled: !args.disabled,
            notes: args.notes,
        }
    }
}

#[derive(ClapArgs, Debug)]
pub struct UpdateKeyArgs {
    pub id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub key: Option<String>,
    #[arg(long)]
    pub weight: Option<i64>,
    #[arg(long)]
    pub rate_limit: Option<i64>,
    #[arg(long)]
    pub enabled: Option<bool>,
    #[arg(long)]
    pub notes: Option<String>,
}

impl UpdateKeyArgs {
    pub fn into_parts(self) -> (String, KeyPatch) {
        let patch = KeyPatch {
            name: self.name,
            key_value: self.key,
            weight: self.weight,
            rate_limit: self.rate_limit,
            is_enabled: self.enabled,
            notes: self.notes,
        };
        (self.id, patch)
    }
}

#[derive(Subcommand, Debug)]
pub enum ConfigCmd {
    Show,
    Set(SetConfigArgs),
}

#[derive(ClapArgs, Debug)]
pub struct SetConfigArgs {
    #[arg(long)]
    pub proxy_host: Option<String>,
    #[arg(long)]
    pub proxy_port: Option<String>,
    #[arg(long)]
    pub proxy_user: Option<String>,
    /// Left unchanged when empty
    #[arg(long)]
    pub proxy_pass: Option<String>,
    /// Public base URL the gateway advertises
    #[arg(long)]
    pub server_base_url: Option<String>,
    #[arg(long)]
    pub image_localization: Option<bool>,
    #[arg(long)]
    pub image_save_dir: Option<String>,
    /// Apply without writing the server's .env file
    #[arg(long)]
    pub no_persist: bool,
}

impl From<SetConfigArgs> for ConfigUpdate {
    fn from(args: SetConfigArgs) -> Self {
        ConfigUpdate {
            proxy_host: args.proxy_host,
            proxy_port: args.proxy_port,
            proxy_user: args.proxy_user,
            proxy_pass: None,
            base_url: args.server_base_url,
            image_localization: args.image_localization,
            image_save_dir: args.image_save_dir,
            save_to_env: !args.no_persist,
        }
        .with_proxy_pass(args.proxy_pass)
    }
}
