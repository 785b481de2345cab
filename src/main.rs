use anyhow::Result;
use clap::{Parser, Subcommand};
use futures::TryStreamExt;
use msgraph_directory::config::{Config, ProcessEnv};
use msgraph_directory::domain::{parse_skus, Invitation, User, UserQuery};
use msgraph_directory::registry::{ProviderRegistry, MSGRAPH_DRIVER};
use msgraph_directory::service::{GroupManager, InviteManager, LicenseManager, UserManager};
use msgraph_directory::{telemetry, DirectoryService};
use serde::Serialize;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "msgraph-directory", version, about = "Directory administration over Microsoft Graph")]
struct Cli {
    /// Directory driver to use
    #[arg(long, default_value = MSGRAPH_DRIVER)]
    driver: String,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    User {
        #[command(subcommand)]
        cmd: UserCommand,
    },
    Group {
        #[command(subcommand)]
        cmd: GroupCommand,
    },
    License {
        #[command(subcommand)]
        cmd: LicenseCommand,
    },
    /// Invite an external user
    Invite {
        #[arg(long)]
        email: String,
        #[arg(long)]
        display_name: String,
        #[arg(long)]
        redirect_url: String,
        #[arg(long)]
        send_email: bool,
    },
}

#[derive(Subcommand)]
enum UserCommand {
    /// Get a user by object id or UPN
    Get { id: String },
    FindByEmail { email: String },
    Exists { name: String },
    List {
        /// OData filter expression
        #[arg(long)]
        filter: Option<String>,
    },
    Create {
        #[arg(long)]
        upn: String,
        #[arg(long)]
        display_name: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        enabled: bool,
    },
    Enable { id: String },
    Disable { id: String },
    Delete { id: String },
    Groups { id: String },
    /// Bind a certificate for certificate-based MFA
    BindCert {
        id: String,
        cert_id: String,
        /// Drop existing certificate bindings
        #[arg(long)]
        replace: bool,
    },
}

#[derive(Subcommand)]
enum GroupCommand {
    List,
    Get { id: String },
    Find { name: String },
    Create { name: String },
    Rename { id: String, name: String },
    Delete { id: String },
    Members { id: String },
    AddMembers {
        id: String,
        #[arg(required = true)]
        user_ids: Vec<String>,
    },
    RemoveMembers {
        id: String,
        #[arg(required = true)]
        user_ids: Vec<String>,
    },
}

#[derive(Subcommand)]
enum LicenseCommand {
    List,
    /// SKUs assigned to a user
    User { id: String },
    /// Users holding a SKU
    Users { sku: String },
    /// Make the user's licenses exactly the given SKUs
    Set { id: String, skus: Vec<String> },
    Assign {
        id: String,
        #[arg(long)]
        add: Vec<String>,
        #[arg(long)]
        remove: Vec<String>,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = Config::from_env()?;
    telemetry::init(&config.telemetry);

    let directory = ProviderRegistry::with_defaults()
        .create(&cli.driver, &ProcessEnv)
        .await?;

    match cli.cmd {
        Command::User { cmd } => run_user(cmd, directory).await,
        Command::Group { cmd } => run_group(cmd, directory).await,
        Command::License { cmd } => run_license(cmd, directory).await,
        Command::Invite {
            email,
            display_name,
            redirect_url,
            send_email,
        } => {
            let invitation = Invitation {
                email,
                display_name,
                redirect_url,
                send_email,
            };
            InviteManager::new(directory)
                .create_invitation(&invitation)
                .await?;
            Ok(())
        }
    }
}

async fn run_user(cmd: UserCommand, directory: Arc<dyn DirectoryService>) -> Result<()> {
    let users = UserManager::new(directory);
    match cmd {
        UserCommand::Get { id } => print_json(&users.get_user(&id).await?),
        UserCommand::FindByEmail { email } => print_json(&users.get_user_by_email(&email).await?),
        UserCommand::Exists { name } => print_json(&users.user_exists(&name).await?),
        UserCommand::List { filter } => {
            let query = filter.map(UserQuery::filtered).unwrap_or_default();
            let all: Vec<User> = users.list_users(query).try_collect().await?;
            print_json(&all)
        }
        UserCommand::Create {
            upn,
            display_name,
            first_name,
            last_name,
            email,
            password,
            enabled,
        } => {
            let mut user = User::new(upn, display_name);
            user.first_name = first_name.unwrap_or_default();
            user.last_name = last_name.unwrap_or_default();
            user.email = email.unwrap_or_default();
            user.password = password.unwrap_or_default();
            user.must_change_password = !user.password.is_empty();
            user.enabled = enabled;
            print_json(&users.create_user(&user).await?)
        }
        UserCommand::Enable { id } => Ok(users.enable_user(&id).await?),
        UserCommand::Disable { id } => Ok(users.disable_user(&id).await?),
        UserCommand::Delete { id } => Ok(users.delete_user(&id).await?),
        UserCommand::Groups { id } => {
            let groups: Vec<_> = users.get_user_groups(&id).try_collect().await?;
            print_json(&groups)
        }
        UserCommand::BindCert {
            id,
            cert_id,
            replace,
        } => Ok(users
            .associate_certificate_mfa(&id, &cert_id, replace)
            .await?),
    }
}

async fn run_group(cmd: GroupCommand, directory: Arc<dyn DirectoryService>) -> Result<()> {
    let groups = GroupManager::new(directory);
    match cmd {
        GroupCommand::List => {
            let all: Vec<_> = groups.list_groups().try_collect().await?;
            print_json(&all)
        }
        GroupCommand::Get { id } => print_json(&groups.get_group(&id).await?),
        GroupCommand::Find { name } => print_json(&groups.find_group_by_name(&name).await?),
        GroupCommand::Create { name } => print_json(&groups.create_group(&name).await?),
        GroupCommand::Rename { id, name } => Ok(groups.rename_group(&id, &name).await?),
        GroupCommand::Delete { id } => Ok(groups.delete_group(&id).await?),
        GroupCommand::Members { id } => {
            let members: Vec<_> = groups.get_group_members(&id).try_collect().await?;
            print_json(&members)
        }
        GroupCommand::AddMembers { id, user_ids } => Ok(groups.add_members(&id, &user_ids).await?),
        GroupCommand::RemoveMembers { id, user_ids } => {
            Ok(groups.remove_members(&id, &user_ids).await?)
        }
    }
}

async fn run_license(cmd: LicenseCommand, directory: Arc<dyn DirectoryService>) -> Result<()> {
    let licenses = LicenseManager::new(directory);
    match cmd {
        LicenseCommand::List => print_json(&licenses.list_licenses().await?),
        LicenseCommand::User { id } => print_json(&licenses.get_user_licenses(&id).await?),
        LicenseCommand::Users { sku } => {
            let sku = parse_skus(&[sku])?[0];
            let holders: Vec<_> = licenses.get_assigned(sku).try_collect().await?;
            print_json(&holders)
        }
        LicenseCommand::Set { id, skus } => {
            print_json(&licenses.set_licenses(&id, &parse_skus(&skus)?).await?)
        }
        LicenseCommand::Assign { id, add, remove } => print_json(
            &licenses
                .assign_licenses(&id, &parse_skus(&add)?, &parse_skus(&remove)?)
                .await?,
        ),
    }
}
