//! `stores` subcommands.

use clap::Subcommand;

use magdash_core::{NewMagentoConnection, StoreUpdate};
use magdash_db::HostedClient;

#[derive(Debug, Subcommand)]
pub enum StoreCommands {
    /// List the stores a user has connected
    List {
        user_id: String,
    },
    /// List a user's Magento connections
    Connections {
        user_id: String,
        /// Only active connections
        #[arg(long)]
        active: bool,
    },
    /// Create a store
    Create {
        name: String,
        #[arg(long)]
        url: Option<String>,
    },
    /// Rename a store or change its URL
    Update {
        store_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        url: Option<String>,
    },
    /// Delete a store and all of its synced data
    Delete {
        store_id: String,
    },
    /// Register a Magento connection for a user
    Connect {
        user_id: String,
        #[arg(long)]
        store_id: Option<String>,
        #[arg(long)]
        name: String,
        #[arg(long)]
        url: String,
        /// Magento integration access token
        #[arg(long, env = "MAGDASH_MAGENTO_TOKEN", hide_env_values = true)]
        token: String,
    },
    /// Remove a Magento connection
    Disconnect {
        connection_id: String,
    },
    /// List order statuses known to the backend
    Statuses,
}

pub(crate) async fn run(client: &HostedClient, command: StoreCommands) -> anyhow::Result<()> {
    match command {
        StoreCommands::List { user_id } => {
            let stores = magdash_db::get_stores_for_user(client, &user_id).await?;
            if stores.is_empty() {
                println!("user {user_id} has no connected stores");
                return Ok(());
            }
            println!("{:<38}{:<30}URL", "ID", "NAME");
            for store in &stores {
                println!(
                    "{:<38}{:<30}{}",
                    store.id,
                    store.name,
                    store.url.as_deref().unwrap_or("\u{2014}")
                );
            }
        }
        StoreCommands::Connections { user_id, active } => {
            let connections = if active {
                magdash_db::fetch_active_magento_connections(client, &user_id).await?
            } else {
                magdash_db::fetch_magento_connections(client, &user_id).await?
            };
            println!("{:<38}{:<10}{:<30}URL", "ID", "STATUS", "NAME");
            for c in &connections {
                println!("{:<38}{:<10}{:<30}{}", c.id, c.status, c.store_name, c.store_url);
            }
        }
        StoreCommands::Create { name, url } => {
            let store = magdash_db::create_store(client, &name, url.as_deref()).await?;
            println!("created store {} ({})", store.name, store.id);
        }
        StoreCommands::Update {
            store_id,
            name,
            url,
        } => {
            if name.is_none() && url.is_none() {
                anyhow::bail!("nothing to update; pass --name and/or --url");
            }
            let store =
                magdash_db::update_store(client, &store_id, &StoreUpdate { name, url }).await?;
            println!("updated store {} ({})", store.name, store.id);
        }
        StoreCommands::Delete { store_id } => {
            magdash_db::delete_store(client, &store_id).await?;
            println!("deleted store {store_id}");
        }
        StoreCommands::Connect {
            user_id,
            store_id,
            name,
            url,
            token,
        } => {
            let connection = magdash_db::add_magento_connection(
                client,
                &NewMagentoConnection {
                    user_id,
                    store_id,
                    store_name: name,
                    store_url: url,
                    access_token: token,
                    status: "pending".to_string(),
                },
            )
            .await?;
            println!("added connection {} for {}", connection.id, connection.store_url);
        }
        StoreCommands::Disconnect { connection_id } => {
            magdash_db::delete_magento_connection(client, &connection_id).await?;
            println!("removed connection {connection_id}");
        }
        StoreCommands::Statuses => {
            for status in magdash_db::fetch_order_statuses(client).await {
                println!("{status}");
            }
        }
    }
    Ok(())
}
