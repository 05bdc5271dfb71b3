// Interactive console front-end for the KeyAuth client.
// Holds one `Client` and drives it through its public calls only; all
// prompting, printing and looping lives here.

use anyhow::Result;
use chrono::{Local, TimeZone};
use dialoguer::{Confirm, Input, Password, Select};
use keyauth_client::{Client, ClientOptions, KeyAuthError};
use std::time::Duration;

fn options_from_env() -> ClientOptions {
    let var = |key: &str, fallback: &str| std::env::var(key).unwrap_or_else(|_| fallback.into());

    let mut options = ClientOptions::new(
        &var("KEYAUTH_NAME", "WebTest"),
        &var("KEYAUTH_OWNER_ID", "7hglp2IAKQ"),
        &var("KEYAUTH_VERSION", "1.0"),
    );
    if let Ok(url) = std::env::var("KEYAUTH_URL") {
        options.endpoint = url;
    }
    options.debug = std::env::var("KEYAUTH_DEBUG").is_ok();
    options
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut client = Client::new(options_from_env())?;

    if let Err(err) = run(&mut client).await {
        eprintln!("An error occurred: {}", err);
    }

    Ok(())
}

async fn run(client: &mut Client) -> Result<()> {
    client.init().await?;

    let items = vec!["Login", "Register", "License", "Upgrade"];
    let selection = Select::new()
        .with_prompt("Select an option")
        .items(&items)
        .default(0)
        .interact()?;

    match selection {
        0 => {
            let username: String = Input::new().with_prompt("Username").interact_text()?;
            let password: String = Password::new().with_prompt("Password").interact()?;
            let code: String = Input::new()
                .with_prompt("2FA code (leave empty if disabled)")
                .allow_empty(true)
                .interact_text()?;
            let code = Some(code.trim()).filter(|c| !c.is_empty());
            client.login(&username, &password, code).await?;
        }
        1 => {
            let username: String = Input::new().with_prompt("Username").interact_text()?;
            let password: String = Password::new().with_prompt("Password").interact()?;
            let license: String = Input::new().with_prompt("License").interact_text()?;
            client.register(&username, &password, &license).await?;
        }
        2 => {
            let license: String = Input::new().with_prompt("License").interact_text()?;
            client.license(&license).await?;
        }
        3 => {
            let username: String = Input::new().with_prompt("Username").interact_text()?;
            let license: String = Input::new().with_prompt("License").interact_text()?;
            client.upgrade(&username, &license).await?;
        }
        _ => unreachable!(),
    }

    dashboard(client).await
}

async fn dashboard(client: &mut Client) -> Result<()> {
    client.fetch_stats().await?;

    let app = client.app_data();
    println!("Application data:");
    println!("  App Version: {}", app.app_version);
    println!("  Customer panel: {}", app.customer_panel_link);
    println!("  Number of Keys: {}", app.num_keys);
    println!("  Number of Users: {}", app.num_users);
    println!("  Online Users: {}", app.num_online_users);

    let user = client.user_data();
    println!("\nUser data:");
    println!("  Username: {}", user.username);
    println!("  IP Address: {}", user.ip);
    println!("  Hardware-id: {}", user.hwid);

    let total = user.subscriptions.len();
    for (i, sub) in user.subscriptions.iter().enumerate() {
        println!(
            "[{}/{}] | Subscription: {} - Expiry: {}",
            i + 1,
            total,
            sub.name,
            format_timestamp(sub.expiry)
        );
    }

    println!("Created at: {}", format_timestamp(user.created_at));
    println!("Last Login: {}", format_timestamp(user.last_login));
    println!("Expires: {}", format_timestamp(user.expires_at));

    let panel = app.customer_panel_link.clone();
    if !panel.is_empty()
        && Confirm::new()
            .with_prompt("Open the customer panel in your browser?")
            .default(false)
            .interact()?
    {
        let _ = open::that(&panel);
    }

    two_factor(client).await?;

    println!("Closing app in 10 seconds...");
    tokio::time::sleep(Duration::from_secs(10)).await;

    client.logout().await?;
    Ok(())
}

async fn two_factor(client: &mut Client) -> Result<()> {
    println!("\n2-factor authentication:");
    let items = vec!["Enable", "Disable", "Skip"];
    let selection = Select::new()
        .with_prompt("Select an option")
        .items(&items)
        .default(2)
        .interact()?;

    let result = match selection {
        0 => {
            let setup = client.enable_2fa(None).await?;
            if let Some(secret) = setup["2fa"]["secret_code"].as_str() {
                println!("Add this secret to your authenticator app: {}", secret);
            }
            let code: String = Input::new().with_prompt("2FA code").interact_text()?;
            client.enable_2fa(Some(code.trim())).await
        }
        1 => {
            let code: String = Input::new().with_prompt("2FA code").interact_text()?;
            client.disable_2fa(code.trim()).await
        }
        _ => return Ok(()),
    };

    match result {
        Ok(data) => println!("{}", data["message"].as_str().unwrap_or("Done.")),
        Err(KeyAuthError::Service(message)) => println!("2FA request rejected: {}", message),
        Err(err) => return Err(err.into()),
    }

    Ok(())
}

fn format_timestamp(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| Local.timestamp_opt(secs, 0).single())
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}
