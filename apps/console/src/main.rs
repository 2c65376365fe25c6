//! # TokenizeLocal Console App
//!
//! Numbered-menu REPL over the shared ledger, the console twin of the
//! chat front end.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  stdin ──► menu dispatch ──► handler (role-gated)                      │
//! │                                │                                        │
//! │                  ┌─────────────┼──────────────┐                         │
//! │                  ▼             ▼              ▼                         │
//! │            tokenize-db   tokenize-registry  SessionContext              │
//! │            (ledger)      (company lookup)   (explicit, per run)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The ledger engine never reads or writes the terminal; every prompt,
//! parse, and error message lives here.

mod config;
mod session;

use std::io::{self, Write};

use tracing::info;
use tracing_subscriber::EnvFilter;

use tokenize_core::validation::{validate_positive_amount, validate_tax_id};
use tokenize_core::{
    DividendRate, LedgerError, Money, PlaintextVerifier, TokenAmount,
};
use tokenize_db::{Database, DbConfig, DbError};
use tokenize_registry::{CompanyLookup, HttpRegistryClient};

use crate::config::AppConfig;
use crate::session::{Role, SessionContext};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::load();
    info!(db = %config.database_path, "Configuration loaded");

    let db = Database::new(DbConfig::new(&config.database_path)).await?;
    let registry = HttpRegistryClient::new(&config.registry_url, &config.registry_api_key)?;

    let mut session = SessionContext::new();
    info!(session_id = %session.session_id, "Console session started");

    println!("=== 🌐 TokenizeLocal Console App ===");
    show_help(&session);

    loop {
        let choice = read_line("\nEnter your choice (0-10): ");

        match choice.as_str() {
            "0" => {
                session.reset();
                println!("\n🔄 Session reset. You can start fresh.");
                show_help(&session);
            }
            "1" => login_user(&db, &mut session).await,
            "2" => register_user(&db, &mut session).await,
            "3" => {
                session.role = Some(Role::Company);
                println!("[INFO] You have selected Company Mode.");
                show_help(&session);
            }
            "4" => {
                if session.role == Some(Role::Company) {
                    issue_tokens(&db, &registry).await;
                } else {
                    println!("[ERROR] Please select Company Mode first (command 3).");
                }
            }
            "5" => show_companies(&db).await,
            "6" => buy_tokens(&db, &session).await,
            "7" => show_balance(&db, &session).await,
            "8" => show_help(&session),
            "9" => {
                println!("👋 Exiting TokenizeLocal...");
                break;
            }
            "10" => {
                if session.role == Some(Role::Company) {
                    distribute_dividends(&db).await;
                } else {
                    println!("[ERROR] Please select Company Mode first (command 3).");
                }
            }
            _ => println!("[ERROR] Invalid choice. Enter 0-10."),
        }
    }

    db.close().await;
    Ok(())
}

// =============================================================================
// Help & session
// =============================================================================

fn show_help(session: &SessionContext) {
    match session.role {
        Some(Role::Company) => println!(
            "\n💼 You are in Company Mode.\n\
             \n\
             Available commands:\n\
             4. Issue Tokens\n\
             10. Distribute Dividends\n\
             8. Help\n\
             9. Exit\n\
             \n\
             💡 To restart, enter 0"
        ),
        _ => println!(
            "\n👤 You are in User Mode.\n\
             \n\
             Available commands:\n\
             1. Login as User\n\
             2. Register as User\n\
             3. Switch to Company Mode\n\
             5. List Companies\n\
             6. Buy Tokens\n\
             7. My Balance\n\
             8. Help\n\
             9. Exit\n\
             \n\
             💡 To restart, enter 0"
        ),
    }
}

// =============================================================================
// User commands
// =============================================================================

async fn login_user(db: &Database, session: &mut SessionContext) {
    println!("\n🔐 Login as User");
    let identity = read_line("Enter email: ");
    let secret = read_line("Enter password: ");

    match db
        .users()
        .authenticate(&identity, &secret, &PlaintextVerifier)
        .await
    {
        Ok(true) => {
            session.user = Some(identity.clone());
            session.role = Some(Role::User);
            println!("[INFO] Login successful for {identity}");
            show_help(session);
        }
        Ok(false) => println!("[ERROR] Invalid email or password."),
        Err(err) => println!("[ERROR] {}", render_error(&err)),
    }
}

async fn register_user(db: &Database, session: &mut SessionContext) {
    println!("\n📝 Register New User");
    let name = read_line("Name: ");
    let identity = read_line("Email: ");
    let secret = read_line("Password: ");

    match db.users().register(&name, &identity, &secret).await {
        Ok(()) => {
            session.user = Some(identity);
            session.role = Some(Role::User);
            println!("[INFO] Registration successful! Welcome, {name}!");
            show_help(session);
        }
        Err(err) => println!("[ERROR] {}", render_error(&err)),
    }
}

// =============================================================================
// Company commands
// =============================================================================

async fn issue_tokens(db: &Database, registry: &dyn CompanyLookup) {
    println!("\n🏢 Company Mode");
    let tax_id = read_line("Enter company tax id: ");

    if validate_tax_id(&tax_id).is_err() {
        println!("[ERROR] Invalid tax id format. Must be 10 or 12 digits.");
        return;
    }

    let company = match registry.lookup(&tax_id).await {
        Ok(company) => company,
        Err(err) => {
            println!("[ERROR] Token issuance failed: {err}");
            return;
        }
    };

    // Issuance precondition: only active companies may issue
    if !company.is_active() {
        println!("[ERROR] Company is not active. Status: {}", company.status);
        return;
    }

    println!("[INFO] Company found: {}", company.name);

    let amount = match read_line("How many tokens to issue? ").parse::<TokenAmount>() {
        Ok(amount) if validate_positive_amount(amount).is_ok() => amount,
        _ => {
            println!("[ERROR] Amount must be a positive number.");
            return;
        }
    };

    // Registration and issuance commit together or not at all
    match db.flows().register_and_issue(&tax_id, &company.name, amount).await {
        Ok(()) => println!("[INFO] ✅ Successfully issued {amount} tokens for '{}'", company.name),
        Err(err) => println!("[ERROR] Token issuance failed: {}", render_error(&err)),
    }
}

async fn distribute_dividends(db: &Database) {
    println!("\n💸 Distribute Dividends");
    let tax_id = read_line("Enter company tax id: ");

    if validate_tax_id(&tax_id).is_err() {
        println!("[ERROR] Invalid tax id format. Must be 10 or 12 digits.");
        return;
    }

    let revenue = match read_line("Revenue to distribute from (e.g. 1000.00): ").parse::<Money>() {
        Ok(revenue) if revenue.is_positive() => revenue,
        _ => {
            println!("[ERROR] Revenue must be a positive number.");
            return;
        }
    };

    match db
        .dividends()
        .distribute(&tax_id, revenue, DividendRate::default())
        .await
    {
        Ok(distribution) => {
            println!(
                "[INFO] ✅ Dividends distributed: pool {}, token price {}",
                distribution.event.dividend_pool(),
                distribution.event.token_price()
            );
            for payout in &distribution.payouts {
                println!(
                    "  💸 {} receives {} for {} tokens",
                    payout.owner,
                    payout.payout(),
                    payout.balance()
                );
            }
        }
        Err(err) => println!("[ERROR] Distribution failed: {}", render_error(&err)),
    }
}

// =============================================================================
// Browsing & purchases
// =============================================================================

async fn show_companies(db: &Database) {
    println!("\n📋 Available Companies:");
    match db.issuances().list_all().await {
        Ok(companies) if companies.is_empty() => println!("No companies available."),
        Ok(companies) => {
            for (idx, company) in companies.iter().enumerate() {
                println!(
                    "{}. {} (tax id: {}) — Tokens available: {}",
                    idx + 1,
                    company.name,
                    company.tax_id,
                    company.available()
                );
            }
        }
        Err(err) => println!("[ERROR] {}", render_error(&err)),
    }
}

async fn buy_tokens(db: &Database, session: &SessionContext) {
    let Some(user) = session.user.as_deref() else {
        println!("[ERROR] Please log in as a user first.");
        return;
    };

    println!("\n🛒 Buy Tokens");
    show_companies(db).await;
    let choice = read_line("Choose company number: ");
    let amount_input = read_line("How many tokens to buy? ");

    let Ok(company_num) = choice.parse::<usize>() else {
        println!("[ERROR] Input error: company number must be a positive integer.");
        return;
    };
    let amount = match amount_input.parse::<TokenAmount>() {
        Ok(amount) if validate_positive_amount(amount).is_ok() => amount,
        _ => {
            println!("[ERROR] Input error: amount must be a positive number.");
            return;
        }
    };

    let companies = match db.issuances().list_all().await {
        Ok(companies) => companies,
        Err(err) => {
            println!("[ERROR] {}", render_error(&err));
            return;
        }
    };

    if company_num == 0 || company_num > companies.len() {
        println!("[ERROR] Input error: no such company.");
        return;
    }
    let company = &companies[company_num - 1];

    if amount > company.available() {
        println!(
            "[ERROR] Input error: not enough tokens. Available: {}",
            company.available()
        );
        return;
    }

    // Deduct-from-supply and credit-holding commit together or not at all
    match db.flows().purchase(user, &company.tax_id, amount).await {
        Ok(balance) => {
            println!("\n✅ Successfully bought {amount} tokens of '{}'", company.name);
            println!("Your current balance: {balance} tokens");
        }
        Err(err) => println!("[ERROR] {}", render_error(&err)),
    }
}

async fn show_balance(db: &Database, session: &SessionContext) {
    let Some(user) = session.user.as_deref() else {
        println!("[ERROR] Please log in first.");
        return;
    };

    println!("\n💰 Your Balance:");
    match db.holdings().holdings_of(user).await {
        Ok(holdings) if holdings.is_empty() => println!("You have no tokens yet."),
        Ok(holdings) => {
            for holding in holdings {
                println!("- {}: {} tokens", holding.name, holding.balance());
            }
        }
        Err(err) => println!("[ERROR] {}", render_error(&err)),
    }
}

// =============================================================================
// Rendering & input
// =============================================================================

/// Maps error kinds to user-facing messages. Matching happens on the
/// kind, never on message content.
fn render_error(err: &DbError) -> String {
    match err {
        DbError::Ledger(LedgerError::InvalidOperation(context)) => {
            format!("Operation rejected: {context}.")
        }
        DbError::Ledger(LedgerError::InsufficientSupply { remaining }) => {
            format!("Insufficient tokens to deduct. Remaining: {remaining}.")
        }
        DbError::Ledger(LedgerError::NoTokensIssued { tax_id }) => {
            format!("Company {tax_id} has not issued tokens.")
        }
        DbError::Ledger(LedgerError::AlreadyExists { .. }) => {
            "User with this email already exists.".to_string()
        }
        DbError::Ledger(LedgerError::InvalidIdentity { .. }) => {
            "Invalid email format.".to_string()
        }
        DbError::Ledger(LedgerError::NotFound { tax_id }) => {
            format!("Company {tax_id} not found or no tokens issued.")
        }
        DbError::Ledger(LedgerError::Validation(validation)) => validation.to_string(),
        other => format!("Unexpected storage error: {other}"),
    }
}

/// Prompts and reads one trimmed line from stdin.
fn read_line(prompt: &str) -> String {
    print!("{prompt}");
    let _ = io::stdout().flush();

    let mut line = String::new();
    if io::stdin().read_line(&mut line).is_err() {
        return String::new();
    }
    line.trim().to_string()
}
