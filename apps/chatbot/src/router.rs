//! # Chat Command Router
//!
//! Session-keyed dispatch of chat commands over the shared ledger.
//!
//! ## Session State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  /start ──► awaiting role ──► "1"/"2" ──► role = User | Company        │
//! │                                                                         │
//! │  /register ──► awaiting "name email password" ──► users.register       │
//! │  /login    ──► awaiting "email password"      ──► users.authenticate   │
//! │  /issue_tokens ──► awaiting tax id ──► registry lookup + active gate   │
//! │                        └──► awaiting amount ──► flows.register_and_issue│
//! │  /buy ──► company list + awaiting "NUMBER AMOUNT" ──► flows.purchase   │
//! │                                                                         │
//! │  Each chat user gets an explicit ChatSession value keyed by their      │
//! │  chat id: created on first contact, reset by /start, never persisted.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The router is pure request/reply: every inbound line maps to exactly
//! one reply string, so any chat transport (or a test) can drive it.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use tokenize_core::validation::{validate_positive_amount, validate_tax_id};
use tokenize_core::{LedgerError, PlaintextVerifier, TokenAmount};
use tokenize_db::{Database, DbError};
use tokenize_registry::CompanyLookup;

/// Role a chat user is acting in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    User,
    Company,
}

/// Pending multi-message interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Awaiting {
    RoleSelection,
    Register,
    Login,
    TaxId,
    /// Carries the verified (tax_id, company_name) pair.
    TokenAmount(String, String),
    Purchase,
}

/// Per-chat-user session state.
#[derive(Debug, Clone, Default)]
struct ChatSession {
    role: Option<Role>,
    awaiting: Option<Awaiting>,
}

/// Routes chat messages to ledger operations.
pub struct ChatRouter {
    db: Database,
    registry: Arc<dyn CompanyLookup>,
    sessions: HashMap<i64, ChatSession>,
}

impl ChatRouter {
    /// Creates a router over the shared ledger and registry client.
    pub fn new(db: Database, registry: Arc<dyn CompanyLookup>) -> Self {
        ChatRouter {
            db,
            registry,
            sessions: HashMap::new(),
        }
    }

    /// The ledger identity synthesized for a chat user.
    pub fn chat_identity(user_id: i64) -> String {
        format!("{user_id}@chat.local")
    }

    /// Handles one inbound message and returns the reply.
    pub async fn handle(&mut self, user_id: i64, text: &str) -> String {
        let text = text.trim();
        debug!(user_id, text, "Chat message");

        // Commands always win over pending interactions
        match text {
            "/start" => return self.start(user_id),
            "/help" => return self.help(user_id),
            "/register" => return self.begin_register(user_id),
            "/login" => return self.begin_login(user_id),
            "/issue_tokens" => return self.begin_issue(user_id),
            "/companies" => return self.show_companies().await,
            "/buy" => return self.begin_purchase(user_id).await,
            "/balance" => return self.show_balance(user_id).await,
            "/dividends" => return self.show_dividends(user_id).await,
            _ => {}
        }

        let awaiting = self.session(user_id).awaiting.take();
        match awaiting {
            Some(Awaiting::RoleSelection) => self.finish_role_selection(user_id, text),
            Some(Awaiting::Register) => self.finish_register(user_id, text).await,
            Some(Awaiting::Login) => self.finish_login(text).await,
            Some(Awaiting::TaxId) => self.finish_tax_id(user_id, text).await,
            Some(Awaiting::TokenAmount(tax_id, name)) => {
                self.finish_issue(&tax_id, &name, text).await
            }
            Some(Awaiting::Purchase) => self.finish_purchase(user_id, text).await,
            None => "Unknown command. Type /help for the list of commands.".to_string(),
        }
    }

    fn session(&mut self, user_id: i64) -> &mut ChatSession {
        self.sessions.entry(user_id).or_default()
    }

    // =========================================================================
    // /start, /help
    // =========================================================================

    fn start(&mut self, user_id: i64) -> String {
        let session = self.session(user_id);
        session.role = None;
        session.awaiting = Some(Awaiting::RoleSelection);
        "Welcome to TokenizeLocal!\nPlease select your role:\n1. 👤 User\n2. 🏢 Company"
            .to_string()
    }

    fn finish_role_selection(&mut self, user_id: i64, text: &str) -> String {
        let role = match text {
            "1" => Role::User,
            "2" => Role::Company,
            _ => {
                self.session(user_id).awaiting = Some(Awaiting::RoleSelection);
                return "❌ Unknown role. Reply 1 for User or 2 for Company.".to_string();
            }
        };

        self.session(user_id).role = Some(role);
        let confirmation = match role {
            Role::User => "✅ You have selected user mode.",
            Role::Company => "✅ You have selected company mode.",
        };
        format!("{confirmation}\n\n{}", self.help(user_id))
    }

    fn help(&mut self, user_id: i64) -> String {
        match self.session(user_id).role {
            Some(Role::Company) => "💼 You are in company mode.\n\
                 Available commands:\n\
                 /issue_tokens — Issue tokens\n\
                 /help — Help\n\
                 💡 To restart, type /start"
                .to_string(),
            _ => "👤 You are in user mode.\n\
                 Available commands:\n\
                 /register — Register\n\
                 /login — Login\n\
                 /companies — List of companies\n\
                 /buy — Buy tokens\n\
                 /balance — My balance\n\
                 /dividends — My dividends\n\
                 /help — Help\n\
                 💡 To restart, type /start"
                .to_string(),
        }
    }

    // =========================================================================
    // /register, /login
    // =========================================================================

    fn begin_register(&mut self, user_id: i64) -> String {
        let session = self.session(user_id);
        if session.role != Some(Role::User) {
            return "❌ This command is only for users.".to_string();
        }
        session.awaiting = Some(Awaiting::Register);
        "Enter your name, email, and password separated by spaces\n\
         Example: Ivan user@example.com 1234"
            .to_string()
    }

    async fn finish_register(&mut self, _user_id: i64, text: &str) -> String {
        let parts: Vec<&str> = text.split_whitespace().collect();
        if parts.len() < 3 {
            return "❌ Required: name email password".to_string();
        }
        let secret = parts[parts.len() - 1];
        let identity = parts[parts.len() - 2];
        let name = parts[..parts.len() - 2].join(" ");

        match self.db.users().register(&name, identity, secret).await {
            Ok(()) => format!("✅ Registration successful, {name}!"),
            Err(err) => format!("❌ {}", render_error(&err)),
        }
    }

    fn begin_login(&mut self, user_id: i64) -> String {
        let session = self.session(user_id);
        if session.role != Some(Role::User) {
            return "❌ This command is only for users.".to_string();
        }
        session.awaiting = Some(Awaiting::Login);
        "Enter your email and password separated by a space".to_string()
    }

    async fn finish_login(&mut self, text: &str) -> String {
        let parts: Vec<&str> = text.split_whitespace().collect();
        if parts.len() != 2 {
            return "❌ Enter email and password".to_string();
        }

        match self
            .db
            .users()
            .authenticate(parts[0], parts[1], &PlaintextVerifier)
            .await
        {
            Ok(true) => "✅ Login successful!".to_string(),
            Ok(false) => "❌ Invalid email or password.".to_string(),
            Err(err) => format!("❌ {}", render_error(&err)),
        }
    }

    // =========================================================================
    // /issue_tokens
    // =========================================================================

    fn begin_issue(&mut self, user_id: i64) -> String {
        let session = self.session(user_id);
        if session.role != Some(Role::Company) {
            return "❌ This command is only for companies.".to_string();
        }
        session.awaiting = Some(Awaiting::TaxId);
        "Enter the company tax id (10 or 12 digits):".to_string()
    }

    async fn finish_tax_id(&mut self, user_id: i64, text: &str) -> String {
        if validate_tax_id(text).is_err() {
            return "❌ Invalid tax id format.".to_string();
        }

        let company = match self.registry.lookup(text).await {
            Ok(company) => company,
            Err(err) => return format!("❌ Error: {err}"),
        };

        if !company.is_active() {
            return format!("❌ Company is not active. Status: {}", company.status);
        }

        self.session(user_id).awaiting =
            Some(Awaiting::TokenAmount(text.to_string(), company.name.clone()));
        format!("✅ {}\nNow enter the number of tokens:", company.name)
    }

    async fn finish_issue(&mut self, tax_id: &str, name: &str, text: &str) -> String {
        let amount = match text.parse::<TokenAmount>() {
            Ok(amount) if validate_positive_amount(amount).is_ok() => amount,
            _ => return "❌ Error: amount must be positive".to_string(),
        };

        match self.db.flows().register_and_issue(tax_id, name, amount).await {
            Ok(()) => format!("✅ Issued {amount} tokens for {name}!"),
            Err(err) => format!("❌ Error: {}", render_error(&err)),
        }
    }

    // =========================================================================
    // /companies, /buy, /balance, /dividends
    // =========================================================================

    async fn show_companies(&self) -> String {
        match self.db.issuances().list_all().await {
            Ok(companies) if companies.is_empty() => "No companies available.".to_string(),
            Ok(companies) => {
                let mut response = "📋 Available companies:\n".to_string();
                for (idx, company) in companies.iter().enumerate() {
                    response.push_str(&format!(
                        "{}. {} — {} tokens\n",
                        idx + 1,
                        company.name,
                        company.available()
                    ));
                }
                response
            }
            Err(err) => format!("❌ {}", render_error(&err)),
        }
    }

    async fn begin_purchase(&mut self, user_id: i64) -> String {
        if self.session(user_id).role != Some(Role::User) {
            return "❌ This command is only for users.".to_string();
        }

        let companies = match self.db.issuances().list_all().await {
            Ok(companies) => companies,
            Err(err) => return format!("❌ {}", render_error(&err)),
        };
        if companies.is_empty() {
            return "❌ No companies available.".to_string();
        }

        let mut response = "Select a company:\n".to_string();
        for (idx, company) in companies.iter().enumerate() {
            response.push_str(&format!(
                "{}. {} ({})\n",
                idx + 1,
                company.name,
                company.available()
            ));
        }
        response.push_str("\nEnter: NUMBER AMOUNT\nExample: 1 10");

        self.session(user_id).awaiting = Some(Awaiting::Purchase);
        response
    }

    async fn finish_purchase(&mut self, user_id: i64, text: &str) -> String {
        let parts: Vec<&str> = text.split_whitespace().collect();
        if parts.len() != 2 {
            return "❌ Error: enter two values".to_string();
        }

        let Ok(company_num) = parts[0].parse::<usize>() else {
            return "❌ Error: values must be positive".to_string();
        };
        let amount = match parts[1].parse::<TokenAmount>() {
            Ok(amount) if validate_positive_amount(amount).is_ok() => amount,
            _ => return "❌ Error: values must be positive".to_string(),
        };

        let companies = match self.db.issuances().list_all().await {
            Ok(companies) => companies,
            Err(err) => return format!("❌ {}", render_error(&err)),
        };
        if company_num == 0 || company_num > companies.len() {
            return "❌ Error: company not found".to_string();
        }
        let company = &companies[company_num - 1];

        if amount > company.available() {
            return format!(
                "❌ Error: not enough tokens. Available: {}",
                company.available()
            );
        }

        let identity = Self::chat_identity(user_id);
        match self.db.flows().purchase(&identity, &company.tax_id, amount).await {
            Ok(balance) => format!(
                "✅ Purchased {amount} tokens of {}!\nBalance: {balance}",
                company.name
            ),
            Err(err) => format!("❌ Error: {}", render_error(&err)),
        }
    }

    async fn show_balance(&mut self, user_id: i64) -> String {
        let identity = Self::chat_identity(user_id);
        match self.db.holdings().holdings_of(&identity).await {
            Ok(holdings) if holdings.is_empty() => "You have no tokens.".to_string(),
            Ok(holdings) => {
                let mut response = "💰 Your balance:\n".to_string();
                for holding in holdings {
                    response.push_str(&format!("- {}: {} tokens\n", holding.name, holding.balance()));
                }
                response
            }
            Err(err) => format!("❌ {}", render_error(&err)),
        }
    }

    async fn show_dividends(&mut self, user_id: i64) -> String {
        let identity = Self::chat_identity(user_id);
        match self.db.dividends().recent_for_holder(&identity, 5).await {
            Ok(dividends) if dividends.is_empty() => {
                "You have not received any dividends.".to_string()
            }
            Ok(dividends) => {
                let mut response = "📈 Your dividends:\n".to_string();
                for dividend in dividends {
                    response.push_str(&format!(
                        "🏢 {}\n📅 {}\n💸 {}\n",
                        dividend.name,
                        dividend.distributed_at.format("%Y-%m-%d"),
                        dividend.payout()
                    ));
                }
                response
            }
            Err(err) => format!("❌ {}", render_error(&err)),
        }
    }
}

/// Maps error kinds to chat replies; matching is on the kind, never on
/// message content.
fn render_error(err: &DbError) -> String {
    match err {
        DbError::Ledger(LedgerError::InvalidOperation(context)) => {
            format!("operation rejected: {context}")
        }
        DbError::Ledger(LedgerError::InsufficientSupply { remaining }) => {
            format!("not enough tokens. Remaining: {remaining}")
        }
        DbError::Ledger(LedgerError::NoTokensIssued { tax_id }) => {
            format!("company {tax_id} has not issued tokens")
        }
        DbError::Ledger(LedgerError::AlreadyExists { .. }) => "User already exists.".to_string(),
        DbError::Ledger(LedgerError::InvalidIdentity { .. }) => "Invalid email.".to_string(),
        DbError::Ledger(LedgerError::NotFound { tax_id }) => {
            format!("company {tax_id} not found")
        }
        DbError::Ledger(LedgerError::Validation(validation)) => validation.to_string(),
        other => format!("unexpected storage error: {other}"),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tokenize_core::{DividendRate, Money};
    use tokenize_db::DbConfig;
    use tokenize_registry::StaticLookup;

    const SBER: &str = "7707083893";
    const ALICE: i64 = 101;
    const ISSUER: i64 = 202;

    async fn router() -> ChatRouter {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let registry = StaticLookup::new().with_active(SBER, "Sberbank");
        ChatRouter::new(db, Arc::new(registry))
    }

    /// Drives the issuer through role selection and a full issue flow.
    async fn issue(router: &mut ChatRouter, amount: &str) {
        router.handle(ISSUER, "/start").await;
        router.handle(ISSUER, "2").await;
        router.handle(ISSUER, "/issue_tokens").await;
        let reply = router.handle(ISSUER, SBER).await;
        assert!(reply.contains("Sberbank"), "unexpected reply: {reply}");
        let reply = router.handle(ISSUER, amount).await;
        assert!(reply.starts_with('✅'), "unexpected reply: {reply}");
    }

    #[tokio::test]
    async fn start_offers_roles_and_help_follows_selection() {
        let mut router = router().await;

        let reply = router.handle(ALICE, "/start").await;
        assert!(reply.contains("select your role"));

        let reply = router.handle(ALICE, "1").await;
        assert!(reply.contains("user mode"));
        assert!(reply.contains("/buy"));

        let reply = router.handle(ALICE, "/help").await;
        assert!(reply.contains("/dividends"));
    }

    #[tokio::test]
    async fn role_gating() {
        let mut router = router().await;
        router.handle(ALICE, "/start").await;
        router.handle(ALICE, "1").await;

        let reply = router.handle(ALICE, "/issue_tokens").await;
        assert!(reply.contains("only for companies"));

        router.handle(ISSUER, "/start").await;
        router.handle(ISSUER, "2").await;
        let reply = router.handle(ISSUER, "/buy").await;
        assert!(reply.contains("only for users"));
    }

    #[tokio::test]
    async fn register_login_and_duplicate() {
        let mut router = router().await;
        router.handle(ALICE, "/start").await;
        router.handle(ALICE, "1").await;

        router.handle(ALICE, "/register").await;
        let reply = router.handle(ALICE, "Alice alice@example.com 1234").await;
        assert!(reply.contains("Registration successful"));

        router.handle(ALICE, "/register").await;
        let reply = router.handle(ALICE, "Alice alice@example.com 1234").await;
        assert!(reply.contains("already exists"));

        router.handle(ALICE, "/login").await;
        let reply = router.handle(ALICE, "alice@example.com 1234").await;
        assert!(reply.contains("Login successful"));

        router.handle(ALICE, "/login").await;
        let reply = router.handle(ALICE, "alice@example.com wrong").await;
        assert!(reply.contains("Invalid email or password"));
    }

    #[tokio::test]
    async fn issue_then_buy_then_balance() {
        let mut router = router().await;
        issue(&mut router, "100").await;

        router.handle(ALICE, "/start").await;
        router.handle(ALICE, "1").await;

        let reply = router.handle(ALICE, "/companies").await;
        assert!(reply.contains("1. Sberbank — 100 tokens"));

        router.handle(ALICE, "/buy").await;
        let reply = router.handle(ALICE, "1 30").await;
        assert!(reply.contains("Purchased 30 tokens"));
        assert!(reply.contains("Balance: 30"));

        let reply = router.handle(ALICE, "/balance").await;
        assert!(reply.contains("Sberbank: 30 tokens"));

        // the listing reflects the reduced supply
        let reply = router.handle(ALICE, "/companies").await;
        assert!(reply.contains("1. Sberbank — 70 tokens"));
    }

    #[tokio::test]
    async fn over_purchase_is_rejected_before_the_ledger() {
        let mut router = router().await;
        issue(&mut router, "10").await;

        router.handle(ALICE, "/start").await;
        router.handle(ALICE, "1").await;
        router.handle(ALICE, "/buy").await;
        let reply = router.handle(ALICE, "1 11").await;
        assert!(reply.contains("not enough tokens"));

        let reply = router.handle(ALICE, "/companies").await;
        assert!(reply.contains("10 tokens"));
    }

    #[tokio::test]
    async fn inactive_company_cannot_issue() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let registry = StaticLookup::new().with_company(
            SBER,
            tokenize_registry::CompanyInfo {
                name: "Sberbank".to_string(),
                short_name: None,
                status: "LIQUIDATED".to_string(),
                registration_date: None,
                address: None,
                revenue_cents: None,
            },
        );
        let mut router = ChatRouter::new(db, Arc::new(registry));

        router.handle(ISSUER, "/start").await;
        router.handle(ISSUER, "2").await;
        router.handle(ISSUER, "/issue_tokens").await;
        let reply = router.handle(ISSUER, SBER).await;
        assert!(reply.contains("not active"));
    }

    #[tokio::test]
    async fn dividends_view_reports_current_share() {
        let mut router = router().await;
        issue(&mut router, "100").await;

        router.handle(ALICE, "/start").await;
        router.handle(ALICE, "1").await;
        router.handle(ALICE, "/buy").await;
        router.handle(ALICE, "1 25").await;

        // top the supply back up to 100 so alice holds 25 of 100
        issue(&mut router, "25").await;

        // distribution happens out of band (ops tooling), the bot reads it
        router
            .db
            .dividends()
            .distribute(SBER, Money::from_dollars(1_000), DividendRate::default())
            .await
            .unwrap();

        let reply = router.handle(ALICE, "/dividends").await;
        assert!(reply.contains("Sberbank"));
        assert!(reply.contains("$25.00"));
    }

    #[tokio::test]
    async fn unknown_text_without_pending_state_gets_a_hint() {
        let mut router = router().await;
        let reply = router.handle(ALICE, "what do I do").await;
        assert!(reply.contains("/help"));
    }
}
