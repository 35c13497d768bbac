use std::path::PathBuf;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use log::{warn, LevelFilter};
use ottsonly_client::auth::RegisterRequest;
use ottsonly_client::filter::{DateRange, PriceRange, SubscriptionTab};
use ottsonly_client::flows::{parse_amount, youtube_email};
use ottsonly_client::prelude::*;
use ottsonly_client::products::Plan;
use ottsonly_client::sync::ProfileSource;
use ottsonly_client::wallet::TransactionType;

mod gateway;

use gateway::TerminalGateway;

#[derive(Parser, Debug)]
#[clap(name = "ottsonly", version)]
#[clap(about = "OTTSONLY subscription marketplace from the command line", long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,

    /// API base URL. Defaults to OTTSONLY_API_URL or http://localhost:8000.
    #[clap(long)]
    api_url: Option<String>,

    /// Where the session is kept. Defaults to OTTSONLY_SESSION_PATH.
    #[clap(long)]
    session_file: Option<PathBuf>,

    /// Output debug logs to stderr
    #[clap(long)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in with email and password
    Login {
        #[clap(long)]
        email: String,
        #[clap(long)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        #[clap(long)]
        name: String,
        #[clap(long)]
        email: String,
        #[clap(long)]
        phone: String,
        #[clap(long)]
        password: String,
        #[clap(long)]
        referral_code: Option<String>,
    },
    /// Sign in with a phone OTP
    VerifyOtp {
        #[clap(long)]
        phone: String,
        #[clap(long)]
        otp: String,
    },
    /// Forget the stored session
    Logout {
        /// Also tell the server
        #[clap(long)]
        server: bool,
    },
    /// Exchange the refresh token for a new access token
    RefreshToken,
    /// Show the signed-in user's profile and balance
    Profile,
    /// Browse the plan catalog
    Plans {
        /// Platform, e.g. netflix or "YouTube Premium"
        #[clap(long)]
        platform: Option<String>,
        /// Duration in months
        #[clap(long)]
        duration: Option<u32>,
        /// Price bucket, "min-max" or "min+"
        #[clap(long)]
        price_range: Option<PriceRange>,
        /// popular, price-low, price-high or savings
        #[clap(long, default_value = "popular")]
        sort: PlanSort,
    },
    /// Buy a plan
    Buy {
        product_id: String,
        #[clap(long, value_enum, default_value_t = Method::Wallet)]
        payment_method: Method,
        /// Accept the terms and conditions
        #[clap(long)]
        accept_terms: bool,
        /// Gmail to submit right away for YouTube plans
        #[clap(long)]
        gmail: Option<String>,
    },
    /// List your subscriptions
    Subscriptions {
        #[clap(long, value_enum, default_value_t = Tab::Active)]
        tab: Tab,
        #[clap(long)]
        search: Option<String>,
        /// Platform key, e.g. youtube_premium
        #[clap(long)]
        platform: Option<String>,
    },
    /// Set or change the Gmail on a YouTube subscription
    YoutubeEmail { subscription_id: String, email: String },
    /// List wallet transactions
    Transactions {
        #[clap(long, value_enum)]
        kind: Option<Kind>,
        #[clap(long)]
        search: Option<String>,
        #[clap(long, value_enum, default_value_t = Range::All)]
        range: Range,
        /// Start date (YYYY-MM-DD) for --range custom
        #[clap(long)]
        from: Option<NaiveDate>,
        /// End date (YYYY-MM-DD) for --range custom
        #[clap(long)]
        to: Option<NaiveDate>,
    },
    /// Add money to the wallet
    TopUp { amount: String },
    /// Show the referral dashboard
    Referrals,
    /// Apply someone's referral code
    ApplyReferral { code: String },
    /// Withdraw referral earnings
    Withdraw {
        amount: String,
        #[clap(long)]
        upi: Option<String>,
        #[clap(long)]
        account_number: Option<String>,
        #[clap(long)]
        ifsc_code: Option<String>,
        #[clap(long)]
        account_holder_name: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Method {
    Wallet,
    Card,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Tab {
    Active,
    Expired,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Kind {
    Credit,
    Debit,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Range {
    All,
    #[value(name = "7d")]
    Last7,
    #[value(name = "30d")]
    Last30,
    #[value(name = "90d")]
    Last90,
    Custom,
}

fn init_logging(debug: bool) {
    let mut builder = pretty_env_logger::formatted_builder();
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    if debug {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

fn client(cli: &Cli) -> anyhow::Result<Ottsonly> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = &cli.api_url {
        config = ClientConfig::new(url, config.options)?;
    }
    if let Some(path) = &cli.session_file {
        config.options = config.options.with_session_path(path.clone());
    }
    Ok(Ottsonly::with_config(config)?)
}

fn print_plan(plan: &Plan) {
    println!(
        "{}  {} {}  {} mo  ₹{:.2} (was ₹{:.2}, save {:.0}%){}",
        plan.id,
        plan.platform,
        plan.name,
        plan.duration_months,
        plan.discounted_price,
        plan.original_price,
        plan.savings_percent(),
        if plan.popular { "  popular" } else { "" }
    );
    for feature in &plan.features {
        println!("    • {}", feature);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let client = client(&cli)?;

    match cli.command {
        Commands::Login { email, password } => {
            let session = client.auth().login(&email, &password).await?;
            println!("Signed in as {}", session.user.name.as_deref().unwrap_or(&email));
        }
        Commands::Register {
            name,
            email,
            phone,
            password,
            referral_code,
        } => {
            let request = RegisterRequest {
                name,
                email,
                phone,
                password,
                referral_code,
            };
            let session = client.auth().register(&request).await?;
            println!("Welcome, {}", session.user.name.as_deref().unwrap_or(&request.name));
        }
        Commands::VerifyOtp { phone, otp } => {
            client.auth().verify_otp(&phone, &otp).await?;
            println!("Phone verified, signed in");
        }
        Commands::Logout { server } => {
            if server {
                if let Err(e) = client.auth().logout().await {
                    warn!("Server logout failed: {}", e);
                }
            }
            client.logout()?;
            println!("Logged out");
        }
        Commands::RefreshToken => {
            client.auth().refresh_token().await?;
            println!("Access token refreshed");
        }
        Commands::Profile => {
            let snapshot = client.profile_sync().load().await;
            match snapshot.source {
                ProfileSource::Server => {}
                ProfileSource::Cached => println!("(offline, showing saved profile)"),
                ProfileSource::Default => println!("(no profile available)"),
            }
            let profile = &snapshot.profile;
            println!("Name:    {}", profile.name.as_deref().unwrap_or("-"));
            println!("Email:   {}", profile.email.as_deref().unwrap_or("-"));
            println!("Phone:   {}", profile.phone.as_deref().unwrap_or("-"));
            println!("Balance: {}", snapshot.balance());
            if let Some(session) = client.sessions().session()? {
                if session.is_expired_at(Utc::now()) {
                    println!("Your session has expired. Please sign in again.");
                }
            }
        }
        Commands::Plans {
            platform,
            duration,
            price_range,
            sort,
        } => {
            let products = client.products().list().await?;
            let filter = PlanFilter {
                platform,
                duration_months: duration,
                price_range,
                sort,
            };
            let plans = filter.apply(&build_catalog(&products));
            if plans.is_empty() {
                println!("No plans match these filters");
            }
            for plan in &plans {
                print_plan(plan);
            }
        }
        Commands::Buy {
            product_id,
            payment_method,
            accept_terms,
            gmail,
        } => {
            let product = client.products().get(&product_id).await?;
            let plan = Plan::from(&product);
            let balance = client.profile_sync().load().await.balance();

            // Without any known balance the wallet cannot cover the price
            let mut dialog = PurchaseDialog::new(plan, balance.amount().unwrap_or(0.0));
            dialog.select_payment_method(match payment_method {
                Method::Wallet => PaymentMethod::Wallet,
                Method::Card => PaymentMethod::Card,
            });
            dialog.accept_terms(accept_terms);
            print_plan(&dialog.plan);
            if let Some(warning) = dialog.warning() {
                println!("{}", warning);
            }

            let outcome = client.purchase_flow().confirm(&dialog).await?;
            println!("{}", outcome.message);
            println!("Wallet balance: {}", outcome.profile.balance());

            match outcome.navigation {
                Navigation::YoutubeGmailRequest(state) => match gmail {
                    Some(gmail) => {
                        client
                            .youtube_email_flow()
                            .submit(state.subscription_id.as_deref(), &gmail)
                            .await?;
                        println!("Gmail submitted successfully! You will be added shortly.");
                    }
                    None => println!(
                        "Submit your Gmail with: ottsonly youtube-email {} <gmail>",
                        state.subscription_id.as_deref().unwrap_or("<subscription-id>")
                    ),
                },
                Navigation::MySubscriptions => {
                    println!("See it with: ottsonly subscriptions")
                }
            }
        }
        Commands::Subscriptions {
            tab,
            search,
            platform,
        } => {
            let subscriptions = client.subscriptions().mine().await?;
            let filter = SubscriptionFilter {
                tab: match tab {
                    Tab::Active => SubscriptionTab::Active,
                    Tab::Expired => SubscriptionTab::Expired,
                },
                query: search,
                platform,
            };
            let now = Utc::now();
            for sub in filter.apply(&subscriptions) {
                println!(
                    "{}  {} {}  {:?}  {} days left",
                    sub.id,
                    sub.platform_name,
                    sub.plan_name,
                    sub.status,
                    sub.remaining_days(now)
                );
                if sub.is_youtube() || sub.is_combo() {
                    println!(
                        "    Gmail: {}  ({} edit(s) remaining)",
                        sub.youtube_email.as_deref().unwrap_or("not submitted"),
                        youtube_email::edits_remaining(&sub)
                    );
                }
            }
        }
        Commands::YoutubeEmail {
            subscription_id,
            email,
        } => {
            let subscription = client.subscriptions().get(&subscription_id).await?;
            let flow = client.youtube_email_flow();
            let update = match subscription.youtube_email.as_deref() {
                None | Some("") => flow.submit(Some(&subscription.id), &email).await?,
                Some(_) => flow.edit(&subscription, &email).await?,
            };
            println!(
                "{}",
                update
                    .message
                    .unwrap_or_else(|| "YouTube email updated successfully!".to_string())
            );
        }
        Commands::Transactions {
            kind,
            search,
            range,
            from,
            to,
        } => {
            let transactions = client.wallet().transactions().await?;
            let mut filter = TransactionFilter::new(Utc::now()).with_date_range(match range {
                Range::All => DateRange::All,
                Range::Last7 => DateRange::Last7Days,
                Range::Last30 => DateRange::Last30Days,
                Range::Last90 => DateRange::Last90Days,
                Range::Custom => DateRange::Custom { from, to },
            });
            if let Some(kind) = kind {
                filter = filter.with_kind(match kind {
                    Kind::Credit => TransactionType::Credit,
                    Kind::Debit => TransactionType::Debit,
                });
            }
            if let Some(search) = search {
                filter = filter.with_search(search);
            }
            for txn in filter.apply(&transactions) {
                let sign = if txn.kind == TransactionType::Debit { "-" } else { "+" };
                println!(
                    "{}  {}  {}₹{:.2}  {}  balance ₹{:.2}",
                    txn.created_at, txn.id, sign, txn.amount, txn.description, txn.balance_after
                );
            }
        }
        Commands::TopUp { amount } => {
            let amount = parse_amount(&amount)?;
            let outcome = client.top_up_flow().add_money(amount, &TerminalGateway).await?;
            println!("{}", outcome.message);
            println!("Wallet balance: {}", outcome.profile.balance());
        }
        Commands::Referrals => {
            let dashboard = client.referrals().dashboard().await?;
            println!("Code:         {}", dashboard.referral_code.as_deref().unwrap_or("-"));
            println!(
                "Referrals:    {} ({} active)",
                dashboard.total_referrals, dashboard.active_referrals
            );
            println!("Earnings:     ₹{:.2}", dashboard.total_earnings);
            println!("Withdrawable: ₹{:.2}", dashboard.withdrawable_balance);
            println!("Commission:   {}%", dashboard.commission_rate);
            println!("Minimum payout ₹{}", dashboard.min_withdrawal());
            for commission in &dashboard.recent_commissions {
                println!(
                    "    {}  ₹{:.2} on a ₹{:.2} top-up",
                    commission.referred_user_name.as_deref().unwrap_or("-"),
                    commission.commission_amount,
                    commission.topup_amount
                );
            }
        }
        Commands::ApplyReferral { code } => {
            client.referrals().apply(&code).await?;
            println!("Referral code applied");
        }
        Commands::Withdraw {
            amount,
            upi,
            account_number,
            ifsc_code,
            account_holder_name,
        } => {
            let amount = parse_amount(&amount)?;
            let destination = match upi {
                Some(upi) => Destination::Upi(upi),
                None if account_number.is_some()
                    || ifsc_code.is_some()
                    || account_holder_name.is_some() =>
                {
                    Destination::Bank {
                        account_number: account_number.unwrap_or_default(),
                        ifsc_code: ifsc_code.unwrap_or_default(),
                        account_holder_name: account_holder_name.unwrap_or_default(),
                    }
                }
                None => Destination::Upi(String::new()),
            };

            let dashboard = client
                .referrals()
                .dashboard()
                .await
                .context("Failed to load referral data")?;
            let outcome = client
                .withdrawal_flow()
                .submit(amount, &destination, &dashboard)
                .await?;
            println!(
                "{}",
                outcome
                    .receipt
                    .message
                    .unwrap_or_else(|| "Withdrawal request submitted successfully".to_string())
            );
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
