use anyhow::Context;
use clap::{Parser, Subcommand};
use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use shared_types::{
    AuthTokenResponse, AuthUserResponse, CreateAccountRequest, CreateAccountResponse,
    LoginRequest, RefreshTokenRequest, ReportRequest, ReportResponse,
};

#[derive(Parser)]
#[command(name = "report-cli")]
#[command(about = "CLI for signing in and generating activity reports via the backend API")]
#[command(
    long_about = "A command-line interface for interacting with the activity report server.\n\n\
    Supports signing in, refreshing and verifying tokens, creating accounts,\n\
    and turning a list of activities into a report."
)]
struct Cli {
    /// Backend server URL to connect to.
    ///
    /// Use this to connect to a remote server or a different port.
    #[arg(
        short,
        long,
        default_value = "http://localhost:3000",
        env = "REPORT_API_URL"
    )]
    base_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with email and password and print the issued tokens
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },

    /// Exchange a refresh token for a new access token
    Refresh {
        /// Refresh token returned by 'login'.
        refresh_token: String,
    },

    /// Check an access token and print the user it belongs to
    Verify {
        #[arg(short, long, env = "REPORT_API_TOKEN")]
        token: String,
    },

    /// Create a new account
    ///
    /// Depending on the identity provider, the email may need to be
    /// confirmed before 'login' succeeds.
    Signup {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },

    /// Generate a report from a list of activities
    ///
    /// Each positional argument is one activity, e.g.
    /// report-cli report "Revisé el código" "Reunión con el equipo"
    Report {
        #[arg(short, long, env = "REPORT_API_TOKEN")]
        token: String,

        #[arg(required = true, value_name = "ACTIVITY")]
        activities: Vec<String>,
    },
}

/// Error body returned by the server for non-2xx responses
#[derive(Debug, Deserialize)]
struct ServerError {
    error: String,
    details: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = Client::new();
    let base_url = cli.base_url.trim_end_matches('/');

    match cli.command {
        Commands::Login { email, password } => {
            let req = LoginRequest { email, password };
            let tokens: AuthTokenResponse =
                send(client.post(format!("{}/auth/get-token", base_url)).json(&req)).await?;
            print_json(&tokens)?;
        }
        Commands::Refresh { refresh_token } => {
            let req = RefreshTokenRequest { refresh_token };
            let tokens: AuthTokenResponse =
                send(client.post(format!("{}/auth/refresh-token", base_url)).json(&req)).await?;
            print_json(&tokens)?;
        }
        Commands::Verify { token } => {
            let user: AuthUserResponse = send(
                client
                    .get(format!("{}/auth/verify-token", base_url))
                    .bearer_auth(token),
            )
            .await?;
            print_json(&user)?;
        }
        Commands::Signup { email, password } => {
            let req = CreateAccountRequest { email, password };
            let account: CreateAccountResponse = send(
                client
                    .post(format!("{}/auth/create-account", base_url))
                    .json(&req),
            )
            .await?;
            print_json(&account)?;
            if account.confirmation_required {
                eprintln!("Check your inbox to confirm the account before logging in.");
            }
        }
        Commands::Report { token, activities } => {
            let req = ReportRequest { activities };
            let report: ReportResponse = send(
                client
                    .post(format!("{}/reports", base_url))
                    .bearer_auth(token)
                    .json(&req),
            )
            .await?;
            print_json(&report)?;
        }
    }

    Ok(())
}

/// Send a request and decode the JSON body, turning non-2xx responses into errors.
async fn send<T: DeserializeOwned>(request: RequestBuilder) -> anyhow::Result<T> {
    let response = request
        .send()
        .await
        .context("Failed to reach the report server")?;
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ServerError>(&body) {
            Ok(ServerError {
                error,
                details: Some(details),
            }) => anyhow::bail!("{} ({}): {}", error, status, details),
            Ok(ServerError { error, .. }) => anyhow::bail!("{} ({})", error, status),
            Err(_) => anyhow::bail!("Request failed ({}): {}", status, body),
        }
    }

    response
        .json()
        .await
        .context("Failed to parse server response")
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
