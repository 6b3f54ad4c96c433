//! `comments`: command-line client for the comments service.
//!
//! - **`token`**: mint an HS256 bearer token from the server's shared secret.
//! - **`health`**, **`list`**, **`get`**: read endpoints, no credentials needed.
//! - **`post`**, **`update`**, **`delete`**: write endpoints. Pass `--token`
//!   for bearer auth or `--user`/`--password` for basic auth.
//!
//! Response bodies are printed as pretty JSON. The exit code is 0 on a 2xx
//! response, 1 on any other status, and 2 when the request cannot be made.

use std::process;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use comments_api::CommentDraft;
use reqwest::blocking::{Client, RequestBuilder};

/// comments: client for the comments HTTP API
#[derive(Parser)]
#[command(name = "comments", version, about, long_about = None)]
struct Cli {
    /// Base URL of the server.
    #[arg(long, env = "COMMENTS_URL", default_value = "http://localhost:8080", global = true)]
    url: String,

    #[command(flatten)]
    auth: AuthArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct AuthArgs {
    /// Bearer token for write routes (see `comments token`).
    #[arg(long, env = "COMMENTS_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    /// Basic-auth username for write routes.
    #[arg(long, env = "COMMENTS_BASIC_USER", global = true)]
    user: Option<String>,

    /// Basic-auth password for write routes.
    #[arg(long, env = "COMMENTS_BASIC_PASSWORD", global = true, hide_env_values = true)]
    password: Option<String>,
}

#[derive(Args)]
struct DraftArgs {
    /// Page the comment is attached to, e.g. `/blog/hello`.
    #[arg(short = 's', long, default_value = "")]
    slug: String,

    /// Comment text.
    #[arg(short = 'b', long, default_value = "")]
    body: String,

    /// Display name of the author.
    #[arg(short = 'a', long, default_value = "")]
    author: String,
}

impl From<DraftArgs> for CommentDraft {
    fn from(args: DraftArgs) -> Self {
        CommentDraft::new(args.slug, args.body, args.author)
    }
}

#[derive(Subcommand)]
enum Command {
    /// Print a bearer token signed with the server's secret.
    Token {
        /// Shared HMAC secret; must match the server's COMMENTS_JWT_SECRET.
        #[arg(long, env = "COMMENTS_JWT_SECRET", hide_env_values = true)]
        secret: String,

        /// Value of the `sub` claim.
        #[arg(long, default_value = "comments-cli")]
        subject: String,

        /// Lifetime of the token in seconds.
        #[arg(long, default_value_t = 3600)]
        ttl: u64,
    },

    /// Check that the server is alive.
    Health,

    /// List comments, optionally only those for one slug.
    List {
        #[arg(short = 's', long)]
        slug: Option<String>,
    },

    /// Fetch one comment by id.
    Get { id: String },

    /// Create a comment.
    Post(DraftArgs),

    /// Update a comment. Only the fields given are changed.
    Update {
        id: String,
        #[command(flatten)]
        draft: DraftArgs,
    },

    /// Delete a comment.
    Delete { id: String },
}

fn main() {
    let cli = Cli::parse();

    let Cli { url, auth, command } = cli;
    let base = format!("{}/api", url.trim_end_matches('/'));

    let client = Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap_or_else(|e| fatal(&format!("failed to build HTTP client: {e}")));

    let request = match command {
        Command::Token {
            secret,
            subject,
            ttl,
        } => {
            match comments_server::issue_token(secret.as_bytes(), &subject, Duration::from_secs(ttl)) {
                Ok(token) => println!("{token}"),
                Err(e) => fatal(&format!("failed to sign token: {e}")),
            }
            return;
        }
        Command::Health => client.get(format!("{base}/health")),
        Command::List { slug } => {
            let req = client.get(format!("{base}/comment"));
            match slug {
                Some(slug) => req.query(&[("slug", slug)]),
                None => req,
            }
        }
        Command::Get { id } => client.get(format!("{base}/comment/{id}")),
        Command::Post(draft) => auth
            .apply(client.post(format!("{base}/comment")))
            .json(&CommentDraft::from(draft)),
        Command::Update { id, draft } => auth
            .apply(client.put(format!("{base}/comment/{id}")))
            .json(&CommentDraft::from(draft)),
        Command::Delete { id } => auth.apply(client.delete(format!("{base}/comment/{id}"))),
    };

    process::exit(send(request));
}

impl AuthArgs {
    /// Attach credentials: a bearer token wins over a basic-auth pair.
    fn apply(&self, req: RequestBuilder) -> RequestBuilder {
        match (&self.token, &self.user) {
            (Some(token), _) => req.bearer_auth(token),
            (None, Some(user)) => req.basic_auth(user, self.password.as_deref()),
            (None, None) => req,
        }
    }
}

/// Send `req`, print the response body, and return the process exit code.
fn send(req: RequestBuilder) -> i32 {
    let resp = req
        .send()
        .unwrap_or_else(|e| fatal(&format!("request failed: {e}")));
    let status = resp.status();
    let text = resp
        .text()
        .unwrap_or_else(|e| fatal(&format!("failed to read response: {e}")));

    match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(json) => println!(
            "{}",
            serde_json::to_string_pretty(&json).unwrap_or(text)
        ),
        Err(_) if text.is_empty() => {}
        Err(_) => println!("{text}"),
    }

    if status.is_success() {
        0
    } else {
        eprintln!("comments: server answered {status}");
        1
    }
}

/// Print an error message to stderr and exit with code 2.
fn fatal(msg: &str) -> ! {
    eprintln!("comments: {msg}");
    process::exit(2);
}
