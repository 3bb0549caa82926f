//! Submit a form from the command line.
//!
//! Usage:
//!   cargo run -p formpost --example submit -- <url> [post|put|delete] [name=value ...]
//!
//! Examples:
//!   # Post two fields to a local endpoint
//!   cargo run -p formpost --example submit -- http://localhost:8080/contact post name=Ada email=ada@example.com
//!
//!   # Relative targets resolve against FORMPOST_BASE_URL
//!   FORMPOST_BASE_URL=http://localhost:8080 cargo run -p formpost --example submit -- /contact

use std::env;

use anyhow::{Context, Result, bail};
use formpost::{Form, FormOptions, SubmitError};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let mut args = env::args().skip(1);
    let Some(url) = args.next() else {
        bail!("usage: submit <url> [post|put|delete] [name=value ...]");
    };

    let mut method = "post".to_string();
    let mut fields = Vec::new();
    for arg in args {
        match arg.split_once('=') {
            Some((name, value)) => fields.push((name.to_string(), value.to_string())),
            None if fields.is_empty() => method = arg,
            None => bail!("expected name=value, got '{}'", arg),
        }
    }

    let mut form = Form::new(&url, fields, FormOptions::default()).context("failed to build form")?;

    match form.submit(&method).await {
        Ok(body) => println!("{}", body),
        Err(SubmitError::Rejected(body)) => {
            for (field, messages) in form.errors().iter() {
                eprintln!("  {}: {}", field, messages.join("; "));
            }
            bail!("submission rejected: {}", body);
        }
        Err(error) => return Err(error.into()),
    }
    Ok(())
}

fn init_tracing() {
    let filter = env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
