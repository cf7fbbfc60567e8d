//! CLI module for Lilly.
//!
//! Parses arguments and runs one request against the backend, printing
//! streamed replies to stdout as they arrive.
//!
//! ```ignore
//! use lilly::cli::{parse_args, run_cli_command};
//! use lilly::config::LillyConfig;
//!
//! let command = parse_args(std::env::args());
//! run_cli_command(command, LillyConfig::from_env()).await?;
//! ```

pub mod args;
pub mod version;

pub use args::{parse_args, CliCommand};
pub use version::{version_string, VERSION};

use color_eyre::eyre::eyre;
use color_eyre::{Report, Result};
use std::io::Write;

use crate::client::LillyClient;
use crate::config::LillyConfig;
use crate::conversation::Conversation;
use crate::error::LillyError;
use crate::traits::HttpClient;

pub const USAGE: &str = "\
Usage:
  lilly <message...>                     Ask Lilly a question
  lilly --enrich <CVE-ID> <description>   Analyst write-up of a CVE
  lilly --simplify <CVE-ID> <description> Plain-language CVE explanation
  lilly --clear                           Clear Lilly's chat memory
  lilly --version | -V
  lilly --help | -h

Options:
  --no-stream   Wait for the whole answer instead of streaming it

Environment:
  LILLY_API_BASE_URL, LILLY_IDLE_TIMEOUT_SECS,
  LILLY_REQUEST_TIMEOUT_SECS, LILLY_KEEP_CONTROL_CHARS
";

/// Run a parsed command against the backend described by `config`.
pub async fn run_cli_command(command: CliCommand, config: LillyConfig) -> Result<()> {
    let client = LillyClient::new(config);

    match command {
        CliCommand::Version => println!("{}", version_string()),
        CliCommand::Help => print!("{}", USAGE),
        CliCommand::Invalid(reason) => {
            eprint!("{}", USAGE);
            return Err(eyre!(reason));
        }
        CliCommand::Chat {
            message,
            stream: true,
        } => {
            if !stream_chat_to(&client, &message, &mut std::io::stdout()).await? {
                print!("{}", USAGE);
            }
        }
        CliCommand::Chat {
            message,
            stream: false,
        } => println!("{}", client.chat(&message).await.map_err(report)?),
        CliCommand::Clear => {
            let response = client.clear().await.map_err(report)?;
            println!("{}", response.message);
        }
        CliCommand::Enrich {
            cve_id,
            description,
            stream,
        } => {
            if stream {
                client
                    .stream_enrich_cve(&cve_id, &description, print_delta)
                    .await
                    .map_err(report)?;
                println!();
            } else {
                println!(
                    "{}",
                    client
                        .enrich_cve(&cve_id, &description)
                        .await
                        .map_err(report)?
                );
            }
        }
        CliCommand::Simplify {
            cve_id,
            description,
            stream,
        } => {
            if stream {
                client
                    .stream_simplify_cve(&cve_id, &description, print_delta)
                    .await
                    .map_err(report)?;
                println!();
            } else {
                println!(
                    "{}",
                    client
                        .simplify_cve(&cve_id, &description)
                        .await
                        .map_err(report)?
                );
            }
        }
    }

    Ok(())
}

/// Stream a chat reply into `out` as it arrives.
///
/// If the reply fails part way, the failure notice is written on its own line
/// after whatever text already arrived. Returns `Ok(false)` for a blank message.
async fn stream_chat_to<C, W>(client: &LillyClient<C>, message: &str, out: &mut W) -> Result<bool>
where
    C: HttpClient,
    W: Write,
{
    let mut convo = Conversation::new();
    let result = convo
        .send_with(client, message, |delta| write_delta(out, delta))
        .await;

    match result {
        Ok(sent) => {
            if sent {
                let _ = writeln!(out);
            }
            Ok(sent)
        }
        Err(e) => {
            if let Some(notice) = convo.last() {
                let _ = writeln!(out);
                let _ = writeln!(out, "{}", notice.content);
                let _ = out.flush();
            }
            Err(report(e))
        }
    }
}

fn write_delta<W: Write>(out: &mut W, delta: &str) {
    // Ignore a closed stdout
    let _ = out.write_all(delta.as_bytes());
    let _ = out.flush();
}

fn print_delta(delta: &str) {
    write_delta(&mut std::io::stdout().lock(), delta);
}

fn report(err: LillyError) -> Report {
    let hint = err.user_message();
    Report::new(err).wrap_err(hint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{MockHttpClient, MockResponse};
    use crate::error::STREAM_FAILURE_NOTICE;
    use crate::traits::HttpError;
    use std::time::Duration;

    fn mock_client() -> LillyClient<MockHttpClient> {
        LillyClient::with_http(
            MockHttpClient::new(),
            LillyConfig::default().with_base_url("http://lilly.test"),
        )
    }

    #[tokio::test]
    async fn test_version_and_help_succeed() {
        assert!(run_cli_command(CliCommand::Version, LillyConfig::default())
            .await
            .is_ok());
        assert!(run_cli_command(CliCommand::Help, LillyConfig::default())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_invalid_is_error() {
        let result = run_cli_command(
            CliCommand::Invalid("unknown option --x".to_string()),
            LillyConfig::default(),
        )
        .await;
        assert_eq!(result.unwrap_err().to_string(), "unknown option --x");
    }

    #[test]
    fn test_report_carries_user_message() {
        let err = report(LillyError::IdleTimeout {
            after: Duration::from_secs(5),
        });
        assert_eq!(err.to_string(), "The Lilly service stopped responding.");
    }

    #[tokio::test]
    async fn test_stream_chat_prints_reply() {
        let client = mock_client();
        client.http().set_default_response(MockResponse::chunks([
            "data: {\"text\":\"Patch\"}\n",
            "data: {\"text\":\"now\"}\n",
        ]));

        let mut out = Vec::new();
        assert!(stream_chat_to(&client, "what?", &mut out).await.unwrap());
        assert_eq!(String::from_utf8(out).unwrap(), "Patch now\n");
    }

    #[tokio::test]
    async fn test_stream_chat_failure_prints_notice() {
        let client = mock_client();
        client.http().set_default_response(MockResponse::StreamThenError(
            vec!["data: {\"text\":\"Half\"}\n".into()],
            HttpError::Io("reset".to_string()),
        ));

        let mut out = Vec::new();
        let err = stream_chat_to(&client, "what?", &mut out)
            .await
            .unwrap_err();

        let printed = String::from_utf8(out).unwrap();
        assert_eq!(printed, format!("Half\n{}\n", STREAM_FAILURE_NOTICE));
        assert_eq!(err.to_string(), STREAM_FAILURE_NOTICE);
    }

    #[tokio::test]
    async fn test_stream_chat_server_error_prints_notice() {
        let client = mock_client();
        client
            .http()
            .set_default_response(MockResponse::Success(crate::traits::Response::new(
                503, "down",
            )));

        let mut out = Vec::new();
        let err = stream_chat_to(&client, "what?", &mut out)
            .await
            .unwrap_err();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            format!("\n{}\n", STREAM_FAILURE_NOTICE)
        );
        assert_eq!(err.to_string(), "The Lilly service returned an error (503).");
    }

    #[tokio::test]
    async fn test_stream_chat_blank_message_not_sent() {
        let client = mock_client();
        let mut out = Vec::new();
        assert!(!stream_chat_to(&client, "   ", &mut out).await.unwrap());
        assert!(out.is_empty());
        assert!(client.http().get_requests().is_empty());
    }
}
