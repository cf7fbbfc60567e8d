//! Command-line argument parsing for the Lilly CLI.

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Send a chat message
    Chat { message: String, stream: bool },
    /// Clear server-side chat memory
    Clear,
    /// Analyst write-up of a CVE
    Enrich {
        cve_id: String,
        description: String,
        stream: bool,
    },
    /// Plain-language explanation of a CVE
    Simplify {
        cve_id: String,
        description: String,
        stream: bool,
    },
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// Arguments could not be understood
    Invalid(String),
}

/// Parse command-line arguments and return the appropriate command.
///
/// The first element is the program name and is skipped. `--no-stream` may
/// appear anywhere and switches to the buffered endpoints.
///
/// # Examples
///
/// ```
/// use lilly::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["lilly".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()), CliCommand::Version);
/// ```
pub fn parse_args<I>(args: I) -> CliCommand
where
    I: Iterator<Item = String>,
{
    let mut stream = true;
    let rest: Vec<String> = args
        .skip(1)
        .filter(|arg| {
            if arg == "--no-stream" {
                stream = false;
                false
            } else {
                true
            }
        })
        .collect();

    let Some(first) = rest.first() else {
        return CliCommand::Help;
    };

    match first.as_str() {
        "--version" | "-V" => CliCommand::Version,
        "--help" | "-h" => CliCommand::Help,
        "--clear" => CliCommand::Clear,
        flag @ ("--enrich" | "--simplify") => {
            let (Some(cve_id), true) = (rest.get(1), rest.len() > 2) else {
                return CliCommand::Invalid(format!("{} needs <CVE-ID> <description>", flag));
            };
            let cve_id = cve_id.clone();
            let description = rest[2..].join(" ");
            if flag == "--enrich" {
                CliCommand::Enrich {
                    cve_id,
                    description,
                    stream,
                }
            } else {
                CliCommand::Simplify {
                    cve_id,
                    description,
                    stream,
                }
            }
        }
        flag if flag.starts_with("--") => CliCommand::Invalid(format!("unknown option {}", flag)),
        _ => CliCommand::Chat {
            message: rest.join(" "),
            stream,
        },
    }
}
