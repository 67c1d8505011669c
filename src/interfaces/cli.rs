use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ordertrack")]
#[command(about = "Track storefront orders from the command line.")]
#[command(version)]
pub struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Choose color theme
    #[arg(short = 'T', long, global = true)]
    pub theme: Option<String>,

    /// Generate config sample
    #[arg(long)]
    pub generate_config: bool,

    /// Show status
    #[arg(long)]
    pub status: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Track one or more orders; repeated ids share one request
    Track {
        #[arg(required = true, num_args = 1..)]
        order_ids: Vec<String>,
    },

    /// Send a one-time password to the order's email
    OtpRequest { order_id: String, email: String },

    /// Verify a one-time password and print the access token
    OtpVerify {
        order_id: String,
        email: String,
        otp: String,
    },

    /// Full order details using a verified access token
    Details {
        order_id: String,

        /// Access token from `otp-verify`
        #[arg(short = 't', long, env = "ORDERTRACK_ACCESS_TOKEN")]
        token: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_track_many() {
        let cli = Cli::parse_from(["ordertrack", "--json", "track", "PC-1", "PC-2", "PC-1"]);
        assert!(cli.json);
        match cli.command {
            Some(Command::Track { order_ids }) => assert_eq!(order_ids, ["PC-1", "PC-2", "PC-1"]),
            _ => panic!("expected track"),
        }
    }

    #[test]
    fn test_parse_details_token() {
        let cli = Cli::parse_from(["ordertrack", "details", "PC-1", "--token", "abc"]);
        match cli.command {
            Some(Command::Details { order_id, token }) => {
                assert_eq!(order_id, "PC-1");
                assert_eq!(token, "abc");
            }
            _ => panic!("expected details"),
        }
    }

    #[test]
    fn test_track_requires_id() {
        assert!(Cli::try_parse_from(["ordertrack", "track"]).is_err());
    }
}
