use clap::{Args, Parser, Subcommand};

use crate::config::{DEFAULT_CLAUDE_MODEL, DEFAULT_TRANSLATION_MODEL, ServerConfig, parse_langs};
use crate::dto::TranslateMode;
use crate::pipeline::AlignmentPolicy;

#[derive(Parser)]
#[command(
    name = "yt-summary",
    about = "YouTube caption translation & summary",
    long_about = "Fetches a YouTube video's captions, translates them to Korean and summarizes them into five key points, as a web service or from the command line.",
    after_help = "EXAMPLES:\n    # Start the server (reads OPENAI_API_KEY / ANTHROPIC_API_KEY from the environment or .env)\n    yt-summary serve\n\n    # Print the captions of a video as a timeline\n    yt-summary transcript https://youtu.be/dQw4w9WgXcQ --mode timeline\n\n    # Translate and summarize the full text\n    yt-summary translate https://www.youtube.com/watch?v=dQw4w9WgXcQ\n\n    # Ask a Claude model through the chat endpoint\n    yt-summary chat \"Hello\" --model claude"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args)]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, env = "PORT", default_value = "8080")]
    pub port: u16,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    #[arg(long, env = "OPENAI_ORGANIZATION")]
    pub openai_organization: Option<String>,

    #[arg(long, env = "OPENAI_BASE_URL")]
    pub openai_base_url: Option<String>,

    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    pub anthropic_api_key: Option<String>,

    #[arg(long, env = "ANTHROPIC_BASE_URL")]
    pub anthropic_base_url: Option<String>,

    #[arg(long, env = "TRANSLATION_MODEL", default_value = DEFAULT_TRANSLATION_MODEL)]
    pub translation_model: String,

    #[arg(long, env = "CLAUDE_MODEL", default_value = DEFAULT_CLAUDE_MODEL)]
    pub claude_model: String,

    /// Comma-separated caption languages to try when a request has no hint
    #[arg(long, env = "CAPTION_LANGS", default_value = "en")]
    pub caption_langs: String,

    /// What to do when a timeline translation loses or merges lines
    #[arg(long, env = "ALIGNMENT_POLICY", default_value = "lenient", value_parser = parse_alignment)]
    pub alignment: AlignmentPolicy,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(name = "serve")]
    Serve(ServeArgs),
    #[command(name = "transcript")]
    Transcript {
        url: String,

        #[arg(long, default_value = "text", value_parser = parse_mode)]
        mode: TranslateMode,

        #[arg(long)]
        lang: Option<String>,

        #[arg(long, default_value = "http://localhost:8080")]
        server_url: String,
    },
    #[command(name = "translate")]
    Translate {
        url: String,

        #[arg(long, default_value = "text", value_parser = parse_mode)]
        mode: TranslateMode,

        #[arg(long)]
        lang: Option<String>,

        #[arg(long, default_value = "http://localhost:8080")]
        server_url: String,
    },
    #[command(name = "chat")]
    Chat {
        prompt: String,

        #[arg(long)]
        model: Option<String>,

        #[arg(long)]
        system: Option<String>,

        #[arg(long, default_value = "http://localhost:8080")]
        server_url: String,
    },
}

pub fn parse_mode(s: &str) -> Result<TranslateMode, String> {
    s.parse()
}

pub fn parse_alignment(s: &str) -> Result<AlignmentPolicy, String> {
    s.parse()
}

impl From<ServeArgs> for ServerConfig {
    fn from(args: ServeArgs) -> Self {
        let caption_langs = parse_langs(&args.caption_langs);
        ServerConfig {
            host: args.host,
            port: args.port,
            openai_api_key: args.openai_api_key,
            openai_organization: args.openai_organization,
            openai_base_url: args.openai_base_url,
            anthropic_api_key: args.anthropic_api_key,
            anthropic_base_url: args.anthropic_base_url,
            translation_model: args.translation_model,
            claude_model: args.claude_model,
            caption_langs: if caption_langs.is_empty() {
                ServerConfig::default().caption_langs
            } else {
                caption_langs
            },
            alignment: args.alignment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translate_defaults_to_text_mode() {
        let cli = Cli::try_parse_from(["yt-summary", "translate", "https://youtu.be/abc"]).unwrap();
        match cli.command {
            Commands::Translate { url, mode, .. } => {
                assert_eq!(url, "https://youtu.be/abc");
                assert_eq!(mode, TranslateMode::Text);
            }
            _ => panic!("expected translate"),
        }
    }

    #[test]
    fn rejects_unknown_mode() {
        assert!(
            Cli::try_parse_from(["yt-summary", "translate", "u", "--mode", "full"]).is_err()
        );
    }

    #[test]
    fn empty_lang_list_falls_back() {
        let cli = Cli::try_parse_from([
            "yt-summary",
            "serve",
            "--caption-langs",
            " , ",
            "--alignment",
            "strict",
        ])
        .unwrap();
        let Commands::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        let config = ServerConfig::from(args);
        assert_eq!(config.caption_langs, vec!["en"]);
        assert_eq!(config.alignment, AlignmentPolicy::Strict);
    }
}
