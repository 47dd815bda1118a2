use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "lex")]
#[command(about = "Legal question answering over a retrieval-augmented document corpus")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Bind address (overrides LEX_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (overrides LEX_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Use an in-memory store loaded with the seed corpus
        #[arg(long)]
        memory: bool,
    },

    /// Clear the document store and load the seed corpus
    Ingest,

    /// Check the store, the embedding chain and vector search
    Verify,

    /// Answer one question and print it
    Ask {
        /// The question to answer
        #[arg(required = true)]
        question: Vec<String>,

        /// Use an in-memory store loaded with the seed corpus
        #[arg(long)]
        memory: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_flags() {
        let cli = Cli::try_parse_from(["lex", "serve", "--port", "8080", "--memory"]).unwrap();
        assert_eq!(cli.command, Commands::Serve { host: None, port: Some(8080), memory: true });
    }

    #[test]
    fn ask_joins_words() {
        let cli = Cli::try_parse_from(["lex", "ask", "What", "is", "RICO?"]).unwrap();
        let Commands::Ask { question, memory } = cli.command else { panic!("expected ask") };
        assert_eq!(question.join(" "), "What is RICO?");
        assert!(!memory);
    }

    #[test]
    fn ask_requires_a_question() {
        assert!(Cli::try_parse_from(["lex", "ask"]).is_err());
    }
}
