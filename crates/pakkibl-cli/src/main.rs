mod chat;
mod display;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use pakkibl_ai::{CategoryClassifier, SharedClassifier, Strategy, build_classifier, route};
use pakkibl_core::{
    CategoryTable, CitationTable, Conversation, FAQS, RESOURCE_SHELVES, TrainingExample,
    builtin_corpus,
};
use pakkibl_llm::config::{
    DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE, DEFAULT_TTS_MODEL,
    DEFAULT_VOICE,
};
use pakkibl_llm::{Advocate, LlmConfig, OpenAiClient, OpenAiSpeech, SpeechConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pakkibl", version, about = "PakkiBL AI Legal Advocate")]
struct Cli {
    #[command(flatten)]
    tables: TableArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify a question into a legal category without calling the LLM.
    Classify {
        query: String,
        #[arg(long, value_enum, default_value_t = StrategyArg::Both)]
        strategy: StrategyArg,
    },
    /// Ask a single question and print the answer.
    Ask {
        query: String,
        #[command(flatten)]
        llm: LlmArgs,
        /// Write a spoken version of the answer to this MP3 file.
        #[arg(long)]
        speech: Option<PathBuf>,
        #[arg(long, default_value = DEFAULT_VOICE)]
        voice: String,
        #[arg(long, default_value = DEFAULT_TTS_MODEL)]
        tts_model: String,
        /// Attach a pdf, txt or docx document to the question.
        #[arg(long)]
        document: Option<PathBuf>,
    },
    /// Interactive chat session.
    Chat {
        #[command(flatten)]
        llm: LlmArgs,
        /// Write saved conversation snapshots to this JSON file on exit.
        #[arg(long)]
        transcript: Option<PathBuf>,
    },
    /// List the keyword, citation and training tables.
    Tables,
    /// Show the legal resource library and frequently asked questions.
    Resources {
        /// Only show the shelf for this area of law.
        #[arg(long)]
        area: Option<String>,
    },
}

#[derive(Args)]
struct TableArgs {
    /// JSON keyword table replacing the built-in one.
    #[arg(long, global = true, env = "PAKKIBL_KEYWORDS")]
    keywords: Option<PathBuf>,
    /// JSON citation table replacing the built-in one.
    #[arg(long, global = true, env = "PAKKIBL_CITATIONS")]
    citations: Option<PathBuf>,
    /// JSON training corpus replacing the built-in one.
    #[arg(long, global = true, env = "PAKKIBL_CORPUS")]
    corpus: Option<PathBuf>,
}

#[derive(Args)]
struct LlmArgs {
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,
    #[arg(long, default_value_t = DEFAULT_TEMPERATURE)]
    temperature: f32,
    #[arg(long, default_value_t = DEFAULT_MAX_TOKENS)]
    max_tokens: u32,
    /// Classifier used to route questions.
    #[arg(long, value_enum, default_value_t = RouterArg::Bayes)]
    router: RouterArg,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Keyword,
    Bayes,
    Both,
}

#[derive(Clone, Copy, ValueEnum)]
enum RouterArg {
    Keyword,
    Bayes,
}

impl From<RouterArg> for Strategy {
    fn from(arg: RouterArg) -> Self {
        match arg {
            RouterArg::Keyword => Strategy::Keyword,
            RouterArg::Bayes => Strategy::NaiveBayes,
        }
    }
}

struct Tables {
    keywords: CategoryTable,
    citations: CitationTable,
    corpus: Vec<TrainingExample>,
}

impl TableArgs {
    fn load(&self) -> anyhow::Result<Tables> {
        let keywords = match &self.keywords {
            Some(path) => CategoryTable::from_json_file(path)
                .with_context(|| format!("loading keyword table {}", path.display()))?,
            None => CategoryTable::builtin(),
        };
        let citations = match &self.citations {
            Some(path) => CitationTable::from_json_file(path)
                .with_context(|| format!("loading citation table {}", path.display()))?,
            None => CitationTable::builtin(),
        };
        let corpus = match &self.corpus {
            Some(path) => pakkibl_core::tables::corpus_from_json_file(path)
                .with_context(|| format!("loading training corpus {}", path.display()))?,
            None => builtin_corpus(),
        };
        Ok(Tables {
            keywords,
            citations,
            corpus,
        })
    }

    fn build(&self, strategy: Strategy) -> anyhow::Result<Arc<dyn CategoryClassifier>> {
        let tables = self.load()?;
        build_classifier(strategy, tables.keywords, &tables.corpus)
            .with_context(|| format!("building {strategy} classifier"))
    }
}

impl LlmArgs {
    fn api_key(&self) -> anyhow::Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .context("no API key configured; set OPENAI_API_KEY or pass --api-key")
    }

    fn generator(&self) -> anyhow::Result<OpenAiClient> {
        let config = LlmConfig::new(self.api_key()?)
            .with_base_url(&self.base_url)
            .with_model(&self.model)
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens);
        Ok(OpenAiClient::new(config)?)
    }

    fn advocate(&self, tables: &TableArgs) -> anyhow::Result<Advocate> {
        let strategy = Strategy::from(self.router);
        let loaded = tables.load()?;
        let classifier = build_classifier(strategy, loaded.keywords, &loaded.corpus)
            .with_context(|| format!("building {strategy} classifier"))?;
        Ok(Advocate::new(
            SharedClassifier::new(classifier),
            Arc::new(loaded.citations),
            Arc::new(self.generator()?),
        ))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    tracing::info!("pakkibl v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    match cli.command {
        Command::Classify { query, strategy } => classify(&cli.tables, &query, strategy),
        Command::Ask {
            query,
            llm,
            speech,
            voice,
            tts_model,
            document,
        } => {
            let mut advocate = llm.advocate(&cli.tables)?;
            if speech.is_some() {
                let config = SpeechConfig::new(llm.api_key()?)
                    .with_base_url(&llm.base_url)
                    .with_model(tts_model)
                    .with_voice(voice);
                advocate = advocate.with_synthesizer(Arc::new(OpenAiSpeech::new(config)?));
            }

            let mut conversation = Conversation::new();
            if let Some(path) = &document {
                chat::attach(&mut conversation, path).await?;
            }

            let answer = chat::ask(&advocate, &mut conversation, &query).await?;
            if let (Some(path), Some(audio)) = (&speech, &answer.audio) {
                write_audio(path, audio).await?;
            }
            Ok(())
        }
        Command::Chat { llm, transcript } => {
            let advocate = llm.advocate(&cli.tables)?;
            let strategy = Strategy::from(llm.router);
            chat::run_chat(&advocate, || cli.tables.build(strategy), transcript.as_deref()).await
        }
        Command::Tables => {
            let tables = cli.tables.load()?;
            display::print_tables(&tables.keywords, &tables.citations, &tables.corpus);
            Ok(())
        }
        Command::Resources { area } => match area {
            Some(area) => {
                let shelf = pakkibl_core::resources::shelf(&area)
                    .with_context(|| format!("no resources for area '{area}'"))?;
                display::print_resources(std::slice::from_ref(shelf), &[]);
                Ok(())
            }
            None => {
                display::print_resources(RESOURCE_SHELVES, FAQS);
                Ok(())
            }
        },
    }
}

fn classify(table_args: &TableArgs, query: &str, strategy: StrategyArg) -> anyhow::Result<()> {
    let tables = table_args.load()?;
    let strategies: &[Strategy] = match strategy {
        StrategyArg::Keyword => &[Strategy::Keyword],
        StrategyArg::Bayes => &[Strategy::NaiveBayes],
        StrategyArg::Both => &[Strategy::Keyword, Strategy::NaiveBayes],
    };

    for &s in strategies {
        let classifier = build_classifier(s, tables.keywords.clone(), &tables.corpus)
            .with_context(|| format!("building {s} classifier"))?;
        let routing = route(classifier.as_ref(), &tables.citations, query)?;
        display::print_routing(classifier.name(), &routing);
    }
    Ok(())
}

async fn write_audio(path: &Path, audio: &[u8]) -> anyhow::Result<()> {
    tokio::fs::write(path, audio)
        .await
        .with_context(|| format!("writing audio to {}", path.display()))?;
    println!("Audio written to {}", path.display());
    Ok(())
}
