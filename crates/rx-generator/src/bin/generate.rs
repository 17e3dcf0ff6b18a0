//! CLI for inspecting prompts and replaying recorded model responses.
//!
//! # Usage
//!
//! ```bash
//! # Show the chat messages a reflexion attempt would send
//! rx-generate render --signature "def add(a, b):" --strategy reflexion \
//!     --prev prev.py --feedback feedback.txt --reflection reflection.txt
//!
//! # Clean a saved model response into an implementation
//! rx-generate clean --signature "def add(a, b):" < response.txt
//!
//! # Parse, filter and sample generated tests
//! RX_SEED=7 rx-generate tests --signature "def add(a, b):" --max-tests 3 < tests.txt
//!
//! # Same, replayed as a completion-only backend would see it
//! rx-generate clean --completion --signature "def add(a, b):" < body.txt
//!
//! # Dump the preset templates as a starting point for a custom file
//! rx-generate templates --language rust > rust.json
//! ```

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rx_core::{ScriptedModel, TemplateSet};
use rx_generator::{
    CodeGenerator, GeneratorConfig, GeneratorError, ImplRequest, Prompt, PromptBuilder, Strategy,
};
use rx_lang::{Language, LanguageKit};
use rx_sample::{checked_count, seed_from_env, DeterministicRng};

#[derive(Debug, Parser)]
#[command(name = "rx-generate", version, about = "Prompt assembly and response cleanup for code-generating models")]
struct Cli {
    /// Target language (python, rust)
    #[arg(short, long, global = true, default_value = "python")]
    language: String,

    /// JSON template file overriding the language presets
    #[arg(short, long, global = true)]
    templates: Option<PathBuf>,

    /// JSON generator config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the prompt a generation stage would send
    Render(RenderArgs),
    /// Clean a raw implementation response
    Clean(CleanArgs),
    /// Parse, filter and sample a raw test generation response
    Tests(TestsArgs),
    /// Print the templates in use as JSON
    Templates,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Stage {
    Impl,
    Tests,
    Reflection,
}

#[derive(Debug, Args)]
struct RenderArgs {
    /// Pipeline stage to render
    #[arg(long, value_enum, default_value = "impl")]
    stage: Stage,

    /// Function signature
    #[arg(short, long)]
    signature: String,

    /// Strategy: simple or reflexion
    #[arg(long, default_value = "simple")]
    strategy: String,

    /// Previous implementation file (reflexion); implementation file for reflection
    #[arg(long)]
    prev: Option<PathBuf>,

    /// Unit test feedback file
    #[arg(long)]
    feedback: Option<PathBuf>,

    /// Self-reflection file (reflexion)
    #[arg(long)]
    reflection: Option<PathBuf>,

    /// Render the completion-style prompt instead of chat messages
    #[arg(long)]
    completion: bool,

    /// Use the think-first test prompt (chat only)
    #[arg(long)]
    react: bool,
}

#[derive(Debug, Args)]
struct CleanArgs {
    /// Function signature
    #[arg(short, long)]
    signature: String,

    /// Raw response file (default: stdin)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Replay through a completion-only backend instead of a chat one
    #[arg(long)]
    completion: bool,
}

#[derive(Debug, Args)]
struct TestsArgs {
    /// Function signature
    #[arg(short, long)]
    signature: String,

    /// Raw response file (default: stdin)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Maximum number of tests to keep
    #[arg(short = 'n', long, default_value_t = 10, allow_negative_numbers = true)]
    max_tests: i64,

    /// Sampling seed (default: RX_SEED or random)
    #[arg(long)]
    seed: Option<u64>,

    /// Replay through a completion-only backend instead of a chat one
    #[arg(long)]
    completion: bool,

    /// Use the think-first test prompt (chat only)
    #[arg(long)]
    react: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| cli.log_level.clone());
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)))
        .init();

    match run(cli) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<String, GeneratorError> {
    let language: Language = cli.language.parse()?;
    let templates = match cli.templates {
        Some(ref path) => TemplateSet::from_file(path)?,
        None => language.templates(),
    };
    let config = match cli.config {
        Some(ref path) => GeneratorConfig::from_file(path)?,
        None => GeneratorConfig::default(),
    };

    match cli.command {
        Command::Render(args) => render(&args, &templates),
        Command::Clean(args) => {
            let model = replay_model(read_input(args.input.as_deref())?, args.completion);
            clean(&model, &args, Setup::new(language, templates, config))
        }
        Command::Tests(args) => {
            let model = replay_model(read_input(args.input.as_deref())?, args.completion);
            sample_tests(&model, &args, Setup::new(language, templates, config))
        }
        Command::Templates => Ok(templates.to_json()?),
    }
}

/// Everything a replayed generator needs besides its model.
struct Setup {
    language: Language,
    templates: TemplateSet,
    config: GeneratorConfig,
}

impl Setup {
    fn new(language: Language, templates: TemplateSet, config: GeneratorConfig) -> Self {
        Self {
            language,
            templates,
            config,
        }
    }

    fn generator(
        self,
        model: &ScriptedModel,
        seed: u64,
    ) -> CodeGenerator<&ScriptedModel, Box<dyn LanguageKit>> {
        CodeGenerator::new(
            model,
            self.language.kit(),
            self.templates,
            self.config,
            DeterministicRng::new(seed),
        )
    }
}

/// A backend that answers once with `raw`.
fn replay_model(raw: String, completion: bool) -> ScriptedModel {
    let model = if completion {
        ScriptedModel::completion()
    } else {
        ScriptedModel::chat()
    };
    model.respond_text(raw)
}

fn clean(model: &ScriptedModel, args: &CleanArgs, setup: Setup) -> Result<String, GeneratorError> {
    let generator = setup.generator(model, 1);
    let code = generator.generate_implementation(&ImplRequest::simple(&args.signature))?;
    Ok(code.into_vec().join("\n"))
}

fn sample_tests(
    model: &ScriptedModel,
    args: &TestsArgs,
    setup: Setup,
) -> Result<String, GeneratorError> {
    let max_tests = checked_count(args.max_tests)?;
    let seed = match args.seed {
        Some(seed) => seed,
        None => seed_from_env()?,
    };

    let mut generator = setup.generator(model, seed);
    let tests = generator.generate_tests(&args.signature, 1, max_tests, args.react)?;
    info!(seed = generator.seed(), kept = tests.len(), "Replayed test generation");
    Ok(tests.join("\n"))
}

fn render(args: &RenderArgs, templates: &TemplateSet) -> Result<String, GeneratorError> {
    let chat = !args.completion;
    let prev = read_optional(args.prev.as_deref())?;
    let feedback = read_optional(args.feedback.as_deref())?;

    let prompt: Prompt = match args.stage {
        Stage::Impl => {
            let strategy: Strategy = args.strategy.parse()?;
            let reflection = read_optional(args.reflection.as_deref())?;
            let request = ImplRequest {
                prev_impl: prev.as_deref(),
                feedback: feedback.as_deref(),
                reflection: reflection.as_deref(),
                ..ImplRequest::new(&args.signature, strategy)
            };
            PromptBuilder::build_impl_prompt(&request, &templates.implementation, chat)?
        }
        Stage::Tests => {
            PromptBuilder::build_test_prompt(&args.signature, &templates.tests, chat, args.react)
        }
        Stage::Reflection => {
            let implementation = prev.ok_or_else(|| {
                GeneratorError::InvalidArgument("--prev is required for the reflection stage".to_string())
            })?;
            let feedback = feedback.ok_or_else(|| {
                GeneratorError::InvalidArgument(
                    "--feedback is required for the reflection stage".to_string(),
                )
            })?;
            PromptBuilder::build_reflection_prompt(&implementation, &feedback, &templates.reflection, chat)
        }
    };

    Ok(prompt.render())
}

fn read_input(path: Option<&Path>) -> Result<String, GeneratorError> {
    match path {
        Some(path) => read_file(path),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| GeneratorError::Input(format!("stdin: {}", e)))?;
            Ok(buf)
        }
    }
}

fn read_optional(path: Option<&Path>) -> Result<Option<String>, GeneratorError> {
    path.map(read_file).transpose()
}

fn read_file(path: &Path) -> Result<String, GeneratorError> {
    std::fs::read_to_string(path)
        .map_err(|e| GeneratorError::Input(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rx_core::RecordedCall;

    const SIGNATURE: &str = "def add(a, b):";

    fn python() -> Setup {
        Setup::new(Language::Python, Language::Python.templates(), GeneratorConfig::default())
    }

    fn clean_args(completion: bool) -> CleanArgs {
        CleanArgs {
            signature: SIGNATURE.to_string(),
            input: None,
            completion,
        }
    }

    fn tests_args(completion: bool, react: bool) -> TestsArgs {
        TestsArgs {
            signature: SIGNATURE.to_string(),
            input: None,
            max_tests: 5,
            seed: Some(3),
            completion,
            react,
        }
    }

    #[test]
    fn test_clean_through_chat_backend() {
        let model = replay_model("```python\ndef add(a, b):\n    return a + b\n```".to_string(), false);
        let code = clean(&model, &clean_args(false), python()).unwrap();

        assert_eq!(code, "def add(a, b):\n    return a + b");
        assert!(matches!(model.calls().as_slice(), [RecordedCall::Chat { .. }]));
    }

    #[test]
    fn test_clean_through_completion_backend() {
        let model = replay_model("return a + b".to_string(), true);
        let code = clean(&model, &clean_args(true), python()).unwrap();

        assert_eq!(code, "def add(a, b):\n    return a + b");
        match model.calls().as_slice() {
            [RecordedCall::Completion { prompt, .. }] => assert!(prompt.ends_with(SIGNATURE)),
            other => panic!("unexpected calls: {:?}", other),
        }
    }

    #[test]
    fn test_tests_with_react_prompt() {
        let raw = "[think]: cover zero and opposite signs\n[unit tests]:\nassert add(0, 0) == 0\nassert add(-1, 1) == 0";
        let model = replay_model(raw.to_string(), false);
        let tests = sample_tests(&model, &tests_args(false, true), python()).unwrap();

        assert_eq!(tests, "assert add(0, 0) == 0\nassert add(-1, 1) == 0");
        match model.calls().as_slice() {
            [RecordedCall::Chat { user, .. }] => assert!(user.ends_with("[think]:")),
            other => panic!("unexpected calls: {:?}", other),
        }
    }

    #[test]
    fn test_tests_through_completion_backend() {
        let model = replay_model("assert add(1, 2) == 3\nassert add(1, 2) == == 3".to_string(), true);
        let tests = sample_tests(&model, &tests_args(true, true), python()).unwrap();

        assert_eq!(tests, "assert add(1, 2) == 3");
        match model.calls().as_slice() {
            [RecordedCall::Completion { prompt, .. }] => assert!(prompt.ends_with("unit tests:")),
            other => panic!("unexpected calls: {:?}", other),
        }
    }

    #[test]
    fn test_negative_max_tests_is_rejected_before_replay() {
        let model = replay_model("assert add(1, 2) == 3".to_string(), false);
        let args = TestsArgs {
            max_tests: -1,
            ..tests_args(false, false)
        };

        assert!(sample_tests(&model, &args, python()).is_err());
        assert_eq!(model.call_count(), 0);
    }
}
