use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use libhangul::{calc_gap_match, GapMatchRanker};
use rand::rngs::StdRng;
use rand::SeedableRng;
use sdprompt::{
    highlight_prompt, paren_check, ErrorContext, Library, ParenStatus, Preset, PromptAssembler,
    PromptConfig, Resolver, Scene, StyleBlock, TagIndex,
};
use sdprompt_core::Ranker;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "sdprompt", about = "Prompt grammar and editor tools")]
struct Args {
    /// Prompt config (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve piece references and print lowered prompts
    Expand {
        library: PathBuf,
        prompt: String,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value_t = 1)]
        count: usize,
    },
    /// Check bracket balance
    Check { prompt: String },
    /// Print highlighted markup
    Highlight { library: PathBuf, prompt: String },
    /// Gap-match a fragment against a word
    Match { small: String, large: String },
    /// Build every prompt of a scene file
    Compose {
        library: PathBuf,
        scene: PathBuf,
        /// Tag database (JSON) used to move character tags first
        #[arg(long)]
        tags: Option<PathBuf>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Rank tags of a JSON dump for a typed fragment
    Suggest {
        tags: PathBuf,
        query: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

/// Scene file layout for `compose`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SceneFile {
    session: String,
    preset: Preset,
    style: Option<StyleBlock>,
    scene: Scene,
}

fn rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// `word` with the chars at `path` wrapped in brackets.
fn emphasize(word: &str, path: &[usize]) -> String {
    let mut out = String::with_capacity(word.len() + path.len() * 2);
    for (i, c) in word.chars().enumerate() {
        if path.contains(&i) {
            out.push('[');
            out.push(c);
            out.push(']');
        } else {
            out.push(c);
        }
    }
    out
}

fn load_config(path: Option<&Path>) -> Result<PromptConfig> {
    match path {
        Some(path) => PromptConfig::load_toml(path),
        None => Ok(PromptConfig::default()),
    }
}

fn run(args: Args) -> Result<ExitCode> {
    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Expand {
            library,
            prompt,
            seed,
            count,
        } => {
            let library = Library::load(&library)?;
            let context = ErrorContext::default();
            let node = Resolver::new(&library, &context).parse_prompt(&prompt)?;
            let mut rng = rng(seed);
            for _ in 0..count {
                println!("{}", node.lower(&mut rng));
            }
        }
        Command::Check { prompt } => match paren_check(&prompt) {
            ParenStatus::Balanced => println!("balanced"),
            ParenStatus::Unmatched(pos) => {
                println!("{prompt}");
                println!("{}^ unmatched delimiter at {pos}", " ".repeat(pos));
                return Ok(ExitCode::FAILURE);
            }
        },
        Command::Highlight { library, prompt } => {
            let library = Library::load(&library)?;
            println!("{}", highlight_prompt(Some(&library), &prompt));
        }
        Command::Match { small, large } => {
            let m = calc_gap_match(&small, &large);
            if !m.is_match() {
                println!("no match");
                return Ok(ExitCode::FAILURE);
            }
            println!("result: {}", m.result);
            println!("path: {:?}", m.path);
            println!("{}", emphasize(&large, &m.path));
        }
        Command::Compose {
            library,
            scene,
            tags,
            seed,
        } => {
            let library = Library::load(&library)?;
            let content = std::fs::read_to_string(&scene)
                .with_context(|| format!("failed to read scene {}", scene.display()))?;
            let file: SceneFile = toml::from_str(&content)
                .with_context(|| format!("failed to parse scene {}", scene.display()))?;
            let index = match tags {
                Some(path) => TagIndex::load(path)?,
                None => TagIndex::default(),
            };
            let prompts = PromptAssembler::new(&library, &config)
                .with_tags(&index)
                .with_session(file.session)
                .create_prompts(&file.preset, file.style.as_ref(), &file.scene)?;
            let mut rng = rng(seed);
            for node in &prompts {
                println!("{}", node.lower(&mut rng));
            }
        }
        Command::Suggest {
            tags,
            query,
            limit,
        } => {
            let index = TagIndex::load(tags)?;
            let ranked = GapMatchRanker.rank(&query, index.matching(&query));
            for tag in ranked.iter().take(limit) {
                println!(
                    "{}\t{}\t{}",
                    emphasize(&tag.word, &tag.highlight),
                    tag.score,
                    tag.freq
                );
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    run(Args::parse())
}
