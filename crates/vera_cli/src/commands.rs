//! Command handlers for the Vera CLI.

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use serde::Deserialize;
use std::io::{stdin, stdout, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use vera_core::{
    Catalog, ChatBackend, Decision, EmbeddingBackend, EmbeddingStrategy, HashEmbedder, Invoker,
    KeywordStrategy, OllamaChat, OllamaEmbedder, RandomStrategy, Router, Session, VeraConfig,
};

/// Build a full session from config: catalog, Ollama backends, router,
/// invoker. Modes that consult the embedding strategy will call the
/// embedding service here, once, to build the entry cache.
async fn build_session(config: &VeraConfig) -> Result<Session> {
    let catalog = Arc::new(
        Catalog::load(Path::new(&config.catalog_path))
            .with_context(|| format!("failed to load catalog from {}", config.catalog_path))?,
    );

    let chat: Arc<dyn ChatBackend> = Arc::new(
        OllamaChat::new(
            &config.ollama.base_url,
            &config.ollama.chat_model,
            Duration::from_secs(config.ollama.chat_timeout_secs),
        )?
        .with_keep_alive(&config.ollama.keep_alive),
    );
    let embedder: Arc<dyn EmbeddingBackend> = Arc::new(OllamaEmbedder::new(
        &config.ollama.base_url,
        &config.ollama.embed_model,
        config.ollama.embed_dimension,
        Duration::from_secs(config.ollama.embed_timeout_secs),
    )?);

    let router = Router::new(catalog.clone(), config.mode, chat, embedder)
        .await
        .context("failed to initialize router")?;
    let invoker = Invoker::new(
        catalog,
        &config.invoker.interpreter,
        Duration::from_secs(config.invoker.timeout_secs),
    );
    Ok(Session::new(router, invoker))
}

/// Interactive chat loop. A failed turn prints and the loop continues;
/// only startup failures end the command.
pub async fn chat(config: &VeraConfig) -> Result<()> {
    let mut session = build_session(config).await?;

    println!("Welcome to Vera. Type your query below ('exit' or 'quit' to leave).");
    loop {
        print!("{} ", ">".bright_cyan());
        stdout().flush()?;

        let mut line = String::new();
        if stdin().read_line(&mut line)? == 0 {
            break;
        }
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if query.eq_ignore_ascii_case("exit") || query.eq_ignore_ascii_case("quit") {
            break;
        }

        match session.respond(query).await {
            Ok(answer) => println!("{} {}", "Vera:".bright_green(), answer),
            Err(e) => println!("{} {}", "[ERROR]".red(), e),
        }
    }
    Ok(())
}

/// One-shot query.
pub async fn ask(config: &VeraConfig, query: &str) -> Result<()> {
    let mut session = build_session(config).await?;
    let answer = session.respond(query).await?;
    println!("{answer}");
    Ok(())
}

#[derive(Debug, Deserialize)]
struct EvalCase {
    user_query: String,
    expected_model: String,
}

fn truncate(text: &str, max: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max {
        text.to_string()
    } else {
        let mut out: String = chars[..max.saturating_sub(3)].iter().collect();
        out.push_str("...");
        out
    }
}

fn mark(decision: &Decision, expected: &str) -> String {
    match decision {
        Decision::Model(path) if path == expected => "[OK]".bright_green().to_string(),
        Decision::Model(_) => "[X]".bright_red().to_string(),
        Decision::NoMatch => "[-]".yellow().to_string(),
    }
}

fn is_correct(decision: &Decision, expected: &str) -> bool {
    matches!(decision, Decision::Model(path) if path == expected)
}

/// Offline strategy comparison on a labeled query set. Uses the
/// deterministic hash embedder so no services are required; the random
/// strategy is the lower bound the others must beat.
pub async fn eval(config: &VeraConfig, queries: &PathBuf) -> Result<()> {
    let catalog = Arc::new(
        Catalog::load(Path::new(&config.catalog_path))
            .with_context(|| format!("failed to load catalog from {}", config.catalog_path))?,
    );
    let raw = std::fs::read_to_string(queries)
        .with_context(|| format!("failed to read query set {}", queries.display()))?;
    let cases: Vec<EvalCase> = serde_json::from_str(&raw).context("malformed query set")?;

    let keyword = KeywordStrategy::new(&catalog)?;
    let embedding = EmbeddingStrategy::new(&catalog, Arc::new(HashEmbedder::default())).await?;
    let random = RandomStrategy::new(&catalog);

    println!();
    println!(
        "{:<42} {:<26} {:<10} {:<10} {:<10}",
        "User Query".bold(),
        "Expected Model".bold(),
        "Keyword".bold(),
        "Embedding".bold(),
        "Random".bold()
    );
    println!("{}", "-".repeat(100).dimmed());

    let (mut kw_hits, mut emb_hits, mut rnd_hits) = (0usize, 0usize, 0usize);
    for case in &cases {
        let kw = keyword.select(&case.user_query);
        let emb = embedding.select(&case.user_query).await?;
        let rnd = random.select(&case.user_query);

        kw_hits += is_correct(&kw, &case.expected_model) as usize;
        emb_hits += is_correct(&emb, &case.expected_model) as usize;
        rnd_hits += is_correct(&rnd, &case.expected_model) as usize;

        println!(
            "{:<42} {:<26} {:<10} {:<10} {:<10}",
            truncate(&case.user_query, 40),
            truncate(&case.expected_model, 24),
            mark(&kw, &case.expected_model),
            mark(&emb, &case.expected_model),
            mark(&rnd, &case.expected_model),
        );
    }

    let total = cases.len().max(1);
    let pct = |hits: usize| format!("{:.1}%", hits as f64 * 100.0 / total as f64);

    println!("{}", "-".repeat(100).dimmed());
    println!(
        "{:<69} {:<10} {:<10} {:<10}",
        format!("Accuracy over {} queries", cases.len()),
        pct(kw_hits).bright_green().to_string(),
        pct(emb_hits).bright_green().to_string(),
        pct(rnd_hits).yellow().to_string(),
    );
    println!();
    Ok(())
}

/// List the catalog.
pub fn catalog(config: &VeraConfig) -> Result<()> {
    let catalog = Catalog::load(Path::new(&config.catalog_path))
        .with_context(|| format!("failed to load catalog from {}", config.catalog_path))?;

    println!();
    for entry in catalog.entries() {
        println!("{}", entry.path.bright_cyan());
        println!("  {}", entry.description);
        if !entry.tags.is_empty() {
            println!("  tags: {}", entry.tags.join(", ").dimmed());
        }
        if !entry.keywords.is_empty() {
            println!("  keywords: {}", entry.keywords.join(", ").dimmed());
        }
        println!();
    }
    println!("{} models in catalog", catalog.len());
    Ok(())
}
