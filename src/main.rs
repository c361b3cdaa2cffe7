use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use veriflow::cache::{MemoryStore, VerdictCache};
use veriflow::config::Config;
use veriflow::enrich::IdentityTranslator;
use veriflow::llm::openai::LlmClient;
use veriflow::llm::stub::DisabledLlm;
use veriflow::llm::Llm;
use veriflow::metrics::MetricsRegistry;
use veriflow::pipeline::Pipeline;
use veriflow::retrieve::{
    EvidenceBackend, EvidenceRetriever, FactCheckBackend, LocalIndexBackend,
    SnippetCacheBackend, WebSearchBackend,
};
use veriflow::search::SerperClient;
use veriflow::server::{run_server, AppState};
use veriflow::tasks::TaskManager;
use veriflow::types::PipelinePayload;

#[derive(Parser)]
#[command(name = "veriflow", version, about = "Claim verification pipeline")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Run the verification HTTP server
    Serve {
        #[arg(long)]
        addr: Option<String>,
    },
    /// Verify a single text and print the result as JSON
    Verify {
        #[arg(long)]
        text: String,
        #[arg(long, default_value = "cli")]
        platform: String,
    },
}

fn build_pipeline(cfg: &Config, metrics: Arc<MetricsRegistry>) -> Pipeline {
    let oracle: Arc<dyn Llm> = match &cfg.llm.api_key {
        Some(_) => Arc::new(LlmClient::new(
            cfg.llm.model.clone(),
            cfg.llm.base_url.clone(),
            cfg.llm.api_key.clone(),
            cfg.llm.max_concurrency,
            cfg.llm.timeout,
        )),
        None => Arc::new(DisabledLlm),
    };

    let snippet_store = Arc::new(MemoryStore::new());
    let mut backends: Vec<Arc<dyn EvidenceBackend>> = vec![
        Arc::new(SnippetCacheBackend::new(snippet_store)),
        Arc::new(LocalIndexBackend::new()),
    ];
    if let Some(key) = &cfg.search.api_key {
        if let Ok(searcher) = SerperClient::new(
            key.clone(),
            cfg.search.qps,
            cfg.search.top_k,
            cfg.search.timeout,
        ) {
            let searcher = Arc::new(searcher);
            backends.push(Arc::new(WebSearchBackend::new(searcher.clone())));
            backends.push(Arc::new(FactCheckBackend::new(
                searcher,
                cfg.search.fact_check_sites.clone(),
            )));
        }
    }

    Pipeline::new(
        oracle.clone(),
        oracle,
        Arc::new(IdentityTranslator),
        EvidenceRetriever::new(backends, cfg.fusion),
        VerdictCache::in_memory(cfg.cache_ttl),
        metrics,
        cfg.aggregation,
        cfg.claim_concurrency,
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let cfg = Config::from_env();
    let metrics = Arc::new(MetricsRegistry::new());
    let pipeline = Arc::new(build_pipeline(&cfg, metrics.clone()));

    match cli.cmd {
        Cmd::Serve { addr } => {
            let state = AppState { tasks: TaskManager::new(pipeline), metrics };
            let addr = addr.unwrap_or_else(|| cfg.bind_addr.clone());
            run_server(state, &addr).await
        }
        Cmd::Verify { text, platform } => {
            let result = pipeline
                .process(PipelinePayload::from_text(&platform, &text))
                .await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
    }
}
