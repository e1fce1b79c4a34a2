pub mod cli;
pub mod llm;
pub mod models;
pub mod repl;
pub mod session;

use cli::Args;
use llm::LlmConfig;
use llm::chat::new_client;
use log::info;
use session::ChatSession;
use std::error::Error;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let chat_llm_type = args.chat_llm_type
        .parse()
        .map_err(|e| format!("Invalid chat LLM type: {}", e))?;
    let config = LlmConfig {
        llm_type: chat_llm_type,
        api_key: Some(args.chat_api_key.clone()).filter(|k| !k.is_empty()),
        completion_model: args.chat_model.clone(),
        base_url: args.chat_base_url.clone(),
        referer: args.app_url.clone(),
        title: args.app_title.clone(),
    };

    info!("--- Core Configuration ---");
    info!("Chat LLM Type: {}", args.chat_llm_type);
    info!("Chat Model: {}", config.completion_model.as_deref().unwrap_or("adapter default"));
    info!("Chat Base URL: {}", config.base_url.as_deref().unwrap_or("adapter default"));
    info!("Attribution Referer: {}", config.referer.as_deref().unwrap_or("unset"));
    info!("Attribution Title: {}", config.title.as_deref().unwrap_or("unset"));
    info!("-------------------------");

    let client = new_client(&config)?;
    let mut session = ChatSession::new(client);
    repl::run(&mut session).await
}
