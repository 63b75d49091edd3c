//! Demo orchestration: runs the fixed generation scenarios and prints results.

use crate::ai::{
    DirectHttpClient, GenerationService, IamTokenClient, ModelInference, TokenProvider,
};
use crate::config::{Config, Credentials};
use crate::models::{
    DecodingMethod, GenerationRequest, GenerationResult, FLAN_UL2, LLAMA_2_13B_CHAT,
};
use crate::{prompts, Result};
use std::io::Write;
use std::sync::Arc;
use tracing::{error, info};

pub const DELIMITER: &str =
    "---------------------------------------------------------------------------";

/// Which generation client a scenario goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Managed,
    Direct,
}

#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: &'static str,
    pub prompt_label: &'static str,
    pub answer_label: &'static str,
    pub strategy: Strategy,
    pub request: GenerationRequest,
}

pub fn complaint_request() -> GenerationRequest {
    GenerationRequest::new(
        LLAMA_2_13B_CHAT,
        prompts::complaint_prompt(),
        100,
        50,
        DecodingMethod::Greedy,
        0.7,
    )
}

pub fn question_request() -> GenerationRequest {
    GenerationRequest::new(
        FLAN_UL2,
        prompts::CAPITAL_QUESTION,
        300,
        50,
        DecodingMethod::Sample,
        0.7,
    )
}

/// The three demo scenarios, in the order they run.
pub fn demo_scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "complaint-factors",
            prompt_label: "Prompt",
            answer_label: "List of complaints",
            strategy: Strategy::Managed,
            request: complaint_request(),
        },
        Scenario {
            name: "question",
            prompt_label: "Question/request",
            answer_label: "Answer",
            strategy: Strategy::Managed,
            request: question_request(),
        },
        Scenario {
            name: "question-rest",
            prompt_label: "Question/request",
            answer_label: "Answer",
            strategy: Strategy::Direct,
            request: question_request(),
        },
    ]
}

/// Write one delimiter-wrapped prompt/answer block.
pub fn write_exchange<W: Write>(
    out: &mut W,
    prompt_label: &str,
    prompt: &str,
    answer_label: &str,
    answer: &str,
) -> std::io::Result<()> {
    writeln!(out, "{}", DELIMITER)?;
    writeln!(out, "{}: {}", prompt_label, prompt)?;
    writeln!(out, "{}: {}", answer_label, answer)?;
    writeln!(out, "{}", DELIMITER)?;
    out.flush()
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub managed: Box<dyn GenerationService>,
    pub direct: Box<dyn GenerationService>,
}

pub struct App {
    managed: Box<dyn GenerationService>,
    direct: Box<dyn GenerationService>,
    scenarios: Vec<Scenario>,
}

impl App {
    pub fn with_services(services: AppServices) -> Self {
        Self {
            managed: services.managed,
            direct: services.direct,
            scenarios: demo_scenarios(),
        }
    }

    /// Wire real watsonx.ai clients from configuration and credentials.
    pub fn new(config: &Config, credentials: Credentials) -> Self {
        // Reuse one HTTP connection pool across clients.
        let http_client = reqwest::Client::new();

        let iam: Arc<dyn TokenProvider> =
            Arc::new(IamTokenClient::from_config(config, http_client.clone()));

        info!(
            "Using watsonx.ai at {} (IAM: {})",
            config.service_url, config.iam_url
        );

        let managed = ModelInference::new_with_client(
            credentials.clone(),
            config,
            iam.clone(),
            http_client.clone(),
        );
        let direct = DirectHttpClient::new_with_client(credentials, config, iam, http_client);

        Self::with_services(AppServices {
            managed: Box::new(managed),
            direct: Box::new(direct),
        })
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Run every scenario in order, stopping at the first failure.
    pub async fn run<W: Write>(&self, out: &mut W) -> Result<()> {
        for scenario in &self.scenarios {
            self.run_scenario(scenario, out).await?;
        }
        Ok(())
    }

    pub async fn run_scenario<W: Write>(
        &self,
        scenario: &Scenario,
        out: &mut W,
    ) -> Result<GenerationResult> {
        info!(
            "[{}] Generating with {} ({:?} client)",
            scenario.name, scenario.request.model_id, scenario.strategy
        );

        let service = match scenario.strategy {
            Strategy::Managed => &self.managed,
            Strategy::Direct => &self.direct,
        };

        let result = service.generate(&scenario.request).await.map_err(|e| {
            error!("[{}] Generation failed: {}", scenario.name, e);
            e
        })?;

        write_exchange(
            out,
            scenario.prompt_label,
            &scenario.request.prompt,
            scenario.answer_label,
            &result.generated_text,
        )?;

        Ok(result)
    }
}
