use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sous_core::schema::DEFAULT_SERVINGS;
use sous_core::{AgentRegistry, AiConfig, RecipeRequest, RecipeWorkflow, WorkflowConfig};

/// Where the recipe request comes from.
pub enum RequestSource {
    File(PathBuf),
    Flags {
        ingredients: Vec<String>,
        taste: Option<String>,
        servings: Option<u32>,
        dietary_notes: Option<String>,
    },
}

/// Command-line overrides for the environment's workflow configuration.
pub struct Overrides {
    pub ingredient_agent: Option<String>,
    pub recipe_agent: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Overrides {
    fn apply(self, mut config: WorkflowConfig) -> WorkflowConfig {
        if let Some(agent) = self.ingredient_agent {
            config.ingredient_agent = agent;
        }
        if let Some(agent) = self.recipe_agent {
            config.recipe_agent = agent;
        }
        if let Some(secs) = self.timeout_secs {
            config.stage_timeout = Duration::from_secs(secs);
        }
        config
    }
}

pub async fn cook(source: RequestSource, overrides: Overrides, show_plan: bool) -> Result<()> {
    let ai_config = AiConfig::from_env()?;
    let workflow_config = overrides.apply(WorkflowConfig::from_env()?);
    let registry = Arc::new(AgentRegistry::from_config(&ai_config)?);

    tracing::info!(
        provider = ai_config.provider.as_str(),
        ingredient_agent = %workflow_config.ingredient_agent,
        recipe_agent = %workflow_config.recipe_agent,
        timeout_secs = workflow_config.stage_timeout.as_secs(),
        "Starting recipe workflow"
    );

    let workflow = RecipeWorkflow::new(registry, workflow_config);

    let output = match source {
        RequestSource::File(path) => {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read request file {}", path.display()))?;
            let value: serde_json::Value = serde_json::from_str(&contents)
                .with_context(|| format!("Request file {} is not valid JSON", path.display()))?;
            if show_plan {
                let request = RecipeRequest::validate(&value)?;
                serde_json::to_string_pretty(&workflow.run_with_report(&request).await?)?
            } else {
                serde_json::to_string_pretty(&workflow.run_json(&value).await?)?
            }
        }
        RequestSource::Flags {
            ingredients,
            taste,
            servings,
            dietary_notes,
        } => {
            let mut request = RecipeRequest::new(ingredients, taste.unwrap_or_default())
                .with_servings(servings.unwrap_or(DEFAULT_SERVINGS));
            if let Some(notes) = dietary_notes {
                request = request.with_dietary_notes(notes);
            }
            if show_plan {
                serde_json::to_string_pretty(&workflow.run_with_report(&request).await?)?
            } else {
                serde_json::to_string_pretty(&workflow.run(&request).await?)?
            }
        }
    };

    println!("{}", output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_only_what_is_set() {
        let overrides = Overrides {
            ingredient_agent: None,
            recipe_agent: Some("pastryAgent".to_string()),
            timeout_secs: Some(5),
        };

        let config = overrides.apply(WorkflowConfig::default());

        assert_eq!(config.ingredient_agent, sous_core::INGREDIENT_AGENT);
        assert_eq!(config.recipe_agent, "pastryAgent");
        assert_eq!(config.stage_timeout, Duration::from_secs(5));
    }
}
